//! Main application state and control flow for the player.
//!
//! This module ties the transport controller, the render control handle, the
//! open dialog and the skin together. It runs the terminal event loop: key
//! presses become transport events, and a refresh timer drains engine
//! notifications, pushes the latest block peak into the meter, refreshes the
//! position label and releases sources the render path has retired.

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use std::{error::Error, io};

use tapedeck::constants::GAIN_STEP;
use tapedeck::meter::MeterHistory;
use tapedeck::position::position_label;
use tapedeck::render::{EngineEvent, RenderControl, render_pair};
use tapedeck::source::decode_file;
use tapedeck::transport::{Controls, Deck, TransportController, TransportState};

use super::audio::AudioEngine;
use super::browser::{Browser, BrowserFocus};
use super::theme::Skin;
use super::ui;

/// Everything the player needs to start, resolved from config and CLI flags.
#[derive(Debug, Clone)]
pub struct PlayerOptions {
    pub file: Option<PathBuf>,
    pub skin: Skin,
    pub volume: f32,
    pub looping: bool,
    pub refresh_ms: u64,
    pub block_frames: usize,
    pub output_channels: u16,
    pub start_dir: PathBuf,
    pub log_path: PathBuf,
}

pub struct App {
    pub should_quit: bool,
    pub current_file: Option<PathBuf>,
    pub controller: TransportController<RenderControl>,
    pub meter: MeterHistory,
    pub position_text: String,
    pub browser: Browser,
    pub skin: Skin,
    pub status: Option<String>,
    start_dir: PathBuf,
    engine_events: Receiver<EngineEvent>,
}

impl App {
    pub fn new(
        control: RenderControl,
        engine_events: Receiver<EngineEvent>,
        looping: bool,
        skin: Skin,
        start_dir: PathBuf,
    ) -> Self {
        let controller = TransportController::new(control, looping);
        let position_text = position_label(controller.state(), 0.0);

        Self {
            should_quit: false,
            current_file: None,
            controller,
            meter: MeterHistory::new(),
            position_text,
            browser: Browser::new(),
            skin,
            status: None,
            start_dir,
            engine_events,
        }
    }

    pub fn state(&self) -> TransportState {
        self.controller.state()
    }

    pub fn controls(&self) -> Controls {
        self.controller.controls()
    }

    pub fn is_looping(&self) -> bool {
        self.controller.transport().is_looping()
    }

    pub fn gain(&self) -> f32 {
        self.controller.deck().gain()
    }

    pub fn duration_secs(&self) -> f64 {
        self.controller.deck().duration_secs()
    }

    /// Decodes `path` and hands it to the transport. On failure the current
    /// file and transport state are left as they were.
    pub fn open_file(&mut self, path: &Path) {
        match decode_file(path) {
            Ok(source) => {
                info!("Opened {}", path.display());
                self.controller.open(Box::new(source));
                self.current_file = Some(path.to_path_buf());
                self.meter.clear();
                self.status = None;
                self.refresh_position();
            }
            Err(e) => {
                log::warn!("Could not open {}: {e}", path.display());
                self.status = Some(format!("Could not open {}: {e}", path.display()));
            }
        }
    }

    pub fn show_open_dialog(&mut self) {
        let start_dir = self.start_dir.clone();
        if let Err(e) = self.browser.open(&start_dir) {
            log::warn!("Could not scan {}: {e}", start_dir.display());
            self.status = Some(format!("Could not scan {}: {e}", start_dir.display()));
        }
    }

    pub fn press_play(&mut self) {
        if self.controls().play {
            self.controller.play();
        }
    }

    pub fn press_pause(&mut self) {
        if self.controls().pause {
            self.controller.pause();
        }
    }

    pub fn press_stop(&mut self) {
        if self.controls().stop {
            self.controller.stop();
        }
    }

    /// Space bar: whichever of Play or Pause is currently enabled.
    pub fn press_play_pause(&mut self) {
        if self.controls().play {
            self.press_play();
        } else {
            self.press_pause();
        }
    }

    pub fn toggle_loop(&mut self) {
        self.controller.toggle_looping();
    }

    pub fn change_volume(&mut self, delta: f32) {
        let gain = ((self.gain() + delta) * 100.0).round() / 100.0;
        self.controller.deck().set_gain(gain);
    }

    pub fn cycle_skin(&mut self) {
        self.skin = self.skin.next();
    }

    /// Timer callback.
    pub fn tick(&mut self) {
        while let Ok(event) = self.engine_events.try_recv() {
            self.controller
                .engine_changed(event == EngineEvent::Started);
        }

        self.meter.push(self.controller.deck().peak());
        self.refresh_position();
        self.controller.deck().collect_retired();
    }

    fn refresh_position(&mut self) {
        self.position_text = position_label(self.state(), self.controller.deck().position());
    }
}

pub fn run(options: PlayerOptions) -> Result<(), Box<dyn Error>> {
    init_logging(&options.log_path)?;
    info!("Starting tapedeck player");

    let (control, path, engine_events) = render_pair(options.output_channels, options.volume);

    // Open the device before touching the terminal so errors print normally
    let engine = AudioEngine::start(path, options.block_frames)?;
    if !engine.is_running() {
        log::warn!("Audio output accepted no source; playback will be silent");
    }

    let mut app = App::new(
        control,
        engine_events,
        options.looping,
        options.skin,
        options.start_dir.clone(),
    );

    if let Some(file) = &options.file {
        app.open_file(file);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let refresh = Duration::from_millis(options.refresh_ms);
    let res = run_app(&mut terminal, &mut app, refresh);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        log::error!("Player stopped with error: {e}");
    }
    info!("Player exited");

    res
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    refresh: Duration,
) -> Result<(), Box<dyn Error>> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = refresh.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key_event(app, key);
        }

        if last_tick.elapsed() >= refresh {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

pub fn handle_key_event(app: &mut App, key: event::KeyEvent) {
    if app.browser.is_active {
        handle_browser_keys(app, key);
    } else {
        handle_player_keys(app, key);
    }
}

fn handle_browser_keys(app: &mut App, key: event::KeyEvent) {
    // Universal keys that work regardless of focus
    match key.code {
        KeyCode::Esc => {
            app.browser.close();
            return;
        }
        KeyCode::Enter => {
            if let Some(path) = app.browser.confirm() {
                app.open_file(&path);
            }
            return;
        }
        KeyCode::Tab => {
            app.browser.toggle_focus();
            return;
        }
        KeyCode::Up => {
            app.browser.select_previous();
            return;
        }
        KeyCode::Down => {
            app.browser.select_next();
            return;
        }
        _ => {}
    }

    match app.browser.focus {
        BrowserFocus::Search => match key.code {
            KeyCode::Char(c) => app.browser.push_char(c),
            KeyCode::Backspace => app.browser.pop_char(),
            _ => {}
        },
        BrowserFocus::Files => match key.code {
            KeyCode::Char('j') => app.browser.select_next(),
            KeyCode::Char('k') => app.browser.select_previous(),
            KeyCode::Char('/') => app.browser.focus = BrowserFocus::Search,
            KeyCode::Backspace => app.browser.clear_search(),
            KeyCode::Char('q') => app.browser.close(),
            _ => {}
        },
    }
}

fn handle_player_keys(app: &mut App, key: event::KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('o') => app.show_open_dialog(),
        KeyCode::Char(' ') => app.press_play_pause(),
        KeyCode::Char('p') => app.press_play(),
        KeyCode::Char('a') => app.press_pause(),
        KeyCode::Char('s') => app.press_stop(),
        KeyCode::Char('l') => app.toggle_loop(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_volume(GAIN_STEP),
        KeyCode::Char('-') => app.change_volume(-GAIN_STEP),
        KeyCode::Char('t') => app.cycle_skin(),
        _ => {}
    }
}

fn init_logging(log_path: &Path) -> Result<(), Box<dyn Error>> {
    use simplelog::*;
    use std::fs::File;

    CombinedLogger::init(vec![WriteLogger::new(
        LevelFilter::Debug,
        Config::default(),
        File::create(log_path)?,
    )])?;

    Ok(())
}
