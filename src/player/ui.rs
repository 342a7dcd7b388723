use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph},
};

use tapedeck::position::format_position;

use super::app::App;
use super::browser::{Browser, BrowserFocus};
use super::theme::Palette;

pub fn draw(f: &mut Frame, app: &App) {
    let size = f.area();
    let palette = app.skin.palette();

    draw_main_ui(f, app, &palette);

    // Draw the open dialog on top if active
    if app.browser.is_active {
        draw_browser(f, size, &app.browser, &palette);
    }
}

fn draw_main_ui(f: &mut Frame, app: &App, palette: &Palette) {
    let size = f.area();
    let show_meter = size.height > 16; // Only show the meter if the window is tall enough

    let background = Block::default().style(Style::default().bg(palette.background));
    f.render_widget(background, size);

    let mut constraints = vec![
        Constraint::Length(2), // Title
        Constraint::Length(2), // File info
        Constraint::Length(3), // Transport buttons + loop toggle
        Constraint::Length(3), // Volume slider
        Constraint::Length(3), // Position readout
    ];
    if show_meter {
        constraints.push(Constraint::Min(4)); // Meter
    }
    constraints.push(Constraint::Length(2)); // Key help

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(size);

    let title = Paragraph::new(format!("tapedeck · {}", app.skin))
        .style(
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    draw_file_info(f, chunks[1], app, palette);
    draw_transport(f, chunks[2], app, palette);
    draw_volume(f, chunks[3], app, palette);
    draw_position(f, chunks[4], app, palette);

    let help_idx = if show_meter {
        draw_meter(f, chunks[5], app, palette);
        6
    } else {
        5
    };
    draw_help(f, chunks[help_idx], palette);
}

fn draw_file_info(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let text = if let Some(status) = &app.status {
        Line::from(Span::styled(
            status.clone(),
            Style::default().fg(palette.stop),
        ))
    } else if let Some(file) = &app.current_file {
        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file.display().to_string());
        Line::from(vec![
            Span::styled("Loaded: ", Style::default().fg(palette.disabled)),
            Span::styled(filename, Style::default().fg(palette.text)),
            Span::styled(
                format!("  [{}]", format_position(app.duration_secs())),
                Style::default().fg(palette.disabled),
            ),
        ])
    } else {
        Line::from(Span::styled(
            "No file loaded - press [o] to open one",
            Style::default().fg(palette.disabled),
        ))
    };

    let widget = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(palette.border)),
    );
    f.render_widget(widget, area);
}

fn button<'a>(label: &'a str, enabled: bool, color: Color, palette: &Palette) -> Span<'a> {
    if enabled {
        Span::styled(
            label,
            Style::default()
                .fg(palette.background)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            label,
            Style::default().fg(palette.disabled).bg(palette.panel),
        )
    }
}

fn draw_transport(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let controls = app.controls();
    let looping = app.is_looping();

    let checkbox = if looping { "[x]" } else { "[ ]" };
    let loop_style = if looping {
        Style::default().fg(palette.toggle_on)
    } else {
        Style::default().fg(palette.text)
    };

    let row = vec![
        button(" Open ", true, palette.accent, palette),
        Span::raw("  "),
        button(" Play ", controls.play, palette.play, palette),
        Span::raw("  "),
        button(" Pause ", controls.pause, palette.pause, palette),
        Span::raw("  "),
        button(" Stop ", controls.stop, palette.stop, palette),
        Span::raw("    "),
        Span::styled(format!("{checkbox} Loop"), loop_style),
    ];

    let widget = Paragraph::new(Line::from(row)).alignment(Alignment::Center);

    // Buttons sit on the middle row of the area
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    f.render_widget(widget, rows[1]);
}

fn draw_volume(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let gain = app.gain();

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border))
                .title(Span::styled(" Volume ", Style::default().fg(palette.text))),
        )
        .gauge_style(Style::default().fg(palette.accent).bg(palette.panel))
        .ratio(gain.clamp(0.0, 1.0) as f64)
        .label(Span::styled(
            format!("{gain:.2}"),
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        ));

    f.render_widget(gauge, area);
}

fn draw_position(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let widget = Paragraph::new(app.position_text.as_str())
        .style(
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border)),
        );
    f.render_widget(widget, area);
}

fn draw_meter(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(Span::styled(" Level ", Style::default().fg(palette.text)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let height = inner.height as usize;
    if height == 0 {
        return;
    }

    let style = if app.meter.latest() > 0.9 {
        Style::default().fg(palette.meter_hot)
    } else {
        Style::default().fg(palette.meter)
    };

    let lines: Vec<Line> = app
        .meter
        .rows(height)
        .into_iter()
        .map(|row| Line::from(Span::styled(row, style)))
        .collect();

    let widget = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(widget, inner);
}

fn draw_help(f: &mut Frame, area: Rect, palette: &Palette) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(palette.accent));
    let text = |t: &'static str| Span::styled(t, Style::default().fg(palette.text));

    let help = vec![
        key("[o]"),
        text(" open  "),
        key("[space]"),
        text(" play/pause  "),
        key("[s]"),
        text(" stop  "),
        key("[l]"),
        text(" loop  "),
        key("[+/-]"),
        text(" volume  "),
        key("[t]"),
        text(" theme  "),
        key("[q]"),
        text(" quit"),
    ];

    let widget = Paragraph::new(Line::from(help))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(palette.border)),
        );
    f.render_widget(widget, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn draw_browser(f: &mut Frame, area: Rect, browser: &Browser, palette: &Palette) {
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(popup);

    let search_border = if browser.focus == BrowserFocus::Search {
        palette.accent
    } else {
        palette.border
    };
    let search = Paragraph::new(browser.search_query.as_str())
        .style(Style::default().fg(palette.text).bg(palette.background))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(search_border))
                .title(" Filter (Tab) "),
        );
    f.render_widget(search, chunks[0]);

    let entries = browser.get_filtered_items();
    let items: Vec<ListItem> = entries
        .iter()
        .map(|path| ListItem::new(browser.display_name(path).to_string()))
        .collect();

    let title = format!(
        " Open {} ({} of {}) ",
        browser.root.display(),
        entries.len(),
        browser.items.len()
    );

    let files_border = if browser.focus == BrowserFocus::Files {
        palette.accent
    } else {
        palette.border
    };
    let list = List::new(items)
        .style(Style::default().fg(palette.text).bg(palette.background))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(files_border))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .fg(palette.background)
                .bg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !entries.is_empty() {
        state.select(Some(browser.selected));
    }
    f.render_stateful_widget(list, chunks[1], &mut state);
}
