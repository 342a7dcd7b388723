//! tapedeck - a terminal audio-file player.
//!
//! Opens a WAV or FLAC file and plays it through the default output device
//! with Play/Pause/Stop transport controls, a loop toggle, a volume slider,
//! a running position readout and a scrolling peak-level meter. The player
//! itself sits behind the `player` feature; configuration and shell
//! completions are always available.

use clap::{CommandFactory, Parser, Subcommand, builder::PossibleValuesParser};
use clap_complete::{Generator, Shell, generate};
use std::error::Error;
use std::io;

mod cli;

#[cfg(feature = "player")]
mod player;

#[derive(Parser)]
#[command(name = "tapedeck")]
#[command(about = "Terminal audio-file player with transport controls and a peak meter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize tapedeck configuration
    Init {
        /// Directory the open dialog starts in
        #[arg(short, long)]
        start_dir: Option<String>,
    },
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Launch the player, optionally opening a file
    Play {
        /// WAV or FLAC file to open
        file: Option<String>,
        /// Skin to use (overrides the configured theme)
        #[arg(short, long, value_parser = PossibleValuesParser::new(tapedeck::config::THEMES.iter().copied()))]
        theme: Option<String>,
        /// Initial volume between 0.0 and 1.0
        #[arg(short, long)]
        volume: Option<f32>,
        /// Start with looping enabled
        #[arg(short, long = "loop")]
        looping: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// View current configuration
    View,
    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_parser = PossibleValuesParser::new([
            "theme",
            "start_dir",
            "volume",
            "refresh_ms",
            "block_frames",
            "output_channels",
            "looping",
            "log_file",
        ]))]
        key: String,
        /// Configuration value
        value: String,
    },
    /// Edit configuration file in your editor
    Edit,
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { start_dir } => {
            cli::init::handle_init(start_dir.as_deref())?;
        }
        Commands::Config { action } => match action {
            ConfigAction::View => {
                cli::config::handle_config_view()?;
            }
            ConfigAction::Set { key, value } => {
                cli::config::handle_config_set(&key, &value)?;
            }
            ConfigAction::Edit => {
                cli::config::handle_config_edit()?;
            }
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
        }
        Commands::Play {
            file,
            theme,
            volume,
            looping,
        } => {
            cli::play::handle_play(file.as_deref(), theme.as_deref(), volume, looping)?;
        }
    }

    Ok(())
}
