use std::error::Error;

pub fn handle_play(
    file: Option<&str>,
    theme: Option<&str>,
    volume: Option<f32>,
    looping: bool,
) -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "player")]
    {
        use crate::player::{PlayerOptions, Skin};
        use std::path::PathBuf;
        use tapedeck::config::Config;

        let config = Config::load()?;

        let skin = Skin::from_name(theme.unwrap_or(&config.theme))?;

        let volume = match volume {
            Some(v) if !(0.0..=1.0).contains(&v) => {
                return Err(format!("Volume must be between 0.0 and 1.0, got {v}").into());
            }
            Some(v) => v,
            None => config.initial_gain(),
        };

        let options = PlayerOptions {
            file: file.map(|f| PathBuf::from(shellexpand::tilde(f).to_string())),
            skin,
            volume,
            looping: looping || config.looping,
            refresh_ms: config.refresh_interval_ms(),
            block_frames: config.block_frames.max(1),
            output_channels: config.output_channels.clamp(1, 2),
            start_dir: config.expanded_start_dir(),
            log_path: config.log_path(),
        };

        crate::player::run(options)
    }

    #[cfg(not(feature = "player"))]
    {
        let _ = (file, theme, volume, looping);
        use owo_colors::OwoColorize;
        println!("{} {}", "🎵".cyan(), "tapedeck player".bold());
        println!();
        println!(
            "{} The player requires the 'player' feature to be enabled.",
            "Note:".yellow()
        );
        println!();
        println!("To enable it, install with:");
        println!("  {}", "cargo install tapedeck --features player".cyan());
        println!();
        println!("Or if building from source:");
        println!("  {}", "cargo build --release --features player".cyan());

        Ok(())
    }
}
