use owo_colors::OwoColorize;
use std::error::Error;
use std::process::Command;
use tapedeck::config::Config;

pub fn handle_config_view() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    println!("{}", "Current tapedeck configuration:".yellow().bold());
    println!("  theme: {}", config.theme);
    println!("  start_dir: {}", config.start_dir);
    println!("  volume: {:.2}", config.volume);
    println!("  looping: {}", config.looping);
    println!("  refresh_ms: {}", config.refresh_ms);
    println!("  block_frames: {}", config.block_frames);
    println!("  output_channels: {}", config.output_channels);
    println!("  log_file: {}", config.log_file);

    if !Config::exists()? {
        println!(
            "\n{} no config file yet, showing defaults. Run 'tapedeck init' to create one.",
            "Note:".yellow()
        );
    }

    Ok(())
}

pub fn handle_config_set(key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;

    config.set_value(key, value)?;
    config.save()?;

    println!("{} Configuration updated: {key} = {value}", "✓".green().bold());

    Ok(())
}

pub fn handle_config_edit() -> Result<(), Box<dyn Error>> {
    // Ensure config exists
    if !Config::exists()? {
        return Err("tapedeck not initialized. Run 'tapedeck init' first.".into());
    }

    let config_path = Config::config_path()?;
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    println!("Opening {} in {}", config_path.display(), editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                format!("Editor '{editor}' not found. Set $EDITOR to a valid editor path.")
            } else {
                format!("Failed to launch editor '{editor}': {e}")
            }
        })?;

    if !status.success() {
        return Err(format!("Editor '{editor}' exited with error").into());
    }

    // Validate the config after editing
    match Config::load() {
        Ok(_) => println!("Configuration saved successfully"),
        Err(e) => {
            return Err(format!("Configuration validation failed: {e}").into());
        }
    }

    Ok(())
}
