use owo_colors::OwoColorize;
use std::error::Error;
use std::fs;
use tapedeck::config::Config;

pub fn handle_init(start_dir: Option<&str>) -> Result<(), Box<dyn Error>> {
    // Check if already initialized
    if Config::exists()? {
        return Err(
            "tapedeck is already initialized. Use 'tapedeck config set <key> <value>' to change settings."
                .into(),
        );
    }

    let mut config = Config::new();

    if let Some(dir) = start_dir {
        config.start_dir = dir.to_string();
    }

    let expanded = config.expanded_start_dir();
    if !expanded.exists() {
        println!("Creating start directory: {}", expanded.display());
        fs::create_dir_all(&expanded)?;
    } else if !expanded.is_dir() {
        return Err(format!("{} exists but is not a directory", expanded.display()).into());
    }

    config.save()?;

    println!("{} tapedeck initialized", "✓".green().bold());
    println!("Start directory: {}", expanded.display().cyan());
    println!(
        "Configuration saved to: {}",
        Config::config_path()?.display()
    );

    Ok(())
}
