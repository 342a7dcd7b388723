use tapedeck::config::Config;
use tempfile::TempDir;

#[test]
fn test_config_lifecycle() {
    // Create a temporary directory for test config
    let temp_dir = TempDir::new().unwrap();

    // Override the config path for testing
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    // Test that config doesn't exist initially
    assert!(!Config::exists().unwrap());

    // Missing file means defaults
    let defaults = Config::load().unwrap();
    assert_eq!(defaults.theme, "tahoe");
    assert_eq!(defaults.volume, 1.0);
    assert!(!defaults.looping);

    // Create and save a config
    Config::new().save().unwrap();
    assert!(Config::exists().unwrap());

    // Test config mutation
    let mut config = Config::load().unwrap();
    config.set_value("theme", "matrix").unwrap();
    config.set_value("volume", "0.25").unwrap();
    config.set_value("looping", "true").unwrap();
    config.save().unwrap();

    // Verify mutations persisted
    let reloaded = Config::load().unwrap();
    assert_eq!(reloaded.theme, "matrix");
    assert_eq!(reloaded.volume, 0.25);
    assert!(reloaded.looping);

    // Test invalid keys and values
    let mut config = Config::load().unwrap();
    assert!(config.set_value("invalid_key", "value").is_err());
    assert!(config.set_value("theme", "neon").is_err());
    assert!(config.set_value("volume", "1.5").is_err());
    assert!(config.set_value("refresh_ms", "5").is_err());

    // Fields missing from the file fall back to defaults
    std::fs::write(
        Config::config_path().unwrap(),
        "theme = \"classic\"\nrefresh_ms = 30\n",
    )
    .unwrap();
    let partial = Config::load().unwrap();
    assert_eq!(partial.theme, "classic");
    assert_eq!(partial.refresh_interval_ms(), 30);
    assert_eq!(partial.block_frames, 512);
    assert_eq!(partial.output_channels, 2);
}
