//! Application configuration management.
//!
//! This module handles the persistent settings for tapedeck: the skin, the
//! directory the open dialog starts in, the initial volume and loop state, the
//! UI refresh interval and the device block size. Configuration is stored in the
//! user's config directory (typically ~/.config/tapedeck/config.toml); a missing
//! file means defaults, and every field falls back to its default on its own.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use crate::constants::{DEFAULT_BLOCK_FRAMES, MAX_GAIN, MAX_REFRESH_MS, MIN_GAIN, MIN_REFRESH_MS};

pub const THEMES: &[&str] = &["tahoe", "classic", "matrix"];

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_start_dir")]
    pub start_dir: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,
    #[serde(default = "default_block_frames")]
    pub block_frames: usize,
    #[serde(default = "default_output_channels")]
    pub output_channels: u16,
    #[serde(default)]
    pub looping: bool,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_theme() -> String {
    "tahoe".to_string()
}

fn default_start_dir() -> String {
    dirs::audio_dir()
        .or_else(dirs::home_dir)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string())
}

fn default_volume() -> f32 {
    MAX_GAIN
}

fn default_refresh_ms() -> u64 {
    MAX_REFRESH_MS
}

fn default_block_frames() -> usize {
    DEFAULT_BLOCK_FRAMES
}

fn default_output_channels() -> u16 {
    2
}

fn default_log_file() -> String {
    std::env::temp_dir()
        .join("tapedeck.log")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            theme: default_theme(),
            start_dir: default_start_dir(),
            volume: default_volume(),
            refresh_ms: default_refresh_ms(),
            block_frames: default_block_frames(),
            output_channels: default_output_channels(),
            looping: false,
            log_file: default_log_file(),
        }
    }

    pub fn config_dir() -> Result<PathBuf, Box<dyn Error>> {
        // Check for XDG_CONFIG_HOME first (useful for testing)
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config).join("tapedeck")
        } else {
            dirs::config_dir()
                .ok_or("Unable to find config directory")?
                .join("tapedeck")
        };
        Ok(config_dir)
    }

    pub fn config_path() -> Result<PathBuf, Box<dyn Error>> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self, Box<dyn Error>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            // Return default config instead of error
            return Ok(Default::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()?;
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(&config_path, toml_string)?;

        Ok(())
    }

    pub fn exists() -> Result<bool, Box<dyn Error>> {
        Ok(Self::config_path()?.exists())
    }

    /// `start_dir` with a leading `~` expanded.
    pub fn expanded_start_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.start_dir).to_string())
    }

    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.log_file).to_string())
    }

    /// Refresh interval forced into the supported range.
    pub fn refresh_interval_ms(&self) -> u64 {
        self.refresh_ms.clamp(MIN_REFRESH_MS, MAX_REFRESH_MS)
    }

    pub fn initial_gain(&self) -> f32 {
        if self.volume.is_nan() {
            return MAX_GAIN;
        }
        self.volume.clamp(MIN_GAIN, MAX_GAIN)
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        match key {
            "theme" => {
                if !THEMES.contains(&value) {
                    return Err(format!(
                        "Unknown theme: {value} (expected one of {})",
                        THEMES.join(", ")
                    )
                    .into());
                }
                self.theme = value.to_string();
            }
            "start_dir" => self.start_dir = value.to_string(),
            "volume" => {
                let volume = value
                    .parse::<f32>()
                    .map_err(|_| "Value must be a number between 0.0 and 1.0")?;
                if !(MIN_GAIN..=MAX_GAIN).contains(&volume) {
                    return Err("Value must be a number between 0.0 and 1.0".into());
                }
                self.volume = volume;
            }
            "refresh_ms" => {
                let refresh = value
                    .parse::<u64>()
                    .map_err(|_| "Value must be a whole number of milliseconds")?;
                if !(MIN_REFRESH_MS..=MAX_REFRESH_MS).contains(&refresh) {
                    return Err(format!(
                        "Refresh interval must be between {MIN_REFRESH_MS} and {MAX_REFRESH_MS} ms"
                    )
                    .into());
                }
                self.refresh_ms = refresh;
            }
            "block_frames" => {
                let frames = value
                    .parse::<usize>()
                    .map_err(|_| "Value must be a positive whole number")?;
                if frames == 0 {
                    return Err("Value must be a positive whole number".into());
                }
                self.block_frames = frames;
            }
            "output_channels" => {
                let channels = value
                    .parse::<u16>()
                    .map_err(|_| "Value must be 1 or 2")?;
                if !(1..=2).contains(&channels) {
                    return Err("Value must be 1 or 2".into());
                }
                self.output_channels = channels;
            }
            "looping" => {
                self.looping = value
                    .parse::<bool>()
                    .map_err(|_| "Value must be 'true' or 'false'")?;
            }
            "log_file" => self.log_file = value.to_string(),
            _ => return Err(format!("Unknown configuration key: {key}").into()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Use a mutex to ensure tests that modify environment variables don't run concurrently
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.theme, "tahoe");
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.refresh_ms, 50);
        assert_eq!(config.block_frames, DEFAULT_BLOCK_FRAMES);
        assert_eq!(config.output_channels, 2);
        assert!(!config.looping);
        assert!(config.log_file.ends_with("tapedeck.log"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = toml::from_str("theme = \"matrix\"\n").unwrap();
        assert_eq!(config.theme, "matrix");
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.output_channels, 2);
    }

    #[test]
    fn test_set_value() {
        let mut config = Config::new();

        config.set_value("theme", "classic").unwrap();
        assert_eq!(config.theme, "classic");
        assert!(config.set_value("theme", "neon").is_err());

        config.set_value("volume", "0.25").unwrap();
        assert_eq!(config.volume, 0.25);
        assert!(config.set_value("volume", "1.5").is_err());
        assert!(config.set_value("volume", "loud").is_err());

        config.set_value("refresh_ms", "20").unwrap();
        assert_eq!(config.refresh_ms, 20);
        assert!(config.set_value("refresh_ms", "100").is_err());

        config.set_value("looping", "true").unwrap();
        assert!(config.looping);
        assert!(config.set_value("looping", "yes").is_err());

        assert!(config.set_value("block_frames", "0").is_err());
        assert!(config.set_value("output_channels", "6").is_err());

        // Test unknown key
        let result = config.set_value("unknown_key", "value");
        assert!(result.is_err());
    }

    #[test]
    fn test_refresh_interval_is_clamped() {
        let mut config = Config::new();
        config.refresh_ms = 5;
        assert_eq!(config.refresh_interval_ms(), MIN_REFRESH_MS);
        config.refresh_ms = 500;
        assert_eq!(config.refresh_interval_ms(), MAX_REFRESH_MS);
    }

    #[test]
    fn test_initial_gain_is_clamped() {
        let mut config = Config::new();
        config.volume = 4.0;
        assert_eq!(config.initial_gain(), 1.0);
        config.volume = -1.0;
        assert_eq!(config.initial_gain(), 0.0);
    }

    #[test]
    fn test_expanded_start_dir() {
        let mut config = Config::new();
        config.start_dir = "~/Music".to_string();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.expanded_start_dir(), home.join("Music"));
        }

        config.start_dir = "/srv/audio".to_string();
        assert_eq!(config.expanded_start_dir(), PathBuf::from("/srv/audio"));
    }

    #[test]
    fn test_config_save_and_load() {
        let _guard = ENV_MUTEX.lock().unwrap();

        let temp_dir = TempDir::new().unwrap();
        let original_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }

        let mut config = Config::new();
        config.theme = "matrix".to_string();
        config.volume = 0.5;
        config.save().unwrap();

        // Verify the config file was created in the temp directory
        let config_path = Config::config_path().unwrap();
        assert!(config_path.exists());
        assert!(config_path.starts_with(temp_dir.path().join("tapedeck")));

        let loaded = Config::load().unwrap();
        assert_eq!(loaded.theme, "matrix");
        assert_eq!(loaded.volume, 0.5);

        // Clean up - restore original value if it existed
        unsafe {
            if let Some(original) = original_xdg {
                std::env::set_var("XDG_CONFIG_HOME", original);
            } else {
                std::env::remove_var("XDG_CONFIG_HOME");
            }
        }
    }

    #[test]
    fn test_config_exists() {
        let _guard = ENV_MUTEX.lock().unwrap();

        let temp_dir = TempDir::new().unwrap();
        let original_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }

        let expected_path = temp_dir.path().join("tapedeck").join("config.toml");
        assert!(!expected_path.exists());
        assert!(!Config::exists().unwrap());

        Config::new().save().unwrap();

        assert!(expected_path.exists());
        assert!(Config::exists().unwrap());

        // Clean up - restore original value if it existed
        unsafe {
            if let Some(original) = original_xdg {
                std::env::set_var("XDG_CONFIG_HOME", original);
            } else {
                std::env::remove_var("XDG_CONFIG_HOME");
            }
        }
    }
}
