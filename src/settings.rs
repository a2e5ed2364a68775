use serde::Deserialize;
use std::{path::Path, str::FromStr, time::Duration};

use crate::{ctrl_surf::surface, midi};

/// Name under which the OP-1 shows up on most backends.
pub const DEFAULT_PORT: &str = "OP-1 Midi Device";

/// Prefix for the environment overrides, e.g. `OP1_CHANNEL=2`.
pub const ENV_PREFIX: &str = "OP1";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Couldn't load settings: {}", .0)]
    Load(#[from] config::ConfigError),

    #[error("Invalid settings: {}", .0)]
    Invalid(String),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub client_name: String,
    /// Full name or prefix of the device input port.
    pub input_port: String,
    /// Full name or prefix of the device output port.
    pub output_port: String,
    pub channel: u8,
    pub log_level: String,
    pub tick_interval_ms: u64,
    /// Tracks shown on the color display.
    pub num_tracks: usize,
    pub num_scenes: usize,
    pub retry_interval_ms: u64,
    pub max_retries: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client_name: "OP-1 Live Bridge".to_string(),
            input_port: DEFAULT_PORT.to_string(),
            output_port: DEFAULT_PORT.to_string(),
            channel: 0,
            log_level: "info".to_string(),
            tick_interval_ms: 100,
            num_tracks: 8,
            num_scenes: 4,
            retry_interval_ms: 1_000,
            max_retries: 5,
        }
    }
}

impl Settings {
    /// Loads the defaults, overridden by `path` then by the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |msg: String| Err(Error::Invalid(msg));

        if self.client_name.is_empty() {
            return invalid("client name must not be empty".to_string());
        }

        if self.input_port.is_empty() || self.output_port.is_empty() {
            return invalid("port names must not be empty".to_string());
        }

        if self.channel > 15 {
            return invalid(format!(
                "MIDI channel should be 0 to 15 (found {})",
                self.channel
            ));
        }

        if log::LevelFilter::from_str(&self.log_level).is_err() {
            return invalid(format!("unknown log level {:?}", self.log_level));
        }

        // The color frame count must fit in a data byte
        if !(1..=127).contains(&self.num_tracks) {
            return invalid(format!(
                "num_tracks should be 1 to 127 (found {})",
                self.num_tracks
            ));
        }

        if self.num_scenes == 0 {
            return invalid("num_scenes must not be 0".to_string());
        }

        if self.tick_interval_ms == 0 || self.retry_interval_ms == 0 {
            return invalid("intervals must not be 0".to_string());
        }

        Ok(())
    }

    pub fn log_level(&self) -> log::LevelFilter {
        log::LevelFilter::from_str(&self.log_level).unwrap_or(log::LevelFilter::Info)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn surface_config(&self) -> surface::Config {
        surface::Config {
            channel: midi::Channel::from(self.channel),
            num_tracks: self.num_tracks,
            num_scenes: self.num_scenes,
            retry_interval: Duration::from_millis(self.retry_interval_ms),
            max_retries: self.max_retries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::PathBuf};

    fn write_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "op1-live-bridge-{}-{name}.toml",
            std::process::id()
        ));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults() {
        let settings = Settings::default();
        settings.validate().unwrap();

        assert_eq!(settings.input_port, DEFAULT_PORT);
        assert_eq!(settings.output_port, DEFAULT_PORT);
        assert_eq!(settings.log_level(), log::LevelFilter::Info);

        let config = settings.surface_config();
        assert_eq!(config.channel, midi::Channel::from(0));
        assert_eq!(config.num_tracks, 8);
        assert_eq!(config.num_scenes, 4);
        assert_eq!(config.retry_interval, Duration::from_secs(1));
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn from_file() {
        let path = write_config(
            "partial",
            r#"
input_port = "OP-1"
channel = 3
num_tracks = 4
log_level = "debug"
"#,
        );

        let settings = Settings::load(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(settings.input_port, "OP-1");
        assert_eq!(settings.output_port, DEFAULT_PORT);
        assert_eq!(settings.channel, 3);
        assert_eq!(settings.num_tracks, 4);
        assert_eq!(settings.num_scenes, 4);
        assert_eq!(settings.log_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn invalid_file() {
        let path = write_config("invalid", "channel = 16\n");
        let res = Settings::load(Some(&path));
        fs::remove_file(&path).unwrap();

        assert!(matches!(res, Err(Error::Invalid(_))));
    }

    #[test]
    fn invalid_values() {
        for settings in [
            Settings {
                client_name: String::new(),
                ..Settings::default()
            },
            Settings {
                num_tracks: 0,
                ..Settings::default()
            },
            Settings {
                num_tracks: 128,
                ..Settings::default()
            },
            Settings {
                log_level: "loud".to_string(),
                ..Settings::default()
            },
            Settings {
                retry_interval_ms: 0,
                ..Settings::default()
            },
        ] {
            assert!(settings.validate().is_err(), "{settings:?}");
        }
    }
}
