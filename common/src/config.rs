// Configuration management with layered configuration (file, env)

use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::str::FromStr;

// Helper functions for Tz serialization
fn serialize_tz<S>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&tz.to_string())
}

fn deserialize_tz<'de, D>(deserializer: D) -> Result<Tz, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Tz::from_str(&s).map_err(serde::de::Error::custom)
}

fn default_time_zone() -> Tz {
    chrono_tz::Asia::Tokyo
}

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Path of the schedule file (JSON array of schedule records).
    pub schedules_path: PathBuf,
    pub download_dir: PathBuf,
    pub download_ext: String,
    pub rtmpdump_path: PathBuf,
    /// Lead time subtracted from each nominal start so the dump connects
    /// before the program begins.
    pub rec_start_buffer_seconds: i64,
    /// Zone the triggers are evaluated in.
    #[serde(
        serialize_with = "serialize_tz",
        deserialize_with = "deserialize_tz",
        default = "default_time_zone"
    )]
    pub time_zone: Tz,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            schedules_path: PathBuf::from("config/schedules.json"),
            download_dir: PathBuf::from("downloads"),
            download_ext: "flv".to_string(),
            rtmpdump_path: PathBuf::from("libs/rtmpdump"),
            rec_start_buffer_seconds: 10,
            time_zone: default_time_zone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Server-info XML endpoint publishing the current AGQR stream address.
    pub agqr_server_info_url: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            agqr_server_info_url: "http://www.uniqueradio.jp/agplayerf/getfmsListHD.php"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment-specific configuration
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.recording.rec_start_buffer_seconds < 0 {
            return Err("Recording start buffer must not be negative".to_string());
        }

        if self.recording.download_ext.is_empty() {
            return Err("Download extension must not be empty".to_string());
        }

        if self.stream.agqr_server_info_url.is_empty() {
            return Err("AGQR server info URL must not be empty".to_string());
        }

        Ok(())
    }
}
