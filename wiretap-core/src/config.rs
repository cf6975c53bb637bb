use figment::{Figment, providers::{Env, Format, Yaml}};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source-service name used when none is configured.
pub const UNKNOWN_SERVICE: &str = "unknown-service";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WiretapConfig {
    #[serde(default)]
    pub application: ApplicationConfig,
    #[serde(default)]
    pub sinks: SinkConfig,
}

/// Identity of the process issuing intercepted calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Recorded as `source_service` on every entry.
    #[serde(default)]
    pub name: Option<String>,
}

/// Delivery targets. Console is on, everything else off by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub console: ConsoleSinkConfig,
    #[serde(default)]
    pub file: FileSinkConfig,
    #[serde(default)]
    pub remote: RemoteSinkConfig,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleFormat {
    /// Multi-line text rendering of the entry.
    #[default]
    Text,
    /// One JSON object per entry.
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleSinkConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub format: ConsoleFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSinkConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_file_path")]
    pub path: PathBuf,
    /// 0 = size-based rotation disabled (daily rotation only).
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// 0 = keep every rotated file.
    #[serde(default = "default_max_rotated_files")]
    pub max_rotated_files: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSinkConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_remote_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_flush_interval")]
    pub flush_interval_secs: u64,
    /// Entries buffered between callers and the flush task.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_true() -> bool { true }
fn default_file_path() -> PathBuf { PathBuf::from("wiretap.log") }
fn default_max_file_size() -> u64 { 100 * 1024 * 1024 }
fn default_max_rotated_files() -> usize { 30 }
fn default_remote_endpoint() -> String { "http://localhost:9428/insert/jsonline".into() }
fn default_batch_size() -> usize { 1000 }
fn default_flush_interval() -> u64 { 5 }
fn default_channel_capacity() -> usize { 10_000 }

// ── Impls ─────────────────────────────────────────────────────

impl Default for ConsoleSinkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: ConsoleFormat::Text,
        }
    }
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_file_path(),
            max_file_size_bytes: default_max_file_size(),
            max_rotated_files: default_max_rotated_files(),
        }
    }
}

impl Default for RemoteSinkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_remote_endpoint(),
            batch_size: default_batch_size(),
            flush_interval_secs: default_flush_interval(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl WiretapConfig {
    /// Load configuration from a YAML file + `WIRETAP_` env overrides.
    ///
    /// Nested keys are separated by a double underscore:
    /// `WIRETAP_APPLICATION__NAME=checkout`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config: WiretapConfig = Self::figment(path).extract()?;
        Ok(config)
    }

    /// Load from environment variables only.
    pub fn from_env() -> anyhow::Result<Self> {
        let config: WiretapConfig = Figment::new()
            .merge(Env::prefixed("WIRETAP_").split("__"))
            .extract()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("WIRETAP_").split("__"))
    }

    /// Configured application name, or `"unknown-service"` when it is unset
    /// or blank.
    pub fn source_service_name(&self) -> &str {
        self.application
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_SERVICE)
    }
}
