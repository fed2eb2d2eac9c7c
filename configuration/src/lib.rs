mod logging;

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

pub use logging::setup_logging;

pub type AppConfig = AsrConfig;

const ENV_PREFIX: &str = "ASR_SERVICE";
const ENV_SEPARATOR: &str = "__";
const ENVIRONMENT_VAR: &str = "APP_ENV";
const CONFIG_DIR: &str = "config";

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AsrConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// One JSON object per line instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub asr: AsrRuntimeConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub subtitles: SubtitleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hz: u32,
    #[serde(default = "default_max_chunk_duration_secs")]
    pub max_chunk_duration_secs: f64,
    /// Directory for per-request scratch audio; the system temp dir when unset.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsrRuntimeConfig {
    #[serde(default = "default_model_path")]
    pub model_path: String,
    #[serde(default = "default_beam_size")]
    pub default_beam_size: u32,
    #[serde(default = "default_max_beam_size")]
    pub max_beam_size: u32,
    #[serde(default = "default_batch_size")]
    pub default_batch_size: u32,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: u32,
    #[serde(default = "default_supported_languages")]
    pub supported_languages: Vec<String>,
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Whether the loaded model can produce word and segment timings.
    #[serde(default = "default_true")]
    pub timestamps: bool,
    #[serde(default)]
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleConfig {
    #[serde(default = "default_max_words_per_cue")]
    pub max_words_per_cue: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: default_sample_rate(),
            max_chunk_duration_secs: default_max_chunk_duration_secs(),
            scratch_dir: None,
        }
    }
}

impl Default for AsrRuntimeConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            default_beam_size: default_beam_size(),
            max_beam_size: default_max_beam_size(),
            default_batch_size: default_batch_size(),
            max_batch_size: default_max_batch_size(),
            supported_languages: default_supported_languages(),
            threads: default_threads(),
            timestamps: default_true(),
            temperature: 0.0,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            max_words_per_cue: default_max_words_per_cue(),
        }
    }
}

impl AsrConfig {
    /// Rejects combinations the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let asr = &self.service.asr;
        if asr.supported_languages.is_empty() {
            return Err(ConfigurationError::Invalid(
                "service.asr.supported_languages must not be empty".to_string(),
            ));
        }
        if asr.default_beam_size == 0 || asr.default_beam_size > asr.max_beam_size {
            return Err(ConfigurationError::Invalid(format!(
                "service.asr.default_beam_size must be between 1 and {}",
                asr.max_beam_size
            )));
        }
        if asr.default_batch_size == 0 || asr.default_batch_size > asr.max_batch_size {
            return Err(ConfigurationError::Invalid(format!(
                "service.asr.default_batch_size must be between 1 and {}",
                asr.max_batch_size
            )));
        }
        let max_chunk = self.service.audio.max_chunk_duration_secs;
        if !max_chunk.is_finite() || max_chunk <= 0.0 {
            return Err(ConfigurationError::Invalid(
                "service.audio.max_chunk_duration_secs must be positive".to_string(),
            ));
        }
        if self.service.audio.sample_rate_hz == 0 {
            return Err(ConfigurationError::Invalid(
                "service.audio.sample_rate_hz must be positive".to_string(),
            ));
        }
        if self.service.http.request_timeout_secs == 0 {
            return Err(ConfigurationError::Invalid(
                "service.http.request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loads `config/default.toml`, then `config/<APP_ENV>.toml`, then
/// `ASR_SERVICE__*` environment variables, each layer overriding the last.
pub fn load_config() -> Result<AsrConfig, ConfigurationError> {
    let environment =
        std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "development".to_string());
    load_config_from(Path::new(CONFIG_DIR), &environment)
}

pub fn load_config_from(dir: &Path, environment: &str) -> Result<AsrConfig, ConfigurationError> {
    let config: AsrConfig = Config::builder()
        .add_source(File::from(dir.join("default.toml")).required(false))
        .add_source(File::from(dir.join(format!("{environment}.toml"))).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("service.asr.supported_languages"),
        )
        .build()?
        .try_deserialize()?;
    config.validate()?;
    Ok(config)
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sample_rate() -> u32 {
    16_000
}

fn default_max_chunk_duration_secs() -> f64 {
    40.0
}

fn default_model_path() -> String {
    "models/ggml-base.bin".to_string()
}

fn default_beam_size() -> u32 {
    1
}

fn default_max_beam_size() -> u32 {
    8
}

fn default_batch_size() -> u32 {
    1
}

fn default_max_batch_size() -> u32 {
    32
}

fn default_supported_languages() -> Vec<String> {
    ["en", "de", "fr", "es"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_threads() -> usize {
    4
}

fn default_max_upload_bytes() -> usize {
    256 * 1024 * 1024
}

fn default_request_timeout_secs() -> u64 {
    600
}

fn default_max_words_per_cue() -> usize {
    8
}
