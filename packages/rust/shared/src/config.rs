//! Application configuration for MeetingPrep.
//!
//! User config lives at `~/.meetingprep/meetingprep.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{MeetingPrepError, Result};
use crate::types::{MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "meetingprep.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".meetingprep";

// ---------------------------------------------------------------------------
// Config structs (matching meetingprep.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Form defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Web search service settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Text generation service settings.
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Pre-filled meeting duration in minutes.
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_duration(),
        }
    }
}

fn default_duration() -> u32 {
    60
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    /// Base URL of the search API.
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    /// Number of results requested per query.
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Search depth hint passed through to the service.
    #[serde(default = "default_search_depth")]
    pub search_depth: String,

    /// Request timeout in seconds.
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_key_env(),
            base_url: default_search_base_url(),
            max_results: default_max_results(),
            search_depth: default_search_depth(),
            timeout_secs: default_search_timeout(),
        }
    }
}

fn default_search_key_env() -> String {
    "TAVILY_API_KEY".into()
}
fn default_search_base_url() -> String {
    "https://api.tavily.com".into()
}
fn default_max_results() -> u32 {
    5
}
fn default_search_depth() -> String {
    "basic".into()
}
fn default_search_timeout() -> u64 {
    30
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_generation_key_env")]
    pub api_key_env: String,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Model ID.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature used for every step.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,

    /// Optional cap on output tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_generation_key_env(),
            base_url: default_generation_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_generation_timeout(),
            max_tokens: None,
        }
    }
}

fn default_generation_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn default_generation_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_model() -> String {
    "meta-llama/llama-4-maverick-17b-128e-instruct".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_generation_timeout() -> u64 {
    60
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Check value ranges and URL syntax. Called after loading and after
    /// CLI overrides are applied.
    pub fn validate(&self) -> Result<()> {
        let duration = self.defaults.duration_minutes;
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration) {
            return Err(MeetingPrepError::config(format!(
                "defaults.duration_minutes must be between {MIN_DURATION_MINUTES} and \
                 {MAX_DURATION_MINUTES}, got {duration}"
            )));
        }

        parse_base_url("search.base_url", &self.search.base_url)?;
        if !(1..=20).contains(&self.search.max_results) {
            return Err(MeetingPrepError::config(format!(
                "search.max_results must be between 1 and 20, got {}",
                self.search.max_results
            )));
        }
        if self.search.timeout_secs == 0 {
            return Err(MeetingPrepError::config("search.timeout_secs must be > 0"));
        }

        parse_base_url("generation.base_url", &self.generation.base_url)?;
        if self.generation.model.trim().is_empty() {
            return Err(MeetingPrepError::config("generation.model must not be empty"));
        }
        let temperature = self.generation.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(MeetingPrepError::config(format!(
                "generation.temperature must be between 0 and 2, got {temperature}"
            )));
        }
        if self.generation.timeout_secs == 0 {
            return Err(MeetingPrepError::config(
                "generation.timeout_secs must be > 0",
            ));
        }

        Ok(())
    }
}

fn parse_base_url(key: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| MeetingPrepError::config(format!("{key} is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(MeetingPrepError::config(format!(
            "{key} must use http or https, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.meetingprep/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MeetingPrepError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.meetingprep/meetingprep.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load and validate the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MeetingPrepError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        MeetingPrepError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| MeetingPrepError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| MeetingPrepError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| MeetingPrepError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("TAVILY_API_KEY"));
        assert!(toml_str.contains("GROQ_API_KEY"));
        assert!(!toml_str.contains("max_tokens"));
    }

    #[test]
    fn default_config_is_valid() {
        AppConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let toml_str = r#"
[generation]
model = "llama-3.3-70b-versatile"
max_tokens = 2048
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.generation.model, "llama-3.3-70b-versatile");
        assert_eq!(config.generation.max_tokens, Some(2048));
        assert_eq!(config.generation.timeout_secs, 60);
        assert!((config.generation.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.defaults.duration_minutes, 60);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = AppConfig::default();
        config.generation.temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.defaults.duration_minutes = 10;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duration_minutes"));

        let mut config = AppConfig::default();
        config.search.max_results = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.generation.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_base_url() {
        let mut config = AppConfig::default();
        config.search.base_url = "not a url".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.generation.base_url = "ftp://example.com".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn load_from_file_validates() {
        let dir = std::env::temp_dir().join(format!("meetingprep-cfg-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);

        std::fs::write(&path, "[search]\nmax_results = 50\n").unwrap();
        assert!(load_config_from(&path).is_err());

        std::fs::write(&path, "[search]\nmax_results = 8\n").unwrap();
        let config = load_config_from(&path).expect("valid config");
        assert_eq!(config.search.max_results, 8);

        std::fs::remove_dir_all(&dir).ok();
    }
}
