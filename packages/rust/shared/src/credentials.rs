//! API key resolution.
//!
//! Keys come from an explicit entry (CLI flag or TUI field) first, then from
//! the environment variable named in config. Both keys must resolve before
//! any client is built.

use std::fmt;

use crate::config::AppConfig;
use crate::error::{MeetingPrepError, Result};

/// Keys typed in by the user for this run. Empty strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    pub search_api_key: Option<String>,
    pub generation_api_key: Option<String>,
}

/// Resolved API keys for both external services.
#[derive(Clone)]
pub struct Credentials {
    search_api_key: String,
    generation_api_key: String,
}

impl Credentials {
    /// Build directly from known keys.
    pub fn new(search_api_key: impl Into<String>, generation_api_key: impl Into<String>) -> Self {
        Self {
            search_api_key: search_api_key.into(),
            generation_api_key: generation_api_key.into(),
        }
    }

    pub fn search_api_key(&self) -> &str {
        &self.search_api_key
    }

    pub fn generation_api_key(&self) -> &str {
        &self.generation_api_key
    }
}

// Keys must never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("search_api_key", &"<redacted>")
            .field("generation_api_key", &"<redacted>")
            .finish()
    }
}

/// Resolve both keys, failing with a user-facing config error naming the
/// env var to set when either is missing.
pub fn resolve_credentials(
    config: &AppConfig,
    overrides: &CredentialOverrides,
) -> Result<Credentials> {
    let search = resolve_one(
        overrides.search_api_key.as_deref(),
        &config.search.api_key_env,
        "Search",
    )?;
    let generation = resolve_one(
        overrides.generation_api_key.as_deref(),
        &config.generation.api_key_env,
        "Generation",
    )?;
    Ok(Credentials::new(search, generation))
}

fn resolve_one(explicit: Option<&str>, var_name: &str, service: &str) -> Result<String> {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val.trim().to_string()),
        _ => Err(MeetingPrepError::config(format!(
            "{service} API key not found. Set the {var_name} environment variable \
             (or add it to your .env file), or enter the key directly."
        ))),
    }
}
