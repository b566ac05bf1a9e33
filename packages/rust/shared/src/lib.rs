//! Shared types, error model, and configuration for MeetingPrep.
//!
//! This crate is the foundation depended on by all other MeetingPrep crates.
//! It provides:
//! - [`MeetingPrepError`] — the unified error type
//! - Domain types ([`MeetingInputs`], [`MeetingState`], [`DerivedField`], [`SessionId`])
//! - Configuration ([`AppConfig`], config loading, credential resolution)

pub mod config;
pub mod credentials;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, GenerationConfig, SearchConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use credentials::{CredentialOverrides, Credentials, resolve_credentials};
pub use error::{MeetingPrepError, Result};
pub use types::{
    DerivedField, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES, DURATION_STEP_MINUTES,
    MeetingInputs, MeetingState, SessionId, StepUsage, clamp_duration,
};
