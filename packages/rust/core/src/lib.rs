//! Core pipeline orchestration for MeetingPrep.
//!
//! This crate ties the search and generation clients together into the
//! four-step briefing workflow (`context → industry → strategy → brief`).

pub mod pipeline;
pub mod prompts;

pub use pipeline::{
    MeetingPipeline, PrepareResult, ProgressReporter, SilentProgress, prepare_meeting,
};
pub use meetingprep_generation::Generation;
