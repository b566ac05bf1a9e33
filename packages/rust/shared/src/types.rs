//! Core domain types for a meeting preparation run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MeetingPrepError, Result};

/// Shortest meeting the form accepts, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 15;

/// Longest meeting the form accepts, in minutes.
pub const MAX_DURATION_MINUTES: u32 = 180;

/// Increment used by the interactive duration stepper.
pub const DURATION_STEP_MINUTES: u32 = 15;

/// Clamp a duration into the accepted range.
pub fn clamp_duration(minutes: u32) -> u32 {
    minutes.clamp(MIN_DURATION_MINUTES, MAX_DURATION_MINUTES)
}

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a new time-sortable session identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// MeetingInputs
// ---------------------------------------------------------------------------

/// The five form fields collected from the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingInputs {
    /// Company the meeting is with.
    pub company_name: String,
    /// What the meeting should achieve.
    pub meeting_objective: String,
    /// Attendees and their roles, one per line.
    pub attendees: String,
    /// Meeting length in minutes.
    pub meeting_duration: u32,
    /// Specific areas of focus or concerns.
    pub focus_areas: String,
}

impl MeetingInputs {
    pub fn new(
        company_name: impl Into<String>,
        meeting_objective: impl Into<String>,
        attendees: impl Into<String>,
        meeting_duration: u32,
        focus_areas: impl Into<String>,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            meeting_objective: meeting_objective.into(),
            attendees: attendees.into(),
            meeting_duration,
            focus_areas: focus_areas.into(),
        }
    }

    /// Reject inputs the pipeline cannot meaningfully run with.
    pub fn validate(&self) -> Result<()> {
        if self.company_name.trim().is_empty() {
            return Err(MeetingPrepError::validation("company name is required"));
        }
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&self.meeting_duration) {
            return Err(MeetingPrepError::validation(format!(
                "meeting duration must be between {MIN_DURATION_MINUTES} and \
                 {MAX_DURATION_MINUTES} minutes, got {}",
                self.meeting_duration
            )));
        }
        Ok(())
    }

    /// Non-blank attendee lines, trimmed.
    pub fn attendee_lines(&self) -> impl Iterator<Item = &str> {
        self.attendees
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}

// ---------------------------------------------------------------------------
// DerivedField
// ---------------------------------------------------------------------------

/// Fields produced by the pipeline, in the order they must be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedField {
    ContextAnalysis,
    IndustryInsights,
    Strategy,
    ExecutiveBrief,
}

impl DerivedField {
    /// All derived fields in write order.
    pub const ALL: [DerivedField; 4] = [
        Self::ContextAnalysis,
        Self::IndustryInsights,
        Self::Strategy,
        Self::ExecutiveBrief,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContextAnalysis => "context_analysis",
            Self::IndustryInsights => "industry_insights",
            Self::Strategy => "strategy",
            Self::ExecutiveBrief => "executive_brief",
        }
    }

    /// The field that must already be present before this one is written.
    pub fn predecessor(&self) -> Option<DerivedField> {
        match self {
            Self::ContextAnalysis => None,
            Self::IndustryInsights => Some(Self::ContextAnalysis),
            Self::Strategy => Some(Self::IndustryInsights),
            Self::ExecutiveBrief => Some(Self::Strategy),
        }
    }
}

impl std::fmt::Display for DerivedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StepUsage
// ---------------------------------------------------------------------------

/// Token accounting for one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepUsage {
    pub field: DerivedField,
    pub model: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub latency_ms: u64,
}

// ---------------------------------------------------------------------------
// MeetingState
// ---------------------------------------------------------------------------

/// Per-run session state: immutable inputs plus derived fields written once,
/// in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingState {
    session_id: SessionId,
    started_at: DateTime<Utc>,
    inputs: MeetingInputs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    search_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    search_context: Option<String>,
    #[serde(default)]
    search_result_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    industry_insights: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    executive_brief: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    usage: Vec<StepUsage>,
}

impl MeetingState {
    /// Start a new session from validated inputs.
    pub fn new(inputs: MeetingInputs) -> Self {
        Self {
            session_id: SessionId::new(),
            started_at: Utc::now(),
            inputs,
            search_query: None,
            search_context: None,
            search_result_count: 0,
            context_analysis: None,
            industry_insights: None,
            strategy: None,
            executive_brief: None,
            usage: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn inputs(&self) -> &MeetingInputs {
        &self.inputs
    }

    pub fn search_query(&self) -> Option<&str> {
        self.search_query.as_deref()
    }

    /// Concatenated search snippets, once the search has run.
    pub fn search_context(&self) -> Option<&str> {
        self.search_context.as_deref()
    }

    pub fn search_result_count(&self) -> usize {
        self.search_result_count
    }

    /// Store the search outcome. Must happen before any derived field.
    pub fn record_search(
        &mut self,
        query: impl Into<String>,
        context: impl Into<String>,
        result_count: usize,
    ) -> Result<()> {
        if self.search_context.is_some() {
            return Err(MeetingPrepError::State(
                "search context already recorded".into(),
            ));
        }
        if self.context_analysis.is_some() {
            return Err(MeetingPrepError::State(
                "search must be recorded before any derived field".into(),
            ));
        }
        self.search_query = Some(query.into());
        self.search_context = Some(context.into());
        self.search_result_count = result_count;
        Ok(())
    }

    /// Read a derived field, if it has been written.
    pub fn get(&self, field: DerivedField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Read a derived field that a later step depends on.
    pub fn require(&self, field: DerivedField) -> Result<&str> {
        self.get(field).ok_or_else(|| {
            MeetingPrepError::State(format!("{field} has not been produced yet"))
        })
    }

    /// Write a derived field exactly once, after its predecessor.
    pub fn record(&mut self, field: DerivedField, text: impl Into<String>) -> Result<()> {
        if let Some(prev) = field.predecessor() {
            if self.get(prev).is_none() {
                return Err(MeetingPrepError::State(format!(
                    "cannot write {field} before {prev}"
                )));
            }
        } else if self.search_context.is_none() {
            return Err(MeetingPrepError::State(format!(
                "cannot write {field} before the search context"
            )));
        }

        let slot = self.slot_mut(field);
        if slot.is_some() {
            return Err(MeetingPrepError::State(format!("{field} is already set")));
        }
        *slot = Some(text.into());
        Ok(())
    }

    /// Attach token usage for a generation call.
    pub fn record_usage(&mut self, usage: StepUsage) {
        self.usage.push(usage);
    }

    pub fn usage(&self) -> &[StepUsage] {
        &self.usage
    }

    /// The final rendered document, once the last step has run.
    pub fn executive_brief(&self) -> Option<&str> {
        self.executive_brief.as_deref()
    }

    /// True once every derived field is present.
    pub fn is_complete(&self) -> bool {
        DerivedField::ALL.iter().all(|f| self.get(*f).is_some())
    }

    fn slot(&self, field: DerivedField) -> &Option<String> {
        match field {
            DerivedField::ContextAnalysis => &self.context_analysis,
            DerivedField::IndustryInsights => &self.industry_insights,
            DerivedField::Strategy => &self.strategy,
            DerivedField::ExecutiveBrief => &self.executive_brief,
        }
    }

    fn slot_mut(&mut self, field: DerivedField) -> &mut Option<String> {
        match field {
            DerivedField::ContextAnalysis => &mut self.context_analysis,
            DerivedField::IndustryInsights => &mut self.industry_insights,
            DerivedField::Strategy => &mut self.strategy,
            DerivedField::ExecutiveBrief => &mut self.executive_brief,
        }
    }
}
