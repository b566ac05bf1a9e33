//! TUI screen definitions.
//!
//! Each screen corresponds to a tab in the TUI and encapsulates its
//! own state and rendering logic.

mod brief;
mod credentials;
mod meeting_form;

use std::fmt;

pub(crate) use brief::BriefScreen;
pub(crate) use credentials::CredentialsScreen;
pub(crate) use meeting_form::MeetingFormScreen;

/// Screen identifiers, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScreenId {
    Meeting,
    Brief,
    Credentials,
}

impl ScreenId {
    pub(crate) const ALL: [ScreenId; 3] = [Self::Meeting, Self::Brief, Self::Credentials];
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meeting => write!(f, "Meeting"),
            Self::Brief => write!(f, "Brief"),
            Self::Credentials => write!(f, "API Keys"),
        }
    }
}

/// Something a screen asks the app to do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScreenAction {
    /// Run the pipeline with the current form contents.
    Prepare,
    /// Show a message in the status bar.
    Status(String),
}
