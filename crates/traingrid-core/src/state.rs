//! Application lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a submitted application.
///
/// Once an application reaches a terminal state it never transitions
/// again; backends must stop reporting new states for that app id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    /// Built but not yet handed to a backend.
    Unsubmitted,
    /// Accepted by a backend, not yet queued.
    Submitted,
    /// Queued, waiting for resources.
    Pending,
    /// At least one replica is executing.
    Running,
    /// Every replica exited zero.
    Succeeded,
    /// At least one replica exited non-zero.
    Failed,
    /// Terminated on request before natural completion.
    Cancelled,
}

/// The states from which no further transition occurs.
pub const TERMINAL_STATES: [AppState; 3] = [
    AppState::Succeeded,
    AppState::Failed,
    AppState::Cancelled,
];

impl AppState {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppState::Succeeded | AppState::Failed | AppState::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppState::Unsubmitted => "unsubmitted",
            AppState::Submitted => "submitted",
            AppState::Pending => "pending",
            AppState::Running => "running",
            AppState::Succeeded => "succeeded",
            AppState::Failed => "failed",
            AppState::Cancelled => "cancelled",
        }
    }

    /// All lifecycle states, in lifecycle order.
    pub fn all() -> [AppState; 7] {
        [
            AppState::Unsubmitted,
            AppState::Submitted,
            AppState::Pending,
            AppState::Running,
            AppState::Succeeded,
            AppState::Failed,
            AppState::Cancelled,
        ]
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time status of an application as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppStatus {
    pub state: AppState,
    /// Backend-specific monitoring URL, when the backend has one.
    pub ui_url: Option<String>,
}

impl AppStatus {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            ui_url: None,
        }
    }

    pub fn with_ui_url(mut self, ui_url: impl Into<String>) -> Self {
        self.ui_url = Some(ui_url.into());
        self
    }

    /// Whether the underlying application has stopped transitioning.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
