//! Session error types.

use thiserror::Error;

use traingrid_core::SchedulerError;

/// Errors surfaced by session operations.
///
/// These cover the driver failing to perform an operation. A workload that
/// runs and fails is never an error — it is `AppState::Failed`, observed
/// through `status`/`wait`.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The application is structurally invalid and was never submitted.
    #[error("application failed validation: {0}")]
    Validation(String),

    /// The app id was never submitted through this session, or its record
    /// has since been evicted by the backend.
    #[error("unknown app id: {0}")]
    UnknownApp(String),

    /// The application object is an attached read-only handle; attached
    /// apps cannot be resubmitted.
    #[error("application {0} was attached and cannot be re-run")]
    NotReRunnable(String),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

pub type SessionResult<T> = Result<T, SessionError>;
