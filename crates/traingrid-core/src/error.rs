//! Backend error types.

use thiserror::Error;

/// An image reference could not be resolved to a local path.
#[derive(Debug, Error)]
#[error("failed to fetch image {image}: {reason}")]
pub struct ImageFetchError {
    pub image: String,
    pub reason: String,
}

impl ImageFetchError {
    pub fn new(image: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            reason: reason.into(),
        }
    }
}

/// Errors a scheduler backend can surface from its own operations.
///
/// A workload exiting non-zero is *not* an error — it is reported as
/// `AppState::Failed` through `describe`. These variants cover the driver
/// failing to perform an operation at all.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    ImageFetch(#[from] ImageFetchError),

    #[error("failed to spawn replica {replica} of role {role}: {source}")]
    Spawn {
        role: String,
        replica: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
