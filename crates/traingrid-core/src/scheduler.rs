//! The scheduler backend contract.
//!
//! A scheduler maps logical applications onto real execution — local
//! processes, a cluster manager, a job queue. Backends are interchangeable
//! behind this trait; sessions never see past it.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app::{AppId, Application, RunMode};
use crate::error::SchedulerResult;
use crate::state::AppState;

/// Status of one role replica as observed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaStatus {
    pub role: String,
    pub replica: u32,
    pub state: AppState,
    /// Exit code once the replica has finished, if the backend knows it.
    pub exit_code: Option<i32>,
}

/// Everything a backend knows about a submitted application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeAppResponse {
    pub app_id: AppId,
    /// Aggregate state across all replicas.
    pub state: AppState,
    /// Backend-specific monitoring URL, when one exists.
    pub ui_url: Option<String>,
    pub replica_statuses: Vec<ReplicaStatus>,
}

/// Capability contract every scheduler backend implements.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Accept an application for execution and return its backend-assigned
    /// id. Image resolution is all-or-nothing: a fetch failure aborts the
    /// submission before any work starts.
    async fn submit(&self, app: &Application, mode: RunMode) -> SchedulerResult<AppId>;

    /// Report the current state of an application, or `Ok(None)` if the
    /// backend no longer (or never) knew the id.
    async fn describe(&self, app_id: &str) -> SchedulerResult<Option<DescribeAppResponse>>;

    /// Request termination of all live work for an application. Idempotent;
    /// a no-op once the application is terminal.
    async fn cancel(&self, app_id: &str) -> SchedulerResult<()>;

    /// The app ids this backend still has records for. Sessions use this to
    /// prune their own caches.
    async fn list(&self) -> SchedulerResult<HashSet<AppId>>;
}
