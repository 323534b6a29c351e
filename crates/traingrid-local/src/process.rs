//! Per-replica process bookkeeping.

use std::process::ExitStatus;

use tokio::process::Child;
use tracing::{debug, warn};

use traingrid_core::{AppState, ReplicaStatus};

/// One spawned role replica: the child process plus its observed outcome.
///
/// The handle owns the `Child`. Exit status is captured at most once, via
/// [`poll`](Self::poll) or [`kill`](Self::kill); after that the recorded
/// outcome is immutable, which is what keeps terminal states terminal.
#[derive(Debug)]
pub struct ReplicaHandle {
    pub role: String,
    pub replica: u32,
    child: Child,
    exit: Option<ExitStatus>,
    killed: bool,
}

impl ReplicaHandle {
    pub fn new(role: impl Into<String>, replica: u32, child: Child) -> Self {
        Self {
            role: role.into(),
            replica,
            child,
            exit: None,
            killed: false,
        }
    }

    /// Non-blocking check for process completion. Records (and thereby
    /// reaps) the exit status the first time the process is seen finished.
    pub fn poll(&mut self) {
        if self.exit.is_some() {
            return;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!(role = %self.role, replica = self.replica, %status, "replica exited");
                self.exit = Some(status);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(role = %self.role, replica = self.replica, error = %e, "failed to poll replica");
            }
        }
    }

    /// Whether the process is still running (after a fresh poll).
    pub fn is_alive(&mut self) -> bool {
        self.poll();
        self.exit.is_none()
    }

    /// Terminate the process if it is still running and reap it. A replica
    /// that already exited keeps its natural outcome.
    pub async fn kill(&mut self) {
        self.poll();
        if self.exit.is_some() {
            return;
        }
        if let Err(e) = self.child.start_kill() {
            warn!(role = %self.role, replica = self.replica, error = %e, "failed to signal replica");
        }
        match self.child.wait().await {
            Ok(status) => {
                self.exit = Some(status);
                self.killed = true;
                debug!(role = %self.role, replica = self.replica, "replica killed");
            }
            Err(e) => {
                warn!(role = %self.role, replica = self.replica, error = %e, "failed to reap killed replica");
            }
        }
    }

    /// Lifecycle state of this single replica.
    pub fn state(&self) -> AppState {
        match &self.exit {
            None => AppState::Running,
            Some(_) if self.killed => AppState::Cancelled,
            Some(status) if status.success() => AppState::Succeeded,
            Some(_) => AppState::Failed,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit.and_then(|status| status.code())
    }

    /// Snapshot for a `DescribeAppResponse`.
    pub fn status(&self) -> ReplicaStatus {
        ReplicaStatus {
            role: self.role.clone(),
            replica: self.replica,
            state: self.state(),
            exit_code: self.exit_code(),
        }
    }
}
