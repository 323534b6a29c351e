//! Session contract and the standalone implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use traingrid_core::{
    AppId, AppStatus, Application, Role, RunMode, Scheduler,
};

use crate::error::{SessionError, SessionResult};

/// Default interval between `wait` status polls.
const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_secs(1);

/// Driver-side contract for submitting and tracking applications.
///
/// A session owns the mapping from app id to the `Application` the caller
/// submitted. Operations referencing an id the session does not know fail
/// with [`SessionError::UnknownApp`].
#[async_trait]
pub trait Session: Send + Sync {
    /// Display name, used in logs.
    fn name(&self) -> &str;

    /// Validate and submit an application; returns the backend-assigned id.
    async fn run(&self, app: &Application, mode: RunMode) -> SessionResult<AppId>;

    /// Current status of a tracked application.
    async fn status(&self, app_id: &str) -> SessionResult<AppStatus>;

    /// Block until the application reaches a terminal state, polling the
    /// backend at the session's configured interval.
    async fn wait(&self, app_id: &str) -> SessionResult<AppStatus>;

    /// Request cancellation. Fire-and-forget: observe the effect through
    /// `status`/`wait`.
    async fn stop(&self, app_id: &str) -> SessionResult<()>;

    /// The session's live view of its submitted applications, synchronized
    /// against the backend (ids the backend evicted are dropped).
    async fn list(&self) -> SessionResult<HashMap<AppId, Application>>;

    /// Reconstruct a read-only handle to an application submitted
    /// elsewhere (e.g. by another process) and start tracking it.
    async fn attach(&self, app_id: &str) -> SessionResult<Application>;
}

/// Structural validation performed before an application reaches a backend.
///
/// An application is submittable when it has at least one role, every role
/// is bound to a container, every container declares resources, and every
/// role asks for at least one replica.
pub fn validate(app: &Application) -> SessionResult<()> {
    if app.roles.is_empty() {
        return Err(SessionError::Validation(format!(
            "application {} has no roles",
            app.name
        )));
    }
    for role in &app.roles {
        let container = role.container.as_ref().ok_or_else(|| {
            SessionError::Validation(format!("role {} has no container", role.name))
        })?;
        if container.resources.is_none() {
            return Err(SessionError::Validation(format!(
                "container {} for role {} has no resources",
                container.image, role.name
            )));
        }
        if role.num_replicas < 1 {
            return Err(SessionError::Validation(format!(
                "role {} must have at least one replica",
                role.name
            )));
        }
    }
    Ok(())
}

/// A session bound to exactly one scheduler backend.
///
/// Owns no process state — it is purely the validation, bookkeeping, and
/// delegation layer. The app cache is lock-protected; concurrent `list`
/// and `status` calls never observe a half-inserted record.
pub struct StandaloneSession {
    name: String,
    scheduler: Arc<dyn Scheduler>,
    wait_interval: Duration,
    apps: RwLock<HashMap<AppId, Application>>,
}

impl StandaloneSession {
    pub fn new(name: impl Into<String>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            name: name.into(),
            scheduler,
            wait_interval: DEFAULT_WAIT_INTERVAL,
            apps: RwLock::new(HashMap::new()),
        }
    }

    /// Set the polling interval used by `wait`.
    pub fn with_wait_interval(mut self, wait_interval: Duration) -> Self {
        self.wait_interval = wait_interval;
        self
    }

    async fn ensure_known(&self, app_id: &str) -> SessionResult<()> {
        if self.apps.read().await.contains_key(app_id) {
            Ok(())
        } else {
            Err(SessionError::UnknownApp(app_id.to_string()))
        }
    }

    /// Drop a backend-evicted id from the cache. Once evicted, the app is
    /// unknowable: the session fails fast rather than replaying a stale
    /// status.
    async fn prune(&self, app_id: &str) -> SessionError {
        self.apps.write().await.remove(app_id);
        debug!(session = %self.name, %app_id, "pruned app evicted by the backend");
        SessionError::UnknownApp(app_id.to_string())
    }
}

#[async_trait]
impl Session for StandaloneSession {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, app: &Application, mode: RunMode) -> SessionResult<AppId> {
        validate(app)?;
        if app.is_attached() {
            return Err(SessionError::NotReRunnable(app.name.clone()));
        }

        let app_id = self.scheduler.submit(app, mode).await?;
        self.apps.write().await.insert(app_id.clone(), app.clone());
        info!(session = %self.name, %app_id, app = %app.name, ?mode, "application submitted");
        Ok(app_id)
    }

    async fn status(&self, app_id: &str) -> SessionResult<AppStatus> {
        self.ensure_known(app_id).await?;
        match self.scheduler.describe(app_id).await? {
            Some(resp) => Ok(AppStatus {
                state: resp.state,
                ui_url: resp.ui_url,
            }),
            None => Err(self.prune(app_id).await),
        }
    }

    async fn wait(&self, app_id: &str) -> SessionResult<AppStatus> {
        self.ensure_known(app_id).await?;
        loop {
            match self.scheduler.describe(app_id).await? {
                None => return Err(self.prune(app_id).await),
                Some(resp) if resp.state.is_terminal() => {
                    return Ok(AppStatus {
                        state: resp.state,
                        ui_url: resp.ui_url,
                    });
                }
                Some(resp) => {
                    debug!(session = %self.name, %app_id, state = %resp.state, "waiting");
                }
            }
            tokio::time::sleep(self.wait_interval).await;
        }
    }

    async fn stop(&self, app_id: &str) -> SessionResult<()> {
        self.ensure_known(app_id).await?;
        self.scheduler.cancel(app_id).await?;
        info!(session = %self.name, %app_id, "cancellation requested");
        Ok(())
    }

    async fn list(&self) -> SessionResult<HashMap<AppId, Application>> {
        let live = self.scheduler.list().await?;
        let mut apps = self.apps.write().await;
        apps.retain(|app_id, _| {
            let keep = live.contains(app_id);
            if !keep {
                debug!(session = %self.name, %app_id, "pruned app evicted by the backend");
            }
            keep
        });
        Ok(apps.clone())
    }

    async fn attach(&self, app_id: &str) -> SessionResult<Application> {
        let resp = self
            .scheduler
            .describe(app_id)
            .await?
            .ok_or_else(|| SessionError::UnknownApp(app_id.to_string()))?;

        // Rebuild the role layout from the backend's replica statuses.
        let mut roles: Vec<Role> = Vec::new();
        for status in &resp.replica_statuses {
            match roles.iter_mut().find(|r| r.name == status.role) {
                Some(role) => role.num_replicas += 1,
                None => roles.push(Role::new(&status.role)),
            }
        }

        let app = Application::new(app_id).of(roles).mark_attached();
        self.apps.write().await.insert(app_id.to_string(), app.clone());
        info!(session = %self.name, %app_id, "attached to running application");
        Ok(app)
    }
}
