//! LocalScheduler — maps applications onto local OS processes.

use std::collections::HashSet;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use traingrid_core::{
    AppId, AppState, Application, DescribeAppResponse, MacroValues, ReplicaStatus, RunMode,
    Scheduler, SchedulerError, SchedulerResult,
};

use crate::cache::EvictionCache;
use crate::fetcher::ImageFetcher;
use crate::process::ReplicaHandle;

/// How often the managed-mode reaper polls for finished replicas.
const REAP_INTERVAL: Duration = Duration::from_millis(250);

/// Process record for one submitted application.
struct LocalApp {
    id: AppId,
    /// Set once `cancel` has terminated live replicas.
    cancelled: AtomicBool,
    replicas: Vec<Mutex<ReplicaHandle>>,
}

/// Scheduler backend that runs each role replica as a local process.
///
/// App records live in an insertion-ordered cache bounded by
/// `cache_size`; inserting past the bound evicts the oldest record.
/// Eviction only forgets the record — live processes are left running,
/// but their status becomes permanently unknowable through this backend.
pub struct LocalScheduler {
    fetcher: Arc<dyn ImageFetcher>,
    apps: RwLock<EvictionCache<Arc<LocalApp>>>,
    seq: AtomicU64,
}

impl LocalScheduler {
    /// Create a scheduler with an effectively unbounded record cache.
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            fetcher,
            apps: RwLock::new(EvictionCache::new(0)),
            seq: AtomicU64::new(0),
        }
    }

    /// Bound the number of resident app records.
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.apps = RwLock::new(EvictionCache::new(cache_size));
        self
    }

    fn mint_app_id(&self, app: &Application) -> AppId {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}", app.name, seq)
    }

    /// Spawn every replica of every role. On a spawn failure the already
    /// started replicas are killed so a failed submission leaves nothing
    /// behind.
    async fn spawn_replicas(
        &self,
        app_id: &str,
        app: &Application,
        image_roots: &[std::path::PathBuf],
    ) -> SchedulerResult<Vec<Mutex<ReplicaHandle>>> {
        let mut replicas: Vec<Mutex<ReplicaHandle>> = Vec::new();

        for (role, img_root) in app.roles.iter().zip(image_roots) {
            let values = MacroValues::new(app_id, img_root.clone());
            let program = values.resolve_entrypoint(&role.entrypoint);
            let args = values.resolve_args(&role.args);

            for replica in 0..role.num_replicas {
                let spawned = Command::new(&program)
                    .args(&args)
                    .envs(&role.env)
                    .current_dir(img_root)
                    .stdin(Stdio::null())
                    .spawn();

                match spawned {
                    Ok(child) => {
                        debug!(
                            %app_id,
                            role = %role.name,
                            replica,
                            program = %program.display(),
                            "replica spawned"
                        );
                        replicas.push(Mutex::new(ReplicaHandle::new(&role.name, replica, child)));
                    }
                    Err(source) => {
                        for started in &replicas {
                            started.lock().await.kill().await;
                        }
                        return Err(SchedulerError::Spawn {
                            role: role.name.clone(),
                            replica,
                            source,
                        });
                    }
                }
            }
        }
        Ok(replicas)
    }
}

#[async_trait]
impl Scheduler for LocalScheduler {
    async fn submit(&self, app: &Application, mode: RunMode) -> SchedulerResult<AppId> {
        let app_id = self.mint_app_id(app);

        // Fetch every image before spawning anything: a fetch failure must
        // abort the submission with no replicas started.
        let mut image_roots = Vec::with_capacity(app.roles.len());
        for role in &app.roles {
            let image = role
                .container
                .as_ref()
                .map(|c| c.image.as_str())
                .unwrap_or_default();
            image_roots.push(self.fetcher.fetch(image).await?);
        }

        let replicas = self.spawn_replicas(&app_id, app, &image_roots).await?;
        let num_replicas = replicas.len();

        let record = Arc::new(LocalApp {
            id: app_id.clone(),
            cancelled: AtomicBool::new(false),
            replicas,
        });

        if mode == RunMode::Managed {
            spawn_reaper(&record);
        }

        let evicted = self.apps.write().await.insert(app_id.clone(), record);
        if let Some((evicted_id, _)) = evicted {
            info!(
                %evicted_id,
                "app record evicted from cache; its processes are unaffected"
            );
        }

        info!(%app_id, roles = app.roles.len(), replicas = num_replicas, "application submitted");
        Ok(app_id)
    }

    async fn describe(&self, app_id: &str) -> SchedulerResult<Option<DescribeAppResponse>> {
        let record = { self.apps.read().await.get(app_id).cloned() };
        let Some(record) = record else {
            return Ok(None);
        };

        let mut statuses = Vec::with_capacity(record.replicas.len());
        for replica in &record.replicas {
            let mut handle = replica.lock().await;
            handle.poll();
            statuses.push(handle.status());
        }

        let state = aggregate_state(record.cancelled.load(Ordering::Relaxed), &statuses);
        Ok(Some(DescribeAppResponse {
            app_id: record.id.clone(),
            state,
            ui_url: None,
            replica_statuses: statuses,
        }))
    }

    async fn cancel(&self, app_id: &str) -> SchedulerResult<()> {
        let record = { self.apps.read().await.get(app_id).cloned() };
        let Some(record) = record else {
            warn!(%app_id, "cancel requested for unknown app");
            return Ok(());
        };

        let mut any_alive = false;
        for replica in &record.replicas {
            if replica.lock().await.is_alive() {
                any_alive = true;
            }
        }
        if !any_alive {
            // Already terminal; terminal states never transition.
            debug!(%app_id, "cancel requested but no replicas are live");
            return Ok(());
        }

        record.cancelled.store(true, Ordering::Relaxed);
        for replica in &record.replicas {
            replica.lock().await.kill().await;
        }
        info!(%app_id, "application cancelled");
        Ok(())
    }

    async fn list(&self) -> SchedulerResult<HashSet<AppId>> {
        let apps = self.apps.read().await;
        Ok(apps.keys().cloned().collect())
    }
}

/// Derive the aggregate application state from per-replica states.
fn aggregate_state(cancelled: bool, statuses: &[ReplicaStatus]) -> AppState {
    if statuses.iter().any(|s| s.state == AppState::Running) {
        AppState::Running
    } else if cancelled && statuses.iter().any(|s| s.state == AppState::Cancelled) {
        AppState::Cancelled
    } else if statuses.iter().any(|s| s.state == AppState::Failed) {
        AppState::Failed
    } else {
        AppState::Succeeded
    }
}

/// Background task that reaps finished replicas of a managed-mode app so
/// completed processes release their OS resources without the caller ever
/// polling `describe`. Holds only a weak reference: once the record is
/// evicted (or the scheduler dropped) the task stops on its next tick.
fn spawn_reaper(record: &Arc<LocalApp>) {
    let weak: Weak<LocalApp> = Arc::downgrade(record);
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(REAP_INTERVAL).await;
            let Some(record) = weak.upgrade() else {
                break;
            };
            let mut all_done = true;
            for replica in &record.replicas {
                if replica.lock().await.is_alive() {
                    all_done = false;
                }
            }
            if all_done {
                debug!(app_id = %record.id, "all replicas reaped");
                break;
            }
        }
    });
}
