//! End-to-end session tests against the local process backend.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use traingrid_core::{AppState, Application, Container, Resources, Role, RunMode};
use traingrid_local::{LocalDirectoryImageFetcher, LocalScheduler};
use traingrid_session::{Session, SessionError, StandaloneSession};

fn write_shell_script(dir: &Path, name: &str, lines: &[&str]) {
    let path = dir.join(name);
    let body = format!("#!/bin/sh\n{}\n", lines.join("\n"));
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
}

fn test_image() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_shell_script(dir.path(), "touch.sh", &["touch \"$1\""]);
    write_shell_script(dir.path(), "fail.sh", &["exit 1"]);
    write_shell_script(dir.path(), "sleep.sh", &["sleep \"$1\""]);
    dir
}

fn test_container(dir: &TempDir) -> Container {
    // Resources are ignored by the local backend; set as an example.
    Container::new(dir.path().to_str().unwrap()).require(Resources::new(1, 0, 1024))
}

fn local_scheduler() -> Arc<LocalScheduler> {
    Arc::new(LocalScheduler::new(Arc::new(LocalDirectoryImageFetcher::new())))
}

fn fast_session(name: &str, scheduler: Arc<LocalScheduler>) -> StandaloneSession {
    StandaloneSession::new(name, scheduler).with_wait_interval(Duration::from_millis(100))
}

#[tokio::test]
async fn run_and_wait_for_success() {
    let image = test_image();
    let out = image.path().join("test_file");
    let session = fast_session("test_session", local_scheduler());

    let role = Role::new("touch")
        .runs("touch.sh", [out.to_str().unwrap()])
        .on(test_container(&image));
    let app = Application::new("toucher").of([role]);

    let app_id = session.run(&app, RunMode::Headless).await.unwrap();
    let status = session.wait(&app_id).await.unwrap();
    assert_eq!(status.state, AppState::Succeeded);
    assert!(out.exists());
}

#[tokio::test]
async fn failing_workload_never_succeeds() {
    let image = test_image();
    let session = fast_session("test_session", local_scheduler());

    let role = Role::new("fail")
        .runs("fail.sh", Vec::<&str>::new())
        .on(test_container(&image));
    let app = Application::new("failer").of([role]);

    let app_id = session.run(&app, RunMode::Headless).await.unwrap();
    let status = session.wait(&app_id).await.unwrap();
    assert_eq!(status.state, AppState::Failed);
}

#[tokio::test]
async fn status_then_stop_reports_cancelled() {
    let image = test_image();
    let session = fast_session("test_session", local_scheduler());

    let role = Role::new("sleep")
        .runs("sleep.sh", ["60"])
        .on(test_container(&image));
    let app = Application::new("sleeper").of([role]);

    let app_id = session.run(&app, RunMode::Headless).await.unwrap();
    assert_eq!(session.status(&app_id).await.unwrap().state, AppState::Running);

    session.stop(&app_id).await.unwrap();
    assert_eq!(
        session.status(&app_id).await.unwrap().state,
        AppState::Cancelled
    );
}

#[tokio::test]
async fn second_session_attaches_and_stops() {
    let image = test_image();
    let scheduler = local_scheduler();

    let session1 = fast_session("test_session1", scheduler.clone());
    let role = Role::new("sleep")
        .runs("sleep.sh", ["60"])
        .on(test_container(&image));
    let app = Application::new("sleeper").of([role]);
    let app_id = session1.run(&app, RunMode::Headless).await.unwrap();

    let session2 = fast_session("test_session2", scheduler);
    session2.attach(&app_id).await.unwrap();

    assert_eq!(
        session2.status(&app_id).await.unwrap().state,
        AppState::Running
    );
    session2.stop(&app_id).await.unwrap();
    assert_eq!(
        session2.status(&app_id).await.unwrap().state,
        AppState::Cancelled
    );
}

#[tokio::test]
async fn attached_app_is_not_rerunnable() {
    let image = test_image();
    let scheduler = local_scheduler();

    let session1 = fast_session("test_session1", scheduler.clone());
    let out = image.path().join("test_file");
    let role = Role::new("touch")
        .runs("touch.sh", [out.to_str().unwrap()])
        .on(test_container(&image));
    let app = Application::new("touch_test_file").of([role]);
    let app_id = session1.run(&app, RunMode::Headless).await.unwrap();

    let session2 = fast_session("test_session2", scheduler);
    let attached = session2.attach(&app_id).await.unwrap();
    let err = session2.run(&attached, RunMode::Headless).await.unwrap_err();
    assert!(matches!(err, SessionError::NotReRunnable(_)));
}

#[tokio::test]
async fn list_returns_all_submitted_apps() {
    let image = test_image();
    let session = fast_session("test_session", local_scheduler());

    let role = Role::new("sleep")
        .runs("sleep.sh", ["1"])
        .on(test_container(&image));
    let app = Application::new("sleeper").of([role]);

    let num_apps = 4;
    for _ in 0..num_apps {
        // Managed mode: the backend reaps these without us waiting on them.
        session.run(&app, RunMode::Managed).await.unwrap();
    }

    let apps = session.list().await.unwrap();
    assert_eq!(apps.len(), num_apps);
}

#[tokio::test]
async fn backend_eviction_drops_the_app_from_the_session() {
    let image = test_image();
    let scheduler = Arc::new(
        LocalScheduler::new(Arc::new(LocalDirectoryImageFetcher::new())).with_cache_size(1),
    );
    let session = fast_session("test_session", scheduler);

    let out = image.path().join("test_file");
    let role = Role::new("touch")
        .runs("touch.sh", [out.to_str().unwrap()])
        .on(test_container(&image));
    let app = Application::new("touch_test_file").of([role]);

    // The backend keeps one record: the second run evicts the first.
    let app_id1 = session.run(&app, RunMode::Headless).await.unwrap();
    session.wait(&app_id1).await.unwrap();

    let app_id2 = session.run(&app, RunMode::Headless).await.unwrap();
    session.wait(&app_id2).await.unwrap();

    let apps = session.list().await.unwrap();
    assert_eq!(apps.len(), 1);
    assert!(!apps.contains_key(&app_id1));
    assert!(apps.contains_key(&app_id2));

    // Once evicted, the first id is unknowable.
    let err = session.status(&app_id1).await.unwrap_err();
    assert!(matches!(err, SessionError::UnknownApp(_)));
}
