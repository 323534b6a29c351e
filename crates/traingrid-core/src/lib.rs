//! traingrid-core — application data model and backend contracts.
//!
//! Everything a caller needs to describe a distributed application lives
//! here: compute demands (`Resources`), container bindings (`Container`),
//! executable roles (`Role`, `ElasticRole`), and the `Application` that
//! groups them. The crate also defines the lifecycle state machine
//! (`AppState`/`AppStatus`), the symbolic macro tokens resolved at
//! submission time, and the `Scheduler` contract every backend implements.
//!
//! # Architecture
//!
//! ```text
//! Application
//!   └── Role (× N)
//!       ├── Container { image, Resources, ports }
//!       ├── entrypoint + args (ArgToken: literal | app-id | image-root path)
//!       └── num_replicas
//!
//! Scheduler (trait)
//!   ├── submit(Application, RunMode) → AppId
//!   ├── describe(AppId) → DescribeAppResponse (AppState + replica statuses)
//!   ├── cancel(AppId)
//!   └── list() → set of live AppIds
//! ```
//!
//! This crate is pure data and contracts — no I/O, no runtime.

pub mod app;
pub mod elastic;
pub mod error;
pub mod macros;
pub mod resources;
pub mod scheduler;
pub mod state;

pub use app::{AppId, Application, Container, Role, RunMode};
pub use elastic::{ELASTIC_INTERPRETER, ELASTIC_LAUNCHER_MODULE, ElasticRole};
pub use error::{ImageFetchError, SchedulerError, SchedulerResult};
pub use macros::{ArgToken, MacroValues};
pub use resources::Resources;
pub use scheduler::{DescribeAppResponse, ReplicaStatus, Scheduler};
pub use state::{AppState, AppStatus, TERMINAL_STATES};
