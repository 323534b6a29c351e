//! traingrid-session — the driver-side front door.
//!
//! A [`Session`] is what callers hold: it validates applications before
//! they ever reach a backend, keeps the app-id → application bookkeeping
//! for everything submitted (or attached) through it, and delegates the
//! actual work to a [`Scheduler`](traingrid_core::Scheduler).
//!
//! ```text
//! caller
//!   └── StandaloneSession
//!       ├── validate(Application)          — structural checks, pre-backend
//!       ├── app cache (app id → Application), pruned against backend list()
//!       └── Scheduler backend              — submit / describe / cancel / list
//! ```
//!
//! [`StandaloneSession`] is bound to exactly one scheduler; a second
//! process can `attach` to an app id submitted by a first, observe its
//! status, and stop it.

pub mod error;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use session::{Session, StandaloneSession, validate};
