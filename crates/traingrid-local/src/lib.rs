//! traingrid-local — the reference scheduler backend.
//!
//! Executes each role replica as a local OS process. Images are resolved
//! to directories by an [`ImageFetcher`], macros are substituted with the
//! minted app id and fetched image root, and per-app process records are
//! held in an insertion-ordered cache so resident memory stays bounded:
//!
//! ```text
//! LocalScheduler
//!   ├── ImageFetcher (image reference → local directory)
//!   ├── EvictionCache (app id → LocalApp, oldest-first eviction)
//!   └── LocalApp
//!       └── ReplicaHandle (× role × replica) — child process + exit status
//! ```
//!
//! Eviction drops the *record*, never the processes; an evicted app keeps
//! running but its status becomes unknowable through this backend.

pub mod cache;
pub mod fetcher;
pub mod process;
pub mod scheduler;

pub use cache::EvictionCache;
pub use fetcher::{ImageFetcher, LocalDirectoryImageFetcher};
pub use scheduler::LocalScheduler;
