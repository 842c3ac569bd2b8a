//! Cart persistence.
//!
//! - [`backend`] - The key/value storage contract and its error taxonomy
//! - [`memory`] - In-process backend (session-scoped storage, tests)
//! - [`file`] - JSON-file backend (durable storage for the CLI)
//! - [`tiered`] - Tier ladder with quota recovery and allow-list purges

pub mod backend;
pub mod file;
pub mod memory;
pub mod tiered;

pub use backend::{StorageBackend, StorageError, UnavailableBackend};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use tiered::{AllowList, StorageTier, TieredStore, WriteOutcome};
