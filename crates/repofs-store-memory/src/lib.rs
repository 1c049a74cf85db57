//! Ephemeral in-memory backend for the repofs virtual filesystem.
//!
//! One [`MemoryFs`] lives for the duration of a single clone operation and
//! is dropped by the caller afterwards. It implements the same
//! [`RepoFilesystem`](repofs_core::RepoFilesystem) contract as the
//! persistent store and doubles as the oracle the SQLite backend is tested
//! against.

mod fs;

pub use fs::MemoryFs;
