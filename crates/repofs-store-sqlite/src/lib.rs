//! SQLite backend for the repofs virtual filesystem.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. One [`SqliteFs`] corresponds
//! to exactly one repository; every file is persisted as a sequence of
//! fixed-size chunks in a single `git_objects` table.

mod encode;
mod migrate;
mod store;

pub mod schema;

pub use store::{LargestObject, SqliteFs, StorageStats};
