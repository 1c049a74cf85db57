//! Core types and trait definition for the repofs virtual filesystem.
//!
//! This crate is deliberately free of database dependencies. Storage
//! backends (`repofs-store-sqlite`, `repofs-store-memory`) implement the
//! [`RepoFilesystem`] trait defined here; the consuming git library binds
//! against the trait, never against a concrete backend.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod fs;
pub mod path;
pub mod stat;

pub use error::{Error, ErrorCode, Result};
pub use fs::RepoFilesystem;
pub use stat::{FileKind, FileStat};
