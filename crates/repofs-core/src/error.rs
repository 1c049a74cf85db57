//! Error types for `repofs-core`.
//!
//! The consuming git library branches on [`ErrorCode`] to build indexes,
//! resolve refs and check out working trees, so every operation must map a
//! failure to the exact code that library expects. Messages follow the
//! `CODE: <text>, <op> '<path>'` shape, and `path` is always the original,
//! non-normalized input.

use thiserror::Error;

/// Symbolic POSIX error kind carried by a failed filesystem operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
  Enoent,
  Eisdir,
  Enotdir,
  Eexist,
  Enotempty,
  Eperm,
}

impl ErrorCode {
  /// The numeric errno reported alongside the symbolic code.
  pub fn errno(self) -> i32 {
    match self {
      Self::Enoent => -2,
      Self::Eisdir => -21,
      Self::Enotdir => -20,
      Self::Eexist => -17,
      Self::Enotempty => -39,
      Self::Eperm => -1,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Enoent => "ENOENT",
      Self::Eisdir => "EISDIR",
      Self::Enotdir => "ENOTDIR",
      Self::Eexist => "EEXIST",
      Self::Enotempty => "ENOTEMPTY",
      Self::Eperm => "EPERM",
    }
  }

  /// Human-readable description used in the error message.
  pub fn description(self) -> &'static str {
    match self {
      Self::Enoent => "no such file or directory",
      Self::Eisdir => "illegal operation on a directory",
      Self::Enotdir => "not a directory",
      Self::Eexist => "file already exists",
      Self::Enotempty => "directory not empty",
      Self::Eperm => "operation not permitted",
    }
  }
}

impl std::fmt::Display for ErrorCode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// A POSIX-shaped failure the consumer branches on.
  #[error("{}: {}, {} '{}'", .code.as_str(), .code.description(), .op, .path)]
  Posix {
    code: ErrorCode,
    /// The operation that failed, e.g. `open` or `rmdir`.
    op:   &'static str,
    /// The original, non-normalized input path.
    path: String,
  },

  /// A precondition violation with no POSIX code, e.g. writing to the
  /// repository root.
  #[error("{0}")]
  Invalid(String),

  /// A storage-layer failure, surfaced unchanged and fatal for the current
  /// operation.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
  /// Build a POSIX-shaped error for `op` on `path`.
  pub fn posix(
    code: ErrorCode,
    op: &'static str,
    path: impl Into<String>,
  ) -> Self {
    Self::Posix { code, op, path: path.into() }
  }

  /// Wrap a storage-layer failure.
  pub fn storage(
    err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
  ) -> Self {
    Self::Storage(err.into())
  }

  /// The symbolic code, if this is a POSIX-shaped failure.
  pub fn code(&self) -> Option<ErrorCode> {
    match self {
      Self::Posix { code, .. } => Some(*code),
      _ => None,
    }
  }

  /// The numeric errno, if any.
  pub fn errno(&self) -> Option<i32> {
    self.code().map(ErrorCode::errno)
  }

  /// The originating path, if any.
  pub fn path(&self) -> Option<&str> {
    match self {
      Self::Posix { path, .. } => Some(path),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
