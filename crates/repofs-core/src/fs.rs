//! The [`RepoFilesystem`] trait — the single polymorphic interface both
//! storage backends expose.
//!
//! The consuming git library requires two equivalent handles (a callback
//! surface and a promise surface); [`RepoFilesystem::promises`] satisfies
//! that convention by aliasing the filesystem to itself.

use std::future::Future;

use crate::{ErrorCode, FileStat, Result};

/// Abstraction over a repository filesystem backend.
///
/// All operations take paths relative to the repository root; inputs are
/// normalized once at the API boundary and the empty string denotes the
/// root itself. Instances are driven by a single cooperative caller — the
/// host serializes requests per repository, so implementations assume no
/// concurrent calls against one value.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait RepoFilesystem: Send + Sync {
  /// Read the entire contents of a file.
  fn read_file<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<Vec<u8>>> + Send + 'a;

  /// Read a file and decode it as UTF-8, lossily — text reads match the
  /// consumer's buffer-to-string conversion.
  fn read_file_utf8<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<String>> + Send + 'a {
    async move {
      let bytes = self.read_file(path).await?;
      Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
  }

  /// Write `data` to `path`, replacing any previous contents and creating
  /// ancestor directories as needed.
  fn write_file<'a>(
    &'a self,
    path: &'a str,
    data: &'a [u8],
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Remove a file. Directories are rejected with `EPERM`.
  fn unlink<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// List the entry names (basenames) of a directory, in no guaranteed
  /// order.
  fn read_dir<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<Vec<String>>> + Send + 'a;

  /// Create a single directory. Creation is not recursive: the parent must
  /// already exist. Creating an existing directory succeeds silently.
  fn mkdir<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Remove an empty directory.
  fn rmdir<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Metadata for a path, following symlinks where the backend models
  /// them.
  fn stat<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<FileStat>> + Send + 'a;

  /// Metadata for a path without following symlinks.
  fn lstat<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<FileStat>> + Send + 'a;

  /// Create a symbolic link at `path` pointing to `target`.
  fn symlink<'a>(
    &'a self,
    target: &'a str,
    path: &'a str,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Read the target of a symbolic link.
  fn read_link<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<String>> + Send + 'a;

  /// Change permission bits. Modes are reported as constants and never
  /// enforced, so every backend treats this as a no-op.
  fn chmod<'a>(
    &'a self,
    path: &'a str,
    mode: u32,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Move `old` to `new`, replacing anything already stored at `new`.
  /// Ancestor directories of the destination are not created.
  fn rename<'a>(
    &'a self,
    old: &'a str,
    new: &'a str,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Whether `path` exists. Failures other than `ENOENT` propagate.
  fn exists<'a>(
    &'a self,
    path: &'a str,
  ) -> impl Future<Output = Result<bool>> + Send + 'a {
    async move {
      match self.stat(path).await {
        Ok(_) => Ok(true),
        Err(err) if err.code() == Some(ErrorCode::Enoent) => Ok(false),
        Err(err) => Err(err),
      }
    }
  }

  /// The promise-surface alias required by the consuming git library; both
  /// handles are the same filesystem.
  fn promises(&self) -> &Self
  where
    Self: Sized,
  {
    self
  }
}
