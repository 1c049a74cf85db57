//! Stat results reported to the consuming git library.

use serde::{Deserialize, Serialize};

/// Mode reported for every regular file. Permissions are not modeled; the
/// value is a constant the consumer expects to see.
pub const MODE_FILE: u32 = 0o100_644;
/// Mode reported for every directory.
pub const MODE_DIR: u32 = 0o040_755;
/// Mode reported for symbolic links (ephemeral backend only; the
/// persistent store never reports links).
pub const MODE_SYMLINK: u32 = 0o120_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
  File,
  Dir,
  Symlink,
}

/// Metadata for a single path.
///
/// `dev`, `ino`, `uid` and `gid` are always zero: the backing store has no
/// notion of devices or ownership, and callers only require the fields to
/// be present. `ctime_ms` mirrors `mtime_ms` — the store records a single
/// timestamp per entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
  pub kind:     FileKind,
  pub mode:     u32,
  pub size:     u64,
  /// Last-modification time in milliseconds since the epoch.
  pub mtime_ms: i64,
  pub ctime_ms: i64,
  pub dev:      u32,
  pub ino:      u32,
  pub uid:      u32,
  pub gid:      u32,
}

impl FileStat {
  pub fn file(size: u64, mtime_ms: i64) -> Self {
    Self {
      kind: FileKind::File,
      mode: MODE_FILE,
      size,
      mtime_ms,
      ctime_ms: mtime_ms,
      dev: 0,
      ino: 0,
      uid: 0,
      gid: 0,
    }
  }

  pub fn dir(mtime_ms: i64) -> Self {
    Self {
      kind: FileKind::Dir,
      mode: MODE_DIR,
      size: 0,
      mtime_ms,
      ctime_ms: mtime_ms,
      dev: 0,
      ino: 0,
      uid: 0,
      gid: 0,
    }
  }

  pub fn symlink(mtime_ms: i64) -> Self {
    Self {
      kind: FileKind::Symlink,
      mode: MODE_SYMLINK,
      size: 0,
      mtime_ms,
      ctime_ms: mtime_ms,
      dev: 0,
      ino: 0,
      uid: 0,
      gid: 0,
    }
  }

  pub fn is_file(&self) -> bool {
    self.kind == FileKind::File
  }

  pub fn is_directory(&self) -> bool {
    self.kind == FileKind::Dir
  }

  pub fn is_symbolic_link(&self) -> bool {
    self.kind == FileKind::Symlink
  }
}
