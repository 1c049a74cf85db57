//! In-memory filesystem implementation.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use repofs_core::{
  Error, ErrorCode, FileStat, RepoFilesystem, Result, path::normalize,
};
use tokio::sync::RwLock;

fn now_ms() -> i64 {
  Utc::now().timestamp_millis()
}

/// Two disjoint maps keyed by canonical path. A path is either a file or a
/// symlink, never both; directories are implicit.
#[derive(Debug, Default)]
struct State {
  files:    HashMap<String, Vec<u8>>,
  symlinks: HashMap<String, String>,
}

impl State {
  /// True when any entry in either map lies strictly below `path`.
  fn has_descendant(&self, path: &str) -> bool {
    if path.is_empty() {
      return !self.files.is_empty() || !self.symlinks.is_empty();
    }
    let prefix = format!("{path}/");
    self
      .files
      .keys()
      .chain(self.symlinks.keys())
      .any(|key| key.starts_with(&prefix))
  }
}

/// Clone-scoped filesystem backed by in-process maps.
///
/// A directory exists iff some entry lies beneath it; the repository root
/// always exists. `mkdir`, `rmdir` and `chmod` are therefore no-ops.
#[derive(Debug, Default)]
pub struct MemoryFs {
  state: RwLock<State>,
}

impl MemoryFs {
  /// Create a new, empty filesystem.
  pub fn new() -> Self {
    Self::default()
  }

  /// Every file path outside `.git/`, sorted — the set a checkout is
  /// expected to have produced.
  pub async fn get_working_tree_files(&self) -> Vec<String> {
    let state = self.state.read().await;
    let mut out: Vec<String> = state
      .files
      .keys()
      .filter(|key| {
        !key.is_empty() && key.as_str() != ".git" && !key.starts_with(".git/")
      })
      .cloned()
      .collect();
    out.sort();
    out
  }
}

impl RepoFilesystem for MemoryFs {
  async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
    let p = normalize(path);
    let state = self.state.read().await;
    if let Some(data) = state.files.get(&p) {
      return Ok(data.clone());
    }
    // One-hop symlink follow, matching stat.
    if let Some(target) = state.symlinks.get(&p)
      && let Some(data) = state.files.get(&normalize(target))
    {
      return Ok(data.clone());
    }
    Err(Error::posix(ErrorCode::Enoent, "open", path))
  }

  async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
    let p = normalize(path);
    if p.is_empty() {
      return Err(Error::Invalid("cannot write to repository root".into()));
    }
    let mut state = self.state.write().await;
    if state.has_descendant(&p) {
      return Err(Error::posix(ErrorCode::Eisdir, "open", path));
    }
    // Keep the maps disjoint: a write claims the path for the file map.
    state.symlinks.remove(&p);
    state.files.insert(p, data.to_vec());
    Ok(())
  }

  async fn unlink(&self, path: &str) -> Result<()> {
    let p = normalize(path);
    let mut state = self.state.write().await;
    let removed_file = state.files.remove(&p).is_some();
    let removed_link = state.symlinks.remove(&p).is_some();
    if removed_file || removed_link {
      Ok(())
    } else {
      Err(Error::posix(ErrorCode::Enoent, "unlink", path))
    }
  }

  async fn read_dir(&self, path: &str) -> Result<Vec<String>> {
    let p = normalize(path);
    let state = self.state.read().await;
    let prefix = if p.is_empty() { String::new() } else { format!("{p}/") };
    let mut names = BTreeSet::new();
    for key in state.files.keys().chain(state.symlinks.keys()) {
      if let Some(rest) = key.strip_prefix(&prefix)
        && !rest.is_empty()
      {
        let first = rest.split_once('/').map_or(rest, |(head, _)| head);
        names.insert(first.to_string());
      }
    }
    Ok(names.into_iter().collect())
  }

  async fn mkdir(&self, _path: &str) -> Result<()> {
    // Directories are implicit.
    Ok(())
  }

  async fn rmdir(&self, _path: &str) -> Result<()> {
    Ok(())
  }

  async fn stat(&self, path: &str) -> Result<FileStat> {
    let p = normalize(path);
    let state = self.state.read().await;
    if let Some(data) = state.files.get(&p) {
      return Ok(FileStat::file(data.len() as u64, now_ms()));
    }
    if let Some(target) = state.symlinks.get(&p) {
      // Follow into the files map; a dangling target reports size zero.
      let size = state
        .files
        .get(&normalize(target))
        .map_or(0, |data| data.len() as u64);
      return Ok(FileStat::file(size, now_ms()));
    }
    if p.is_empty() || state.has_descendant(&p) {
      return Ok(FileStat::dir(now_ms()));
    }
    Err(Error::posix(ErrorCode::Enoent, "stat", path))
  }

  async fn lstat(&self, path: &str) -> Result<FileStat> {
    let p = normalize(path);
    let state = self.state.read().await;
    if state.symlinks.contains_key(&p) {
      return Ok(FileStat::symlink(now_ms()));
    }
    if let Some(data) = state.files.get(&p) {
      return Ok(FileStat::file(data.len() as u64, now_ms()));
    }
    if p.is_empty() || state.has_descendant(&p) {
      return Ok(FileStat::dir(now_ms()));
    }
    Err(Error::posix(ErrorCode::Enoent, "lstat", path))
  }

  async fn symlink(&self, target: &str, path: &str) -> Result<()> {
    let p = normalize(path);
    let mut state = self.state.write().await;
    state.files.remove(&p);
    state.symlinks.insert(p, target.to_string());
    Ok(())
  }

  async fn read_link(&self, path: &str) -> Result<String> {
    let p = normalize(path);
    let state = self.state.read().await;
    state
      .symlinks
      .get(&p)
      .cloned()
      .ok_or_else(|| Error::posix(ErrorCode::Enoent, "readlink", path))
  }

  async fn chmod(&self, _path: &str, _mode: u32) -> Result<()> {
    Ok(())
  }

  async fn rename(&self, old: &str, new: &str) -> Result<()> {
    let o = normalize(old);
    let n = normalize(new);
    let mut state = self.state.write().await;
    if let Some(data) = state.files.remove(&o) {
      state.symlinks.remove(&n);
      state.files.insert(n, data);
    } else if let Some(target) = state.symlinks.remove(&o) {
      state.files.remove(&n);
      state.symlinks.insert(n, target);
    }
    // A missing source is a silent no-op; callers depend on it.
    Ok(())
  }
}
