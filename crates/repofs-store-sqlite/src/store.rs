//! [`SqliteFs`] — the persistent, chunked git-object filesystem.

use chrono::Utc;
use repofs_core::{
  Error, ErrorCode, FileStat, RepoFilesystem, Result,
  path::{ancestors, basename, normalize, parent_of},
};
use rusqlite::{OptionalExtension as _, params, types::Value};
use serde::{Deserialize, Serialize};

use crate::{
  encode::{decode_chunk, logical_len},
  migrate,
  schema::CHUNK_SIZE,
};

fn now_ms() -> i64 {
  Utc::now().timestamp_millis()
}

// ─── Reports ─────────────────────────────────────────────────────────────────

/// Aggregate report over the stored objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
  /// Distinct non-directory paths.
  pub total_objects:  u64,
  /// Stored `data` lengths summed across all file chunks. Legacy base64
  /// text counts by its character length, not its decoded length.
  pub total_bytes:    u64,
  pub largest_object: Option<LargestObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargestObject {
  pub path:  String,
  pub bytes: u64,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// One repository's filesystem, stored as `(path, chunk_index)` rows in a
/// single SQLite table.
///
/// Cloning is cheap — the inner connection is reference-counted. The
/// executor is exclusively owned by the filesystem; the host serializes
/// requests, so a single instance never sees concurrent calls.
#[derive(Clone)]
pub struct SqliteFs {
  conn: tokio_rusqlite::Connection,
}

/// Chunk-0 columns used by the metadata paths.
struct HeadRow {
  is_dir: bool,
  size:   i64,
  mtime:  i64,
  data:   Value,
}

impl HeadRow {
  fn stat(&self) -> FileStat {
    if self.is_dir {
      return FileStat::dir(self.mtime);
    }
    // Rows migrated from v1 carry size 0; recover it from the data cell.
    let size = if self.size > 0 {
      self.size as u64
    } else {
      logical_len(&self.data)
    };
    FileStat::file(size, self.mtime)
  }
}

impl SqliteFs {
  /// Wrap an exclusively-owned statement executor. No schema work happens
  /// until [`init`](Self::init) runs.
  pub fn new(conn: tokio_rusqlite::Connection) -> Self {
    Self { conn }
  }

  /// Open (or create) a store at `path` and bring its schema to v2.
  pub async fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(Error::storage)?;
    let fs = Self::new(conn);
    fs.init().await?;
    Ok(fs)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(Error::storage)?;
    let fs = Self::new(conn);
    fs.init().await?;
    Ok(fs)
  }

  /// Detect the stored schema version, migrate v1 data in place if found,
  /// and guarantee the root directory row. Idempotent.
  pub async fn init(&self) -> Result<()> {
    let now = now_ms();
    self.call(move |conn| migrate::run(conn, now)).await
  }

  /// Run a closure against the executor, surfacing storage failures
  /// unchanged.
  pub(crate) async fn call<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<T>
      + Send
      + 'static,
    T: Send + 'static,
  {
    self
      .conn
      .call(move |conn| f(conn).map_err(tokio_rusqlite::Error::from))
      .await
      .map_err(Error::storage)
  }

  /// Fetch the chunk-0 row for a canonical path.
  async fn head(&self, path: String) -> Result<Option<HeadRow>> {
    self
      .call(move |conn| {
        conn
          .query_row(
            "SELECT is_dir, size, mtime, data FROM git_objects
             WHERE path = ?1 AND chunk_index = 0",
            params![path],
            |row| {
              Ok(HeadRow {
                is_dir: row.get::<_, i64>(0)? != 0,
                size:   row.get(1)?,
                mtime:  row.get(2)?,
                data:   row.get(3)?,
              })
            },
          )
          .optional()
      })
      .await
  }

  // ── Export & observability ────────────────────────────────────────────

  /// Every file stored under `.git/`, chunk-concatenated, deterministic in
  /// path order. The scan orders explicitly — index order alone is not a
  /// guarantee.
  pub async fn export_git_objects(&self) -> Result<Vec<(String, Vec<u8>)>> {
    let rows: Vec<(String, Value)> = self
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT path, data FROM git_objects
           WHERE is_dir = 0 AND path LIKE '.git/%'
           ORDER BY path, chunk_index",
        )?;
        stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()
      })
      .await?;

    let mut out: Vec<(String, Vec<u8>)> = Vec::new();
    for (path, data) in rows {
      let bytes = decode_chunk(data)?;
      match out.last_mut() {
        Some((last, buf)) if *last == path => buf.extend(bytes),
        _ => out.push((path, bytes)),
      }
    }
    Ok(out)
  }

  /// Aggregate object counts and stored sizes.
  pub async fn storage_stats(&self) -> Result<StorageStats> {
    // LENGTH() yields bytes for blobs and characters for text, which is
    // exactly the counting rule for legacy base64 rows.
    let rows: Vec<(String, i64)> = self
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT path, SUM(COALESCE(LENGTH(data), 0)) FROM git_objects
           WHERE is_dir = 0 GROUP BY path ORDER BY path",
        )?;
        stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()
      })
      .await?;

    let mut stats = StorageStats {
      total_objects:  rows.len() as u64,
      total_bytes:    0,
      largest_object: None,
    };
    for (path, bytes) in rows {
      let bytes = bytes.max(0) as u64;
      stats.total_bytes += bytes;
      let bigger = match &stats.largest_object {
        Some(largest) => bytes > largest.bytes,
        None => true,
      };
      if bigger {
        stats.largest_object = Some(LargestObject { path, bytes });
      }
    }
    Ok(stats)
  }
}

// ─── RepoFilesystem impl ─────────────────────────────────────────────────────

impl RepoFilesystem for SqliteFs {
  async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
    let p = normalize(path);
    let head = self
      .head(p.clone())
      .await?
      .ok_or_else(|| Error::posix(ErrorCode::Enoent, "open", path))?;
    if head.is_dir {
      return Err(Error::posix(ErrorCode::Eisdir, "read", path));
    }

    let chunks: Vec<Value> = self
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT data FROM git_objects
           WHERE path = ?1 ORDER BY chunk_index ASC",
        )?;
        stmt
          .query_map(params![p], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()
      })
      .await?;

    let mut out = Vec::new();
    for chunk in chunks {
      out.extend(decode_chunk(chunk)?);
    }
    Ok(out)
  }

  async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
    let p = normalize(path);
    if p.is_empty() {
      return Err(Error::Invalid("cannot write to repository root".into()));
    }
    if let Some(head) = self.head(p.clone()).await?
      && head.is_dir
    {
      return Err(Error::posix(ErrorCode::Eisdir, "open", path));
    }

    let bytes = data.to_vec();
    let parents = ancestors(&p);
    let parent = parent_of(&p).to_string();
    let now = now_ms();

    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Implicit ancestor directories, shallowest first.
        for dir in &parents {
          tx.execute(
            "INSERT OR IGNORE INTO git_objects
               (path, chunk_index, parent_path, data, is_dir, size, mtime)
             VALUES (?1, 0, ?2, NULL, 1, 0, ?3)",
            params![dir, parent_of(dir), now],
          )?;
        }
        tx.execute("DELETE FROM git_objects WHERE path = ?1", params![p])?;

        let total = bytes.len();
        let chunk_count = total.div_ceil(CHUNK_SIZE).max(1);
        {
          let mut stmt = tx.prepare(
            "INSERT INTO git_objects
               (path, chunk_index, parent_path, data, is_dir, size, mtime)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
          )?;
          for i in 0..chunk_count {
            let start = i * CHUNK_SIZE;
            let end = ((i + 1) * CHUNK_SIZE).min(total);
            // Chunk 0 carries the logical size and the parent pointer;
            // later chunks carry neither.
            let (chunk_parent, size) = if i == 0 {
              (parent.as_str(), total as i64)
            } else {
              ("", 0)
            };
            stmt.execute(params![
              p,
              i as i64,
              chunk_parent,
              &bytes[start..end],
              size,
              now,
            ])?;
          }
        }
        tx.commit()
      })
      .await
  }

  async fn unlink(&self, path: &str) -> Result<()> {
    let p = normalize(path);
    let head = self
      .head(p.clone())
      .await?
      .ok_or_else(|| Error::posix(ErrorCode::Enoent, "unlink", path))?;
    if head.is_dir {
      return Err(Error::posix(ErrorCode::Eperm, "unlink", path));
    }
    self
      .call(move |conn| {
        conn.execute("DELETE FROM git_objects WHERE path = ?1", params![p])?;
        Ok(())
      })
      .await
  }

  async fn read_dir(&self, path: &str) -> Result<Vec<String>> {
    let p = normalize(path);
    let head = self
      .head(p.clone())
      .await?
      .ok_or_else(|| Error::posix(ErrorCode::Enoent, "scandir", path))?;
    if !head.is_dir {
      return Err(Error::posix(ErrorCode::Enotdir, "scandir", path));
    }
    let children: Vec<String> = self
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT path FROM git_objects
           WHERE parent_path = ?1 AND chunk_index = 0 AND path != ?1",
        )?;
        stmt
          .query_map(params![p], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()
      })
      .await?;
    Ok(children.iter().map(|child| basename(child).to_string()).collect())
  }

  async fn mkdir(&self, path: &str) -> Result<()> {
    let p = normalize(path);
    if p.is_empty() {
      // The root always exists.
      return Ok(());
    }
    let parent = parent_of(&p).to_string();
    if !parent.is_empty() {
      match self.head(parent.clone()).await? {
        Some(head) if head.is_dir => {}
        _ => return Err(Error::posix(ErrorCode::Enoent, "mkdir", path)),
      }
    }
    if let Some(head) = self.head(p.clone()).await? {
      if head.is_dir {
        return Ok(());
      }
      return Err(Error::posix(ErrorCode::Eexist, "mkdir", path));
    }
    let now = now_ms();
    self
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO git_objects
             (path, chunk_index, parent_path, data, is_dir, size, mtime)
           VALUES (?1, 0, ?2, NULL, 1, 0, ?3)",
          params![p, parent, now],
        )?;
        Ok(())
      })
      .await
  }

  async fn rmdir(&self, path: &str) -> Result<()> {
    let p = normalize(path);
    if p.is_empty() {
      return Err(Error::Invalid("cannot remove repository root".into()));
    }
    let head = self
      .head(p.clone())
      .await?
      .ok_or_else(|| Error::posix(ErrorCode::Enoent, "rmdir", path))?;
    if !head.is_dir {
      return Err(Error::posix(ErrorCode::Enotdir, "rmdir", path));
    }

    let probe = p.clone();
    let occupied = self
      .call(move |conn| {
        conn
          .query_row(
            "SELECT 1 FROM git_objects
             WHERE parent_path = ?1 AND chunk_index = 0
             LIMIT 1",
            params![probe],
            |_| Ok(()),
          )
          .optional()
          .map(|found| found.is_some())
      })
      .await?;
    if occupied {
      return Err(Error::posix(ErrorCode::Enotempty, "rmdir", path));
    }

    self
      .call(move |conn| {
        conn.execute(
          "DELETE FROM git_objects WHERE path = ?1 AND chunk_index = 0",
          params![p],
        )?;
        Ok(())
      })
      .await
  }

  async fn stat(&self, path: &str) -> Result<FileStat> {
    let p = normalize(path);
    let head = self
      .head(p)
      .await?
      .ok_or_else(|| Error::posix(ErrorCode::Enoent, "stat", path))?;
    Ok(head.stat())
  }

  async fn lstat(&self, path: &str) -> Result<FileStat> {
    // Symlinks are stored as ordinary files, so lstat and stat agree.
    self.stat(path).await
  }

  async fn symlink(&self, target: &str, path: &str) -> Result<()> {
    self.write_file(path, target.as_bytes()).await
  }

  async fn read_link(&self, path: &str) -> Result<String> {
    self.read_file_utf8(path).await
  }

  async fn chmod(&self, _path: &str, _mode: u32) -> Result<()> {
    Ok(())
  }

  async fn rename(&self, old: &str, new: &str) -> Result<()> {
    let o = normalize(old);
    let n = normalize(new);
    if self.head(o.clone()).await?.is_none() {
      return Err(Error::posix(ErrorCode::Enoent, "rename", old));
    }
    let new_parent = parent_of(&n).to_string();
    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Clear the destination first: a shorter source must not leave
        // stale high-index chunks behind. The destination's ancestors are
        // intentionally not created; callers depend on that.
        tx.execute("DELETE FROM git_objects WHERE path = ?1", params![n])?;
        tx.execute(
          "INSERT OR REPLACE INTO git_objects
             (path, chunk_index, parent_path, data, is_dir, size, mtime)
           SELECT ?2, chunk_index,
                  CASE WHEN chunk_index = 0 THEN ?3 ELSE parent_path END,
                  data, is_dir, size, mtime
           FROM git_objects WHERE path = ?1",
          params![o, n, new_parent],
        )?;
        tx.execute("DELETE FROM git_objects WHERE path = ?1", params![o])?;
        tx.commit()
      })
      .await
  }
}
