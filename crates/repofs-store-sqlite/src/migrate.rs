//! Schema-version detection and the in-place v1 → v2 migration.
//!
//! v1 stored at most one row per path, had no `chunk_index` column, and
//! could hold base64 text in `data`. v2 adds the chunk discipline. The
//! migration copies every v1 row as chunk 0 with `data` preserved
//! byte-for-byte (legacy base64 text stays text) and `size` reset to 0 —
//! the stat path recomputes sizes lazily until the row is rewritten.

use rusqlite::Connection;

use crate::schema;

/// The layout found in an existing database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SchemaVersion {
  Missing,
  V1,
  V2,
}

pub(crate) fn detect(conn: &Connection) -> rusqlite::Result<SchemaVersion> {
  let mut stmt = conn.prepare("PRAGMA table_info(git_objects)")?;
  let columns = stmt
    .query_map([], |row| row.get::<_, String>(1))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  if columns.is_empty() {
    Ok(SchemaVersion::Missing)
  } else if columns.iter().any(|name| name == "chunk_index") {
    Ok(SchemaVersion::V2)
  } else {
    Ok(SchemaVersion::V1)
  }
}

/// Bring the store to the v2 layout, whatever its starting point, and
/// guarantee the root directory row. Idempotent; runs in one transaction,
/// so a failure leaves the original rows untouched.
pub(crate) fn run(conn: &mut Connection, now_ms: i64) -> rusqlite::Result<()> {
  let version = detect(conn)?;
  tracing::debug!(?version, "git object store schema detected");

  let tx = conn.transaction()?;
  match version {
    SchemaVersion::Missing | SchemaVersion::V2 => {
      tx.execute_batch(schema::CREATE_TABLE)?;
    }
    SchemaVersion::V1 => {
      tracing::info!("migrating git object store from v1 to v2");
      tx.execute_batch(
        "CREATE TABLE git_objects_v2 (
             path        TEXT NOT NULL,
             chunk_index INTEGER NOT NULL,
             parent_path TEXT NOT NULL DEFAULT '',
             data        BLOB,
             is_dir      INTEGER NOT NULL DEFAULT 0,
             size        INTEGER NOT NULL DEFAULT 0,
             mtime       INTEGER NOT NULL DEFAULT 0,
             PRIMARY KEY (path, chunk_index)
         );
         INSERT INTO git_objects_v2
             (path, chunk_index, parent_path, data, is_dir, size, mtime)
           SELECT path, 0, parent_path, data, is_dir, 0, mtime
           FROM git_objects;
         DROP TABLE git_objects;
         ALTER TABLE git_objects_v2 RENAME TO git_objects;",
      )?;
    }
  }
  tx.execute_batch(schema::CREATE_INDEXES)?;
  tx.execute(schema::INSERT_ROOT, [now_ms])?;
  tx.commit()
}
