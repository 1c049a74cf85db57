//! SQL schema for the git-object table (v2).
//!
//! One row per chunk, keyed by `(path, chunk_index)`. Chunk 0 carries the
//! entity's metadata; directories are always and only a chunk-0 row with
//! null data.

/// Fixed chunk size in bytes (1,800 KiB exactly).
///
/// Changing this between versions is a breaking change: already-stored
/// files keep their original chunk boundaries and read back correctly, but
/// new writes use the new size.
pub const CHUNK_SIZE: usize = 1_843_200;

pub(crate) const CREATE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS git_objects (
    path        TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    parent_path TEXT NOT NULL DEFAULT '',
    data        BLOB,
    is_dir      INTEGER NOT NULL DEFAULT 0,
    size        INTEGER NOT NULL DEFAULT 0,
    mtime       INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (path, chunk_index)
);
";

pub(crate) const CREATE_INDEXES: &str = "
CREATE INDEX IF NOT EXISTS idx_git_objects_parent
    ON git_objects (parent_path, path);
CREATE INDEX IF NOT EXISTS idx_git_objects_is_dir
    ON git_objects (is_dir, path);
";

/// Idempotent root-directory row; parameter 1 is the current timestamp in
/// milliseconds.
pub(crate) const INSERT_ROOT: &str = "
INSERT OR IGNORE INTO git_objects
    (path, chunk_index, parent_path, data, is_dir, size, mtime)
VALUES ('', 0, '', NULL, 1, 0, ?1)
";
