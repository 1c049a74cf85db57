//! Decoding the bilingual `data` column.
//!
//! New writes store raw blobs. Rows written under the v1 schema may hold
//! base64 text instead, and keep doing so until the path is rewritten; the
//! read path treats both forms identically.

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use repofs_core::{Error, Result};
use rusqlite::types::Value;

/// Decode one chunk's `data` cell into raw bytes.
pub(crate) fn decode_chunk(value: Value) -> Result<Vec<u8>> {
  match value {
    Value::Blob(bytes) => Ok(bytes),
    Value::Text(text) if text.is_empty() => Ok(Vec::new()),
    Value::Text(text) => B64.decode(text.as_bytes()).map_err(Error::storage),
    _ => Ok(Vec::new()),
  }
}

/// The logical byte length of a chunk without decoding it.
///
/// Legacy base64 text reports its decoded length: `len * 3 / 4` minus the
/// trailing padding characters.
pub(crate) fn logical_len(value: &Value) -> u64 {
  match value {
    Value::Blob(bytes) => bytes.len() as u64,
    Value::Text(text) => {
      let padding = text.bytes().rev().take_while(|b| *b == b'=').count();
      (text.len() * 3 / 4).saturating_sub(padding) as u64
    }
    _ => 0,
  }
}
