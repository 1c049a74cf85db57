//! Canonical path handling.
//!
//! Every path crossing the public API boundary is normalized exactly once:
//! no leading separator, no `./` prefix, no trailing separator. The empty
//! string denotes the repository root.

/// Normalize an incoming path to its canonical relative form.
///
/// Idempotent: `normalize(normalize(p)) == normalize(p)`.
pub fn normalize(path: &str) -> String {
  let mut p = path.trim_start_matches('/');
  if p == "." || p == "./" {
    return String::new();
  }
  if let Some(rest) = p.strip_prefix("./") {
    p = rest;
  }
  p.trim_end_matches('/').to_string()
}

/// The canonical path of the containing directory; `""` for entries
/// directly under the repository root.
pub fn parent_of(path: &str) -> &str {
  match path.rfind('/') {
    Some(i) => &path[..i],
    None => "",
  }
}

/// The last path segment.
pub fn basename(path: &str) -> &str {
  match path.rfind('/') {
    Some(i) => &path[i + 1..],
    None => path,
  }
}

/// Proper ancestors of a canonical path, shallowest first.
///
/// `"a/b/c"` yields `["a", "a/b"]`; entries at the root yield nothing.
pub fn ancestors(path: &str) -> Vec<String> {
  path
    .char_indices()
    .filter(|(_, ch)| *ch == '/')
    .map(|(i, _)| path[..i].to_string())
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_strips_leading_separators() {
    assert_eq!(normalize("/a"), "a");
    assert_eq!(normalize("///a/b"), "a/b");
    assert_eq!(normalize("./a"), "a");
    assert_eq!(normalize("a"), "a");
  }

  #[test]
  fn normalize_root_forms() {
    assert_eq!(normalize(""), "");
    assert_eq!(normalize("/"), "");
    assert_eq!(normalize("."), "");
    assert_eq!(normalize("./"), "");
  }

  #[test]
  fn normalize_strips_trailing_separator() {
    assert_eq!(normalize("a/b/"), "a/b");
    assert_eq!(normalize("/a/"), "a");
  }

  #[test]
  fn normalize_is_idempotent() {
    for input in ["/a/b", "./x", "a/b/c/", "", ".", "/./a"] {
      let once = normalize(input);
      assert_eq!(normalize(&once), once, "input {input:?}");
    }
  }

  #[test]
  fn parent_and_basename() {
    assert_eq!(parent_of("a/b/c"), "a/b");
    assert_eq!(parent_of("a"), "");
    assert_eq!(parent_of(""), "");
    assert_eq!(basename("a/b/c"), "c");
    assert_eq!(basename("a"), "a");
  }

  #[test]
  fn ancestors_shallowest_first() {
    assert_eq!(ancestors("a/b/c"), vec!["a".to_string(), "a/b".to_string()]);
    assert!(ancestors("a").is_empty());
    assert!(ancestors("").is_empty());
  }
}
