//! Path segment sanitization for variant labels.
//!
//! A variant label becomes one directory name in the storage layout, so it
//! must be a plain basename: no separators of either flavour, no `.`/`..`,
//! no NUL bytes.

use crate::error::{CatalogError, Result};

/// Reduce `segment` to its final path component.
///
/// Returns `None` when nothing usable remains.
pub fn sanitize_segment(segment: &str) -> Option<&str> {
    if segment.contains('\0') {
        return None;
    }
    match segment.rsplit(['/', '\\']).next() {
        Some("" | "." | "..") | None => None,
        Some(base) => Some(base),
    }
}

/// Reject any segment that is not equal to its own sanitized basename.
pub(crate) fn ensure_basename(segment: &str) -> Result<()> {
    match sanitize_segment(segment) {
        Some(base) if base == segment => Ok(()),
        _ => Err(CatalogError::PathTraversal(segment.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_segment_is_unchanged() {
        assert_eq!(sanitize_segment("01x01"), Some("01x01"));
        assert_eq!(sanitize_segment("POI_3x3"), Some("POI_3x3"));
    }

    #[test]
    fn separators_are_stripped() {
        assert_eq!(sanitize_segment("../../etc/passwd"), Some("passwd"));
        assert_eq!(sanitize_segment("a\\b\\01x01"), Some("01x01"));
    }

    #[test]
    fn dot_segments_have_no_basename() {
        assert_eq!(sanitize_segment("."), None);
        assert_eq!(sanitize_segment(".."), None);
        assert_eq!(sanitize_segment("01x01/.."), None);
        assert_eq!(sanitize_segment("01x01/"), None);
    }

    #[test]
    fn nul_is_rejected() {
        assert_eq!(sanitize_segment("01x01\0"), None);
    }

    #[test]
    fn ensure_basename_flags_traversal() {
        assert!(ensure_basename("01x01").is_ok());
        assert!(matches!(
            ensure_basename("../01x01"),
            Err(CatalogError::PathTraversal(s)) if s == "../01x01"
        ));
        assert!(matches!(ensure_basename(".."), Err(CatalogError::PathTraversal(_))));
    }
}
