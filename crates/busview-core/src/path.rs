//! Object path helpers.

use crate::error::TreeError;

/// Object path separator
pub const SEPARATOR: char = '/';

/// Root object path
pub const ROOT_PATH: &str = "/";

/// Split an absolute object path into its non-empty segments.
///
/// `"/"` yields no segments. Duplicate and trailing separators are tolerated.
/// Empty or relative paths are rejected.
///
/// # Examples
/// ```
/// use busview_core::path::segments;
///
/// assert_eq!(segments("/org/freedesktop").unwrap(), vec!["org", "freedesktop"]);
/// assert!(segments("/").unwrap().is_empty());
/// assert!(segments("org").is_err());
/// ```
pub fn segments(path: &str) -> Result<Vec<&str>, TreeError> {
    if !path.starts_with(SEPARATOR) {
        return Err(TreeError::invalid_path(path));
    }
    Ok(path.split(SEPARATOR).filter(|s| !s.is_empty()).collect())
}

/// Join namespace names (each carrying a trailing separator) into a path.
///
/// The trailing separator of the last name is dropped unless the result is
/// the root itself.
pub fn join_names<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let mut path = String::new();
    for name in names {
        if path.ends_with(SEPARATOR) {
            path.push_str(name.trim_start_matches(SEPARATOR));
        } else {
            path.push_str(name);
        }
    }
    if path.len() > 1 && path.ends_with(SEPARATOR) {
        path.pop();
    }
    if path.is_empty() {
        path.push(SEPARATOR);
    }
    path
}

/// Normalize a raw `<node name="...">` attribute into a namespace name with
/// exactly one trailing separator.
///
/// Returns `None` for names that are empty once separators are trimmed, and
/// for names spanning several segments (`"a/b"`), which could never be
/// reached again by path resolution.
pub fn namespace_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches(SEPARATOR);
    if trimmed.is_empty() || trimmed.contains(SEPARATOR) {
        None
    } else {
        Some(format!("{}{}", trimmed, SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments() {
        assert_eq!(segments("/a/b/c").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(segments("//a//b/").unwrap(), vec!["a", "b"]);
        assert!(segments("/").unwrap().is_empty());
    }

    #[test]
    fn test_segments_rejects_invalid() {
        assert!(matches!(segments(""), Err(TreeError::InvalidPath { .. })));
        assert!(matches!(segments("a/b"), Err(TreeError::InvalidPath { .. })));
    }

    #[test]
    fn test_join_names() {
        assert_eq!(join_names(["/"]), "/");
        assert_eq!(join_names(["/", "org/", "freedesktop/"]), "/org/freedesktop");
        assert_eq!(join_names(["/", "a/"]), "/a");
        assert_eq!(join_names(std::iter::empty()), "/");
    }

    #[test]
    fn test_namespace_name() {
        assert_eq!(namespace_name("child").as_deref(), Some("child/"));
        assert_eq!(namespace_name("/child/").as_deref(), Some("child/"));
        assert_eq!(namespace_name(""), None);
        assert_eq!(namespace_name("/"), None);
        assert_eq!(namespace_name("a/b"), None);
        assert_eq!(namespace_name("/a/b/"), None);
    }
}
