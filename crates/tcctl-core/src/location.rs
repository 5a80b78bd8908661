//! Identifier extraction from operation `location` URLs
//!
//! Only path segments are inspected. Query strings, fragments, empty
//! segments and trailing slashes never contribute an identifier.

use url::Url;

/// Base used to resolve host-relative locations such as `/api/projects/p1`
const RELATIVE_BASE: &str = "http://localhost/";

fn path_segments(location: &str) -> Vec<String> {
    let parsed = Url::parse(location).or_else(|_| Url::parse(RELATIVE_BASE)?.join(location));

    let Ok(url) = parsed else {
        return Vec::new();
    };

    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(|s| {
                    urlencoding::decode(s)
                        .map(|d| d.into_owned())
                        .unwrap_or_else(|_| s.to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Id of the item a location points at: its last path segment
pub fn item_id_from_location(location: &str) -> Option<String> {
    path_segments(location).pop()
}

/// Id of the owning project: the path segment right after `projects`
pub fn project_id_from_location(location: &str) -> Option<String> {
    let segments = path_segments(location);
    let idx = segments.iter().position(|s| s == "projects")?;
    segments.get(idx + 1).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_plain() {
        assert_eq!(
            item_id_from_location("https://tc.example.com/api/providers/abc123").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_item_id_trailing_slash() {
        assert_eq!(
            item_id_from_location("https://tc.example.com/api/providers/abc123/").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_item_id_ignores_query_and_fragment() {
        assert_eq!(
            item_id_from_location("https://tc.example.com/api/providers/abc123?api-version=1#x")
                .as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_item_id_relative_location() {
        assert_eq!(
            item_id_from_location("/api/users/u-1").as_deref(),
            Some("u-1")
        );
    }

    #[test]
    fn test_item_id_without_path() {
        assert_eq!(item_id_from_location("https://tc.example.com"), None);
        assert_eq!(item_id_from_location("https://tc.example.com/"), None);
        assert_eq!(item_id_from_location(""), None);
    }

    #[test]
    fn test_project_id_from_path() {
        assert_eq!(
            project_id_from_location("https://tc.example.com/api/projects/P1/status/t-1")
                .as_deref(),
            Some("P1")
        );
    }

    #[test]
    fn test_project_id_missing() {
        assert_eq!(
            project_id_from_location("https://tc.example.com/api/status/t-1"),
            None
        );
        assert_eq!(
            project_id_from_location("https://tc.example.com/api/projects"),
            None
        );
        assert_eq!(
            project_id_from_location("https://tc.example.com/api/projects/"),
            None
        );
    }

    #[test]
    fn test_project_id_ignores_query_parameters() {
        assert_eq!(
            project_id_from_location("https://tc.example.com/api/status/t-1?from=projects/P9"),
            None
        );
    }

    #[test]
    fn test_project_id_requires_exact_segment() {
        assert_eq!(
            project_id_from_location("https://tc.example.com/api/myprojects/P1/status/t"),
            None
        );
    }

    #[test]
    fn test_segments_are_percent_decoded() {
        assert_eq!(
            item_id_from_location("https://tc.example.com/api/users/jane%40contoso.com")
                .as_deref(),
            Some("jane@contoso.com")
        );
    }
}
