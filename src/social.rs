//! Username extraction from profile URLs.
//!
//! The original kept this inside a persistence hook; here it is a pure
//! function invoked explicitly by the create/update path.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static PLATFORM_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    // Each pattern captures the handle as group 1
    let table: &[(&str, &str)] = &[
        ("github", r"(?i)github\.com/([A-Za-z0-9-]+)/?"),
        ("linkedin", r"(?i)linkedin\.com/in/([A-Za-z0-9_-]+)/?"),
        ("twitter", r"(?i)(?:twitter|x)\.com/([A-Za-z0-9_]+)/?"),
        ("instagram", r"(?i)instagram\.com/([A-Za-z0-9_.]+)/?"),
        ("youtube", r"(?i)youtube\.com/@?([A-Za-z0-9_-]+)/?"),
        ("dribbble", r"(?i)dribbble\.com/([A-Za-z0-9_-]+)/?"),
        ("behance", r"(?i)behance\.net/([A-Za-z0-9_-]+)/?"),
        ("medium", r"(?i)medium\.com/@([A-Za-z0-9_.-]+)/?"),
        ("dev", r"(?i)dev\.to/([A-Za-z0-9_-]+)/?"),
    ];
    table
        .iter()
        .map(|(platform, pattern)| (*platform, Regex::new(pattern).expect("static pattern")))
        .collect()
});

/// Extract the handle from a profile URL for a known platform.
/// Returns `None` for unknown platforms or URLs that do not match.
pub fn extract_username(platform: &str, url: &str) -> Option<String> {
    let pattern = PLATFORM_PATTERNS
        .iter()
        .find(|(name, _)| *name == platform)
        .map(|(_, re)| re)?;

    pattern
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Pre-persist hook for social links: fills `username` from `platform` + `url`
/// when absent. Does nothing if no pattern matches or the field is already set.
pub fn derive_username(doc: &mut Map<String, Value>) {
    let already_set = doc
        .get("username")
        .and_then(Value::as_str)
        .map(|s| !s.is_empty())
        .unwrap_or(false);
    if already_set {
        return;
    }

    let platform = doc.get("platform").and_then(Value::as_str).unwrap_or("");
    let url = doc.get("url").and_then(Value::as_str).unwrap_or("");
    if let Some(username) = extract_username(platform, url) {
        doc.insert("username".to_string(), Value::String(username));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_known_platform_handles() {
        assert_eq!(
            extract_username("github", "https://github.com/octocat"),
            Some("octocat".to_string())
        );
        assert_eq!(
            extract_username("linkedin", "https://www.linkedin.com/in/jane-doe/"),
            Some("jane-doe".to_string())
        );
        assert_eq!(
            extract_username("twitter", "https://x.com/rustlang"),
            Some("rustlang".to_string())
        );
        assert_eq!(
            extract_username("medium", "https://medium.com/@writer.name"),
            Some("writer.name".to_string())
        );
    }

    #[test]
    fn unknown_platform_or_mismatched_url_yields_none() {
        assert_eq!(extract_username("website", "https://example.com"), None);
        assert_eq!(extract_username("github", "https://gitlab.com/someone"), None);
        assert_eq!(extract_username("", ""), None);
    }

    #[test]
    fn hook_fills_username_only_when_absent() {
        let mut doc = json!({
            "platform": "github",
            "url": "https://github.com/octocat"
        })
        .as_object()
        .cloned()
        .unwrap();
        derive_username(&mut doc);
        assert_eq!(doc["username"], json!("octocat"));

        let mut doc = json!({
            "platform": "github",
            "url": "https://github.com/octocat",
            "username": "kept"
        })
        .as_object()
        .cloned()
        .unwrap();
        derive_username(&mut doc);
        assert_eq!(doc["username"], json!("kept"));
    }

    #[test]
    fn hook_is_silent_on_no_match() {
        let mut doc = json!({
            "platform": "website",
            "url": "https://example.com"
        })
        .as_object()
        .cloned()
        .unwrap();
        derive_username(&mut doc);
        assert!(doc.get("username").is_none());
    }
}
