//! Content negotiation against Accept header values.

use flow_request::negotiation::{accepted_media_types, negotiate, parse_quality_values};

/// Typical browser Accept header
#[test]
fn test_browser_header_order() {
    let accepted =
        parse_quality_values("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8");

    assert_eq!(
        accepted,
        vec!["text/html", "application/xhtml+xml", "application/xml", "*/*"]
    );
}

/// Missing or empty header accepts anything
#[test]
fn test_empty_header() {
    assert_eq!(accepted_media_types(Some("")), vec!["*/*"]);
    assert_eq!(accepted_media_types(None), vec!["*/*"]);
}

/// Unqualified ranges come first, by specificity, then qualified ones by q
#[test]
fn test_mixed_tiers_and_qualities() {
    let accepted = parse_quality_values(
        "*/*, image/*;q=0.3, text/plain;format=flowed, application/json;q=0.9, text/*, text/csv",
    );

    assert_eq!(
        accepted,
        vec![
            "text/plain;format=flowed",
            "text/csv",
            "text/*",
            "*/*",
            "application/json",
            "image/*",
        ]
    );
}

/// The accepted order decides, not the supported order
#[test]
fn test_negotiate_by_accepted_preference() {
    let result = negotiate(
        &["application/json", "text/html"],
        &["text/html", "application/json"],
        true,
    );
    assert_eq!(result.as_deref(), Some("application/json"));
}

/// Negotiating against a parsed header
#[test]
fn test_negotiate_parsed_header() {
    let accepted = accepted_media_types(Some("application/xml;q=0.5, text/*"));
    let supported = ["application/xml", "text/html; charset=UTF-8"];

    assert_eq!(negotiate(&accepted, &supported, true).as_deref(), Some("text/html"));
    assert_eq!(
        negotiate(&accepted, &supported, false).as_deref(),
        Some("text/html; charset=UTF-8")
    );
}

/// Nothing matching yields None
#[test]
fn test_negotiate_no_match() {
    let accepted = accepted_media_types(Some("image/webp, image/png;q=0.9"));
    assert_eq!(negotiate(&accepted, &["application/json"], true), None);
}
