//! Lenient media type parsing and range matching.
//!
//! Header values are frequently sloppy, so parsing never fails: unknown
//! shapes produce empty components rather than errors.

use indexmap::IndexMap;

/// Parsed media type or media range, e.g. `text/html; charset=UTF-8`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaType {
    /// Top-level type, lower-cased (`text`, `*`).
    pub type_: String,
    /// Subtype, lower-cased (`html`, `*`).
    pub subtype: String,
    /// Parameters in declaration order, quotes removed.
    pub parameters: IndexMap<String, String>,
}

impl MediaType {
    /// `type/subtype` without parameters.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.type_, self.subtype)
    }

    #[inline]
    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }
}

/// Parse a media type string.
///
/// Input without a `/` yields the whole trimmed input as type and an empty
/// subtype.
pub fn parse_media_type(raw: &str) -> MediaType {
    let mut parts = raw.split(';');
    let essence = parts.next().unwrap_or_default().trim();

    let (type_, subtype) = match essence.split_once('/') {
        Some((t, s)) => (t.trim(), s.trim()),
        None => (essence, ""),
    };

    let mut parameters = IndexMap::new();
    for part in parts {
        let Some((name, value)) = part.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        parameters.insert(name.to_string(), value.to_string());
    }

    MediaType {
        type_: type_.to_ascii_lowercase(),
        subtype: subtype.to_ascii_lowercase(),
        parameters,
    }
}

/// Check whether `media_type` satisfies `media_range`.
///
/// Matches on exact type/subtype, `type/*` and `*/*`. Parameters are not
/// compared. Empty input never matches.
pub fn media_range_matches(media_range: &str, media_type: &str) -> bool {
    if media_range.trim().is_empty() || media_type.trim().is_empty() {
        return false;
    }
    let range = parse_media_type(media_range);
    let candidate = parse_media_type(media_type);

    let types_match = range.type_ == "*" || range.type_ == candidate.type_;
    let subtypes_match = range.subtype == "*" || range.subtype == candidate.subtype;
    types_match && subtypes_match
}

/// Reduce a media type to `type/subtype`.
///
/// A value without subtype trims to its bare type. Returns `None` only if
/// the type is missing.
pub fn trim_media_type(raw: &str) -> Option<String> {
    let parsed = parse_media_type(raw);
    if parsed.type_.is_empty() {
        return None;
    }
    if parsed.subtype.is_empty() {
        return Some(parsed.type_);
    }
    Some(parsed.essence())
}
