//! Content negotiation for `Accept`-family headers.
//!
//! Ranges without an explicit quality value come first, ordered by
//! specificity:
//!
//! 1. type, subtype and parameters (`text/html;level=1`)
//! 2. type and subtype (`text/html`)
//! 3. subtype wildcard (`text/*`)
//! 4. full wildcard (`*/*`)
//!
//! Ranges with an explicit `q` follow, sorted by descending quality.

mod media_type;

use std::sync::LazyLock;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;

pub use media_type::{media_range_matches, parse_media_type, trim_media_type, MediaType};

/// Media range accepting anything.
pub const ANY_MEDIA_TYPE: &str = "*/*";

static RANGE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*").expect("valid regex"));
static QUALITY_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r";\s*q=").expect("valid regex"));
static QUALITY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").expect("valid regex")
});

/// Parse a content negotiation header value into ranges ordered by preference.
///
/// Repeated ranges without quality collapse to their first occurrence.
/// Repeated ranges with quality keep their first position and last value.
pub fn parse_quality_values(raw: &str) -> Vec<String> {
    let mut tiers: [IndexSet<&str>; 4] = Default::default();
    let mut qualified: IndexMap<&str, f64> = IndexMap::new();

    for token in RANGE_SEPARATOR.split(raw) {
        let mut pieces = QUALITY_SEPARATOR.split(token);
        let range = pieces.next().unwrap_or_default();

        match pieces.next() {
            Some(quality) => {
                qualified.insert(range, parse_quality(quality));
            }
            None => {
                tiers[specificity_tier(range)].insert(range);
            }
        }
    }

    let mut sorted: Vec<(&str, f64)> = qualified.into_iter().collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

    tiers
        .iter()
        .flat_map(|tier| tier.iter().copied())
        .chain(sorted.into_iter().map(|(range, _)| range))
        .map(str::to_string)
        .collect()
}

/// Accepted media types for a raw `Accept` header value.
///
/// Missing or empty headers accept anything.
pub fn accepted_media_types(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(raw) if !raw.is_empty() => parse_quality_values(raw),
        _ => vec![ANY_MEDIA_TYPE.to_string()],
    }
}

/// Pick the supported media type matching the most preferred accepted range.
///
/// The accepted order decides, not the supported order. With `trim` the
/// result is reduced to `type/subtype`.
pub fn negotiate<A, S>(accepted: &[A], supported: &[S], trim: bool) -> Option<String>
where
    A: AsRef<str>,
    S: AsRef<str>,
{
    let matched = accepted.iter().find_map(|range| {
        supported
            .iter()
            .find(|candidate| media_range_matches(range.as_ref(), candidate.as_ref()))
    })?;

    let matched = matched.as_ref();
    if trim {
        trim_media_type(matched)
    } else {
        Some(matched.to_string())
    }
}

/// Tier index, 0 being the most specific.
fn specificity_tier(range: &str) -> usize {
    let parsed = parse_media_type(range);
    if parsed.type_ == "*" {
        3
    } else if parsed.subtype == "*" {
        2
    } else if !parsed.has_parameters() {
        1
    } else {
        0
    }
}

/// Parse a quality value from its leading number (sign and exponent
/// included); non-numeric input counts as 0.
fn parse_quality(raw: &str) -> f64 {
    QUALITY_PREFIX
        .find(raw.trim())
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}
