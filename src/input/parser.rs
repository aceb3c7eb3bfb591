//! Query string and form field name parsing.

use std::borrow::Cow;

use crate::types::{Arguments, ParamList, Value};

/// Percent-decode a form component, treating `+` as a space.
#[inline]
pub fn form_decode(s: &str) -> String {
    let s: Cow<'_, str> = if s.contains('+') {
        Cow::Owned(s.replace('+', " "))
    } else {
        Cow::Borrowed(s)
    };

    if s.contains('%') {
        percent_encoding::percent_decode_str(&s)
            .decode_utf8_lossy()
            .into_owned()
    } else {
        s.into_owned()
    }
}

/// Parse a query string (or urlencoded body) into key-value pairs.
#[inline]
pub fn parse_query_string(query: &str) -> ParamList {
    let pair_count = query.matches('&').count() + 1;
    let mut params = Vec::with_capacity(pair_count.min(16));

    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }

        let (key, value) = match pair.find('=') {
            Some(pos) => (&pair[..pos], &pair[pos + 1..]),
            None => (pair, ""),
        };

        if !key.is_empty() {
            params.push((form_decode(key), form_decode(value)));
        }
    }

    params
}

/// One segment of a bracketed field name; `None` stands for `[]` (append).
pub type FieldSegment = Option<String>;

/// Split a form field name into its segments.
///
/// `photo[avatar][main]` becomes `photo`, `avatar`, `main`; `tags[]` becomes
/// `tags` followed by an append marker. Names without a base (`[a]`) are
/// rejected; an unclosed bracket makes the whole name literal.
pub fn split_field_name(name: &str) -> Option<Vec<FieldSegment>> {
    let pos = match name.find('[') {
        Some(0) => return None,
        Some(pos) => pos,
        None if name.is_empty() => return None,
        None => return Some(vec![Some(name.to_string())]),
    };

    let mut segments = vec![Some(name[..pos].to_string())];
    let mut rest = &name[pos..];
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(end) = inner.find(']') else {
            break;
        };
        let segment = &inner[..end];
        segments.push((!segment.is_empty()).then(|| segment.to_string()));
        rest = &inner[end + 1..];
    }

    if segments.len() == 1 {
        return Some(vec![Some(name.to_string())]);
    }
    Some(segments)
}

/// Next free integer key of a map: one past the largest integer key, or `0`.
pub fn next_index(args: &Arguments) -> String {
    args.keys()
        .filter_map(|k| k.parse::<u64>().ok())
        .max()
        .map_or(0, |max| max + 1)
        .to_string()
}

/// Build an argument tree from flat pairs, nesting bracketed names.
///
/// Later pairs overwrite earlier ones at the same path.
pub fn nest_params(params: ParamList) -> Arguments {
    let mut args = Arguments::new();
    for (name, value) in params {
        if let Some(segments) = split_field_name(&name) {
            insert_nested(&mut args, &segments, Value::Scalar(value));
        }
    }
    args
}

fn insert_nested(args: &mut Arguments, segments: &[FieldSegment], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let key = match first {
        Some(key) => key.clone(),
        None => next_index(args),
    };

    if rest.is_empty() {
        args.insert(key, value);
        return;
    }

    let slot = args.entry(key).or_insert_with(Value::map);
    if !slot.is_map() {
        *slot = Value::map();
    }
    if let Value::Map(nested) = slot {
        insert_nested(nested, rest, value);
    }
}
