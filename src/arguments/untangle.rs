//! Untangling of the raw, field-indexed upload description.
//!
//! A raw description keeps one record per top-level field name. For plain
//! names the record is flat:
//!
//! ```text
//! avatar => { tmp_name: "/tmp/a", size: "12", error: "0", name: "a.png", type: "image/png" }
//! ```
//!
//! For bracketed names (`photo[main]`, `photo[thumb]`) each of the five keys
//! holds a tree of the same shape instead:
//!
//! ```text
//! photo => { tmp_name: { main: "/tmp/b", thumb: "/tmp/c" }, size: { main: .., thumb: .. }, ... }
//! ```
//!
//! Untangling turns the second form into `photo => { main: {flat record}, thumb: {flat record} }`.

use tracing::debug;

use super::uploaded_file::{UploadError, UploadedFile, UploadedFileNode, UploadedFiles};
use crate::types::{set_path, Arguments, Value};

/// The five keys of a flat upload record.
pub const UPLOAD_KEYS: [&str; 5] = ["tmp_name", "size", "error", "name", "type"];

const ORIGINALLY_SUBMITTED_RESOURCE: &str = "originallySubmittedResource";
const COLLECTION_NAME: &str = "__collectionName";

/// Every leaf path of `structure`, each prefixed by `field_name`.
///
/// Empty nested maps contribute no path.
pub fn calculate_field_paths(structure: &Arguments, field_name: &str) -> Vec<Vec<String>> {
    let mut paths = Vec::new();
    let mut prefix = vec![field_name.to_string()];
    collect_leaf_paths(structure, &mut prefix, &mut paths);
    paths
}

fn collect_leaf_paths(structure: &Arguments, prefix: &mut Vec<String>, paths: &mut Vec<Vec<String>>) {
    for (key, sub) in structure {
        prefix.push(key.clone());
        match sub {
            Value::Map(nested) => collect_leaf_paths(nested, prefix, paths),
            Value::Scalar(_) => paths.push(prefix.clone()),
        }
        prefix.pop();
    }
}

/// Transform a raw upload description into a tree of flat five-key records.
///
/// Records for empty file inputs (`error` = no file) and records with
/// missing or non-scalar keys are left out.
pub fn untangle_files(raw: &Arguments) -> Arguments {
    let mut field_paths: Vec<Vec<String>> = Vec::new();
    for (field_name, info) in raw {
        match info.as_map().and_then(|m| m.get("error")) {
            Some(Value::Map(error_tree)) => {
                field_paths.extend(calculate_field_paths(error_tree, field_name));
            }
            _ => field_paths.push(vec![field_name.clone()]),
        }
    }

    let mut untangled = Arguments::new();
    for path in &field_paths {
        let Some(record) = assemble_record(raw, path) else {
            debug!(path = %path.join("/"), "untangle: dropping incomplete upload record");
            continue;
        };

        let error = record
            .get("error")
            .and_then(Value::as_str)
            .map(coerce_int)
            .unwrap_or_default();
        if error == UploadError::NO_FILE_CODE {
            continue;
        }

        set_path(&mut untangled, path, Value::Map(record));
    }

    debug!(
        fields = raw.len(),
        paths = field_paths.len(),
        files = untangled.len(),
        "untangle: completed"
    );

    untangled
}

/// Collect the five keys of the upload description at `path`.
///
/// Returns `None` when any of them is missing or is not a scalar.
fn assemble_record(raw: &Arguments, path: &[String]) -> Option<Arguments> {
    let (field_name, rest) = path.split_first()?;
    let info = raw.get(field_name)?.as_map()?;

    let mut record = Arguments::new();
    for key in UPLOAD_KEYS {
        let value = info.get(key)?.get_path(rest)?;
        if value.is_map() {
            return None;
        }
        record.insert(key.to_string(), value.clone());
    }
    Some(record)
}

/// Build the upload record tree from an untangled tree.
///
/// `arguments` is the unified argument tree at the same level; it supplies
/// the optional pass-through fields of each file.
pub fn create_uploaded_files(untangled: &Arguments, arguments: Option<&Arguments>) -> UploadedFiles {
    let mut files = UploadedFiles::new();
    for (key, node) in untangled {
        let Some(node) = node.as_map() else {
            continue;
        };
        let arguments_for_key = arguments.and_then(|a| a.get(key)).and_then(Value::as_map);

        if node.contains_key("tmp_name") {
            files.insert(
                key.clone(),
                UploadedFileNode::File(create_uploaded_file(node, arguments_for_key)),
            );
        } else {
            files.insert(
                key.clone(),
                UploadedFileNode::Nested(create_uploaded_files(node, arguments_for_key)),
            );
        }
    }
    files
}

fn create_uploaded_file(record: &Arguments, arguments: Option<&Arguments>) -> UploadedFile {
    let field = |key: &str| {
        record
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let size = coerce_int(&field("size")).max(0) as u64;
    let error = UploadError::from_code(coerce_int(&field("error")));
    let mut file = UploadedFile::new(field("tmp_name"), size, error, field("name"), field("type"));

    if let Some(arguments) = arguments {
        if let Some(resource) = arguments
            .get(ORIGINALLY_SUBMITTED_RESOURCE)
            .filter(|v| !v.is_empty())
        {
            file = file.with_originally_submitted_resource(resource.clone());
        }
        if let Some(name) = arguments
            .get(COLLECTION_NAME)
            .filter(|v| !v.is_empty())
            .and_then(Value::as_str)
        {
            file = file.with_collection_name(name);
        }
    }

    file
}

/// Best-effort integer coercion.
///
/// Reads an optional sign followed by leading digits after trimming
/// whitespace; anything unparsable yields `0`, overflow saturates.
pub fn coerce_int(s: &str) -> i64 {
    let s = s.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }

    if negative {
        -value
    } else {
        value
    }
}
