//! Argument unification: precedence, untangling and upload records.

use crate::helpers::*;
use flow_request::arguments::{count_files, UploadError};
use flow_request::types::{get_path, Arguments, Value};
use flow_request::unify;
use serde_json::json;

/// Disjoint query and body paths come through unchanged
#[test]
fn test_disjoint_sources_union() {
    let query = args(json!({"page": "2", "filter": {"tag": "rust"}}));
    let body = args(json!({"title": "Hello", "filter": {"author": "flow"}}));

    let unified = unify(query, body, &Arguments::new());

    assert_eq!(
        unified.arguments,
        args(json!({
            "page": "2",
            "filter": {"tag": "rust", "author": "flow"},
            "title": "Hello",
        }))
    );
}

/// Body wins over query at every depth
#[test]
fn test_body_overrides_query_deeply() {
    let query = args(json!({"a": {"b": {"c": "query", "d": "query"}}}));
    let body = args(json!({"a": {"b": {"c": "body"}}}));

    let unified = unify(query, body, &Arguments::new());

    assert_eq!(
        get_path(&unified.arguments, &["a", "b", "c"]),
        Some(&Value::from("body"))
    );
    assert_eq!(
        get_path(&unified.arguments, &["a", "b", "d"]),
        Some(&Value::from("query"))
    );
}

/// Uploads win over both query and body
#[test]
fn test_uploads_override_query_and_body() {
    let query = args(json!({"avatar": "q"}));
    let body = args(json!({"avatar": "b"}));
    let uploads = args(json!({
        "avatar": upload_record("/tmp/php1", 512, 0, "me.png", "image/png"),
    }));

    let unified = unify(query, body, &uploads);

    assert_eq!(
        unified.arguments["avatar"],
        Value::from(upload_record("/tmp/php1", 512, 0, "me.png", "image/png"))
    );
}

/// A flat single-file field yields exactly one record
#[test]
fn test_flat_single_file() {
    let uploads = args(json!({
        "avatar": upload_record("/tmp/php1", 512, 0, "me.png", "image/png"),
    }));

    let unified = unify(Arguments::new(), Arguments::new(), &uploads);

    assert_eq!(count_files(&unified.uploaded_files), 1);
    let file = expect_file(&unified.uploaded_files, &["avatar"]);
    assert_eq!(file.tmp_name(), "/tmp/php1");
    assert_eq!(file.size(), 512);
    assert_eq!(file.error(), UploadError::Ok);
    assert_eq!(file.client_filename(), "me.png");
    assert_eq!(file.client_media_type(), "image/png");
}

/// Nested fields yield one record per leaf
#[test]
fn test_nested_files() {
    let uploads = args(json!({
        "photo": {
            "tmp_name": {"main": "/tmp/php2", "thumb": "/tmp/php3"},
            "size": {"main": 100, "thumb": 10},
            "error": {"main": 0, "thumb": 0},
            "name": {"main": "main.jpg", "thumb": "thumb.jpg"},
            "type": {"main": "image/jpeg", "thumb": "image/jpeg"},
        }
    }));

    let unified = unify(Arguments::new(), Arguments::new(), &uploads);

    assert_eq!(count_files(&unified.uploaded_files), 2);
    assert_eq!(expect_file(&unified.uploaded_files, &["photo", "main"]).size(), 100);
    assert_eq!(
        expect_file(&unified.uploaded_files, &["photo", "thumb"]).client_filename(),
        "thumb.jpg"
    );
    assert_eq!(
        get_path(&unified.arguments, &["photo", "thumb", "tmp_name"]),
        Some(&Value::from("/tmp/php3"))
    );
}

/// Deeply nested fields keep their full path
#[test]
fn test_deeply_nested_files() {
    let uploads = args(json!({
        "gallery": {
            "tmp_name": {"albums": {"summer": {"0": "/tmp/a", "1": "/tmp/b"}}},
            "size": {"albums": {"summer": {"0": 1, "1": 2}}},
            "error": {"albums": {"summer": {"0": 0, "1": 3}}},
            "name": {"albums": {"summer": {"0": "a.jpg", "1": "b.jpg"}}},
            "type": {"albums": {"summer": {"0": "image/jpeg", "1": "image/jpeg"}}},
        }
    }));

    let unified = unify(Arguments::new(), Arguments::new(), &uploads);

    let partial = expect_file(&unified.uploaded_files, &["gallery", "albums", "summer", "1"]);
    assert_eq!(partial.error(), UploadError::Partial);
    assert!(!partial.is_ok());
    assert!(expect_file(&unified.uploaded_files, &["gallery", "albums", "summer", "0"]).is_ok());
}

/// Empty file inputs produce no record and no argument
#[test]
fn test_no_file_sentinel_skipped() {
    let uploads = args(json!({
        "avatar": upload_record("", 0, 4, "", ""),
        "photo": {
            "tmp_name": {"main": "/tmp/php2", "thumb": ""},
            "size": {"main": 100, "thumb": 0},
            "error": {"main": 0, "thumb": 4},
            "name": {"main": "main.jpg", "thumb": ""},
            "type": {"main": "image/jpeg", "thumb": ""},
        }
    }));

    let unified = unify(Arguments::new(), Arguments::new(), &uploads);

    assert!(!unified.uploaded_files.contains_key("avatar"));
    assert!(!unified.arguments.contains_key("avatar"));
    assert_eq!(count_files(&unified.uploaded_files), 1);
    assert!(get_path(&unified.arguments, &["photo", "thumb"]).is_none());
}

/// Malformed upload entries degrade to "file not present"
#[test]
fn test_malformed_uploads_are_dropped() {
    let uploads = args(json!({
        "scalar": "nonsense",
        "missing_keys": {"tmp_name": "/tmp/x", "error": 0},
        "incongruent": {
            "tmp_name": {"a": "/tmp/y"},
            "size": {"a": 1},
            "error": {"a": 0, "b": 0},
            "name": {"a": "y"},
            "type": {"a": "text/plain"},
        },
        "bad_numbers": upload_record("/tmp/z", 0, 0, "z.txt", "text/plain"),
    }));
    let mut uploads = uploads;
    if let Some(Value::Map(record)) = uploads.get_mut("bad_numbers") {
        record.insert("size".to_string(), Value::from("lots"));
        record.insert("error".to_string(), Value::from("none"));
    }

    let unified = unify(Arguments::new(), Arguments::new(), &uploads);

    assert_eq!(count_files(&unified.uploaded_files), 2);
    assert!(expect_file(&unified.uploaded_files, &["incongruent", "a"]).is_ok());
    let coerced = expect_file(&unified.uploaded_files, &["bad_numbers"]);
    assert_eq!(coerced.size(), 0);
    assert_eq!(coerced.error(), UploadError::Ok);
}

/// Pass-through fields come from the argument tree at the same path
#[test]
fn test_pass_through_fields() {
    let body = args(json!({
        "product": {
            "image": {
                "originallySubmittedResource": {"__identity": "4711"},
                "__collectionName": "productImages",
            },
            "manual": {"__collectionName": ""},
        }
    }));
    let uploads = args(json!({
        "product": {
            "tmp_name": {"image": "/tmp/i", "manual": "/tmp/m"},
            "size": {"image": 10, "manual": 20},
            "error": {"image": 0, "manual": 0},
            "name": {"image": "i.png", "manual": "m.pdf"},
            "type": {"image": "image/png", "manual": "application/pdf"},
        }
    }));

    let unified = unify(Arguments::new(), body, &uploads);

    let image = expect_file(&unified.uploaded_files, &["product", "image"]);
    assert_eq!(image.collection_name(), Some("productImages"));
    assert_eq!(
        image.originally_submitted_resource(),
        Some(&Value::from(json!({"__identity": "4711"})))
    );

    let manual = expect_file(&unified.uploaded_files, &["product", "manual"]);
    assert_eq!(manual.collection_name(), None);
    assert_eq!(manual.originally_submitted_resource(), None);
}

/// Unifying the output with itself changes nothing
#[test]
fn test_unify_fixed_point() {
    let query = args(json!({"q": "1", "shared": {"x": "q"}}));
    let body = args(json!({"b": "2", "shared": {"y": "b"}}));
    let uploads = args(json!({
        "file": upload_record("/tmp/f", 3, 0, "f.txt", "text/plain"),
    }));

    let first = unify(query, body, &uploads);
    let second = unify(first.arguments.clone(), first.arguments.clone(), &Arguments::new());

    assert_eq!(second.arguments, first.arguments);
    assert!(second.uploaded_files.is_empty());
}
