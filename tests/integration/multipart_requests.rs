//! End-to-end request decoding with multipart bodies.

use crate::helpers::*;
use flow_request::arguments::{count_files, UploadError};
use flow_request::config::UploadConfig;
use flow_request::types::Value;

/// Form fields, query arguments and files end up in one tree
#[tokio::test]
async fn test_multipart_request_unification() {
    let dir = tempfile::tempdir().unwrap();
    let config = UploadConfig::default().with_tmp_dir(dir.path());

    let body = MultipartBody::new("flowboundary")
        .field("title", "Holidays")
        .field("photo[main][__collectionName]", "albums")
        .file("photo[main]", "beach.jpg", "image/jpeg", "jpegdata")
        .file("photo[thumb]", "beach-small.jpg", "image/jpeg", "tiny")
        .file("attachment", "notes.txt", "text/plain", "remember sunscreen");

    let req = multipart_request("/albums?title=ignored&page=3", body, &config).await;

    assert_eq!(req.argument("title"), Some(&Value::from("Holidays")));
    assert_eq!(req.argument("page"), Some(&Value::from("3")));
    assert_eq!(req.client_ip_address(), Some("10.0.0.1"));

    let files = req.uploaded_files();
    assert_eq!(count_files(files), 3);

    let main = expect_file(files, &["photo", "main"]);
    assert_eq!(main.client_filename(), "beach.jpg");
    assert_eq!(main.client_media_type(), "image/jpeg");
    assert_eq!(main.size(), 8);
    assert_eq!(main.collection_name(), Some("albums"));
    assert_eq!(std::fs::read_to_string(main.tmp_name()).unwrap(), "jpegdata");

    let attachment = expect_file(files, &["attachment"]);
    assert_eq!(
        std::fs::read_to_string(attachment.tmp_name()).unwrap(),
        "remember sunscreen"
    );
}

/// Appended file inputs (`docs[]`) get consecutive indexes
#[tokio::test]
async fn test_multipart_appended_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = UploadConfig::default().with_tmp_dir(dir.path());

    let body = MultipartBody::new("b")
        .file("docs[]", "one.txt", "text/plain", "1")
        .file("docs[]", "two.txt", "text/plain", "22");

    let req = multipart_request("/docs", body, &config).await;
    let files = req.uploaded_files();

    assert_eq!(expect_file(files, &["docs", "0"]).client_filename(), "one.txt");
    assert_eq!(expect_file(files, &["docs", "1"]).size(), 2);
}

/// Empty file inputs and oversized files
#[tokio::test]
async fn test_multipart_empty_and_oversized_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = UploadConfig::default()
        .with_tmp_dir(dir.path())
        .with_max_file_size(4);

    let body = MultipartBody::new("b")
        .file("avatar", "", "application/octet-stream", "")
        .file("big", "big.bin", "application/octet-stream", "way too large");

    let req = multipart_request("/profile", body, &config).await;
    let files = req.uploaded_files();

    assert!(!files.contains_key("avatar"));
    assert!(!req.has_argument("avatar"));

    let big = expect_file(files, &["big"]);
    assert_eq!(big.error(), UploadError::IniSize);
    assert_eq!(big.tmp_name(), "");
    assert_eq!(big.size(), 13);
}

/// Stored files live as long as the request, and no longer
#[tokio::test]
async fn test_multipart_temp_files_removed_with_request() {
    let dir = tempfile::tempdir().unwrap();
    let config = UploadConfig::default().with_tmp_dir(dir.path());

    let body = MultipartBody::new("b")
        .file("a", "a.txt", "text/plain", "first")
        .file("b", "b.txt", "text/plain", "second");

    let req = multipart_request("/upload", body, &config).await;
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);

    drop(req);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

/// A truncated body fails without leaving earlier files behind
#[tokio::test]
async fn test_multipart_truncated_body_leaves_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = UploadConfig::default().with_tmp_dir(dir.path());

    let body = concat!(
        "--b\r\n",
        "Content-Disposition: form-data; name=\"a\"; filename=\"a.txt\"\r\n",
        "\r\n",
        "complete\r\n",
        "--b\r\n",
        "Content-Disposition: form-data; name=\"b\"; filename=\"b.txt\"\r\n",
        "\r\n",
        "trunc",
    );
    let http_req = http::Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-type", "multipart/form-data; boundary=b")
        .body(bytes::Bytes::from(body))
        .unwrap();

    let result = flow_request::ServerRequest::from_http(http_req, None, &config).await;

    assert!(result.is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
