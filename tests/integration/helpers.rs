//! Test helpers and utilities

use bytes::Bytes;
use flow_request::arguments::{file_at, UploadedFile, UploadedFiles};
use flow_request::config::UploadConfig;
use flow_request::types::{arguments_from_json, Arguments};
use flow_request::ServerRequest;

/// Build an argument tree from a JSON literal.
pub fn args(json: serde_json::Value) -> Arguments {
    arguments_from_json(json)
}

/// Flat five-key upload record.
pub fn upload_record(tmp_name: &str, size: u64, error: i64, name: &str, media_type: &str) -> serde_json::Value {
    serde_json::json!({
        "tmp_name": tmp_name,
        "size": size,
        "error": error,
        "name": name,
        "type": media_type,
    })
}

/// Look up an uploaded file, panicking with the path if it is missing.
pub fn expect_file<'a>(files: &'a UploadedFiles, path: &[&str]) -> &'a UploadedFile {
    file_at(files, path).unwrap_or_else(|| panic!("No uploaded file at {:?}", path))
}

/// Multipart body builder.
pub struct MultipartBody {
    boundary: String,
    body: String,
}

#[allow(dead_code)]
impl MultipartBody {
    pub fn new(boundary: &str) -> Self {
        Self {
            boundary: boundary.to_string(),
            body: String::new(),
        }
    }

    /// Add a plain form field.
    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            self.boundary, name, value
        ));
        self
    }

    /// Add a file field.
    pub fn file(mut self, name: &str, filename: &str, content_type: &str, content: &str) -> Self {
        self.body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n{}\r\n",
            self.boundary, name, filename, content_type, content
        ));
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn build(mut self) -> Bytes {
        self.body.push_str(&format!("--{}--\r\n", self.boundary));
        Bytes::from(self.body)
    }
}

/// Decode a multipart POST request to `uri`.
pub async fn multipart_request(uri: &str, body: MultipartBody, config: &UploadConfig) -> ServerRequest {
    let http_req = http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", body.content_type())
        .body(body.build())
        .expect("Failed to build request");

    ServerRequest::from_http(http_req, Some("10.0.0.1".parse().unwrap()), config)
        .await
        .expect("Failed to decode request")
}
