//! Server-side HTTP request with unified arguments.

use std::collections::HashMap;
use std::net::IpAddr;

use bytes::Bytes;
use http::header::{self, HeaderName};
use http::uri::Scheme;
use http::{HeaderMap, Method, Uri};

use super::{Error, Result};
use crate::arguments::{tmp_names, unify, UploadedFiles};
use crate::config::UploadConfig;
use crate::input::{nest_params, parse_multipart, parse_query_string, remove_files};
use crate::negotiation::{accepted_media_types, negotiate, parse_media_type};
use crate::types::{Arguments, Value};

/// Attribute holding the client IP address.
pub const ATTRIBUTE_CLIENT_IP: &str = "clientIpAddress";

/// Body argument that overrides the method of a POST request.
const METHOD_ARGUMENT: &str = "__method";

/// Lazily initialized custom header names.
static X_HTTP_METHOD_OVERRIDE: std::sync::LazyLock<HeaderName> =
    std::sync::LazyLock::new(|| HeaderName::from_static("x-http-method-override"));
static X_HTTP_METHOD: std::sync::LazyLock<HeaderName> =
    std::sync::LazyLock::new(|| HeaderName::from_static("x-http-method"));

/// HTTP request as seen by handlers.
///
/// Query, body and upload data are unified once at construction.
///
/// Temp files stored by [`ServerRequest::from_http`] belong to the request
/// and are removed when it is dropped, unless [`ServerRequest::keep_uploads`]
/// was called after moving them elsewhere.
///
/// Note: Clone is intentionally not derived to prevent expensive copies.
#[derive(Debug)]
pub struct ServerRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    version: http::Version,
    body: Bytes,
    query_params: Arguments,
    parsed_body: Arguments,
    arguments: Arguments,
    uploaded_files: UploadedFiles,
    attributes: HashMap<String, String>,
    /// Temp files this request stored itself and has to remove.
    owned_uploads: Vec<String>,
}

impl ServerRequest {
    /// Create a request from already decoded sources.
    ///
    /// `uploads` is the raw upload description, see [`crate::arguments`].
    pub fn new(
        parts: http::request::Parts,
        body: Bytes,
        query: Arguments,
        parsed_body: Arguments,
        uploads: &Arguments,
        client_ip: Option<IpAddr>,
    ) -> Self {
        let method = resolve_method(parts.method, &parsed_body, &parts.headers);
        let unified = unify(query.clone(), parsed_body.clone(), uploads);

        let mut attributes = HashMap::new();
        if let Some(ip) = client_ip {
            attributes.insert(ATTRIBUTE_CLIENT_IP.to_string(), ip.to_string());
        }

        Self {
            method,
            uri: parts.uri,
            headers: parts.headers,
            version: parts.version,
            body,
            query_params: query,
            parsed_body,
            arguments: unified.arguments,
            uploaded_files: unified.uploaded_files,
            attributes,
            owned_uploads: Vec::new(),
        }
    }

    /// Decode an `http::Request` and build the request from it.
    ///
    /// Urlencoded, multipart and JSON bodies are decoded into body
    /// arguments; any other body is only kept raw. Multipart files are
    /// stored below the configured upload directory.
    pub async fn from_http(
        req: http::Request<Bytes>,
        client_ip: Option<IpAddr>,
        config: &UploadConfig,
    ) -> Result<Self> {
        let (parts, body) = req.into_parts();

        let query = parts
            .uri
            .query()
            .map(|q| nest_params(parse_query_string(q)))
            .unwrap_or_default();

        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let mut uploads = Arguments::new();
        let parsed_body = if body.is_empty() {
            Arguments::new()
        } else {
            match parse_media_type(&content_type).essence().as_str() {
                "application/x-www-form-urlencoded" => {
                    nest_params(parse_query_string(&String::from_utf8_lossy(&body)))
                }
                "multipart/form-data" => {
                    tokio::fs::create_dir_all(&config.tmp_dir).await?;
                    let (params, files) =
                        parse_multipart(&content_type, body.clone(), config).await?;
                    uploads = files;
                    nest_params(params)
                }
                "application/json" => {
                    let json: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
                        Error::InvalidRequest(format!("malformed JSON body: {}", e))
                    })?;
                    crate::types::arguments_from_json(json)
                }
                _ => Arguments::new(),
            }
        };

        tracing::debug!(
            method = %parts.method,
            path = parts.uri.path(),
            query_args = query.len(),
            body_args = parsed_body.len(),
            upload_fields = uploads.len(),
            "request decoded"
        );

        let mut request = Self::new(parts, body, query, parsed_body, &uploads, client_ip);
        request.owned_uploads = tmp_names(&request.uploaded_files)
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok(request)
    }

    /// Remove the temp files stored for this request.
    pub async fn cleanup_uploads(&mut self) {
        remove_files(&self.owned_uploads).await;
        self.owned_uploads.clear();
    }

    /// Leave the stored temp files in place, e.g. after moving them.
    #[inline]
    pub fn keep_uploads(&mut self) {
        self.owned_uploads.clear();
    }

    /// Get the effective HTTP method, after overrides.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the full URI.
    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Get the request path.
    #[inline]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Get the headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the HTTP version.
    #[inline]
    pub fn version(&self) -> http::Version {
        self.version
    }

    /// Get the raw request body.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get a header value by string name (case-insensitive).
    #[inline]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get Content-Type header.
    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Whether the request came in over HTTPS.
    #[inline]
    pub fn is_secure(&self) -> bool {
        self.uri.scheme() == Some(&Scheme::HTTPS)
    }

    /// Whether the method is expected to only retrieve data (GET, HEAD).
    #[inline]
    pub fn is_method_safe(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }

    /// Unified query, body and upload arguments.
    #[inline]
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Get a top-level argument.
    #[inline]
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    #[inline]
    pub fn has_argument(&self, name: &str) -> bool {
        self.arguments.contains_key(name)
    }

    /// Decoded query string arguments, before unification.
    #[inline]
    pub fn query_params(&self) -> &Arguments {
        &self.query_params
    }

    /// Decoded body arguments, before unification.
    #[inline]
    pub fn parsed_body(&self) -> &Arguments {
        &self.parsed_body
    }

    /// Uploaded files, shaped like the argument tree.
    #[inline]
    pub fn uploaded_files(&self) -> &UploadedFiles {
        &self.uploaded_files
    }

    /// Get a request attribute.
    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Client IP address as seen by the server. Can be spoofed behind proxies.
    #[inline]
    pub fn client_ip_address(&self) -> Option<&str> {
        self.attribute(ATTRIBUTE_CLIENT_IP)
    }

    /// Media types from the Accept header, most preferred first.
    ///
    /// Multiple Accept headers are joined before parsing. Without an Accept
    /// header any media type is accepted.
    pub fn accepted_media_types(&self) -> Vec<String> {
        let joined = self
            .headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");
        accepted_media_types(Some(&joined))
    }

    /// Best supported media type for this request's Accept header.
    ///
    /// Returns `None` if nothing matches.
    pub fn negotiated_media_type<S: AsRef<str>>(&self, supported: &[S], trim: bool) -> Option<String> {
        negotiate(&self.accepted_media_types(), supported, trim)
    }
}

impl Drop for ServerRequest {
    fn drop(&mut self) {
        for path in &self.owned_uploads {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path, error = %e, "failed to remove uploaded temp file");
                }
            }
        }
    }
}

/// Effective method: POST may be overridden by the `__method` body argument,
/// then the `X-HTTP-Method-Override` and `X-HTTP-Method` headers.
fn resolve_method(method: Method, body: &Arguments, headers: &HeaderMap) -> Method {
    if method != Method::POST {
        return method;
    }

    let candidate = body
        .get(METHOD_ARGUMENT)
        .and_then(Value::as_str)
        .or_else(|| headers.get(&*X_HTTP_METHOD_OVERRIDE).and_then(|v| v.to_str().ok()))
        .or_else(|| headers.get(&*X_HTTP_METHOD).and_then(|v| v.to_str().ok()));

    match candidate {
        Some(name) => Method::from_bytes(name.trim().to_uppercase().as_bytes()).unwrap_or_else(|_| {
            tracing::debug!(method = name, "ignoring invalid method override");
            method
        }),
        None => method,
    }
}
