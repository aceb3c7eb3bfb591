//! Core types for server-side request handling.
//!
//! - [`ServerRequest`] - HTTP request with unified arguments and uploads
//! - [`Error`] - Core error types
//!
//! # Example
//!
//! ```rust,ignore
//! use flow_request::core::ServerRequest;
//!
//! async fn handle(req: http::Request<Bytes>, config: &UploadConfig) -> Result<()> {
//!     let req = ServerRequest::from_http(req, None, config).await?;
//!     let format = req.negotiated_media_type(&["application/json", "text/html"], true);
//!     let avatar = req.uploaded_files().get("avatar");
//!     // ...
//! }
//! ```

mod error;
mod request;

pub use error::{Error, Result};
pub use request::{ServerRequest, ATTRIBUTE_CLIENT_IP};
