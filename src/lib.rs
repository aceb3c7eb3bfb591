//! flow_request - server-side HTTP request decoding.
//!
//! This crate turns the inputs of an HTTP request into the structures a
//! handler works with.
//!
//! # Features
//!
//! - **Argument unification**: query, body and uploaded files merged into one
//!   ordered argument tree, body over query, uploads over both
//! - **Upload untangling**: field-indexed upload descriptions (`photo[main]`)
//!   normalized into per-file records
//! - **Content negotiation**: `Accept` header parsing with specificity tiers
//!   and quality values, matched against supported media types
//! - **Input decoding**: query strings, urlencoded, JSON and multipart bodies
//!
//! # Example
//!
//! ```rust,ignore
//! use flow_request::arguments::unify;
//! use flow_request::negotiation::{accepted_media_types, negotiate};
//!
//! let unified = unify(query, body, &raw_uploads);
//! let accepted = accepted_media_types(Some("text/html,*/*;q=0.8"));
//! let format = negotiate(&accepted, &["application/json", "text/html"], true);
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod arguments;
pub mod config;
pub mod core;
pub mod input;
pub mod logging;
pub mod negotiation;
pub mod types;

// Re-exports for convenience
pub use arguments::{unify, Unified, UploadError, UploadedFile, UploadedFileNode, UploadedFiles};
pub use config::Config;
pub use crate::core::{Error, Result, ServerRequest};
pub use negotiation::{accepted_media_types, negotiate, parse_quality_values};
pub use types::{Arguments, Value};
