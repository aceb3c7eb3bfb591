//! Argument unification.
//!
//! Query arguments, body arguments and uploaded files are merged into one
//! argument tree. Precedence, lowest to highest:
//!
//! 1. query
//! 2. body
//! 3. uploads
//!
//! # Example
//!
//! ```rust,ignore
//! use flow_request::arguments::unify;
//!
//! let unified = unify(query, body, &raw_uploads);
//! let avatar = unified.uploaded_files.get("avatar");
//! ```

mod merge;
mod untangle;
mod uploaded_file;

use tracing::debug;

use crate::types::Arguments;

pub use merge::merge_recursive;
pub use untangle::{calculate_field_paths, coerce_int, create_uploaded_files, untangle_files, UPLOAD_KEYS};
pub use uploaded_file::{
    count_files, file_at, tmp_names, UploadError, UploadedFile, UploadedFileNode, UploadedFiles,
};

/// Result of [`unify`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Unified {
    /// Merged argument tree.
    pub arguments: Arguments,
    /// Upload records, shaped like the argument tree.
    pub uploaded_files: UploadedFiles,
}

/// Merge query, body and raw upload data into a unified argument tree.
///
/// Never fails: malformed upload entries are dropped.
pub fn unify(query: Arguments, body: Arguments, uploads: &Arguments) -> Unified {
    let arguments = merge_recursive(query, body);
    let files = untangle_files(uploads);
    let arguments = merge_recursive(arguments, files.clone());
    let uploaded_files = create_uploaded_files(&files, Some(&arguments));

    debug!(
        arguments = arguments.len(),
        uploaded_files = count_files(&uploaded_files),
        "unify: completed"
    );

    Unified {
        arguments,
        uploaded_files,
    }
}
