//! Normalized upload records.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::types::Value;

/// Upload error codes as reported by the platform for each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UploadError {
    /// The file was uploaded successfully.
    Ok,
    /// The file exceeds the server-side size limit.
    IniSize,
    /// The file exceeds the size limit declared by the form.
    FormSize,
    /// The file was only partially uploaded.
    Partial,
    /// No file was selected for this input.
    NoFile,
    /// No temporary directory was available.
    NoTmpDir,
    /// The file could not be written to disk.
    CantWrite,
    /// An extension stopped the upload.
    Extension,
    /// Any code not listed above.
    Other(i64),
}

impl UploadError {
    /// Numeric value of [`UploadError::NoFile`].
    pub const NO_FILE_CODE: i64 = 4;

    pub fn from_code(code: i64) -> Self {
        match code {
            0 => UploadError::Ok,
            1 => UploadError::IniSize,
            2 => UploadError::FormSize,
            3 => UploadError::Partial,
            4 => UploadError::NoFile,
            6 => UploadError::NoTmpDir,
            7 => UploadError::CantWrite,
            8 => UploadError::Extension,
            other => UploadError::Other(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            UploadError::Ok => 0,
            UploadError::IniSize => 1,
            UploadError::FormSize => 2,
            UploadError::Partial => 3,
            UploadError::NoFile => 4,
            UploadError::NoTmpDir => 6,
            UploadError::CantWrite => 7,
            UploadError::Extension => 8,
            UploadError::Other(code) => *code,
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Ok => write!(f, "no error"),
            UploadError::IniSize => write!(f, "file exceeds the maximum upload size"),
            UploadError::FormSize => write!(f, "file exceeds the form size limit"),
            UploadError::Partial => write!(f, "file was only partially uploaded"),
            UploadError::NoFile => write!(f, "no file was uploaded"),
            UploadError::NoTmpDir => write!(f, "missing temporary directory"),
            UploadError::CantWrite => write!(f, "failed to write file to disk"),
            UploadError::Extension => write!(f, "upload stopped by extension"),
            UploadError::Other(code) => write!(f, "unknown upload error {}", code),
        }
    }
}

// =============================================================================
// Uploaded File
// =============================================================================

/// One uploaded file, created once during argument unification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedFile {
    tmp_name: String,
    size: u64,
    error: UploadError,
    client_filename: String,
    client_media_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    originally_submitted_resource: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collection_name: Option<String>,
}

impl UploadedFile {
    pub fn new(
        tmp_name: impl Into<String>,
        size: u64,
        error: UploadError,
        client_filename: impl Into<String>,
        client_media_type: impl Into<String>,
    ) -> Self {
        Self {
            tmp_name: tmp_name.into(),
            size,
            error,
            client_filename: client_filename.into(),
            client_media_type: client_media_type.into(),
            originally_submitted_resource: None,
            collection_name: None,
        }
    }

    /// Attach the previously submitted resource reference.
    pub fn with_originally_submitted_resource(mut self, resource: Value) -> Self {
        self.originally_submitted_resource = Some(resource);
        self
    }

    /// Attach the target collection name.
    pub fn with_collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = Some(name.into());
        self
    }

    /// Temporary path the file was stored at.
    ///
    /// The file itself is owned by whoever decoded the upload.
    #[inline]
    pub fn tmp_name(&self) -> &str {
        &self.tmp_name
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn error(&self) -> UploadError {
        self.error
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.error == UploadError::Ok
    }

    /// Filename as sent by the client. Not to be trusted.
    #[inline]
    pub fn client_filename(&self) -> &str {
        &self.client_filename
    }

    /// Media type as declared by the client. Not to be trusted.
    #[inline]
    pub fn client_media_type(&self) -> &str {
        &self.client_media_type
    }

    #[inline]
    pub fn originally_submitted_resource(&self) -> Option<&Value> {
        self.originally_submitted_resource.as_ref()
    }

    #[inline]
    pub fn collection_name(&self) -> Option<&str> {
        self.collection_name.as_deref()
    }
}

/// Tree of uploaded files, mirroring the shape of the argument tree.
pub type UploadedFiles = IndexMap<String, UploadedFileNode>;

/// Node of an [`UploadedFiles`] tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UploadedFileNode {
    File(UploadedFile),
    Nested(UploadedFiles),
}

impl UploadedFileNode {
    #[inline]
    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            UploadedFileNode::File(f) => Some(f),
            UploadedFileNode::Nested(_) => None,
        }
    }

    #[inline]
    pub fn as_nested(&self) -> Option<&UploadedFiles> {
        match self {
            UploadedFileNode::Nested(n) => Some(n),
            UploadedFileNode::File(_) => None,
        }
    }
}

/// Look up the uploaded file at `path`.
pub fn file_at<'a, S: AsRef<str>>(files: &'a UploadedFiles, path: &[S]) -> Option<&'a UploadedFile> {
    let (first, rest) = path.split_first()?;
    let mut node = files.get(first.as_ref())?;
    for segment in rest {
        node = node.as_nested()?.get(segment.as_ref())?;
    }
    node.as_file()
}

/// Count all files in the tree.
pub fn count_files(files: &UploadedFiles) -> usize {
    files
        .values()
        .map(|node| match node {
            UploadedFileNode::File(_) => 1,
            UploadedFileNode::Nested(nested) => count_files(nested),
        })
        .sum()
}

/// Temp file paths of all files in the tree, skipping empty ones.
pub fn tmp_names(files: &UploadedFiles) -> Vec<&str> {
    let mut names = Vec::new();
    for node in files.values() {
        match node {
            UploadedFileNode::File(file) if !file.tmp_name().is_empty() => {
                names.push(file.tmp_name())
            }
            UploadedFileNode::File(_) => {}
            UploadedFileNode::Nested(nested) => names.extend(tmp_names(nested)),
        }
    }
    names
}
