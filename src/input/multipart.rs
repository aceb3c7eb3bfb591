//! Multipart form data parsing.
//!
//! Produces the form fields plus the raw upload description, with one
//! record per top-level field name:
//!
//! - `avatar` yields `avatar => {tmp_name, size, error, name, type}`
//! - `photo[main]` yields `photo => {tmp_name: {main: ..}, size: {main: ..}, ...}`

use std::path::Path;

use bytes::Bytes;
use futures_util::stream;
use multer::Multipart;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::parser::{next_index, split_field_name};
use crate::arguments::UploadError;
use crate::config::UploadConfig;
use crate::core::Result;
use crate::types::{get_path, set_path, Arguments, ParamList, Value};

/// One file part, before it is placed in the upload description.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FilePart {
    tmp_name: String,
    size: u64,
    error: UploadError,
    name: String,
    media_type: String,
}

/// Parse multipart form data.
///
/// Returns a tuple of (form fields, raw upload description). If the body
/// turns out to be malformed, files already stored for it are removed
/// before the error is returned.
pub async fn parse_multipart(
    content_type: &str,
    body: Bytes,
    config: &UploadConfig,
) -> Result<(ParamList, Arguments)> {
    tracing::debug!(
        content_type = content_type,
        body_len = body.len(),
        "parse_multipart: starting"
    );

    let boundary = multer::parse_boundary(content_type)?;
    let mut multipart = Multipart::new(
        stream::once(async { Ok::<_, std::io::Error>(body) }),
        boundary,
    );

    let mut params = ParamList::new();
    let mut uploads = Arguments::new();
    let mut stored = Vec::new();

    let result = read_parts(&mut multipart, config, &mut params, &mut uploads, &mut stored).await;
    if let Err(e) = result {
        tracing::debug!(
            error = %e,
            stored_files = stored.len(),
            "parse_multipart: failed, removing stored files"
        );
        remove_files(&stored).await;
        return Err(e);
    }

    tracing::debug!(
        params_count = params.len(),
        upload_fields = uploads.len(),
        "parse_multipart: completed"
    );

    Ok((params, uploads))
}

/// Read every part, recording the path of each stored file in `stored`.
async fn read_parts(
    multipart: &mut Multipart<'_>,
    config: &UploadConfig,
    params: &mut ParamList,
    uploads: &mut Arguments,
    stored: &mut Vec<String>,
) -> Result<()> {
    while let Some(mut field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(|s| s.to_string());

        let Some(original_name) = file_name else {
            let value = field.text().await?;
            tracing::debug!(
                field_name = %field_name,
                value_len = value.len(),
                "parse_multipart: parsed form field"
            );
            params.push((field_name, value));
            continue;
        };

        let part = if original_name.is_empty() {
            FilePart {
                tmp_name: String::new(),
                size: 0,
                error: UploadError::NoFile,
                name: String::new(),
                media_type: String::new(),
            }
        } else {
            let media_type = field
                .content_type()
                .map(|m| m.to_string())
                .unwrap_or_default();

            let mut data = Vec::new();
            let mut size = 0u64;
            while let Some(chunk) = field.chunk().await? {
                size += chunk.len() as u64;
                if size <= config.max_file_size {
                    data.extend_from_slice(&chunk);
                }
            }

            let (tmp_name, error) = if size > config.max_file_size {
                (String::new(), UploadError::IniSize)
            } else {
                store_file(&config.tmp_dir, &data).await
            };
            if !tmp_name.is_empty() {
                stored.push(tmp_name.clone());
            }

            FilePart {
                tmp_name,
                size,
                error,
                name: original_name,
                media_type,
            }
        };

        tracing::debug!(
            field_name = %field_name,
            file_name = %part.name,
            tmp_name = %part.tmp_name,
            size = part.size,
            error = part.error.code(),
            "parse_multipart: parsed uploaded file"
        );

        insert_upload(uploads, &field_name, part);
    }

    Ok(())
}

/// Remove temp files, ignoring the ones already gone.
pub async fn remove_files<P: AsRef<Path>>(paths: &[P]) {
    for path in paths {
        let _ = tokio::fs::remove_file(path).await;
    }
}

/// Write file contents to a fresh temp file.
///
/// Write failures are reported through the upload error code.
async fn store_file(dir: &Path, data: &[u8]) -> (String, UploadError) {
    let path = dir.join(format!("upload{}", Uuid::new_v4().simple()));

    match write_file(&path, data).await {
        Ok(()) => (path.to_string_lossy().into_owned(), UploadError::Ok),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "parse_multipart: failed to store uploaded file"
            );
            let error = if dir.is_dir() {
                UploadError::CantWrite
            } else {
                UploadError::NoTmpDir
            };
            (String::new(), error)
        }
    }
}

async fn write_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(data).await?;
    file.flush().await
}

/// Place a file part in the upload description under `field_name`.
fn insert_upload(uploads: &mut Arguments, field_name: &str, part: FilePart) {
    let Some(segments) = split_field_name(field_name) else {
        return;
    };
    let Some((Some(base), rest)) = segments.split_first() else {
        return;
    };

    let values = [
        ("tmp_name", part.tmp_name),
        ("size", part.size.to_string()),
        ("error", part.error.code().to_string()),
        ("name", part.name),
        ("type", part.media_type),
    ];

    if rest.is_empty() {
        let record: Arguments = values
            .into_iter()
            .map(|(key, value)| (key.to_string(), Value::Scalar(value)))
            .collect();
        uploads.insert(base.clone(), Value::Map(record));
        return;
    }

    // Resolve `[]` against the error tree; the other keys share its shape.
    let mut error_path = vec![base.clone(), "error".to_string()];
    for segment in rest {
        let key = match segment {
            Some(key) => key.clone(),
            None => get_path(uploads, &error_path)
                .and_then(Value::as_map)
                .map_or_else(|| "0".to_string(), next_index),
        };
        error_path.push(key);
    }
    let sub_path = &error_path[2..];

    // A flat record under the same name is replaced by the nested shape.
    if uploads
        .get(base)
        .and_then(|info| info.as_map())
        .is_some_and(|info| info.get("error").is_some_and(|e| !e.is_map()))
    {
        uploads.shift_remove(base);
    }

    for (key, value) in values {
        let mut path = vec![base.clone(), key.to_string()];
        path.extend(sub_path.iter().cloned());
        set_path(uploads, &path, Value::Scalar(value));
    }
}
