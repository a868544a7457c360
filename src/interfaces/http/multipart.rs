use crate::config::DecodeLimits;
use crate::domain::attachment::AttachmentRef;
use crate::domain::form::{DecodedPayload, FormFields};
use crate::error::{RequestError, Result};
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;

/// Reads every part of `multipart` into text fields and staged uploads.
///
/// A part with a filename is an upload and is streamed into a temporary file;
/// a part with an empty filename (an untouched file input) is skipped. Any
/// other part is a text field, capped at `limits.max_field_bytes`.
pub async fn decode_multipart(mut multipart: Multipart, limits: DecodeLimits) -> Result<DecodedPayload> {
    let mut fields = FormFields::new();
    let mut files = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(filename) if filename.trim().is_empty() => continue,
            Some(filename) => {
                if files.len() >= limits.max_files {
                    return Err(RequestError::DecodeError(format!(
                        "too many files (at most {})",
                        limits.max_files
                    )));
                }
                let mut upload = AttachmentRef::create(name, filename).await?;
                while let Some(chunk) = field.chunk().await.map_err(malformed)? {
                    upload.append(&chunk).await?;
                }
                tracing::debug!(field = %upload.field, filename = %upload.filename, size = upload.size, "Upload staged");
                files.push(upload);
            }
            None => {
                let mut value = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(malformed)? {
                    if value.len() + chunk.len() > limits.max_field_bytes {
                        return Err(RequestError::DecodeError(format!(
                            "field '{name}' exceeds {} bytes",
                            limits.max_field_bytes
                        )));
                    }
                    value.extend_from_slice(&chunk);
                }
                let value = String::from_utf8(value)
                    .map_err(|_| RequestError::DecodeError(format!("field '{name}' is not valid UTF-8")))?;
                fields.append(name, value);
            }
        }
    }

    tracing::debug!(fields = fields.len(), files = files.len(), "Multipart body decoded");
    Ok(DecodedPayload::new(fields, files))
}

fn malformed(error: MultipartError) -> RequestError {
    RequestError::DecodeError(error.body_text())
}
