//! Attachment encoding: converted file → base64 payload.
//!
//! SendGrid's v3 API accepts attachments as base64 text embedded in the
//! JSON request body, so the whole file is read into memory and encoded in
//! one pass. Kindle-bound books are a few megabytes; buffering them whole
//! is simpler and safer than streaming into a JSON string.

use crate::error::HookError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// A single base64-encoded email attachment, shaped for `mail/send`.
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    /// Base64 of the file's full binary content.
    pub content: String,
    /// Filename shown to the recipient; must match the converted name so
    /// the Kindle ingests it under the book's title.
    pub filename: String,
    /// Declared MIME type, derived from the target extension.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Always `attachment`; `inline` would hide the file from Kindle
    /// ingestion.
    pub disposition: String,
}

/// MIME type for a target ebook extension.
///
/// Only the formats the hook can actually produce get a specific type;
/// everything else declares the generic byte-stream type, which Amazon's
/// ingestion accepts.
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        "mobi" => "application/x-mobipocket-ebook",
        "azw3" => "application/vnd.amazon.ebook",
        "epub" => "application/epub+zip",
        _ => "application/octet-stream",
    }
}

/// Read `path` and wrap it as an [`Attachment`] named `filename`.
pub async fn load_attachment(
    path: impl AsRef<Path>,
    filename: &str,
) -> Result<Attachment, HookError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| HookError::AttachmentReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    let content = STANDARD.encode(&bytes);
    debug!(
        filename,
        raw_bytes = bytes.len(),
        encoded_bytes = content.len(),
        "encoded attachment"
    );

    Ok(Attachment {
        content,
        filename: filename.to_string(),
        mime_type: mime_for_extension(crate::paths::extension(filename)).to_string(),
        disposition: "attachment".to_string(),
    })
}
