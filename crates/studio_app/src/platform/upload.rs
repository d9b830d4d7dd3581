use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use studio_core::Attachment;
use studio_engine::ImageInput;

/// Reads an uploaded file into an attachment.
pub(crate) fn read_attachment(path: &Path) -> Result<Attachment> {
    let bytes = fs::read(path).with_context(|| format!("reading upload {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let preview = fs::canonicalize(path)
        .map(|full| format!("file://{}", full.display()))
        .unwrap_or_else(|_| path.display().to_string());

    Ok(Attachment {
        name,
        mime_type: mime_type_for(path).to_string(),
        bytes,
        preview,
    })
}

pub(crate) fn to_image_input(attachment: Attachment) -> ImageInput {
    ImageInput {
        bytes: attachment.bytes,
        mime_type: attachment.mime_type,
    }
}

fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}
