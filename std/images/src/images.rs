//! Image resolution and directory introspection.
//!
//! These functions take a directory snapshot and do the filesystem work for
//! the tools; they know nothing about the protocol layer.

use crate::{
    dirs::describe,
    error::ImageError,
    format::{extension_of, is_image_name, is_supported, mime_type, supported_list},
    validate::{is_contained, join_within},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Encoded payloads above this size (in KB) risk the 1 MB transport limit.
pub const LARGE_PAYLOAD_KB: u64 = 900;

/// A resolved image ready to be sent as an image content block.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// Absolute path the bytes were read from.
    pub path: PathBuf,
    /// Base64-encoded file contents.
    pub data: String,
    /// MIME type derived from the file extension.
    pub mime_type: &'static str,
}

/// Size in kilobytes, rounded half up.
pub fn kilobytes(bytes: u64) -> u64 {
    (bytes + 512) / 1024
}

/// Find `filename` in the first directory that has it, and encode it.
pub async fn fetch_image(dirs: &[PathBuf], filename: &str) -> Result<EncodedImage, ImageError> {
    if filename.trim().is_empty() {
        return Err(ImageError::InvalidArgument(
            "filename parameter is required and must be a non-empty string".into(),
        ));
    }
    if filename.contains('\0') {
        return Err(ImageError::InvalidArgument(
            "filename contains a null byte".into(),
        ));
    }

    let ext = extension_of(filename);
    if !is_supported(&ext) {
        return Err(ImageError::UnsupportedFormat {
            ext,
            supported: supported_list(),
        });
    }

    if dirs.is_empty() {
        return Err(ImageError::NotConfigured);
    }

    let path = locate(dirs, filename).await?;

    let contained = is_contained(&path, dirs).map_err(|e| ImageError::from_io(e, &path))?;
    if !contained {
        return Err(ImageError::AccessDenied(filename.to_string()));
    }

    let meta = tokio::fs::metadata(&path)
        .await
        .map_err(|e| ImageError::from_io(e, &path))?;
    if !meta.is_file() {
        return Err(ImageError::NotAFile(filename.to_string()));
    }

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ImageError::from_io(e, &path))?;
    let data = BASE64.encode(&bytes);

    let size_kb = kilobytes(data.len() as u64);
    tracing::debug!(path = %path.display(), size_kb, "image encoded");
    if size_kb > LARGE_PAYLOAD_KB {
        tracing::warn!(
            path = %path.display(),
            size_kb,
            "large image may exceed the 1MB transport limit after JSON encoding"
        );
    }

    Ok(EncodedImage {
        path,
        data,
        mime_type: mime_type(&ext),
    })
}

/// First existing candidate across `dirs`, in order.
async fn locate(dirs: &[PathBuf], filename: &str) -> Result<PathBuf, ImageError> {
    for dir in dirs {
        let candidate = join_within(dir, filename, dirs)
            .ok_or_else(|| ImageError::AccessDenied(filename.to_string()))?;
        tracing::debug!(candidate = %candidate.display(), "checking");
        if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            tracing::debug!(dir = %dir.display(), "found");
            return Ok(candidate);
        }
    }
    Err(ImageError::NotFound(format!(
        "Image '{filename}' not found.\n\nSearched directories:\n{}\n\nUse list_images to see available files.",
        describe(dirs)
    )))
}

/// Names of supported-format entries directly inside `dir`, sorted.
async fn image_names(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_image_name(&name) {
            continue;
        }
        if entry.file_type().await.is_ok_and(|ft| ft.is_dir()) {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

async fn dir_exists(dir: &Path) -> bool {
    tokio::fs::try_exists(dir).await.unwrap_or(false)
}

/// Status report for every configured directory.
///
/// Never fails: enumeration errors are reported inline for the directory
/// they belong to.
pub async fn list_directories(dirs: &[PathBuf]) -> String {
    if dirs.is_empty() {
        return "Configured directories (0):\n\nNo directories configured. \
                Pass --roots or --media-dir, or enable roots in your MCP client."
            .into();
    }

    let mut output = format!("Configured directories ({}):\n\n", dirs.len());
    for (i, dir) in dirs.iter().enumerate() {
        let exists = dir_exists(dir).await;
        let status = if exists { "✓ exists" } else { "✗ NOT FOUND" };
        output.push_str(&format!("[{i}] {}\n    Status: {status}\n", dir.display()));
        if exists {
            match image_names(dir).await {
                Ok(names) => output.push_str(&format!("    Images: {} files\n", names.len())),
                Err(e) => output.push_str(&format!("    Error reading: {e}\n")),
            }
        }
        output.push('\n');
    }
    output
}

/// Directory index from a JSON argument. Whole numbers are accepted in
/// either integer or float form; anything else yields `None`.
fn parse_index(value: &Value) -> Option<usize> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(index) = number.as_u64() {
        return usize::try_from(index).ok();
    }
    let index = number.as_f64()?;
    (index >= 0.0 && index.fract() == 0.0 && index <= u32::MAX as f64).then_some(index as usize)
}

/// List the images in the directory at `index` (default 0).
pub async fn list_images(dirs: &[PathBuf], index: Option<&Value>) -> Result<String, ImageError> {
    if dirs.is_empty() {
        return Err(ImageError::NotConfigured);
    }

    let dir = match index {
        None | Some(Value::Null) => dirs.first(),
        Some(value) => parse_index(value).and_then(|i| dirs.get(i)),
    };
    let dir = dir.ok_or_else(|| {
        ImageError::InvalidArgument(format!(
            "Invalid directory index {}. Valid range: 0-{}",
            index.unwrap_or(&Value::Null),
            dirs.len() - 1
        ))
    })?;

    if !dir_exists(dir).await {
        return Err(ImageError::NotFound(format!(
            "Directory does not exist: {}",
            dir.display()
        )));
    }

    let names = image_names(dir)
        .await
        .map_err(|e| ImageError::from_io(e, dir))?;
    if names.is_empty() {
        return Ok(format!(
            "No images found in: {}\n\nSupported formats: {}",
            dir.display(),
            supported_list()
        ));
    }

    let mut output = format!("Images in {}:\n\n", dir.display());
    for name in &names {
        match tokio::fs::metadata(dir.join(name)).await {
            Ok(meta) => output.push_str(&format!("  {name} ({} KB)\n", kilobytes(meta.len()))),
            Err(_) => output.push_str(&format!("  {name}\n")),
        }
    }
    output.push_str(&format!("\nTotal: {} images", names.len()));
    Ok(output)
}
