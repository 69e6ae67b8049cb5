//! Supported image formats and their MIME types.

use std::path::Path;

/// Recognized image extensions, lowercase and dot-prefixed.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp"];

/// Fallback MIME type when an extension is missing from the table.
const DEFAULT_MIME: &str = "image/png";

/// Lowercase, dot-prefixed extension of the final path component.
///
/// Returns an empty string when the name has no extension, so callers can
/// put it straight into an error message.
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Whether `ext` (as returned by [`extension_of`]) is a supported format.
pub fn is_supported(ext: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&ext)
}

/// Whether a file name carries a supported image extension.
pub fn is_image_name(name: &str) -> bool {
    is_supported(&extension_of(name))
}

/// MIME type for a supported extension.
pub fn mime_type(ext: &str) -> &'static str {
    match ext {
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".gif" => "image/gif",
        ".webp" => "image/webp",
        _ => DEFAULT_MIME,
    }
}

/// Comma-separated list of supported extensions for messages.
pub fn supported_list() -> String {
    SUPPORTED_EXTENSIONS.join(", ")
}
