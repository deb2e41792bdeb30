//! MIME type heuristics.
//!
//! Two concerns live here:
//! 1. Mimetype sniffing used to classify regular files when the response
//!    carries no explicit `unistorage_type` tag (older protocol revision).
//! 2. Content type detection for upload parts: `infer` magic bytes first,
//!    then `mime_guess` from the file name.

use crate::family::FileFamily;

/// Content type sent when nothing better can be detected.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// MIME types the service treats as documents.
pub const DOCUMENT_MIMETYPES: &[&str] = &[
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.oasis.opendocument.text",
    "application/pdf",
    "application/vnd.pdf",
    "application/x-pdf",
    "application/rtf",
    "application/x-rtf",
    "text/richtext",
    "text/plain",
    "text/html",
];

/// Returns true for `image/*` types.
pub fn is_image(mimetype: &str) -> bool {
    mimetype.starts_with("image/")
}

/// Returns true for `video/*` types and `application/ogg`.
pub fn is_video(mimetype: &str) -> bool {
    mimetype.starts_with("video/") || mimetype == "application/ogg"
}

/// Returns true for the fixed document allow-list.
pub fn is_document(mimetype: &str) -> bool {
    DOCUMENT_MIMETYPES.contains(&mimetype)
}

/// Guess the family of a regular file from its mimetype.
///
/// Audio and unknown files cannot be recognized this way; `None` means the
/// mimetype matched no family.
pub fn family_from_mimetype(mimetype: &str) -> Option<FileFamily> {
    if is_image(mimetype) {
        Some(FileFamily::Image)
    } else if is_video(mimetype) {
        Some(FileFamily::Video)
    } else if is_document(mimetype) {
        Some(FileFamily::Document)
    } else {
        None
    }
}

/// Detect the MIME type from raw bytes using magic byte signatures.
pub fn detect_from_bytes(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|kind| kind.mime_type().to_string())
}

/// Detect the MIME type from a filename using the `mime_guess` crate.
pub fn detect_from_filename(filename: &str) -> Option<String> {
    mime_guess::from_path(filename).first().map(|m| m.to_string())
}

/// Pick the content type for an upload part.
pub fn upload_content_type(bytes: &[u8], filename: &str) -> String {
    detect_from_bytes(bytes)
        .or_else(|| detect_from_filename(filename))
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}
