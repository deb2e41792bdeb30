//! Unistorage client library for Rust.
//!
//! An async client for the Unistorage file-processing API: upload files,
//! apply actions and templates to them, pack them into archives, and read
//! back typed file records.
//!
//! # Overview
//!
//! Every file response is classified into a [`FileRecord`]:
//!
//! - **Pending**: the service is still processing (`"wait"`)
//! - **Temporary**: a result is reachable at a URL (`"just_uri"`)
//! - **Regular**: a stored file (`"ok"`) with a [`FileKind`] of image, video,
//!   audio, document or unknown
//!
//! Records are snapshots. To see a pending file become ready, fetch it again.
//!
//! # Examples
//!
//! ```
//! # use unistorage::classify;
//! # fn example() -> unistorage::error::Result<()> {
//! let body = serde_json::json!({"status": "wait", "ttl": 5});
//! let record = classify("/525cde8bf7c07954bec2552f/", &body)?;
//! assert!(record.is_pending());
//! assert_eq!(record.ttl(), 5);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod action;
pub mod classify;
pub mod client;
pub mod config;
pub mod detection;
pub mod error;
pub mod family;
pub mod record;

// Re-export primary types at the crate root for convenience.
pub use crate::action::Action;
pub use crate::classify::{classify, classify_archive};
pub use crate::client::{Client, UploadOptions};
pub use crate::config::ClientConfig;
pub use crate::error::UnistorageError;
pub use crate::family::{FileFamily, TemplateFamily};
pub use crate::record::{
    ArchiveRecord, AudioFile, Corner, DocumentFile, FileKind, FileRecord, ImageFile, ImageInfo,
    PendingFile, RegularFile, Resource, Template, TemporaryFile, VideoFile, VideoInfo,
    WatermarkPlacement, Watermarkable,
};

/// The crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
