//! File records returned by the API.
//!
//! Records are immutable snapshots of one response. Observing a state change
//! (for example a pending file becoming ready) means fetching the resource
//! again.

use std::fmt;

use serde::Serialize;

use crate::action::Action;
use crate::family::FileFamily;

/// Anything that is identified by a resource reference on the server.
pub trait Resource {
    /// The resource reference (a path relative to the API root).
    fn resource_uri(&self) -> &str;
}

impl Resource for str {
    fn resource_uri(&self) -> &str {
        self
    }
}

impl Resource for String {
    fn resource_uri(&self) -> &str {
        self
    }
}

impl<R: Resource + ?Sized> Resource for &R {
    fn resource_uri(&self) -> &str {
        (**self).resource_uri()
    }
}

/// A classified file response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileRecord {
    /// Processing is not finished yet (`"wait"`).
    #[serde(rename = "wait")]
    Pending(PendingFile),
    /// A result exists at a URL but is not a permanent resource (`"just_uri"`).
    #[serde(rename = "just_uri")]
    Temporary(TemporaryFile),
    /// A stored file (`"ok"`).
    #[serde(rename = "ok")]
    Regular(RegularFile),
}

impl FileRecord {
    /// Seconds the service allows this representation to be cached.
    pub fn ttl(&self) -> u64 {
        match self {
            FileRecord::Pending(f) => f.ttl,
            FileRecord::Temporary(f) => f.ttl,
            FileRecord::Regular(f) => f.ttl,
        }
    }

    /// The wire status this record was built from.
    pub fn status(&self) -> &'static str {
        match self {
            FileRecord::Pending(_) => "wait",
            FileRecord::Temporary(_) => "just_uri",
            FileRecord::Regular(_) => "ok",
        }
    }

    /// The content URL, once one is known.
    pub fn url(&self) -> Option<&str> {
        match self {
            FileRecord::Pending(_) => None,
            FileRecord::Temporary(f) => Some(&f.url),
            FileRecord::Regular(f) => Some(&f.url),
        }
    }

    /// True while the service is still processing.
    pub fn is_pending(&self) -> bool {
        matches!(self, FileRecord::Pending(_))
    }

    /// Returns the regular file, if this record is one.
    pub fn as_regular(&self) -> Option<&RegularFile> {
        match self {
            FileRecord::Regular(f) => Some(f),
            _ => None,
        }
    }

    /// Consumes the record, returning the regular file if this record is one.
    pub fn into_regular(self) -> Option<RegularFile> {
        match self {
            FileRecord::Regular(f) => Some(f),
            _ => None,
        }
    }
}

impl Resource for FileRecord {
    fn resource_uri(&self) -> &str {
        match self {
            FileRecord::Pending(f) => &f.resource_uri,
            FileRecord::Temporary(f) => &f.resource_uri,
            FileRecord::Regular(f) => &f.resource_uri,
        }
    }
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_uri())
    }
}

/// A file the service is still working on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingFile {
    pub(crate) resource_uri: String,
    pub(crate) ttl: u64,
}

impl PendingFile {
    /// Seconds until the status is worth fetching again.
    pub fn ttl(&self) -> u64 {
        self.ttl
    }
}

/// A result that is only reachable through a URL for now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemporaryFile {
    pub(crate) resource_uri: String,
    pub(crate) ttl: u64,
    pub(crate) url: String,
}

impl TemporaryFile {
    /// Seconds the URL stays valid.
    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    /// URL of the binary content.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// A stored file with its family-specific details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegularFile {
    pub(crate) resource_uri: String,
    pub(crate) ttl: u64,
    pub(crate) url: String,
    pub(crate) mimetype: String,
    pub(crate) size: u64,
    pub(crate) name: String,
    pub(crate) kind: FileKind,
}

impl RegularFile {
    /// Cache lifetime in seconds.
    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    /// URL of the binary content.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// MIME type.
    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// File name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Family-specific details.
    pub fn kind(&self) -> &FileKind {
        &self.kind
    }

    /// Family this file was classified into.
    pub fn family(&self) -> FileFamily {
        self.kind.family()
    }

    /// View this file as an image, if it is one.
    pub fn as_image(&self) -> Option<ImageFile<'_>> {
        match &self.kind {
            FileKind::Image(info) => Some(ImageFile { file: self, info }),
            _ => None,
        }
    }

    /// View this file as a video, if it is one.
    pub fn as_video(&self) -> Option<VideoFile<'_>> {
        match &self.kind {
            FileKind::Video(info) => Some(VideoFile { file: self, info }),
            _ => None,
        }
    }

    /// View this file as audio, if it is audio.
    pub fn as_audio(&self) -> Option<AudioFile<'_>> {
        matches!(self.kind, FileKind::Audio).then_some(AudioFile { file: self })
    }

    /// View this file as a document, if it is one.
    pub fn as_document(&self) -> Option<DocumentFile<'_>> {
        matches!(self.kind, FileKind::Document).then_some(DocumentFile { file: self })
    }
}

impl Resource for RegularFile {
    fn resource_uri(&self) -> &str {
        &self.resource_uri
    }
}

impl Resource for PendingFile {
    fn resource_uri(&self) -> &str {
        &self.resource_uri
    }
}

impl Resource for TemporaryFile {
    fn resource_uri(&self) -> &str {
        &self.resource_uri
    }
}

/// Family-specific data of a regular file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "unistorage_type", rename_all = "lowercase")]
pub enum FileKind {
    Image(ImageInfo),
    Video(VideoInfo),
    Audio,
    #[serde(rename = "doc")]
    Document,
    Unknown,
}

impl FileKind {
    /// The family tag matching this variant.
    pub fn family(&self) -> FileFamily {
        match self {
            FileKind::Image(_) => FileFamily::Image,
            FileKind::Video(_) => FileFamily::Video,
            FileKind::Audio => FileFamily::Audio,
            FileKind::Document => FileFamily::Document,
            FileKind::Unknown => FileFamily::Unknown,
        }
    }
}

/// Image dimensions and EXIF orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<u8>,
}

/// Video stream dimensions and codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub codec: String,
}

/// A reusable server-side list of actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    resource_uri: String,
}

impl Template {
    /// Refer to an existing template by its resource URI.
    pub fn new(resource_uri: impl Into<String>) -> Self {
        Self {
            resource_uri: resource_uri.into(),
        }
    }
}

impl Resource for Template {
    fn resource_uri(&self) -> &str {
        &self.resource_uri
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource_uri)
    }
}

/// A ZIP archive built from several files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveRecord {
    pub(crate) resource_uri: String,
    pub(crate) ttl: u64,
    pub(crate) url: String,
}

impl ArchiveRecord {
    /// Seconds the archive stays available.
    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    /// URL of the archive content.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Resource for ArchiveRecord {
    fn resource_uri(&self) -> &str {
        &self.resource_uri
    }
}

impl fmt::Display for ArchiveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource_uri)
    }
}

// ---------------------------------------------------------------------------
// Family views
// ---------------------------------------------------------------------------

/// Corner of the target a watermark is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    /// Wire name of the corner (`nw`, `ne`, `sw`, `se`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Corner::NorthWest => "nw",
            Corner::NorthEast => "ne",
            Corner::SouthWest => "sw",
            Corner::SouthEast => "se",
        }
    }
}

/// Size and padding of a watermark, in percent of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkPlacement {
    pub corner: Corner,
    pub w: u32,
    pub h: u32,
    pub w_pad: u32,
    pub h_pad: u32,
}

/// Files a watermark can be burned into (images and videos).
pub trait Watermarkable: Resource {
    /// Build the `watermark` action placing `watermark` onto this file.
    fn watermark(&self, watermark: &dyn Resource, placement: &WatermarkPlacement) -> Action {
        Action::new("watermark")
            .arg("watermark", watermark.resource_uri())
            .arg("corner", placement.corner.as_str())
            .arg("w", placement.w)
            .arg("h", placement.h)
            .arg("w_pad", placement.w_pad)
            .arg("h_pad", placement.h_pad)
    }
}

/// An image file together with its dimensions.
#[derive(Debug, Clone, Copy)]
pub struct ImageFile<'a> {
    file: &'a RegularFile,
    info: &'a ImageInfo,
}

impl<'a> ImageFile<'a> {
    /// The underlying regular file.
    pub fn file(&self) -> &'a RegularFile {
        self.file
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.info.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.info.height
    }

    /// EXIF orientation, when the service reported one.
    pub fn orientation(&self) -> Option<u8> {
        self.info.orientation
    }

    /// Convert to another image format (`"png"`, `"jpeg"`, ...).
    pub fn convert(&self, to: &str) -> Action {
        Action::new("convert").arg("to", to)
    }

    /// Resize with the given mode (`"keep"`, `"crop"`, ...).
    pub fn resize(&self, mode: &str, w: u32, h: u32) -> Action {
        Action::new("resize").arg("mode", mode).arg("w", w).arg("h", h)
    }

    /// Drop the colour channels.
    pub fn grayscale(&self) -> Action {
        Action::new("grayscale")
    }

    /// Rotate clockwise by `angle` degrees.
    pub fn rotate(&self, angle: i32) -> Action {
        Action::new("rotate").arg("angle", angle)
    }
}

impl Resource for ImageFile<'_> {
    fn resource_uri(&self) -> &str {
        &self.file.resource_uri
    }
}

impl Watermarkable for ImageFile<'_> {}

/// A video file together with its stream details.
#[derive(Debug, Clone, Copy)]
pub struct VideoFile<'a> {
    file: &'a RegularFile,
    info: &'a VideoInfo,
}

impl<'a> VideoFile<'a> {
    /// The underlying regular file.
    pub fn file(&self) -> &'a RegularFile {
        self.file
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.info.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.info.height
    }

    /// Video codec name (e.g. `h264`).
    pub fn codec(&self) -> &'a str {
        &self.info.codec
    }

    /// Convert to another container, optionally forcing the codecs.
    pub fn convert(&self, to: &str, vcodec: Option<&str>, acodec: Option<&str>) -> Action {
        let mut action = Action::new("convert").arg("to", to);
        if let Some(vcodec) = vcodec {
            action = action.arg("vcodec", vcodec);
        }
        if let Some(acodec) = acodec {
            action = action.arg("acodec", acodec);
        }
        action
    }

    /// Extract the audio track into the `to` format.
    pub fn extract_audio(&self, to: &str) -> Action {
        Action::new("extract_audio").arg("to", to)
    }

    /// Grab a single frame at `position` seconds.
    pub fn capture_frame(&self, to: &str, position: f64) -> Action {
        Action::new("capture_frame")
            .arg("to", to)
            .arg("position", position)
    }
}

impl Resource for VideoFile<'_> {
    fn resource_uri(&self) -> &str {
        &self.file.resource_uri
    }
}

impl Watermarkable for VideoFile<'_> {}

/// An audio file.
#[derive(Debug, Clone, Copy)]
pub struct AudioFile<'a> {
    file: &'a RegularFile,
}

impl<'a> AudioFile<'a> {
    /// The underlying regular file.
    pub fn file(&self) -> &'a RegularFile {
        self.file
    }

    /// Convert to another audio format (`"mp3"`, `"ogg"`, ...).
    pub fn convert(&self, to: &str) -> Action {
        Action::new("convert").arg("to", to)
    }
}

impl Resource for AudioFile<'_> {
    fn resource_uri(&self) -> &str {
        &self.file.resource_uri
    }
}

/// A text or office document.
#[derive(Debug, Clone, Copy)]
pub struct DocumentFile<'a> {
    file: &'a RegularFile,
}

impl<'a> DocumentFile<'a> {
    /// The underlying regular file.
    pub fn file(&self) -> &'a RegularFile {
        self.file
    }

    /// Convert to another document format (`"pdf"`, `"odt"`, ...).
    pub fn convert(&self, to: &str) -> Action {
        Action::new("convert").arg("to", to)
    }
}

impl Resource for DocumentFile<'_> {
    fn resource_uri(&self) -> &str {
        &self.file.resource_uri
    }
}
