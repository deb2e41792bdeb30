//! Response classification.
//!
//! Turns a decoded file-status body into a [`FileRecord`]. Two protocol
//! revisions are accepted: bodies tagged with `data.unistorage_type`, and the
//! older untagged bodies whose family is sniffed from `data.mimetype`. Video
//! details may sit directly under `data.extra` or under `data.extra.video`.

use serde::Deserialize;
use serde_json::Value;

use crate::detection::family_from_mimetype;
use crate::error::{Result, UnistorageError};
use crate::family::FileFamily;
use crate::record::{
    ArchiveRecord, FileKind, FileRecord, ImageInfo, PendingFile, RegularFile, TemporaryFile,
    VideoInfo,
};

// `data` and `extra` stay raw; each variant decodes only the fields it reads.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: Option<String>,
    ttl: Option<u64>,
    data: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Location {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Data {
    url: Option<String>,
    mimetype: Option<String>,
    size: Option<u64>,
    name: Option<String>,
    unistorage_type: Option<String>,
    extra: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageExtra {
    width: Option<u32>,
    height: Option<u32>,
    orientation: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
struct VideoExtra {
    width: Option<u32>,
    height: Option<u32>,
    codec: Option<String>,
    video: Option<VideoStream>,
}

#[derive(Debug, Deserialize)]
struct VideoStream {
    width: Option<u32>,
    height: Option<u32>,
    codec: Option<String>,
}

fn missing(field: &str) -> UnistorageError {
    UnistorageError::UnrecognizedShape(format!("missing field `{field}`"))
}

fn parse_envelope(body: &Value) -> Result<Envelope> {
    Envelope::deserialize(body).map_err(|e| UnistorageError::UnrecognizedShape(e.to_string()))
}

/// Decode an optional sub-object, treating absent and `null` as empty.
fn section<'a, T>(value: Option<&'a Value>, field: &str) -> Result<T>
where
    T: Deserialize<'a> + Default,
{
    match value {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => T::deserialize(value)
            .map_err(|e| UnistorageError::UnrecognizedShape(format!("`{field}`: {e}"))),
    }
}

fn required_data(envelope: &Envelope) -> Result<&Value> {
    envelope.data.as_ref().ok_or_else(|| missing("data"))
}

/// Classify a file-status body fetched from `resource_uri`.
pub fn classify(resource_uri: &str, body: &Value) -> Result<FileRecord> {
    let envelope = parse_envelope(body)?;
    let status = envelope.status.as_deref().ok_or_else(|| missing("status"))?;
    let resource_uri = resource_uri.to_string();

    let record = match status {
        "wait" => FileRecord::Pending(PendingFile {
            resource_uri,
            ttl: envelope.ttl.ok_or_else(|| missing("ttl"))?,
        }),
        "just_uri" => {
            let location: Location = section(Some(required_data(&envelope)?), "data")?;
            FileRecord::Temporary(TemporaryFile {
                resource_uri,
                ttl: envelope.ttl.ok_or_else(|| missing("ttl"))?,
                url: location.url.ok_or_else(|| missing("data.url"))?,
            })
        }
        "ok" => {
            let ttl = envelope.ttl.ok_or_else(|| missing("ttl"))?;
            let data: Data = section(Some(required_data(&envelope)?), "data")?;
            FileRecord::Regular(regular(resource_uri, ttl, data)?)
        }
        other => {
            return Err(UnistorageError::UnrecognizedShape(format!(
                "unknown status {other:?}"
            )))
        }
    };

    tracing::info!(
        resource_uri = %record,
        status = record.status(),
        ttl = record.ttl(),
        "File classified"
    );
    Ok(record)
}

/// Classify a ZIP archive body fetched from `resource_uri`.
///
/// Only finished archives (`status` = `ok`) are accepted.
pub fn classify_archive(resource_uri: &str, body: &Value) -> Result<ArchiveRecord> {
    let envelope = parse_envelope(body)?;
    match envelope.status.as_deref() {
        Some("ok") => {}
        Some(other) => {
            return Err(UnistorageError::UnrecognizedShape(format!(
                "archive {resource_uri} has status {other:?}, expected \"ok\""
            )))
        }
        None => return Err(missing("status")),
    }
    let location: Location = section(Some(required_data(&envelope)?), "data")?;
    Ok(ArchiveRecord {
        resource_uri: resource_uri.to_string(),
        ttl: envelope.ttl.ok_or_else(|| missing("ttl"))?,
        url: location.url.ok_or_else(|| missing("data.url"))?,
    })
}

fn regular(resource_uri: String, ttl: u64, data: Data) -> Result<RegularFile> {
    let mimetype = data.mimetype.ok_or_else(|| missing("data.mimetype"))?;

    let family = match data.unistorage_type.as_deref() {
        Some(tag) => tag.parse::<FileFamily>()?,
        None => family_from_mimetype(&mimetype).ok_or_else(|| {
            UnistorageError::UnrecognizedShape(format!(
                "mimetype {mimetype:?} matches no known family"
            ))
        })?,
    };

    let extra = data.extra.as_ref();
    let kind = match family {
        FileFamily::Image => FileKind::Image(image_info(section(extra, "data.extra")?)?),
        FileFamily::Video => FileKind::Video(video_info(section(extra, "data.extra")?)?),
        FileFamily::Audio => FileKind::Audio,
        FileFamily::Document => FileKind::Document,
        FileFamily::Unknown => FileKind::Unknown,
    };

    Ok(RegularFile {
        resource_uri,
        ttl,
        url: data.url.ok_or_else(|| missing("data.url"))?,
        mimetype,
        size: data.size.ok_or_else(|| missing("data.size"))?,
        name: data.name.ok_or_else(|| missing("data.name"))?,
        kind,
    })
}

fn image_info(extra: ImageExtra) -> Result<ImageInfo> {
    Ok(ImageInfo {
        width: extra.width.ok_or_else(|| missing("data.extra.width"))?,
        height: extra.height.ok_or_else(|| missing("data.extra.height"))?,
        orientation: extra.orientation,
    })
}

fn video_info(extra: VideoExtra) -> Result<VideoInfo> {
    match extra.video {
        Some(video) => Ok(VideoInfo {
            width: video.width.ok_or_else(|| missing("data.extra.video.width"))?,
            height: video.height.ok_or_else(|| missing("data.extra.video.height"))?,
            codec: video.codec.ok_or_else(|| missing("data.extra.video.codec"))?,
        }),
        None => Ok(VideoInfo {
            width: extra.width.ok_or_else(|| missing("data.extra.width"))?,
            height: extra.height.ok_or_else(|| missing("data.extra.height"))?,
            codec: extra.codec.ok_or_else(|| missing("data.extra.codec"))?,
        }),
    }
}
