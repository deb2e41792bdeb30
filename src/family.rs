//! File family enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnistorageError;

/// The family a regular file belongs to, as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFamily {
    /// Raster images.
    Image,
    /// Video files.
    Video,
    /// Audio files.
    Audio,
    /// Text documents (PDF, Word, OpenDocument, ...).
    #[serde(rename = "doc")]
    Document,
    /// A regular file the service did not classify.
    Unknown,
}

impl FileFamily {
    /// The wire name used in the `unistorage_type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFamily::Image => "image",
            FileFamily::Video => "video",
            FileFamily::Audio => "audio",
            FileFamily::Document => "doc",
            FileFamily::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FileFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFamily {
    type Err = UnistorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(FileFamily::Image),
            "video" => Ok(FileFamily::Video),
            "audio" => Ok(FileFamily::Audio),
            "doc" => Ok(FileFamily::Document),
            "unknown" => Ok(FileFamily::Unknown),
            other => Err(UnistorageError::UnrecognizedShape(format!(
                "unknown unistorage_type {other:?}"
            ))),
        }
    }
}

/// The families a template can be created for (`applicable_for`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFamily {
    /// Templates of image actions.
    Image,
    /// Templates of video actions.
    Video,
    /// Templates of document actions.
    #[serde(rename = "doc")]
    Document,
}

impl TemplateFamily {
    /// The wire name sent as `applicable_for`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateFamily::Image => "image",
            TemplateFamily::Video => "video",
            TemplateFamily::Document => "doc",
        }
    }
}

impl fmt::Display for TemplateFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TemplateFamily> for FileFamily {
    fn from(family: TemplateFamily) -> Self {
        match family {
            TemplateFamily::Image => FileFamily::Image,
            TemplateFamily::Video => FileFamily::Video,
            TemplateFamily::Document => FileFamily::Document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(FileFamily::Image.to_string(), "image");
        assert_eq!(FileFamily::Video.to_string(), "video");
        assert_eq!(FileFamily::Audio.to_string(), "audio");
        assert_eq!(FileFamily::Document.to_string(), "doc");
        assert_eq!(FileFamily::Unknown.to_string(), "unknown");
        assert_eq!(TemplateFamily::Document.to_string(), "doc");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("doc".parse::<FileFamily>().unwrap(), FileFamily::Document);
        assert_eq!("video".parse::<FileFamily>().unwrap(), FileFamily::Video);
        assert!(matches!(
            "spreadsheet".parse::<FileFamily>(),
            Err(UnistorageError::UnrecognizedShape(_))
        ));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&FileFamily::Document).unwrap();
        assert_eq!(json, "\"doc\"");
    }

    #[test]
    fn test_deserialize() {
        let family: TemplateFamily = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(family, TemplateFamily::Video);
    }

    #[test]
    fn test_template_family_into_file_family() {
        assert_eq!(FileFamily::from(TemplateFamily::Document), FileFamily::Document);
    }
}
