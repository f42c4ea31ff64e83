//! Lecture content classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Content list used when a lecture is created without files.
pub const DEFAULT_LECTURE_CONTENT: &str = "/uploads/course-content.mp4";

/// Kind of media a lecture carries. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LectureKind {
    #[default]
    Text,
    Image,
    Video,
    Pdf,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lecture kind: {0}")]
pub struct UnknownLectureKind(pub String);

impl LectureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Pdf => "pdf",
        }
    }

    /// Classify a single media type. `None` means the type carries no kind
    /// of its own and leaves the running kind untouched.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            Some(Self::Image)
        } else if mime.starts_with("video/") {
            Some(Self::Video)
        } else if mime == "application/pdf" {
            Some(Self::Pdf)
        } else {
            None
        }
    }

    /// Fold the media types of uploaded files, in upload order, over `initial`.
    /// The last classifiable file wins.
    pub fn infer<'a, I>(initial: Self, mimes: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        mimes
            .into_iter()
            .fold(initial, |kind, mime| Self::from_mime(mime).unwrap_or(kind))
    }
}

impl fmt::Display for LectureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LectureKind {
    type Err = UnknownLectureKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "pdf" => Ok(Self::Pdf),
            other => Err(UnknownLectureKind(other.to_owned())),
        }
    }
}
