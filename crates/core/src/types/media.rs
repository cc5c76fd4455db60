//! Item media: a tagged union of images and videos hosted on the media host.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a media entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Infer the kind from a MIME content type by its top-level prefix.
    ///
    /// Returns `None` for anything that is neither `image/*` nor `video/*`.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let top = content_type
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match top.as_str() {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    /// Resource type segment used by the media host's API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One media entry on an item.
///
/// Serialized as `{"type": "image", "url": "https://..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
}

impl Media {
    /// Build an image entry.
    #[must_use]
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Image,
            url: url.into(),
        }
    }

    /// Build a video entry.
    #[must_use]
    pub fn video(url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Video,
            url: url.into(),
        }
    }

    /// The media host's identifier for this asset: the last path segment of
    /// the URL with its extension stripped.
    ///
    /// `https://host/v1/catalog-items/abc123.jpg` yields `abc123`.
    #[must_use]
    pub fn asset_name(&self) -> Option<&str> {
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        let segment = path.trim_end_matches('/').rsplit('/').next()?;
        let name = segment.split('.').next()?;
        (!name.is_empty()).then_some(name)
    }
}
