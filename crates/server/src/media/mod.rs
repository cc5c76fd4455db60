//! Media hosting.
//!
//! The catalog never stores file bytes itself. Uploaded files are pushed to
//! an external host and only the returned public URL is kept on the item.
//! [`MediaGateway`] is the seam between the services and that host; the
//! production implementation is [`CloudinaryClient`].

pub mod cloudinary;

use async_trait::async_trait;
use thiserror::Error;
use vitrine_core::{Media, MediaKind};

pub use cloudinary::CloudinaryClient;

/// Errors that can occur when talking to the media host.
#[derive(Debug, Error)]
pub enum MediaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Host returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// File is neither an image nor a video.
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Media URL has no recognisable asset name.
    #[error("cannot derive asset name from URL: {0}")]
    InvalidUrl(String),
}

/// One file received from a client, ready to be pushed to the host.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: Option<String>,
}

impl MediaFile {
    /// Media kind implied by the declared content type.
    #[must_use]
    pub fn kind(&self) -> Option<MediaKind> {
        MediaKind::from_content_type(&self.content_type)
    }
}

/// External media host.
#[async_trait]
pub trait MediaGateway: Send + Sync {
    /// Upload one file and return the hosted media reference.
    async fn upload(&self, file: MediaFile) -> Result<Media, MediaError>;

    /// Remove the hosted asset behind `media`.
    async fn delete(&self, media: &Media) -> Result<(), MediaError>;
}
