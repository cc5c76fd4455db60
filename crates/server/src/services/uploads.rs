//! Batch upload of client files to the media host.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, instrument, warn};
use vitrine_core::Media;

use crate::media::{MediaFile, MediaGateway};

/// Pushes files to the media host.
///
/// Each file is attempted exactly once; there is no retry.
#[derive(Clone)]
pub struct UploadService {
    media: Arc<dyn MediaGateway>,
}

impl UploadService {
    #[must_use]
    pub fn new(media: Arc<dyn MediaGateway>) -> Self {
        Self { media }
    }

    /// Upload all files concurrently.
    ///
    /// Returns the hosted media of the files that succeeded, in request
    /// order. Files that are neither images nor videos, and files the host
    /// rejects, are logged and dropped, so the result may be shorter than
    /// the input.
    #[instrument(skip(self, files), fields(files = files.len()))]
    pub async fn upload_all(&self, files: Vec<MediaFile>) -> Vec<Media> {
        let accepted: Vec<MediaFile> = files
            .into_iter()
            .filter(|file| {
                let supported = file.kind().is_some();
                if !supported {
                    warn!(content_type = %file.content_type, "Dropping unsupported upload");
                }
                supported
            })
            .collect();
        let attempted = accepted.len();

        let results = join_all(accepted.into_iter().map(|file| self.media.upload(file))).await;

        let uploaded: Vec<Media> = results
            .into_iter()
            .filter_map(|result| match result {
                Ok(media) => Some(media),
                Err(e) => {
                    warn!(error = %e, "Upload failed");
                    None
                }
            })
            .collect();

        info!(attempted, uploaded = uploaded.len(), "Uploaded media");
        uploaded
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::media::MediaError;

    /// Echoes the file name back as the URL; counts calls.
    #[derive(Default)]
    struct EchoGateway {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MediaGateway for EchoGateway {
        async fn upload(&self, file: MediaFile) -> Result<Media, MediaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let kind = file.kind().unwrap();
            Ok(Media {
                kind,
                url: file.file_name.unwrap_or_default(),
            })
        }

        async fn delete(&self, _media: &Media) -> Result<(), MediaError> {
            Ok(())
        }
    }

    fn file(name: &str, content_type: &str) -> MediaFile {
        MediaFile {
            bytes: vec![0; 4],
            content_type: content_type.to_string(),
            file_name: Some(name.to_string()),
        }
    }

    #[tokio::test]
    async fn test_unsupported_files_never_reach_the_host() {
        let gateway = Arc::new(EchoGateway::default());
        let service = UploadService::new(gateway.clone());

        let media = service
            .upload_all(vec![
                file("a.png", "image/png"),
                file("notes.pdf", "application/pdf"),
                file("b.mp4", "video/mp4"),
            ])
            .await;

        assert_eq!(
            media,
            vec![Media::image("a.png"), Media::video("b.mp4")]
        );
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let service = UploadService::new(Arc::new(EchoGateway::default()));
        assert!(service.upload_all(Vec::new()).await.is_empty());
    }
}
