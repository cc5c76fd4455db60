//! Cloudinary upload API client.
//!
//! Requests are signed as described in
//! <https://cloudinary.com/documentation/authentication_signatures>: the
//! signed parameters are sorted by name, joined as `k=v&k=v`, suffixed with
//! the API secret and hashed. SHA-256 is used, so the account must have
//! SHA-256 signatures enabled.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};
use vitrine_core::{Media, MediaKind};

use super::{MediaError, MediaFile, MediaGateway};
use crate::config::CloudinaryConfig;

const SIGNATURE_ALGORITHM: &str = "sha256";

/// Cloudinary client for uploading and destroying assets.
#[derive(Clone)]
pub struct CloudinaryClient {
    client: Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
    folder: String,
}

impl std::fmt::Debug for CloudinaryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryClient")
            .field("cloud_name", &self.cloud_name)
            .field("api_secret", &"[REDACTED]")
            .field("folder", &self.folder)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CloudinaryConfig) -> Result<Self, MediaError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            api_base: config.api_base.as_str().trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            folder: config.folder.clone(),
        })
    }

    fn endpoint(&self, kind: MediaKind, action: &str) -> String {
        format!(
            "{}/{}/{}/{action}",
            self.api_base,
            self.cloud_name,
            kind.as_str()
        )
    }

    /// Full public id of a hosted asset: `<folder>/<asset name>`.
    fn public_id(&self, media: &Media) -> Result<String, MediaError> {
        let name = media
            .asset_name()
            .ok_or_else(|| MediaError::InvalidUrl(media.url.clone()))?;
        Ok(format!("{}/{name}", self.folder))
    }

    fn sign(&self, params: &[(&str, &str)]) -> String {
        sign_params(params, self.api_secret.expose_secret())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, MediaError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(MediaError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl MediaGateway for CloudinaryClient {
    #[instrument(skip(self, file), fields(content_type = %file.content_type, size = file.bytes.len()))]
    async fn upload(&self, file: MediaFile) -> Result<Media, MediaError> {
        let kind = file
            .kind()
            .ok_or_else(|| MediaError::UnsupportedContentType(file.content_type.clone()))?;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", &self.folder), ("timestamp", &timestamp)]);

        let mut part = Part::bytes(file.bytes)
            .mime_str(&file.content_type)
            .map_err(|_| MediaError::UnsupportedContentType(file.content_type.clone()))?;
        part = part.file_name(file.file_name.unwrap_or_else(|| "upload".to_string()));

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.folder.clone())
            .text("signature_algorithm", SIGNATURE_ALGORITHM)
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint(kind, "upload"))
            .multipart(form)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body: UploadResponse = response.json().await?;
        debug!(url = %body.secure_url, "Uploaded media");

        Ok(Media {
            kind,
            url: body.secure_url,
        })
    }

    #[instrument(skip(self, media), fields(url = %media.url))]
    async fn delete(&self, media: &Media) -> Result<(), MediaError> {
        let public_id = self.public_id(media)?;
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", &public_id), ("timestamp", &timestamp)]);

        let params = [
            ("public_id", public_id.as_str()),
            ("api_key", self.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("signature_algorithm", SIGNATURE_ALGORITHM),
            ("signature", signature.as_str()),
        ];

        let response = self
            .client
            .post(self.endpoint(media.kind, "destroy"))
            .form(&params)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body: DestroyResponse = response.json().await?;
        // "not found" means the asset is already gone.
        match body.result.as_str() {
            "ok" | "not found" => {
                debug!(public_id = %public_id, result = %body.result, "Destroyed media");
                Ok(())
            }
            other => Err(MediaError::Api {
                status: 200,
                message: format!("destroy returned '{other}'"),
            }),
        }
    }
}

/// Compute a request signature over `params` (unsorted) with `secret`.
fn sign_params(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
