use anyhow::Context as _;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::domain::repository::MediaStoragePort;
use crate::domain::types::{ResourceType, StagedFile};
use crate::error::MarketplaceError;

/// Signed-upload client for the Cloudinary media store.
#[derive(Clone)]
pub struct CloudinaryClient {
    pub http: reqwest::Client,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// SHA-256 request signature over the signed parameters, sorted by name and
/// joined as a query string, followed by the API secret.
pub fn upload_signature(folder: &str, timestamp: i64, api_secret: &str) -> String {
    let to_sign = format!("folder={folder}&timestamp={timestamp}&use_filename=true{api_secret}");
    hex::encode(Sha256::digest(to_sign.as_bytes()))
}

impl MediaStoragePort for CloudinaryClient {
    async fn upload(
        &self,
        file: &StagedFile,
        folder: &str,
        resource_type: ResourceType,
    ) -> Result<String, MarketplaceError> {
        let staged = tokio::fs::File::open(&file.path)
            .await
            .with_context(|| format!("open staged file {}", file.path.display()))?;
        let length = staged
            .metadata()
            .await
            .with_context(|| format!("stat staged file {}", file.path.display()))?
            .len();
        // Streamed from disk so large videos never sit in memory.
        let part = Part::stream_with_length(staged, length)
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .context("staged file content type")?;

        let timestamp = Utc::now().timestamp();
        let form = Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", folder.to_owned())
            .text("use_filename", "true")
            .text("signature", upload_signature(folder, timestamp, &self.api_secret))
            .text("signature_algorithm", "sha256");

        let url = format!(
            "{}/v1_1/{}/{}/upload",
            self.api_base.trim_end_matches('/'),
            self.cloud_name,
            resource_type.as_str()
        );
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("send media upload")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("media store responded {status}: {body}").into());
        }

        let uploaded: UploadResponse = response.json().await.context("decode upload response")?;
        tracing::debug!(file = %file.file_name, folder, url = %uploaded.secure_url, "media uploaded");
        Ok(uploaded.secure_url)
    }
}
