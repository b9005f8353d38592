//! The Cloudinary-backed receipt store.

use reqwest::multipart;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use crate::{
    config::CloudinaryConfig,
    receipts::{ReceiptError, ReceiptFile, ReceiptFolder, ReceiptStore},
};

const API_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// A receipt store backed by the Cloudinary upload API.
///
/// Requests are authenticated with signed parameters: the request parameters
/// are concatenated in alphabetical order, the API secret is appended, and
/// the SHA-256 hex digest is sent alongside the API key.
#[derive(Clone)]
pub struct CloudinaryStore {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryStore {
    /// Create a store for the configured Cloudinary account.
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    fn sign(&self, params: &str) -> String {
        let digest = Sha256::digest(format!("{params}{}", self.api_secret));

        digest.iter().map(|byte| format!("{byte:02x}")).collect()
    }
}

impl ReceiptStore for CloudinaryStore {
    async fn upload(
        &self,
        folder: ReceiptFolder,
        file: &ReceiptFile,
    ) -> Result<String, ReceiptError> {
        let timestamp = OffsetDateTime::now_utc().unix_timestamp();
        let signature = self.sign(&format!("folder={}&timestamp={timestamp}", folder.as_str()));

        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;

        let form = multipart::Form::new()
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", folder.as_str())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", part);

        let response = self
            .client
            .post(format!("{API_BASE_URL}/{}/auto/upload", self.cloud_name))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReceiptError::Rejected(body));
        }

        let body: UploadResponse = response.json().await?;

        Ok(body.secure_url)
    }

    async fn delete(&self, remote_id: &str) -> Result<(), ReceiptError> {
        let timestamp = OffsetDateTime::now_utc().unix_timestamp();
        let signature = self.sign(&format!("public_id={remote_id}&timestamp={timestamp}"));
        let timestamp = timestamp.to_string();

        let response = self
            .client
            .post(format!("{API_BASE_URL}/{}/image/destroy", self.cloud_name))
            .form(&[
                ("public_id", remote_id),
                ("api_key", &self.api_key),
                ("timestamp", &timestamp),
                ("signature", &signature),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReceiptError::Rejected(body));
        }

        let body: DestroyResponse = response.json().await?;

        // "not found" is treated as success: the object is gone either way.
        match body.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(ReceiptError::Rejected(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CloudinaryConfig;

    use super::CloudinaryStore;

    #[test]
    fn signature_is_the_sha256_hex_digest_of_params_and_secret() {
        let store = CloudinaryStore::new(&CloudinaryConfig {
            cloud_name: "demo".to_owned(),
            api_key: "key".to_owned(),
            api_secret: "abcd".to_owned(),
        });

        // echo -n 'folder=collections&timestamp=1700000000abcd' | sha256sum
        assert_eq!(
            store.sign("folder=collections&timestamp=1700000000"),
            "049572eb44470b8f17dc02353e25a1c2cf10129d740881ea1e3c9f12a278877d"
        );
    }
}
