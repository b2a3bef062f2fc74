//! Content-addressed storage client used for off-chain metadata.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};

const PINATA_API_URL: &str = "https://api.pinata.cloud";

/// A file persisted in the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Resolvable gateway URL
    pub url: String,
    /// Content identifier (CID)
    pub content_id: String,
}

/// Upload contract the metadata resolver needs from a content store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Persists a JSON document and returns a resolvable URL for it.
    async fn upload_json(&self, document: &serde_json::Value) -> Result<String>;

    /// Persists raw bytes (an image) under `file_name`.
    async fn upload_file(&self, bytes: Vec<u8>, file_name: &str) -> Result<StoredFile>;
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Pinata-backed IPFS store.
#[derive(Debug, Clone)]
pub struct PinataStore {
    client: Client,
    api_url: String,
    jwt: String,
    gateway: String,
}

impl PinataStore {
    /// `gateway` may be a bare host (`name.mypinata.cloud`) or a full URL.
    pub fn new(jwt: impl Into<String>, gateway: impl Into<String>) -> Result<Self> {
        let jwt = jwt.into();
        let gateway = gateway.into();
        if jwt.trim().is_empty() || gateway.trim().is_empty() {
            return Err(Error::content_store(
                "content store is not configured (missing JWT or gateway)",
            ));
        }

        let gateway = gateway.trim().trim_end_matches('/');
        let gateway = if gateway.starts_with("http://") || gateway.starts_with("https://") {
            gateway.to_string()
        } else {
            format!("https://{}", gateway)
        };

        Ok(Self {
            client: Client::new(),
            api_url: PINATA_API_URL.to_string(),
            jwt,
            gateway,
        })
    }

    /// Points the client at a different API host.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Gateway URL for a content identifier.
    pub fn gateway_url(&self, cid: &str) -> String {
        format!("{}/ipfs/{}", self.gateway, cid)
    }

    async fn pin(&self, request: reqwest::RequestBuilder) -> Result<String> {
        let response = request
            .bearer_auth(&self.jwt)
            .send()
            .await
            .map_err(|e| Error::content_store(format!("unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "unauthenticated",
                StatusCode::PAYLOAD_TOO_LARGE => "payload too large",
                _ => "upload rejected",
            };
            return Err(Error::content_store(format!(
                "{} ({}): {}",
                reason, status, body
            )));
        }

        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| Error::content_store(format!("unexpected response: {}", e)))?;
        Ok(pinned.ipfs_hash)
    }
}

#[async_trait]
impl ContentStore for PinataStore {
    async fn upload_json(&self, document: &serde_json::Value) -> Result<String> {
        let url = format!("{}/pinning/pinJSONToIPFS", self.api_url);
        let body = serde_json::json!({ "pinataContent": document });
        let cid = self.pin(self.client.post(&url).json(&body)).await?;
        let url = self.gateway_url(&cid);
        info!(%cid, %url, "metadata uploaded");
        Ok(url)
    }

    async fn upload_file(&self, bytes: Vec<u8>, file_name: &str) -> Result<StoredFile> {
        let url = format!("{}/pinning/pinFileToIPFS", self.api_url);
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let cid = self.pin(self.client.post(&url).multipart(form)).await?;
        let url = self.gateway_url(&cid);
        info!(%cid, %url, file_name, "file uploaded");
        Ok(StoredFile {
            url,
            content_id: cid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_credentials() {
        assert!(PinataStore::new("", "gw.example").is_err());
        assert!(PinataStore::new("jwt", " ").is_err());
    }

    #[test]
    fn test_gateway_url_normalised() {
        let store = PinataStore::new("jwt", "gw.example/").unwrap();
        assert_eq!(store.gateway_url("bafy123"), "https://gw.example/ipfs/bafy123");
        let store = PinataStore::new("jwt", "http://localhost:8080").unwrap();
        assert_eq!(store.gateway_url("cid"), "http://localhost:8080/ipfs/cid");
    }

    #[tokio::test]
    async fn test_unreachable_store_is_external_error() {
        let store = PinataStore::new("jwt", "gw.example")
            .unwrap()
            .with_api_url("http://127.0.0.1:9");
        let err = store
            .upload_json(&serde_json::json!({"name": "x"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ExternalService);
    }
}
