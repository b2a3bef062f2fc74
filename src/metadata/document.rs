//! JSON metadata document and its inline `data:` encoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Url;
use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::token::TokenSpec;

const DATA_URI_PREFIX: &str = "data:application/json;base64,";

/// Off-chain token metadata. Absent optional fields are omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDocument {
    pub name: String,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
}

impl MetadataDocument {
    /// Builds the full document. `image` is canonicalised first and dropped
    /// if it is not a plain http(s) URL.
    pub fn from_spec(spec: &TokenSpec, image: Option<&str>) -> Self {
        let owned = |v: Option<&str>| v.map(str::to_string);
        Self {
            name: spec.name.clone(),
            symbol: spec.symbol.clone(),
            description: Some(spec.description.clone()),
            created_on: Some(spec.created_on.clone()),
            image: image
                .map(str::trim)
                .filter(|i| !i.is_empty())
                .and_then(canonical_image_url),
            website: owned(spec.social.website()),
            twitter: owned(spec.social.twitter()),
            discord: owned(spec.social.discord()),
            telegram: owned(spec.social.telegram()),
        }
    }

    /// Same document with the image reference removed.
    pub fn without_image(&self) -> Self {
        Self {
            image: None,
            ..self.clone()
        }
    }

    /// Smallest useful document: name and symbol only.
    pub fn name_and_symbol(&self) -> Self {
        Self {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            description: None,
            created_on: None,
            image: None,
            website: None,
            twitter: None,
            discord: None,
            telegram: None,
        }
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|e| Error::validation(format!("metadata is not serialisable: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::validation(format!("metadata is not serialisable: {}", e)))
    }

    /// Renders the document as a base-64 `data:` URI.
    pub fn to_data_uri(&self) -> Result<String> {
        Ok(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(self.to_json()?)))
    }
}

/// Rewrites known image hosts to their shortest equivalent URL.
///
/// Imgur pages and direct links (`imgur.com/ID`, `i.imgur.com/ID.jpeg`)
/// collapse to `https://i.imgur.com/ID.jpg`. Other http(s) URLs pass through
/// unchanged. Anything else (`data:` URIs, relative paths) yields `None`.
pub fn canonical_image_url(raw: &str) -> Option<String> {
    let url = match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        _ => {
            warn!("image reference is not an http(s) URL, leaving it out of the metadata");
            return None;
        }
    };

    let is_imgur = url
        .host_str()
        .is_some_and(|host| host == "imgur.com" || host.ends_with(".imgur.com"));
    if is_imgur {
        let id = url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .and_then(|last| last.split('.').next())
            .filter(|id| !id.is_empty());
        if let Some(id) = id {
            return Some(format!("https://i.imgur.com/{}.jpg", id));
        }
    }

    Some(raw.to_string())
}
