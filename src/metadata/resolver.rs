//! Chooses the metadata URI written into the on-chain metadata account.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::token::TokenSpec;

use super::document::MetadataDocument;
use super::store::ContentStore;

/// Hard limit of the on-chain URI field, in characters.
pub const MAX_URI_LEN: usize = 200;

/// Where the metadata URI comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriMode {
    /// Use a caller-supplied URL verbatim.
    DirectUrl(String),
    /// Upload the document to the content store and use its URL.
    ContentStoreUpload,
    /// Encode the document into a `data:` URI.
    InlineEncoded,
}

/// Steps of the inline degradation chain, largest payload first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationStep {
    Full,
    WithoutImage,
    NameAndSymbol,
}

/// Resolves a [`TokenSpec`] into a single metadata URI.
#[derive(Clone)]
pub struct MetadataUriResolver {
    store: Option<Arc<dyn ContentStore>>,
    inline_fallback: bool,
    max_len: usize,
}

impl Default for MetadataUriResolver {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MetadataUriResolver {
    pub fn new(store: Option<Arc<dyn ContentStore>>) -> Self {
        Self {
            store,
            inline_fallback: false,
            max_len: MAX_URI_LEN,
        }
    }

    /// When set, a failed upload degrades to [`UriMode::InlineEncoded`]
    /// once instead of surfacing the error.
    pub fn with_inline_fallback(mut self, enabled: bool) -> Self {
        self.inline_fallback = enabled;
        self
    }

    pub async fn resolve(
        &self,
        spec: &TokenSpec,
        image: Option<&str>,
        mode: &UriMode,
    ) -> Result<String> {
        match mode {
            UriMode::DirectUrl(url) => {
                let url = url.trim();
                if url.is_empty() {
                    return Err(Error::validation("metadata URL cannot be empty"));
                }
                info!(uri = url, "using caller-supplied metadata URI");
                Ok(url.to_string())
            }
            UriMode::ContentStoreUpload => match self.upload(spec, image).await {
                Ok(url) => Ok(url),
                Err(e) if self.inline_fallback => {
                    warn!(error = %e, "metadata upload failed, falling back to inline encoding");
                    self.encode_inline(spec, image)
                }
                Err(e) => Err(e),
            },
            UriMode::InlineEncoded => self.encode_inline(spec, image),
        }
    }

    async fn upload(&self, spec: &TokenSpec, image: Option<&str>) -> Result<String> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| Error::content_store("no content store configured"))?;
        let document = MetadataDocument::from_spec(spec, image).to_json_value()?;
        store.upload_json(&document).await
    }

    /// Inline encoding with the degradation chain applied.
    pub fn encode_inline(&self, spec: &TokenSpec, image: Option<&str>) -> Result<String> {
        let chain = degradation_chain(spec, image)?;
        for (step, uri) in &chain {
            debug!(?step, len = uri.len(), "inline metadata candidate");
            if uri.len() <= self.max_len {
                if *step != DegradationStep::Full {
                    warn!(?step, len = uri.len(), "metadata trimmed to fit the on-chain URI limit");
                }
                return Ok(uri.clone());
            }
        }

        let smallest = chain.last().map(|(_, uri)| uri.len()).unwrap_or_default();
        Err(Error::validation(format!(
            "metadata URI is {} characters even with name and symbol only (limit {})",
            smallest, self.max_len
        )))
    }
}

/// Every inline candidate in order, each strictly smaller than the last.
///
/// A step that would not shrink the payload (no image to drop) is skipped.
pub fn degradation_chain(
    spec: &TokenSpec,
    image: Option<&str>,
) -> Result<Vec<(DegradationStep, String)>> {
    let full = MetadataDocument::from_spec(spec, image);
    let candidates = [
        (DegradationStep::Full, full.clone()),
        (DegradationStep::WithoutImage, full.without_image()),
        (DegradationStep::NameAndSymbol, full.name_and_symbol()),
    ];

    let mut chain: Vec<(DegradationStep, String)> = Vec::with_capacity(candidates.len());
    for (step, document) in candidates {
        let uri = document.to_data_uri()?;
        if chain.last().is_some_and(|(_, prev)| uri.len() >= prev.len()) {
            continue;
        }
        chain.push((step, uri));
    }
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::metadata::StoredFile;

    struct FailingStore;

    #[async_trait]
    impl ContentStore for FailingStore {
        async fn upload_json(&self, _document: &serde_json::Value) -> Result<String> {
            Err(Error::content_store("unreachable"))
        }

        async fn upload_file(&self, _bytes: Vec<u8>, _file_name: &str) -> Result<StoredFile> {
            Err(Error::content_store("unreachable"))
        }
    }

    struct EchoStore;

    #[async_trait]
    impl ContentStore for EchoStore {
        async fn upload_json(&self, document: &serde_json::Value) -> Result<String> {
            Ok(format!("https://gw.example/ipfs/{}", document["symbol"].as_str().unwrap()))
        }

        async fn upload_file(&self, _bytes: Vec<u8>, _file_name: &str) -> Result<StoredFile> {
            unreachable!()
        }
    }

    fn small_spec() -> TokenSpec {
        TokenSpec::new("Tk", "TK", 0, "1").with_created_on("x")
    }

    #[tokio::test]
    async fn test_direct_url_verbatim() {
        let resolver = MetadataUriResolver::default();
        let uri = resolver
            .resolve(&small_spec(), None, &UriMode::DirectUrl("https://a.b/m.json".into()))
            .await
            .unwrap();
        assert_eq!(uri, "https://a.b/m.json");

        let err = resolver
            .resolve(&small_spec(), None, &UriMode::DirectUrl("  ".into()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_upload_returns_store_url() {
        let resolver = MetadataUriResolver::new(Some(Arc::new(EchoStore)));
        let uri = resolver
            .resolve(&small_spec(), None, &UriMode::ContentStoreUpload)
            .await
            .unwrap();
        assert_eq!(uri, "https://gw.example/ipfs/TK");
    }

    #[tokio::test]
    async fn test_upload_failure_surfaced_without_fallback() {
        let resolver = MetadataUriResolver::new(Some(Arc::new(FailingStore)));
        let err = resolver
            .resolve(&small_spec(), None, &UriMode::ContentStoreUpload)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ExternalService);

        let missing = MetadataUriResolver::default()
            .resolve(&small_spec(), None, &UriMode::ContentStoreUpload)
            .await
            .unwrap_err();
        assert_eq!(missing.kind(), crate::error::ErrorKind::ExternalService);
    }

    #[tokio::test]
    async fn test_upload_failure_falls_back_inline() {
        let resolver =
            MetadataUriResolver::new(Some(Arc::new(FailingStore))).with_inline_fallback(true);
        let uri = resolver
            .resolve(&small_spec(), None, &UriMode::ContentStoreUpload)
            .await
            .unwrap();
        assert!(uri.starts_with("data:application/json;base64,"));
    }

    #[test]
    fn test_small_document_kept_whole() {
        let resolver = MetadataUriResolver::default();
        let spec = small_spec();
        let uri = resolver.encode_inline(&spec, Some("https://i.imgur.com/a.png")).unwrap();
        let chain = degradation_chain(&spec, Some("https://i.imgur.com/a.png")).unwrap();
        assert_eq!(uri, chain[0].1);
        assert!(uri.len() <= MAX_URI_LEN);
    }

    #[test]
    fn test_chain_skips_non_shrinking_step() {
        let chain = degradation_chain(&small_spec(), None).unwrap();
        let steps: Vec<_> = chain.iter().map(|(s, _)| *s).collect();
        assert_eq!(steps, vec![DegradationStep::Full, DegradationStep::NameAndSymbol]);
    }

    #[test]
    fn test_image_dropped_when_it_alone_breaks_budget() {
        // Small enough without the image, too large with it.
        let spec = TokenSpec::new("Tk", "TK", 0, "1").with_created_on("x");
        let image = format!("https://example.com/{}.png", "i".repeat(60));
        let uri = MetadataUriResolver::default()
            .encode_inline(&spec, Some(&image))
            .unwrap();
        let chain = degradation_chain(&spec, Some(&image)).unwrap();
        assert_eq!(chain[0].0, DegradationStep::Full);
        assert!(chain[0].1.len() > MAX_URI_LEN);
        assert_eq!(chain[1].0, DegradationStep::WithoutImage);
        assert_eq!(uri, chain[1].1);
    }

    #[test]
    fn test_unfittable_name_reports_failure() {
        // 32 four-byte characters blow the budget even at the last step.
        let spec = TokenSpec::new("𝔘".repeat(32), "TK", 0, "1");
        let err = MetadataUriResolver::default()
            .encode_inline(&spec, None)
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }
}
