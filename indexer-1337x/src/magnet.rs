use leetseek_indexer_prelude::{Fetcher, IndexerError, IndexerErrorReason};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static MAGNET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"magnet:\?xt=urn:btih:[^"']+"#).unwrap());

pub fn parse_magnet(html: &str) -> Result<String, IndexerError> {
    MAGNET_PATTERN
        .find(html)
        .map(|found| found.as_str().to_string())
        .ok_or_else(|| IndexerError::new(super::NAME, IndexerErrorReason::EntryMagnetNotFound))
}

#[derive(Clone, Debug)]
pub struct MagnetResolver {
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl MagnetResolver {
    pub fn new(fetcher: Option<Arc<dyn Fetcher>>) -> Self {
        Self { fetcher }
    }

    async fn try_resolve(&self, detail_url: &str) -> Result<String, IndexerError> {
        let fetcher = self
            .fetcher
            .as_ref()
            .ok_or_else(|| IndexerError::new(super::NAME, IndexerErrorReason::FetcherMissing))?;
        let html = fetcher.fetch(detail_url).await?;
        parse_magnet(html.as_str())
    }

    pub async fn resolve(&self, detail_url: &str) -> Option<String> {
        match self.try_resolve(detail_url).await {
            Ok(magnet) => Some(magnet),
            Err(IndexerError {
                reason: IndexerErrorReason::FetcherMissing,
                ..
            }) => {
                tracing::warn!("no fetcher configured, unable to resolve {detail_url:?}");
                None
            }
            Err(error) => {
                tracing::debug!("unable to resolve magnet from {detail_url:?}: {error}");
                None
            }
        }
    }
}
