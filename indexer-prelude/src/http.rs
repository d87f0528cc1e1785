use crate::{Fetcher, IndexerError, IndexerErrorReason};
use std::time::Duration;

const ORIGIN: &str = "http";

#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, IndexerError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map(|client| Self { client })
            .map_err(|err| {
                IndexerError::new(
                    ORIGIN,
                    IndexerErrorReason::UnableToQuery {
                        url: String::new(),
                        cause: err.to_string(),
                    },
                )
            })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, IndexerError> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|err| {
                IndexerError::new(
                    ORIGIN,
                    IndexerErrorReason::UnableToQuery {
                        url: url.to_string(),
                        cause: err.to_string(),
                    },
                )
            })?;
        res.text().await.map_err(|err| {
            IndexerError::new(
                ORIGIN,
                IndexerErrorReason::UnableToRead {
                    url: url.to_string(),
                    cause: err.to_string(),
                },
            )
        })
    }
}
