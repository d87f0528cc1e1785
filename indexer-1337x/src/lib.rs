use leetseek_indexer_prelude::{
    Fetcher, HttpFetcher, IndexerError, IndexerErrorReason, Pause, ResultRecord, ResultSink,
    TokioPause,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

mod magnet;
mod page;
mod retry;
mod rows;

pub use magnet::MagnetResolver;
pub use page::PageParser;
pub use retry::{Backoff, RetryPolicy};
pub use rows::{ParserMode, PatternBased, RowExtractor, RowStrategy, Structured};

const BASE_URL: &str = "https://1337x.to";
const DEFAULT_SEGMENT: &str = "search";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const NAME: &str = "1337x";

static WHITESPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn collapse_whitespaces(html: &str) -> String {
    WHITESPACES.replace_all(html, " ").trim().to_string()
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct SearchConfig {
    #[serde(default = "SearchConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "SearchConfig::default_categories")]
    pub categories: HashMap<String, String>,
    #[serde(default = "SearchConfig::default_page_delay_ms")]
    pub page_delay_ms: u64,
    #[serde(default = "SearchConfig::default_retries")]
    pub retries: u32,
    #[serde(default = "SearchConfig::default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "SearchConfig::default_retry_factor")]
    pub retry_factor: f64,
    #[serde(default = "SearchConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "SearchConfig::default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub parser: ParserMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            categories: Self::default_categories(),
            page_delay_ms: Self::default_page_delay_ms(),
            retries: Self::default_retries(),
            retry_delay_ms: Self::default_retry_delay_ms(),
            retry_factor: Self::default_retry_factor(),
            timeout_secs: Self::default_timeout_secs(),
            user_agent: Self::default_user_agent(),
            parser: ParserMode::default(),
        }
    }
}

impl SearchConfig {
    fn default_base_url() -> String {
        BASE_URL.into()
    }

    fn default_categories() -> HashMap<String, String> {
        [
            ("all", "search"),
            ("movies", "Movies"),
            ("tv", "TV"),
            ("music", "Music"),
            ("games", "Games"),
            ("anime", "Anime"),
            ("software", "Applications"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
    }

    fn default_page_delay_ms() -> u64 {
        3000
    }

    fn default_retries() -> u32 {
        2
    }

    fn default_retry_delay_ms() -> u64 {
        1000
    }

    fn default_retry_factor() -> f64 {
        1.5
    }

    fn default_timeout_secs() -> u64 {
        10
    }

    fn default_user_agent() -> String {
        USER_AGENT.into()
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            initial_delay: Duration::from_millis(self.retry_delay_ms),
            factor: self.retry_factor,
        }
    }

    pub fn validate(&self) -> Result<(), IndexerError> {
        if !self.retry_factor.is_finite() || self.retry_factor < 1.0 {
            return Err(IndexerError::new(
                NAME,
                IndexerErrorReason::InvalidConfig {
                    cause: format!("retry_factor must be at least 1.0, got {}", self.retry_factor),
                },
            ));
        }
        Ok(())
    }

    pub fn build(self) -> Result<SearchDriver, IndexerError> {
        self.validate()?;
        tracing::info!("building {NAME} driver for {:?}", self.base_url);
        let fetcher = HttpFetcher::new(Duration::from_secs(self.timeout_secs), &self.user_agent)?;
        Ok(SearchDriver::new(self).with_fetcher(Arc::new(fetcher)))
    }
}

#[derive(Clone, Debug)]
pub struct SearchRequest {
    pub query: String,
    pub category: String,
    /// `None` and `Some(0)` both mean no limit.
    pub max_pages: Option<u32>,
}

impl SearchRequest {
    pub fn new<Q: Into<String>>(query: Q) -> Self {
        Self {
            query: query.into(),
            category: String::from("all"),
            max_pages: None,
        }
    }

    pub fn with_category<C: Into<String>>(mut self, category: C) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    PageUnavailable { page: u32 },
    EmptyPage { page: u32 },
    PageLimit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    pub pages: u32,
    pub emitted: usize,
    pub stop: StopReason,
}

#[derive(Debug)]
pub struct SearchDriver {
    config: SearchConfig,
    fetcher: Option<Arc<dyn Fetcher>>,
    pause: Arc<dyn Pause>,
}

impl SearchDriver {
    pub fn new(mut config: SearchConfig) -> Self {
        let trimmed = config.base_url.trim_end_matches('/').len();
        config.base_url.truncate(trimmed);
        Self {
            config,
            fetcher: None,
            pause: Arc::new(TokioPause),
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_pause(mut self, pause: Arc<dyn Pause>) -> Self {
        self.pause = pause;
        self
    }

    pub fn page_url(&self, query: &str, category: &str, page: u32) -> String {
        let query = urlencoding::encode(query);
        let segment = self
            .config
            .categories
            .get(category)
            .map(String::as_str)
            .unwrap_or(DEFAULT_SEGMENT);
        format!("{}/{segment}/{query}/{page}/", self.config.base_url)
    }

    async fn fetch_with_retries(&self, fetcher: &dyn Fetcher, url: &str) -> Option<String> {
        let mut backoff = self.config.retry_policy().start();
        loop {
            match fetcher.fetch(url).await {
                Ok(html) => return Some(html),
                Err(error) => {
                    tracing::debug!(
                        "fetch attempt {} failed for {url:?}: {error}",
                        backoff.failures() + 1
                    );
                    match backoff.next_delay() {
                        Some(delay) => self.pause.pause(delay).await,
                        None => {
                            tracing::warn!("all fetch attempts failed for {url:?}");
                            return None;
                        }
                    }
                }
            }
        }
    }

    pub async fn search(
        &self,
        request: &SearchRequest,
        sink: &mut dyn ResultSink,
    ) -> Result<SearchOutcome, IndexerError> {
        let fetcher = self
            .fetcher
            .clone()
            .ok_or_else(|| IndexerError::new(NAME, IndexerErrorReason::FetcherMissing))?;
        tracing::debug!(
            "{NAME} searching {:?} in {:?}",
            request.query,
            request.category
        );

        let parser = PageParser::new(
            RowExtractor::new(self.config.parser),
            MagnetResolver::new(Some(fetcher.clone())),
        );
        let max_pages = request.max_pages.filter(|limit| *limit > 0);
        let mut page = 1;
        let mut emitted = 0;

        let stop = loop {
            let url = self.page_url(&request.query, &request.category, page);
            let html = match self.fetch_with_retries(fetcher.as_ref(), &url).await {
                Some(html) if !html.trim().is_empty() => html,
                _ => break StopReason::PageUnavailable { page },
            };

            let records = parser
                .parse(&collapse_whitespaces(&html), &self.config.base_url)
                .await;
            if records.is_empty() {
                tracing::debug!("no result on page {page}, stopping");
                break StopReason::EmptyPage { page };
            }

            tracing::debug!("page {page} gave {} results", records.len());
            for record in records {
                sink.emit(record).map_err(|err| {
                    IndexerError::new(
                        NAME,
                        IndexerErrorReason::UnableToEmit {
                            cause: err.to_string(),
                        },
                    )
                })?;
                emitted += 1;
            }

            page += 1;
            if max_pages.map_or(false, |limit| page > limit) {
                break StopReason::PageLimit;
            }
            self.pause.pause(self.config.page_delay()).await;
        };

        sink.finish().map_err(|err| {
            IndexerError::new(
                NAME,
                IndexerErrorReason::UnableToEmit {
                    cause: err.to_string(),
                },
            )
        })?;

        Ok(SearchOutcome {
            pages: page - 1,
            emitted,
            stop,
        })
    }

    pub async fn collect(&self, request: &SearchRequest) -> Result<Vec<ResultRecord>, IndexerError> {
        let mut records = Vec::new();
        self.search(request, &mut records).await?;
        Ok(records)
    }
}
