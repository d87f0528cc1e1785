pub use bytesize;

use bytesize::ByteSize;
use std::time::Duration;

mod http;

pub use http::HttpFetcher;

#[async_trait::async_trait]
pub trait Fetcher: std::fmt::Debug + Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, IndexerError>;
}

#[async_trait::async_trait]
pub trait Pause: std::fmt::Debug + Send + Sync {
    async fn pause(&self, duration: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokioPause;

#[async_trait::async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub trait ResultSink {
    fn emit(&mut self, record: ResultRecord) -> std::io::Result<()>;

    fn finish(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl ResultSink for Vec<ResultRecord> {
    fn emit(&mut self, record: ResultRecord) -> std::io::Result<()> {
        self.push(record);
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct IndexerError {
    pub origin: &'static str,
    pub reason: IndexerErrorReason,
}

#[derive(Clone, Debug)]
pub enum IndexerErrorReason {
    EntryMagnetNotFound,
    FetcherMissing,
    InvalidConfig { cause: String },
    UnableToQuery { url: String, cause: String },
    UnableToRead { url: String, cause: String },
    UnableToEmit { cause: String },
}

impl IndexerError {
    pub fn new(origin: &'static str, reason: IndexerErrorReason) -> Self {
        Self { origin, reason }
    }
}

impl std::fmt::Display for IndexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "IndexerError {{ origin={:?}, reason={:?} }}",
            self.origin, self.reason
        )
    }
}

impl std::error::Error for IndexerError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRow {
    pub detail_url: String,
    pub name: String,
    pub seeds: String,
    pub leechers: String,
    pub size: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRecord {
    pub magnet: String,
    pub name: String,
    pub size_display: String,
    pub size: ByteSize,
    pub seeds: String,
    pub leechers: String,
    pub detail_url: String,
    pub source_url: String,
}

impl ResultRecord {
    pub fn size_bytes(&self) -> u64 {
        self.size.as_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ResultRecord {
        ResultRecord {
            magnet: format!("magnet:?xt=urn:btih:{name}"),
            name: name.into(),
            size_display: "1.00 KB".into(),
            size: ByteSize::b(1024),
            seeds: "1".into(),
            leechers: "0".into(),
            detail_url: format!("https://example.org/torrent/1/{name}/"),
            source_url: "https://example.org".into(),
        }
    }

    #[test]
    fn vec_sink_should_keep_order() {
        let mut sink: Vec<ResultRecord> = Vec::new();
        sink.emit(record("first")).unwrap();
        sink.emit(record("second")).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].name, "first");
        assert_eq!(sink[1].name, "second");
        assert_eq!(sink[1].size_bytes(), 1024);
    }

    #[test]
    fn error_should_display_origin_and_reason() {
        let err = IndexerError::new("1337x", IndexerErrorReason::FetcherMissing);
        assert_eq!(
            err.to_string(),
            "IndexerError { origin=\"1337x\", reason=FetcherMissing }"
        );
    }

    #[tokio::test]
    async fn tokio_pause_should_wait() {
        let start = tokio::time::Instant::now();
        TokioPause.pause(Duration::from_millis(5)).await;
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
