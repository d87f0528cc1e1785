use crate::magnet::MagnetResolver;
use crate::rows::RowExtractor;
use leetseek_indexer_helper::size;
use leetseek_indexer_prelude::{RawRow, ResultRecord};

#[derive(Debug)]
pub struct PageParser {
    extractor: RowExtractor,
    resolver: MagnetResolver,
}

impl PageParser {
    pub fn new(extractor: RowExtractor, resolver: MagnetResolver) -> Self {
        Self {
            extractor,
            resolver,
        }
    }

    async fn parse_row(&self, base_url: &str, row: RawRow) -> Option<ResultRecord> {
        let Some(magnet) = self.resolver.resolve(&row.detail_url).await else {
            tracing::debug!("dropping {:?}, no magnet found", row.name);
            return None;
        };
        let size = size::normalize(&row.size);

        Some(ResultRecord {
            magnet,
            name: row.name,
            size_display: size.display,
            size: size.bytes,
            seeds: row.seeds,
            leechers: row.leechers,
            detail_url: row.detail_url,
            source_url: base_url.to_string(),
        })
    }

    pub async fn parse(&self, html: &str, base_url: &str) -> Vec<ResultRecord> {
        let rows = self.extractor.extract(html, base_url);
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(record) = self.parse_row(base_url, row).await {
                records.push(record);
            }
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::ParserMode;
    use leetseek_indexer_prelude::{Fetcher, IndexerError, IndexerErrorReason};
    use std::sync::{Arc, Mutex};

    const BASE_URL: &str = "https://1337x.to";

    #[derive(Debug, Default)]
    struct StubFetcher {
        failing: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String, IndexerError> {
            self.calls.lock().unwrap().push(url.to_string());
            if self.failing.iter().any(|part| url.contains(part)) {
                return Err(IndexerError::new(
                    "stub",
                    IndexerErrorReason::UnableToQuery {
                        url: url.to_string(),
                        cause: "simulated".into(),
                    },
                ));
            }
            Ok(r#"href="magnet:?xt=urn:btih:FAKEHASH&dn=Example.Torrent""#.to_string())
        }
    }

    fn parser(fetcher: Arc<StubFetcher>) -> PageParser {
        PageParser::new(
            RowExtractor::new(ParserMode::Auto),
            MagnetResolver::new(Some(fetcher)),
        )
    }

    #[tokio::test]
    async fn should_parse_minimal_table() {
        let html = r#"
        <html>
        <body>
          <table>
            <tr>
              <td class="coll-1"><a href="/torrent/12345">Example.Torrent</a></td>
              <td class="coll-2">10</td>
              <td class="coll-3">5</td>
              <td class="coll-4">1.2 GB</td>
            </tr>
          </table>
        </body>
        </html>
        "#;
        let records = parser(Arc::default()).parse(html, BASE_URL).await;
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert!(record.magnet.starts_with("magnet:?xt=urn:btih:"));
        assert!(record.name.contains("Example.Torrent"));
        assert!(record.size_display.contains("GB"));
        assert_eq!(record.size_display, "1.20 GB");
        assert_eq!(record.size_bytes(), 1288490188);
        assert_eq!(record.seeds, "10");
        assert_eq!(record.leechers, "5");
        assert_eq!(record.detail_url, "https://1337x.to/torrent/12345");
        assert_eq!(record.source_url, BASE_URL);
    }

    #[tokio::test]
    async fn should_drop_rows_without_magnet() {
        let fetcher = Arc::new(StubFetcher {
            failing: vec!["/torrent/4436318/"],
            ..Default::default()
        });
        let records = parser(fetcher.clone())
            .parse(include_str!("./search.html"), BASE_URL)
            .await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "How I Met Your Mother - Season 4");
        assert_eq!(records[0].size_display, "4.10 GB");
        assert_eq!(
            records[1].name,
            "How I Met Your Mother Season 7 Complete HDTV Bzingaz"
        );
        assert_eq!(fetcher.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn should_return_nothing_without_rows() {
        let fetcher = Arc::new(StubFetcher::default());
        let records = parser(fetcher.clone())
            .parse("<html><body>No results were returned.</body></html>", BASE_URL)
            .await;
        assert!(records.is_empty());
        assert!(fetcher.calls.lock().unwrap().is_empty());
    }
}
