use leetseek_indexer_prelude::RawRow;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const DETAIL_PREFIX: &str = "/torrent/";

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(&format!(r#"a[href^="{DETAIL_PREFIX}"]"#)).unwrap());
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());

static ROW_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<tr(?:\s[^>]*)?>.+?</tr>").unwrap());
static TORRENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?s)<a href="(/torrent/[^"]+)"[^>]*>([^<]+)</a>.*?"#,
        r#"<td class="coll-2[^"]*">([^<]+)</td>.*?"#,
        r#"<td class="coll-3[^"]*">([^<]+)</td>.*?"#,
        r#"<td class="coll-4[^"]*">([^<]+)</td>"#,
    ))
    .unwrap()
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserMode {
    #[default]
    Auto,
    Structured,
    Pattern,
}

pub trait RowStrategy: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when the strategy cannot be applied to this document.
    fn extract(&self, html: &str, base_url: &str) -> Option<Vec<RawRow>>;
}

fn decode(value: &str) -> String {
    html_escape::decode_html_entities(value).trim().to_string()
}

fn detail_url(base_url: &str, path: &str) -> String {
    format!("{base_url}{path}")
}

fn cell_text(cells: &[ElementRef], index: usize, fallback: &str) -> String {
    cells
        .get(index)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

#[derive(Debug)]
pub struct Structured;

impl Structured {
    fn parse_row(base_url: &str, row: ElementRef) -> Option<RawRow> {
        let link = row.select(&LINK_SELECTOR).next()?;
        let path = link.value().attr("href")?;
        let cells = row.select(&CELL_SELECTOR).collect::<Vec<_>>();

        Some(RawRow {
            detail_url: detail_url(base_url, path),
            name: link.text().collect::<String>().trim().to_string(),
            seeds: cell_text(&cells, 1, "0"),
            leechers: cell_text(&cells, 2, "0"),
            size: cell_text(&cells, 3, ""),
        })
    }
}

impl RowStrategy for Structured {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn extract(&self, html: &str, base_url: &str) -> Option<Vec<RawRow>> {
        let document = Html::parse_document(html);
        let mut rows = document.select(&ROW_SELECTOR).peekable();
        rows.peek()?;

        let found = rows
            .filter_map(|row| Self::parse_row(base_url, row))
            .collect();
        Some(found)
    }
}

#[derive(Debug)]
pub struct PatternBased;

impl RowStrategy for PatternBased {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn extract(&self, html: &str, base_url: &str) -> Option<Vec<RawRow>> {
        let rows = ROW_PATTERN
            .find_iter(html)
            .filter_map(|chunk| TORRENT_PATTERN.captures(chunk.as_str()))
            .map(|cap| RawRow {
                detail_url: detail_url(base_url, &decode(&cap[1])),
                name: decode(&cap[2]),
                seeds: decode(&cap[3]),
                leechers: decode(&cap[4]),
                size: decode(&cap[5]),
            })
            .collect();
        Some(rows)
    }
}

#[derive(Debug)]
pub struct RowExtractor {
    strategies: Vec<Box<dyn RowStrategy>>,
}

impl Default for RowExtractor {
    fn default() -> Self {
        Self::new(ParserMode::Auto)
    }
}

impl RowExtractor {
    pub fn new(mode: ParserMode) -> Self {
        let strategies: Vec<Box<dyn RowStrategy>> = match mode {
            ParserMode::Auto => vec![Box::new(Structured), Box::new(PatternBased)],
            ParserMode::Structured => vec![Box::new(Structured)],
            ParserMode::Pattern => vec![Box::new(PatternBased)],
        };
        Self { strategies }
    }

    pub fn extract(&self, html: &str, base_url: &str) -> Vec<RawRow> {
        for strategy in self.strategies.iter() {
            match strategy.extract(html, base_url) {
                Some(rows) if !rows.is_empty() => {
                    tracing::debug!("{} strategy found {} rows", strategy.name(), rows.len());
                    return rows;
                }
                Some(_) => tracing::debug!("{} strategy found no row", strategy.name()),
                None => tracing::debug!("{} strategy not applicable", strategy.name()),
            }
        }
        Vec::new()
    }
}
