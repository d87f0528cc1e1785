use leetseek_indexer_1337x::SearchConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::from_path(PathBuf::from(path)),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        std::fs::read_to_string(path.as_ref())
            .map_err(|err| format!("unable to read {:?}: {err}", path.as_ref()))
            .and_then(|inner| Self::from_str(inner.as_str()))
    }

    pub fn from_str(inner: &str) -> Result<Self, String> {
        toml::from_str(inner).map_err(|err| err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use leetseek_indexer_1337x::ParserMode;

    #[test]
    fn should_use_defaults_for_empty_file() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.search.base_url, "https://1337x.to");
        assert_eq!(config.search.page_delay_ms, 3000);
        assert_eq!(config.search.retries, 2);
        assert_eq!(config.search.parser, ParserMode::Auto);
    }

    #[test]
    fn should_override_search_section() {
        let config = Config::from_str(
            r#"
[search]
base_url = "https://mirror.example"
page_delay_ms = 500
retry_factor = 2.0
parser = "structured"

[search.categories]
all = "search"
docs = "Documentaries"
"#,
        )
        .unwrap();
        assert_eq!(config.search.base_url, "https://mirror.example");
        assert_eq!(config.search.page_delay_ms, 500);
        assert_eq!(config.search.retry_factor, 2.0);
        assert_eq!(config.search.parser, ParserMode::Structured);
        assert_eq!(config.search.categories.len(), 2);
        assert_eq!(
            config.search.categories.get("docs").map(String::as_str),
            Some("Documentaries")
        );
    }

    #[test]
    fn should_reject_invalid_parser() {
        assert!(Config::from_str("[search]\nparser = \"magic\"\n").is_err());
    }

    #[test]
    fn should_report_missing_file() {
        let err = Config::from_path("/nonexistent/leetseek.toml").unwrap_err();
        assert!(err.contains("unable to read"));
    }
}
