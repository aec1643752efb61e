use crate::errors::ConfigError;
use std::{env, net::SocketAddr};

pub const ONTARIO_CSV_URL: &str = "https://data.ontario.ca/dataset/f4f86e54-872d-43f8-8a86-3892fd3cb5e6/resource/ed270bb8-340b-41f9-a7c6-e8ef587e6d11/download/covidtesting.csv";
pub const ONTARIO_JSON_URL: &str = "https://data.ontario.ca/api/3/action/datastore_search?resource_id=ed270bb8-340b-41f9-a7c6-e8ef587e6d11";
pub const DEFAULT_JSON_LIMIT: u32 = 1000;
pub const DEFAULT_TITLE: &str = "Ontario COVID-19 Data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    /// CKAN `datastore_search` response, paged by a `limit` parameter.
    Json { limit: u32 },
}

/// Which tab groups the page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Cases,
    CasesAndDeaths,
}

impl Variant {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cases" => Some(Self::Cases),
            "cases-and-deaths" | "deaths" => Some(Self::CasesAndDeaths),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub url: String,
    pub format: DataFormat,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub title: String,
    pub variant: Variant,
    pub source: SourceConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|err| ConfigError {
                key: "PORT",
                message: err.to_string(),
            })?,
            None => 8080,
        };

        let variant = match lookup("DASHBOARD_VARIANT") {
            Some(value) => Variant::parse(&value).ok_or_else(|| ConfigError {
                key: "DASHBOARD_VARIANT",
                message: format!("expected 'cases' or 'cases-and-deaths', got '{value}'"),
            })?,
            None => Variant::Cases,
        };

        let limit = match lookup("DATASET_LIMIT") {
            Some(value) => value.trim().parse::<u32>().map_err(|err| ConfigError {
                key: "DATASET_LIMIT",
                message: err.to_string(),
            })?,
            None => DEFAULT_JSON_LIMIT,
        };

        let format = match lookup("DATASET_FORMAT").as_deref().map(str::trim) {
            None | Some("csv") => DataFormat::Csv,
            Some("json") => DataFormat::Json { limit },
            Some(other) => {
                return Err(ConfigError {
                    key: "DATASET_FORMAT",
                    message: format!("expected 'csv' or 'json', got '{other}'"),
                });
            }
        };

        let url = lookup("DATASET_URL").unwrap_or_else(|| match format {
            DataFormat::Csv => ONTARIO_CSV_URL.to_string(),
            DataFormat::Json { .. } => ONTARIO_JSON_URL.to_string(),
        });

        let title = lookup("DASHBOARD_TITLE")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        Ok(Self {
            port,
            title,
            variant,
            source: SourceConfig { url, format },
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_ontario_csv_case_tabs() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.variant, Variant::Cases);
        assert_eq!(config.source.format, DataFormat::Csv);
        assert_eq!(config.source.url, ONTARIO_CSV_URL);
        assert_eq!(config.title, DEFAULT_TITLE);
    }

    #[test]
    fn json_format_picks_datastore_url_and_limit() {
        let config = config_from(&[("DATASET_FORMAT", "json"), ("DATASET_LIMIT", "250")]).unwrap();
        assert_eq!(config.source.format, DataFormat::Json { limit: 250 });
        assert_eq!(config.source.url, ONTARIO_JSON_URL);
    }

    #[test]
    fn rejects_unknown_variant() {
        let err = config_from(&[("DASHBOARD_VARIANT", "vaccines")]).unwrap_err();
        assert_eq!(err.key, "DASHBOARD_VARIANT");
    }

    #[test]
    fn rejects_bad_port() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(err.key, "PORT");
    }
}
