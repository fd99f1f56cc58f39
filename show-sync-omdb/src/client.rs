use std::time::Duration;

use serde::{Deserialize, Serialize};

use show_sync_core::ProviderError;

const BASE_URL: &str = "http://www.omdbapi.com/";

/// One record as OMDB returns it: PascalCase keys, comma-joined lists, and
/// the literal string "N/A" for anything unknown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub rated: String,
    /// Release date as "08 Nov 2019".
    #[serde(default)]
    pub released: String,
    #[serde(default)]
    pub plot: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub actors: String,
    #[serde(default)]
    pub poster: String,
    #[serde(rename = "totalSeasons", default)]
    pub total_seasons: String,
    /// "True" or "False"; failures also set `error`.
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub error: String,
}

/// Blocking HTTP client for the OMDB API.
pub struct OmdbClient {
    http: reqwest::blocking::Client,
    api_key: String,
}

impl OmdbClient {
    pub fn new(api_key: &str) -> Result<Self, ProviderError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
        })
    }

    /// Look up a title by IMDB ID.
    ///
    /// OMDB reports failures as HTTP 200 with `Response: "False"`, so the
    /// body is checked as well as the status.
    pub fn lookup(&self, imdb_id: &str) -> Result<OmdbRecord, ProviderError> {
        let resp = self
            .http
            .get(BASE_URL)
            .query(&[
                ("i", imdb_id),
                ("r", "json"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()?;

        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(ProviderError::Api(format!(
                "OMDB HTTP {}: {}",
                status.as_u16(),
                text.get(..200).unwrap_or(&text)
            )));
        }

        let record: OmdbRecord = serde_json::from_str(&text)?;
        if record.response == "False" {
            let message = if record.error.is_empty() {
                "OMDB request failed"
            } else {
                record.error.as_str()
            };
            return Err(ProviderError::NotFound(format!(
                "{message} (IMDB ID: {imdb_id})"
            )));
        }
        Ok(record)
    }
}
