use std::time::Duration;

use show_sync_core::ProviderError;

use crate::types::{FindResponse, SearchResponse, TvDetails};

const BASE_URL: &str = "https://api.themoviedb.org/3";

/// Season sub-requests the API accepts per details call.
const MAX_SEASONS_PER_REQUEST: u32 = 20;

/// Blocking HTTP client for the TMDB API.
pub struct TmdbClient {
    http: reqwest::blocking::Client,
    api_key: String,
}

impl TmdbClient {
    pub fn new(api_key: &str) -> Result<Self, ProviderError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
        })
    }

    fn get_json(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, ProviderError> {
        let resp = self
            .http
            .get(format!("{BASE_URL}{path}"))
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()?;

        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            // TMDB error bodies carry a status_message field
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| {
                    v.get("status_message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| text.get(..200).unwrap_or(&text).to_string());
            return Err(ProviderError::Api(format!(
                "TMDB HTTP {}: {message}",
                status.as_u16()
            )));
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Resolve an IMDB ID to a TMDB TV series ID.
    pub fn find_tv_id(&self, imdb_id: &str) -> Result<u64, ProviderError> {
        let value = self.get_json(
            &format!("/find/{imdb_id}"),
            &[("external_source", "imdb_id")],
        )?;
        let resp: FindResponse = serde_json::from_value(value)?;
        resp.tv_results
            .first()
            .map(|r| r.id)
            .ok_or_else(|| ProviderError::NotFound(format!("No TV show found for IMDB ID: {imdb_id}")))
    }

    /// Fetch full TV details with credits, content ratings, keywords, watch
    /// providers, external IDs, and every season's episode list.
    ///
    /// The API caps appended sub-requests, so shows with more than 20 seasons
    /// need follow-up calls whose `season/N` payloads are merged into the
    /// first response before parsing.
    pub fn tv_details(&self, tmdb_id: u64) -> Result<TvDetails, ProviderError> {
        let mut append = String::from("credits,content_ratings,keywords,watch/providers,external_ids");
        for n in 1..=MAX_SEASONS_PER_REQUEST {
            append.push_str(&format!(",season/{n}"));
        }

        let path = format!("/tv/{tmdb_id}");
        let mut value = self.get_json(&path, &[("append_to_response", &append)])?;

        let season_count = value
            .get("number_of_seasons")
            .and_then(|n| n.as_u64())
            .unwrap_or(0) as u32;

        let mut batch_start = MAX_SEASONS_PER_REQUEST + 1;
        while batch_start <= season_count {
            let batch_end = (batch_start + MAX_SEASONS_PER_REQUEST - 1).min(season_count);
            let append: Vec<String> = (batch_start..=batch_end)
                .map(|n| format!("season/{n}"))
                .collect();
            let batch = self.get_json(&path, &[("append_to_response", &append.join(","))])?;

            if let (Some(target), Some(source)) = (value.as_object_mut(), batch.as_object()) {
                for (key, season) in source {
                    if key.starts_with("season/") {
                        target.insert(key.clone(), season.clone());
                    }
                }
            }
            batch_start = batch_end + 1;
        }

        Ok(serde_json::from_value(value)?)
    }

    /// One page of TV search results.
    pub fn search_tv_page(&self, query: &str, page: u32) -> Result<SearchResponse, ProviderError> {
        let page = page.to_string();
        let value = self.get_json("/search/tv", &[("query", query), ("page", &page)])?;
        Ok(serde_json::from_value(value)?)
    }
}
