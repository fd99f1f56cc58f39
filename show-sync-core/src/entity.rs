use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Snapshot of one TV show as reported by the metadata provider.
///
/// Entities are immutable once fetched; the sync maps their fields onto store
/// rows but never writes back. `fetched_at` is the date the provider was
/// actually contacted, which may be older than today when the snapshot came
/// out of the on-disk cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowEntity {
    pub imdb_id: String,
    pub tmdb_id: u64,
    pub title: String,
    pub original_title: String,
    pub tagline: String,
    pub plot: String,
    /// Full image URL, absent when the provider has no backdrop.
    pub backdrop_url: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Production status (e.g. "Returning Series", "Ended").
    pub status: String,
    /// Show format (e.g. "Scripted", "Miniseries").
    pub kind: String,
    pub content_rating: Option<String>,
    pub cast: Vec<String>,
    pub creators: Vec<String>,
    pub production_companies: Vec<String>,
    pub networks: Vec<String>,
    pub watch_providers: Vec<String>,
    pub countries: Vec<String>,
    pub languages: Vec<String>,
    pub genres: Vec<String>,
    pub keywords: Vec<String>,
    pub season_count: u32,
    pub rating: f64,
    pub fetched_at: NaiveDate,
    /// Per-season details keyed by season number (specials under 0 are not
    /// tracked; reconciliation walks 1..=season_count).
    pub seasons: BTreeMap<u32, SeasonEntity>,
}

impl ShowEntity {
    /// Get the details for one season, if the provider reported it.
    pub fn season(&self, number: u32) -> Option<&SeasonEntity> {
        self.seasons.get(&number)
    }
}

/// One season of a show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonEntity {
    pub air_date: Option<NaiveDate>,
    /// Air date of the last episode the provider knows about.
    pub finale_date: Option<NaiveDate>,
    pub overview: String,
    pub episode_count: u32,
    /// Runtime in minutes per episode; episodes without a runtime count as 0.
    pub episode_runtimes: Vec<u32>,
}

impl SeasonEntity {
    /// Total runtime of the season in minutes.
    pub fn total_runtime(&self) -> u32 {
        self.episode_runtimes.iter().sum()
    }
}

/// Snapshot of one movie (or show) as reported by OMDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieEntity {
    pub imdb_id: String,
    pub title: String,
    /// Age classification (e.g. "PG-13"), absent when unrated.
    pub rated: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub plot: String,
    pub genres: Vec<String>,
    pub countries: Vec<String>,
    pub actors: Vec<String>,
    pub languages: Vec<String>,
    pub poster_url: Option<String>,
    /// 0 for actual movies; OMDB reports this for series records too.
    pub total_seasons: u32,
    pub fetched_at: NaiveDate,
}
