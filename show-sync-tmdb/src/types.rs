use std::collections::HashMap;

use serde::Deserialize;

/// Base URL for backdrop images at a web-friendly width.
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w780";

/// Country whose content rating and watch providers the sync reports.
pub const DEFAULT_COUNTRY: &str = "US";

/// Response from `/find/{imdb_id}`.
#[derive(Debug, Deserialize)]
pub struct FindResponse {
    #[serde(default)]
    pub tv_results: Vec<FindResult>,
}

#[derive(Debug, Deserialize)]
pub struct FindResult {
    pub id: u64,
}

/// Full TV details with the appended sub-requests merged in.
///
/// Season payloads arrive as dynamic `season/N` keys at the top level of the
/// response, so they land in `extra` and are parsed on demand.
#[derive(Debug, Deserialize)]
pub struct TvDetails {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub original_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub number_of_seasons: u32,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub genres: Vec<Named>,
    #[serde(default)]
    pub created_by: Vec<Named>,
    #[serde(default)]
    pub production_companies: Vec<Named>,
    #[serde(default)]
    pub networks: Vec<Named>,
    #[serde(default)]
    pub production_countries: Vec<Country>,
    #[serde(default)]
    pub spoken_languages: Vec<Language>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub content_ratings: ContentRatings,
    #[serde(default)]
    pub keywords: Keywords,
    #[serde(rename = "watch/providers", default)]
    pub watch_providers: WatchProviders,
    #[serde(default)]
    pub external_ids: ExternalIds,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Named {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Country {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Language {
    #[serde(default)]
    pub english_name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<Named>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentRatings {
    #[serde(default)]
    pub results: Vec<RatingEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RatingEntry {
    #[serde(default)]
    pub iso_3166_1: String,
    #[serde(default)]
    pub rating: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Keywords {
    #[serde(default)]
    pub results: Vec<Named>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WatchProviders {
    #[serde(default)]
    pub results: HashMap<String, CountryProviders>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CountryProviders {
    #[serde(default)]
    pub flatrate: Vec<Provider>,
}

#[derive(Debug, Deserialize)]
pub struct Provider {
    #[serde(default)]
    pub provider_name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExternalIds {
    #[serde(default)]
    pub imdb_id: Option<String>,
}

/// One season's full payload from a `season/N` sub-request.
#[derive(Debug, Deserialize)]
pub struct SeasonDetails {
    #[serde(default)]
    pub season_number: u32,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Deserialize)]
pub struct Episode {
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
}

impl TvDetails {
    /// Full backdrop image URL, when the show has one.
    pub fn backdrop_url(&self) -> Option<String> {
        self.backdrop_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{IMAGE_BASE}{p}"))
    }

    /// The content rating for a country, falling back to the US rating.
    pub fn content_rating(&self, country: &str) -> Option<&str> {
        let lookup = |code: &str| {
            self.content_ratings
                .results
                .iter()
                .find(|r| r.iso_3166_1 == code)
                .map(|r| r.rating.as_str())
                .filter(|r| !r.is_empty())
        };
        lookup(country).or_else(|| lookup(DEFAULT_COUNTRY))
    }

    /// Names of the flatrate streaming providers for a country.
    pub fn watch_provider_names(&self, country: &str) -> Vec<String> {
        self.watch_providers
            .results
            .get(country)
            .map(|c| c.flatrate.iter().map(|p| p.provider_name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn cast_names(&self) -> Vec<String> {
        self.credits.cast.iter().map(|c| c.name.clone()).collect()
    }

    pub fn creator_names(&self) -> Vec<String> {
        self.created_by.iter().map(|c| c.name.clone()).collect()
    }

    pub fn company_names(&self) -> Vec<String> {
        self.production_companies
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn network_names(&self) -> Vec<String> {
        self.networks.iter().map(|n| n.name.clone()).collect()
    }

    pub fn country_names(&self) -> Vec<String> {
        self.production_countries
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// English names of the spoken languages.
    pub fn language_names(&self) -> Vec<String> {
        self.spoken_languages
            .iter()
            .map(|l| l.english_name.clone())
            .collect()
    }

    pub fn genre_names(&self) -> Vec<String> {
        self.genres.iter().map(|g| g.name.clone()).collect()
    }

    pub fn keyword_names(&self) -> Vec<String> {
        self.keywords.results.iter().map(|k| k.name.clone()).collect()
    }

    /// Parse the appended `season/N` payload, if the response carried it.
    pub fn season(&self, number: u32) -> Option<SeasonDetails> {
        let raw = self.extra.get(&format!("season/{number}"))?;
        serde_json::from_value(raw.clone()).ok()
    }
}

/// Response page from `/search/tv`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub overview: String,
}
