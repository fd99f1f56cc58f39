use std::collections::BTreeMap;

use chrono::NaiveDate;

use show_sync_core::cache::{CacheEntry, EntityCache};
use show_sync_core::entity::{SeasonEntity, ShowEntity};
use show_sync_core::error::ProviderError;
use show_sync_core::provider::EntityProvider;

use crate::client::TmdbClient;
use crate::types::{DEFAULT_COUNTRY, SearchResult, TvDetails};

/// How long a cached show snapshot stays fresh.
pub const CACHE_TTL_DAYS: i64 = 15;

const CACHE_DIR: &str = "tmdb";

/// The default on-disk cache for TMDB snapshots. The CLI's cache subcommands
/// open it directly.
pub fn default_cache() -> Result<EntityCache, ProviderError> {
    EntityCache::open(CACHE_DIR, CACHE_TTL_DAYS)
}

/// Cache-first show provider backed by TMDB.
pub struct TmdbProvider {
    client: TmdbClient,
    cache: EntityCache,
}

impl TmdbProvider {
    pub fn new(api_key: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: TmdbClient::new(api_key)?,
            cache: default_cache()?,
        })
    }

    /// Build a provider over an explicit cache (tests use a temp dir).
    pub fn with_cache(client: TmdbClient, cache: EntityCache) -> Self {
        Self { client, cache }
    }

    /// Fetch a show by its TMDB ID directly; the add flow starts from one.
    /// The IMDB ID is resolved from the show's external IDs so the created
    /// row can be synced later.
    pub fn fetch_by_tmdb_id(&self, tmdb_id: u64) -> Result<ShowEntity, ProviderError> {
        let today = today();
        let details = self.client.tv_details(tmdb_id)?;
        let imdb_id = details
            .external_ids
            .imdb_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ProviderError::NotFound(format!("No IMDB ID on TMDB series {tmdb_id}"))
            })?;

        let entity = build_entity(&imdb_id, &details, today);
        self.cache.store(
            &imdb_id,
            &CacheEntry {
                fetched_at: today,
                value: entity.clone(),
            },
        )?;
        Ok(entity)
    }

    /// Search TV shows by name.
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>, ProviderError> {
        crate::search::search_tv(&self.client, query)
    }

    fn fetch_fresh(&self, imdb_id: &str, today: NaiveDate) -> Result<ShowEntity, ProviderError> {
        let tmdb_id = self.client.find_tv_id(imdb_id)?;
        let details = self.client.tv_details(tmdb_id)?;
        let entity = build_entity(imdb_id, &details, today);
        self.cache.store(
            imdb_id,
            &CacheEntry {
                fetched_at: today,
                value: entity.clone(),
            },
        )?;
        Ok(entity)
    }
}

impl EntityProvider for TmdbProvider {
    type Entity = ShowEntity;

    fn fetch(&self, imdb_id: &str, force_refresh: bool) -> Result<ShowEntity, ProviderError> {
        let today = today();
        if !force_refresh {
            if let Some(entry) = self.cache.load::<ShowEntity>(imdb_id, today)? {
                log::debug!("TMDB cache hit for {imdb_id}");
                return Ok(entry.value);
            }
        }
        log::debug!("Fetching {imdb_id} from TMDB");
        self.fetch_fresh(imdb_id, today)
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// TMDB reports unknown dates as empty strings as often as nulls.
fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?, "%Y-%m-%d").ok()
}

/// Flatten the wire details into the provider-neutral snapshot.
fn build_entity(imdb_id: &str, details: &TvDetails, fetched_at: NaiveDate) -> ShowEntity {
    let mut seasons = BTreeMap::new();
    for number in 1..=details.number_of_seasons {
        let Some(season) = details.season(number) else {
            continue;
        };
        seasons.insert(
            number,
            SeasonEntity {
                air_date: parse_date(season.air_date.as_deref()),
                finale_date: season
                    .episodes
                    .last()
                    .and_then(|ep| parse_date(ep.air_date.as_deref())),
                overview: season.overview.clone(),
                episode_count: season.episodes.len() as u32,
                episode_runtimes: season
                    .episodes
                    .iter()
                    .map(|ep| ep.runtime.unwrap_or(0))
                    .collect(),
            },
        );
    }

    ShowEntity {
        imdb_id: imdb_id.to_string(),
        tmdb_id: details.id,
        title: details.name.clone(),
        original_title: details.original_name.clone(),
        tagline: details.tagline.clone(),
        plot: details.overview.clone(),
        backdrop_url: details.backdrop_url(),
        release_date: parse_date(details.first_air_date.as_deref()),
        status: details.status.clone(),
        kind: details.kind.clone(),
        content_rating: details.content_rating(DEFAULT_COUNTRY).map(str::to_string),
        cast: details.cast_names(),
        creators: details.creator_names(),
        production_companies: details.company_names(),
        networks: details.network_names(),
        watch_providers: details.watch_provider_names(DEFAULT_COUNTRY),
        countries: details.country_names(),
        languages: details.language_names(),
        genres: details.genre_names(),
        keywords: details.keyword_names(),
        season_count: details.number_of_seasons,
        rating: details.vote_average,
        fetched_at,
        seasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> TvDetails {
        serde_json::from_value(json!({
            "id": 1396,
            "name": "Breaking Bad",
            "original_name": "Breaking Bad",
            "tagline": "All Hail the King",
            "overview": "A chemistry teacher turns to crime.",
            "backdrop_path": "/bb.jpg",
            "first_air_date": "2008-01-20",
            "status": "Ended",
            "type": "Scripted",
            "number_of_seasons": 2,
            "vote_average": 8.9,
            "genres": [{"name": "Drama"}],
            "created_by": [{"name": "Vince Gilligan"}],
            "spoken_languages": [{"english_name": "English"}],
            "credits": {"cast": [{"name": "Bryan Cranston"}]},
            "external_ids": {"imdb_id": "tt0903747"},
            "season/1": {
                "season_number": 1,
                "air_date": "2008-01-20",
                "overview": "Season one.",
                "episodes": [
                    {"air_date": "2008-01-20", "runtime": 58},
                    {"air_date": "2008-03-09", "runtime": null},
                ],
            },
            // season/2 payload missing entirely
        }))
        .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn builds_the_snapshot_from_wire_details() {
        let entity = build_entity("tt0903747", &fixture(), day(2024, 6, 1));
        assert_eq!(entity.imdb_id, "tt0903747");
        assert_eq!(entity.tmdb_id, 1396);
        assert_eq!(entity.release_date, Some(day(2008, 1, 20)));
        assert_eq!(entity.backdrop_url.as_deref(), Some("https://image.tmdb.org/t/p/w780/bb.jpg"));
        assert_eq!(entity.cast, vec!["Bryan Cranston"]);
        assert_eq!(entity.season_count, 2);
        assert_eq!(entity.fetched_at, day(2024, 6, 1));
    }

    #[test]
    fn absent_runtimes_count_as_zero_and_finale_is_the_last_episode() {
        let entity = build_entity("tt0903747", &fixture(), day(2024, 6, 1));
        let season = entity.season(1).unwrap();
        assert_eq!(season.episode_runtimes, vec![58, 0]);
        assert_eq!(season.total_runtime(), 58);
        assert_eq!(season.finale_date, Some(day(2008, 3, 9)));
        assert_eq!(season.episode_count, 2);
    }

    #[test]
    fn seasons_without_payloads_are_left_out() {
        let entity = build_entity("tt0903747", &fixture(), day(2024, 6, 1));
        assert!(entity.season(1).is_some());
        assert!(entity.season(2).is_none());
    }

    #[test]
    fn empty_and_garbled_dates_parse_to_none() {
        assert_eq!(parse_date(None), None);
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(Some("not-a-date")), None);
        assert_eq!(parse_date(Some("2020-05-05")), Some(day(2020, 5, 5)));
    }

    #[test]
    fn fresh_cache_entries_are_served_without_the_client() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = EntityCache::open_under(tmp.path(), "tmdb", CACHE_TTL_DAYS).unwrap();
        let today = chrono::Local::now().date_naive();
        let entity = build_entity("tt0903747", &fixture(), today);
        cache
            .store(
                "tt0903747",
                &CacheEntry {
                    fetched_at: today,
                    value: entity,
                },
            )
            .unwrap();

        let client = TmdbClient::new("unused-key").unwrap();
        let provider = TmdbProvider::with_cache(client, cache);

        let fetched = provider.fetch("tt0903747", false).unwrap();
        assert_eq!(fetched.title, "Breaking Bad");
        assert_eq!(fetched.fetched_at, today);
    }
}
