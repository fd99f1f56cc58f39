use chrono::NaiveDate;

use show_sync_core::cache::{CacheEntry, EntityCache};
use show_sync_core::entity::MovieEntity;
use show_sync_core::error::ProviderError;
use show_sync_core::provider::EntityProvider;

use crate::client::{OmdbClient, OmdbRecord};

/// How long a cached movie snapshot stays fresh. OMDB data moves slowly.
pub const CACHE_TTL_DAYS: i64 = 60;

const CACHE_DIR: &str = "omdb";

/// The default on-disk cache for OMDB snapshots.
pub fn default_cache() -> Result<EntityCache, ProviderError> {
    EntityCache::open(CACHE_DIR, CACHE_TTL_DAYS)
}

/// Cache-first movie provider backed by OMDB.
pub struct OmdbProvider {
    client: OmdbClient,
    cache: EntityCache,
}

impl OmdbProvider {
    pub fn new(api_key: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: OmdbClient::new(api_key)?,
            cache: default_cache()?,
        })
    }

    /// Build a provider over an explicit cache (tests use a temp dir).
    pub fn with_cache(client: OmdbClient, cache: EntityCache) -> Self {
        Self { client, cache }
    }
}

impl EntityProvider for OmdbProvider {
    type Entity = MovieEntity;

    fn fetch(&self, imdb_id: &str, force_refresh: bool) -> Result<MovieEntity, ProviderError> {
        let today = chrono::Local::now().date_naive();
        if !force_refresh {
            if let Some(entry) = self.cache.load::<MovieEntity>(imdb_id, today)? {
                log::debug!("OMDB cache hit for {imdb_id}");
                return Ok(entry.value);
            }
        }

        log::debug!("Fetching {imdb_id} from OMDB");
        let record = self.client.lookup(imdb_id)?;
        let entity = build_entity(imdb_id, &record, today);
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

/// "N/A" and empty values read as absent.
fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "N/A" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split a comma-joined OMDB list field into trimmed values.
fn split_list(raw: &str) -> Vec<String> {
    if optional(raw).is_none() {
        return Vec::new();
    }
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn build_entity(imdb_id: &str, record: &OmdbRecord, fetched_at: NaiveDate) -> MovieEntity {
    MovieEntity {
        imdb_id: imdb_id.to_string(),
        title: record.title.clone(),
        rated: optional(&record.rated),
        release_date: NaiveDate::parse_from_str(record.released.trim(), "%d %b %Y").ok(),
        plot: record.plot.clone(),
        genres: split_list(&record.genre),
        countries: split_list(&record.country),
        actors: split_list(&record.actors),
        languages: split_list(&record.language),
        poster_url: optional(&record.poster),
        total_seasons: record.total_seasons.trim().parse().unwrap_or(0),
        fetched_at,
    }
}
