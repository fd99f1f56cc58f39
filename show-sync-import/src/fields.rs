//! Database field names and the provider-to-row mappings shared by the sync
//! flows.

use chrono::NaiveDate;
use show_sync_core::{MovieEntity, SeasonEntity, ShowEntity};
use show_sync_notion::{NotionError, NotionRow, UpdateMode};

// ── Show and watchlist databases ────────────────────────────────────────────

pub const TITLE: &str = "Title";
pub const IMDB_ID: &str = "IMDB ID";
pub const ORIGINAL_TITLE: &str = "Original Title";
pub const TAGLINE: &str = "Tagline";
pub const PLOT: &str = "Plot";
pub const BACKDROP: &str = "Backdrop";
pub const RELEASE_DATE: &str = "Release Date";
pub const STATUS: &str = "Status";
pub const TYPE: &str = "Type";
pub const CONTENT_RATING: &str = "Content Rating (US)";
pub const CAST: &str = "Cast";
pub const CREATORS: &str = "Creators";
pub const PRODUCTION_COMPANIES: &str = "Production Companies";
pub const NETWORKS: &str = "Networks";
pub const WATCH_PROVIDERS: &str = "Watch Providers (US)";
pub const COUNTRIES: &str = "Countries";
pub const LANGUAGES: &str = "Languages";
pub const GENRES: &str = "Genres";
pub const KEYWORDS: &str = "Keywords";
pub const NUMBER_OF_SEASONS: &str = "Number of Seasons";
pub const TMDB_RATING: &str = "TMDB Rating";
pub const SHOWS_DB_REFERENCE: &str = "Shows DB Reference";

// ── Seasons database ────────────────────────────────────────────────────────

pub const SEASON_INDEX: &str = "Season Index";
pub const SHOW_RELATION: &str = "Show";
pub const AIR_DATE: &str = "Air Date";
pub const FINALE_DATE: &str = "Finale Date";
pub const OVERVIEW: &str = "Overview";
pub const NUMBER_OF_EPISODES: &str = "Number of Episodes";
pub const TOTAL_RUNTIME: &str = "Total Runtime (mins)";
pub const EPISODE_RUNTIMES: &str = "Per Episode Runtimes (mins)";
pub const WATCH_STATUS: &str = "Watch Status";

pub const WATCH_STATUS_NOT_STARTED: &str = "Not Started";

// ── Movies database ─────────────────────────────────────────────────────────

pub const ACTORS: &str = "Actors";
pub const POSTER: &str = "Poster";
pub const RATED: &str = "Rated";
pub const TOTAL_SEASONS: &str = "Total Seasons";

// ── Import bookkeeping ──────────────────────────────────────────────────────

pub const IMPORT_HINT: &str = "[IMPORT] Next Import Hint";
pub const LAST_IMPORT_DATE: &str = "[IMPORT] Last Import Date";
pub const IMPORT_ERRORS: &str = "[IMPORT] Errors";

/// Multi-select options treat commas as separators, so values derived from
/// free text ("Smith, Jr.") have theirs stripped before tagging.
pub fn sanitize_tags(values: &[String]) -> Vec<String> {
    values.iter().map(|value| value.replace(',', "")).collect()
}

/// Stage every show-level field from the provider snapshot onto the row.
///
/// Optional provider data (backdrop, release date, content rating) is left
/// alone when absent rather than cleared.
pub fn map_show_row(row: &mut NotionRow, entity: &ShowEntity) -> Result<(), NotionError> {
    row.set_text(ORIGINAL_TITLE, &entity.original_title)?;
    row.set_text(TAGLINE, &entity.tagline)?;
    row.set_text(PLOT, &entity.plot)?;
    if let Some(url) = &entity.backdrop_url {
        row.set_files(BACKDROP, url, Some(&entity.title))?;
    }
    if let Some(date) = entity.release_date {
        row.set_date(RELEASE_DATE, date)?;
    }
    row.set_select(STATUS, &entity.status)?;
    row.set_select(TYPE, &entity.kind)?;
    if let Some(rating) = &entity.content_rating {
        row.set_select(CONTENT_RATING, rating)?;
    }
    row.set_multi_select(CAST, &sanitize_tags(&entity.cast))?;
    row.set_multi_select(CREATORS, &sanitize_tags(&entity.creators))?;
    row.set_multi_select(PRODUCTION_COMPANIES, &sanitize_tags(&entity.production_companies))?;
    row.set_multi_select(NETWORKS, &sanitize_tags(&entity.networks))?;
    row.set_multi_select(WATCH_PROVIDERS, &sanitize_tags(&entity.watch_providers))?;
    row.set_multi_select(KEYWORDS, &sanitize_tags(&entity.keywords))?;
    row.set_multi_select(COUNTRIES, &entity.countries)?;
    row.set_multi_select(LANGUAGES, &entity.languages)?;
    row.set_multi_select(GENRES, &entity.genres)?;
    row.set_number(NUMBER_OF_SEASONS, f64::from(entity.season_count))?;
    row.set_number(TMDB_RATING, entity.rating)?;
    row.set_date(LAST_IMPORT_DATE, entity.fetched_at)?;
    Ok(())
}

/// Stage every season-level field. The backdrop comes from the show, labeled
/// with the season it decorates.
pub fn map_season_row(
    row: &mut NotionRow,
    shows_db: &str,
    show_row_id: &str,
    entity: &ShowEntity,
    number: u32,
    season: &SeasonEntity,
) -> Result<(), NotionError> {
    row.set_relation(
        SHOW_RELATION,
        &[show_row_id.to_string()],
        UpdateMode::Replace,
        Some(shows_db),
    )?;
    if let Some(date) = season.air_date {
        row.set_date(AIR_DATE, date)?;
    }
    if let Some(date) = season.finale_date {
        row.set_date(FINALE_DATE, date)?;
    }
    row.set_text(OVERVIEW, &season.overview)?;
    row.set_number(NUMBER_OF_EPISODES, f64::from(season.episode_count))?;
    row.set_number(TOTAL_RUNTIME, f64::from(season.total_runtime()))?;
    let runtimes: Vec<String> = season.episode_runtimes.iter().map(u32::to_string).collect();
    row.set_text(EPISODE_RUNTIMES, &runtimes.join(", "))?;
    if let Some(url) = &entity.backdrop_url {
        let label = format!("{} Season {number}", entity.title);
        row.set_files(BACKDROP, url, Some(&label))?;
    }
    row.set_date(LAST_IMPORT_DATE, entity.fetched_at)?;
    Ok(())
}

/// Stage every movie-level field from the OMDB snapshot.
pub fn map_movie_row(
    row: &mut NotionRow,
    entity: &MovieEntity,
    poster_label: &str,
) -> Result<(), NotionError> {
    row.set_text(PLOT, &entity.plot)?;
    row.set_multi_select(GENRES, &entity.genres)?;
    row.set_multi_select(LANGUAGES, &entity.languages)?;
    row.set_multi_select(ACTORS, &entity.actors)?;
    row.set_multi_select(COUNTRIES, &entity.countries)?;
    if let Some(url) = &entity.poster_url {
        row.set_files(POSTER, url, Some(poster_label))?;
    }
    if let Some(rated) = &entity.rated {
        row.set_select(RATED, rated)?;
    }
    if let Some(date) = entity.release_date {
        row.set_date(RELEASE_DATE, date)?;
    }
    row.set_number(TOTAL_SEASONS, f64::from(entity.total_seasons))?;
    row.set_date(LAST_IMPORT_DATE, entity.fetched_at)?;
    Ok(())
}

/// Stage the error text and a refreshed import date so a broken row stops
/// being retried every run.
pub fn stage_error(row: &mut NotionRow, message: &str, today: NaiveDate) -> Result<(), NotionError> {
    row.set_text(IMPORT_ERRORS, message)?;
    row.set_date(LAST_IMPORT_DATE, today)?;
    Ok(())
}

/// The row's IMDB ID, if it has a non-blank one.
pub fn imdb_id(row: &NotionRow) -> Option<String> {
    row.text(IMDB_ID)
        .ok()
        .and_then(|fragments| fragments.first().cloned())
        .filter(|id| !id.trim().is_empty())
}

/// The row's last import date, absent when the field is empty or garbled.
pub fn last_import_date(row: &NotionRow) -> Option<NaiveDate> {
    row.date(LAST_IMPORT_DATE)
        .ok()
        .flatten()
        .and_then(|raw| NaiveDate::parse_from_str(raw.get(..10).unwrap_or(&raw), "%Y-%m-%d").ok())
}
