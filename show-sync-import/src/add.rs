//! Adding a show by TMDB ID: create the row, then run the usual mapping.

use show_sync_core::ShowEntity;
use show_sync_notion::{NotionApi, NotionRow};
use show_sync_tmdb::TmdbProvider;

use crate::error::SyncError;
use crate::fields;
use crate::policy::ImportHint;

pub const SHOW_ICON: &str = "https://www.notion.so/icons/movie-clapboard-play_orange.svg";
pub const WATCHLIST_ICON: &str = "https://www.notion.so/icons/movie-clapboard-play_blue.svg";

/// Look the show up on TMDB by its TMDB ID and insert it into `database_id`.
pub fn add_show<S: NotionApi>(
    provider: &TmdbProvider,
    store: &S,
    database_id: &str,
    icon_url: &str,
    tmdb_id: u64,
) -> Result<NotionRow, SyncError> {
    let entity = provider.fetch_by_tmdb_id(tmdb_id)?;
    create_show_row(store, database_id, icon_url, &entity)
}

/// Insert a fresh row for `entity`: a minimal create carrying the title, the
/// IMDB ID, and an "Automate" hint, then the full field mapping as an
/// immediate follow-up update. The hint means the next scheduled run keeps
/// the row fresh without further attention.
pub fn create_show_row<S: NotionApi>(
    store: &S,
    database_id: &str,
    icon_url: &str,
    entity: &ShowEntity,
) -> Result<NotionRow, SyncError> {
    let mut row = NotionRow::new_in(database_id).with_icon(icon_url);
    row.seed_title(fields::TITLE, &entity.title);
    row.seed_text(fields::IMDB_ID, &[entity.imdb_id.clone()]);
    row.seed_select(fields::IMPORT_HINT, ImportHint::Automate.as_str());
    row.commit(store)?;

    fields::map_show_row(&mut row, entity)?;
    row.commit(store)?;
    log::info!("Added {} ({}) to the database", entity.title, entity.imdb_id);
    Ok(row)
}
