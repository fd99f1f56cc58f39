//! The watchlist flow: keep future shows fresh and archive the ones that
//! have graduated into the main shows database.

use show_sync_core::{EntityProvider, ShowEntity};
use show_sync_notion::{NotionApi, NotionRow};

use crate::error::SyncError;
use crate::fields;
use crate::policy::UpdatePolicy;
use crate::report::SyncReport;
use crate::shows::{commit_show_update, hint_of, record_row_error};

/// Reconciles the watchlist database against TMDB.
pub struct WatchlistSync<'a, P, S> {
    provider: &'a P,
    store: &'a S,
    policy: UpdatePolicy,
    watchlist_db: String,
}

impl<'a, P, S> WatchlistSync<'a, P, S>
where
    P: EntityProvider<Entity = ShowEntity>,
    S: NotionApi,
{
    pub fn new(provider: &'a P, store: &'a S, watchlist_db: impl Into<String>) -> Self {
        Self {
            provider,
            store,
            policy: UpdatePolicy::new(),
            watchlist_db: watchlist_db.into(),
        }
    }

    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sweep the whole watchlist. A row with a non-empty "Shows DB Reference"
    /// relation has been promoted to the main database and is archived; the
    /// rest get the same refresh treatment as main-database rows.
    pub fn run(&self) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::new();
        let pages = self.store.query_all(&self.watchlist_db)?;
        log::info!("Loaded {} watchlist rows from the store", pages.len());

        for page in pages {
            let mut row = NotionRow::from_page(&page);
            let Some(imdb_id) = fields::imdb_id(&row) else {
                log::warn!("Skipping watchlist row {} without a usable IMDB ID", row.row_id());
                continue;
            };
            self.process_row(&mut row, &imdb_id, &mut report);
        }
        Ok(report)
    }

    fn process_row(&self, row: &mut NotionRow, imdb_id: &str, report: &mut SyncReport) {
        let hint = hint_of(row);
        let last_import = fields::last_import_date(row);
        let force = self.policy.needs_refresh(&hint, last_import);

        let entity = match self.provider.fetch(imdb_id, force) {
            Ok(entity) => entity,
            Err(error) => {
                log::warn!("Failed to fetch {imdb_id}: {error}");
                let line = format!("No entity found for IMDB ID: {imdb_id}");
                report.add_error(line.clone());
                report.stats_mut().failed += 1;
                record_row_error(self.store, row, &line, self.policy.today());
                return;
            }
        };

        let promoted = row
            .relation(fields::SHOWS_DB_REFERENCE)
            .map(|ids| !ids.is_empty())
            .unwrap_or(false);
        if promoted {
            match row.archive(self.store) {
                Ok(()) => {
                    log::info!("Archived watchlist row for IMDB ID: {imdb_id}");
                    report.stats_mut().archived += 1;
                }
                Err(error) => {
                    let line =
                        format!("Failed to archive watchlist row for IMDB ID {imdb_id}: {error}");
                    log::warn!("{line}");
                    report.add_error(line);
                    report.stats_mut().failed += 1;
                }
            }
            return;
        }

        if !self.policy.is_eligible(&hint, last_import) {
            log::info!("Skipping update for IMDB ID: {imdb_id} with import_hint={hint}");
            report.stats_mut().skipped += 1;
            return;
        }

        let automated = self.policy.is_automated(&hint, last_import);
        match commit_show_update(self.store, row, &entity, automated) {
            Ok(()) => report.stats_mut().updated += 1,
            Err(error) => {
                let line = format!("Failed to update Notion row for IMDB ID {imdb_id}: {error}");
                log::warn!("{line}");
                report.add_error(line.clone());
                report.stats_mut().failed += 1;
                record_row_error(self.store, row, &line, self.policy.today());
            }
        }
    }
}
