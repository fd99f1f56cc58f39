//! The movies flow: a straight OMDB refresh over every row with an IMDB ID.

use show_sync_core::{EntityProvider, MovieEntity};
use show_sync_notion::{NotionApi, NotionRow};

use crate::error::SyncError;
use crate::fields;
use crate::report::SyncReport;

/// Reconciles the movies database against OMDB.
pub struct MovieSync<'a, P, S> {
    provider: &'a P,
    store: &'a S,
    movies_db: String,
}

impl<'a, P, S> MovieSync<'a, P, S>
where
    P: EntityProvider<Entity = MovieEntity>,
    S: NotionApi,
{
    pub fn new(provider: &'a P, store: &'a S, movies_db: impl Into<String>) -> Self {
        Self {
            provider,
            store,
            movies_db: movies_db.into(),
        }
    }

    /// Refresh every movie row. There is no hint policy here; the provider
    /// cache is what keeps repeat runs cheap.
    pub fn run(&self) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::new();
        let pages = self.store.query_all(&self.movies_db)?;
        log::info!("Loaded {} movie rows from the store", pages.len());

        for page in pages {
            let mut row = NotionRow::from_page(&page);
            let Some(imdb_id) = fields::imdb_id(&row) else {
                log::warn!("Skipping movie row {} without a usable IMDB ID", row.row_id());
                continue;
            };
            self.process_row(&mut row, &imdb_id, &mut report);
        }
        Ok(report)
    }

    fn process_row(&self, row: &mut NotionRow, imdb_id: &str, report: &mut SyncReport) {
        let entity = match self.provider.fetch(imdb_id, false) {
            Ok(entity) => entity,
            Err(error) => {
                let line = format!("No entity found for IMDB ID: {imdb_id}");
                log::warn!("{line} ({error})");
                report.add_error(line);
                report.stats_mut().failed += 1;
                return;
            }
        };

        // The poster label prefers the row's own title; OMDB's is a fallback.
        let poster_label = row
            .title(fields::TITLE)
            .ok()
            .and_then(|fragments| fragments.first().cloned())
            .unwrap_or_else(|| entity.title.clone());

        let result = fields::map_movie_row(row, &entity, &poster_label)
            .and_then(|()| row.commit(self.store).map(|_| ()));
        match result {
            Ok(()) => report.stats_mut().updated += 1,
            Err(error) => {
                let line = format!("Failed to update Notion row for IMDB ID {imdb_id}: {error}");
                log::warn!("{line}");
                report.add_error(line);
                report.stats_mut().failed += 1;
            }
        }
    }
}
