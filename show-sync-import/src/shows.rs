//! The shows flow: join store rows to TMDB snapshots and write back every
//! field the provider knows better, reconciling season rows along the way.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use show_sync_core::{EntityProvider, SeasonEntity, ShowEntity};
use show_sync_notion::{ColumnType, NotionApi, NotionError, NotionRow};

use crate::error::SyncError;
use crate::fields;
use crate::policy::{ImportHint, UpdatePolicy};
use crate::report::SyncReport;

pub const SEASON_ICON: &str = "https://www.notion.so/icons/view_green.svg";

/// One show row joined to its provider snapshot and its season rows, the
/// latter keyed by their "Season Index" title ("Season 3").
struct ShowRecord {
    imdb_id: String,
    row: NotionRow,
    entity: Option<ShowEntity>,
    seasons: HashMap<String, NotionRow>,
}

/// Reconciles the shows database and its seasons database against TMDB.
pub struct ShowSync<'a, P, S> {
    provider: &'a P,
    store: &'a S,
    policy: UpdatePolicy,
    shows_db: String,
    seasons_db: String,
}

impl<'a, P, S> ShowSync<'a, P, S>
where
    P: EntityProvider<Entity = ShowEntity>,
    S: NotionApi,
{
    pub fn new(
        provider: &'a P,
        store: &'a S,
        shows_db: impl Into<String>,
        seasons_db: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            store,
            policy: UpdatePolicy::new(),
            shows_db: shows_db.into(),
            seasons_db: seasons_db.into(),
        }
    }

    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the sync.
    ///
    /// An empty `input_ids` slice means every row. Otherwise only rows whose
    /// IMDB ID is listed are touched, and listed IDs that match no row come
    /// back on the report as invalid.
    ///
    /// The run moves through four phases: load both databases, join season
    /// rows to their shows, fetch one snapshot per show, then process each
    /// record in turn. A problem with one record never stops the others.
    pub fn run(&self, input_ids: &[String]) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::new();

        let mut records = self.load_shows(input_ids)?;
        log::info!("Loaded {} show rows from the store", records.len());
        self.join_seasons(&mut records)?;
        self.fetch_entities(&mut records);

        for record in &mut records {
            self.process_record(record, &mut report);
        }

        if !input_ids.is_empty() {
            report.set_invalid_ids(invalid_ids(&records, input_ids));
        }
        Ok(report)
    }

    fn load_shows(&self, input_ids: &[String]) -> Result<Vec<ShowRecord>, SyncError> {
        let wanted: Option<HashSet<&str>> = if input_ids.is_empty() {
            None
        } else {
            Some(input_ids.iter().map(String::as_str).collect())
        };

        let mut records = Vec::new();
        for page in self.store.query_all(&self.shows_db)? {
            let row = NotionRow::from_page(&page);
            let Some(imdb_id) = fields::imdb_id(&row) else {
                log::warn!("Skipping show row {} without a usable IMDB ID", row.row_id());
                continue;
            };
            if let Some(wanted) = &wanted {
                if !wanted.contains(imdb_id.as_str()) {
                    continue;
                }
            }
            records.push(ShowRecord {
                imdb_id,
                row,
                entity: None,
                seasons: HashMap::new(),
            });
        }
        Ok(records)
    }

    fn join_seasons(&self, records: &mut [ShowRecord]) -> Result<(), SyncError> {
        let index: HashMap<String, usize> = records
            .iter()
            .enumerate()
            .map(|(position, record)| (record.row.row_id().to_string(), position))
            .collect();

        for page in self.store.query_all(&self.seasons_db)? {
            let row = NotionRow::from_page(&page);
            let label = match row.title(fields::SEASON_INDEX) {
                Ok(fragments) if !fragments.is_empty() => fragments.concat(),
                _ => {
                    log::warn!("Skipping season row {} without a Season Index title", row.row_id());
                    continue;
                }
            };
            let parents = match row.relation(fields::SHOW_RELATION) {
                Ok(ids) if !ids.is_empty() => ids,
                _ => {
                    log::warn!("Skipping season row {} with no Show relation", row.row_id());
                    continue;
                }
            };
            // Seasons pointing at shows outside this run are not ours to touch.
            let Some(&position) = parents.first().and_then(|id| index.get(id.as_str())) else {
                continue;
            };
            records[position].seasons.insert(label, row);
        }
        Ok(())
    }

    fn fetch_entities(&self, records: &mut [ShowRecord]) {
        for record in records.iter_mut() {
            let hint = hint_of(&record.row);
            let last_import = fields::last_import_date(&record.row);
            let force = self.policy.needs_refresh(&hint, last_import);
            match self.provider.fetch(&record.imdb_id, force) {
                Ok(entity) => record.entity = Some(entity),
                Err(error) => log::warn!("Failed to fetch {}: {error}", record.imdb_id),
            }
        }
    }

    fn process_record(&self, record: &mut ShowRecord, report: &mut SyncReport) {
        if record.entity.is_none() {
            let line = format!("No entity found for IMDB ID: {}", record.imdb_id);
            log::warn!("{line}");
            report.add_error(line.clone());
            report.stats_mut().failed += 1;
            record_row_error(self.store, &mut record.row, &line, self.policy.today());
            return;
        }

        let hint = hint_of(&record.row);
        let last_import = fields::last_import_date(&record.row);
        if !self.policy.is_eligible(&hint, last_import) {
            log::info!(
                "Skipping update for IMDB ID: {} with import_hint={hint}",
                record.imdb_id
            );
            report.stats_mut().skipped += 1;
            return;
        }

        let automated = self.policy.is_automated(&hint, last_import);
        match self.update_show(record, automated) {
            Ok(()) => report.stats_mut().updated += 1,
            Err(error) => {
                let line = format!(
                    "Failed to update Notion row for IMDB ID {}: {error}",
                    record.imdb_id
                );
                log::warn!("{line}");
                report.add_error(line.clone());
                report.stats_mut().failed += 1;
                record_row_error(self.store, &mut record.row, &line, self.policy.today());
            }
        }

        // Seasons are reconciled whether or not the show row took the write.
        self.reconcile_seasons(record, report);
    }

    fn update_show(&self, record: &mut ShowRecord, automated: bool) -> Result<(), NotionError> {
        let Some(entity) = record.entity.as_ref() else {
            return Ok(());
        };
        commit_show_update(self.store, &mut record.row, entity, automated)
    }

    fn reconcile_seasons(&self, record: &mut ShowRecord, report: &mut SyncReport) {
        let Some(entity) = record.entity.as_ref() else {
            return;
        };
        let show_row_id = record.row.row_id().to_string();

        for number in 1..=entity.season_count {
            let Some(season) = entity.season(number) else {
                log::warn!("TMDB has no season {number} for {}; leaving it alone", record.imdb_id);
                continue;
            };
            let label = format!("Season {number}");
            match record.seasons.get_mut(&label) {
                Some(row) => {
                    match self.write_season(row, &show_row_id, entity, number, season, false) {
                        Ok(()) => report.stats_mut().seasons_updated += 1,
                        Err(error) => {
                            log::warn!("Failed to update {label} of {}: {error}", record.imdb_id);
                            report.stats_mut().seasons_failed += 1;
                        }
                    }
                }
                None => match self.create_season(&show_row_id, entity, number, season, &label) {
                    Ok(()) => report.stats_mut().seasons_created += 1,
                    Err(error) => {
                        log::warn!("Failed to create {label} of {}: {error}", record.imdb_id);
                        report.stats_mut().seasons_failed += 1;
                    }
                },
            }
        }
    }

    fn write_season(
        &self,
        row: &mut NotionRow,
        show_row_id: &str,
        entity: &ShowEntity,
        number: u32,
        season: &SeasonEntity,
        is_new: bool,
    ) -> Result<(), NotionError> {
        fields::map_season_row(row, &self.shows_db, show_row_id, entity, number, season)?;
        if is_new {
            row.set_select(fields::WATCH_STATUS, fields::WATCH_STATUS_NOT_STARTED)?;
        }
        row.commit(self.store)?;
        Ok(())
    }

    fn create_season(
        &self,
        show_row_id: &str,
        entity: &ShowEntity,
        number: u32,
        season: &SeasonEntity,
        label: &str,
    ) -> Result<(), NotionError> {
        let mut row = NotionRow::new_in(&self.seasons_db).with_icon(SEASON_ICON);
        row.seed_title(fields::SEASON_INDEX, label);
        row.seed_relation(fields::SHOW_RELATION, &[show_row_id.to_string()]);
        row.seed_text(fields::OVERVIEW, &[season.overview.clone()]);
        row.commit(self.store)?;
        self.write_season(&mut row, show_row_id, entity, number, season, true)
    }
}

pub(crate) fn hint_of(row: &NotionRow) -> ImportHint {
    ImportHint::from_select(row.select(fields::IMPORT_HINT).ok().flatten().as_deref())
}

/// Stage the full show mapping plus the bookkeeping fields and commit.
///
/// A manual hint is spent here: unless the refresh was the rolling interval
/// acting on its own, the hint resets to "Check Status" so the row waits for
/// a person again. The errors field is wiped on every successful pass.
pub(crate) fn commit_show_update<S: NotionApi>(
    store: &S,
    row: &mut NotionRow,
    entity: &ShowEntity,
    automated: bool,
) -> Result<(), NotionError> {
    fields::map_show_row(row, entity)?;
    if !automated {
        row.set_select(fields::IMPORT_HINT, ImportHint::CheckStatus.as_str())?;
    }
    row.clear(ColumnType::RichText, fields::IMPORT_ERRORS)?;
    row.commit(store)?;
    Ok(())
}

/// Best-effort secondary write that parks the error text on the row itself,
/// so a broken row shows its problem in the database and stops being retried
/// every run.
pub(crate) fn record_row_error<S: NotionApi>(
    store: &S,
    row: &mut NotionRow,
    message: &str,
    today: NaiveDate,
) {
    let result = fields::stage_error(row, message, today).and_then(|()| row.commit(store).map(|_| ()));
    if let Err(error) = result {
        log::warn!("Failed to record the error on row {}: {error}", row.row_id());
    }
}

fn invalid_ids(records: &[ShowRecord], input_ids: &[String]) -> Vec<String> {
    let known: HashSet<&str> = records.iter().map(|record| record.imdb_id.as_str()).collect();
    let mut seen = HashSet::new();
    input_ids
        .iter()
        .filter(|id| !known.contains(id.as_str()) && seen.insert(id.as_str()))
        .cloned()
        .collect()
}
