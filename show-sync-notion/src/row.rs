use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::client::{NotionApi, Page};
use crate::error::NotionError;
use crate::property::{ColumnType, PropertyValue, parse_properties};

/// How a relation write treats page references already on the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Overwrite the stored references.
    Replace,
    /// Append to the stored references. Duplicates are not filtered out.
    Combine,
}

/// What `commit` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing was pending; no store call was made.
    Skipped,
    Created,
    Updated,
}

/// One database row with typed field access and change-set tracking.
///
/// Mutations never talk to the store; they stage values in a pending map
/// which [`NotionRow::commit`] sends as a single create or update. Date,
/// number, and select writes are diffed against the loaded state and stage
/// nothing when the value is already current, which is what makes a re-run
/// of the sync a no-op. Rich text, multi-select, and file writes always
/// stage; callers relying on idempotence must not route unchanged values
/// through those setters expecting a skip.
#[derive(Debug, Clone, Default)]
pub struct NotionRow {
    row_id: String,
    database_id: Option<String>,
    icon: Option<String>,
    properties: BTreeMap<String, PropertyValue>,
    pending: BTreeMap<String, PropertyValue>,
}

impl NotionRow {
    /// Wrap a page loaded from the store.
    pub fn from_page(page: &Page) -> Self {
        Self {
            row_id: page.id.clone(),
            properties: parse_properties(&page.properties),
            ..Default::default()
        }
    }

    /// Start a row that does not exist in the store yet. The first commit
    /// creates it in `database_id`.
    pub fn new_in(database_id: &str) -> Self {
        Self {
            database_id: Some(database_id.to_string()),
            ..Default::default()
        }
    }

    /// Set the external icon URL used when the row is created.
    pub fn with_icon(mut self, url: &str) -> Self {
        self.icon = Some(url.to_string());
        self
    }

    /// The store's page ID; empty until the row is created.
    pub fn row_id(&self) -> &str {
        &self.row_id
    }

    pub fn is_persisted(&self) -> bool {
        !self.row_id.is_empty()
    }

    /// True when uncommitted field writes are staged.
    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    fn get(&self, name: &str) -> Result<&PropertyValue, NotionError> {
        self.properties
            .get(name)
            .ok_or_else(|| NotionError::FieldMissing(name.to_string()))
    }

    fn mismatch(&self, name: &str, expected: ColumnType, found: &PropertyValue) -> NotionError {
        NotionError::TypeMismatch {
            name: name.to_string(),
            expected,
            found: found.column_type(),
        }
    }

    // ------------------------------------------------------------------
    // Getters (committed state only; staged writes are not visible)
    // ------------------------------------------------------------------

    /// Plain text of each title fragment.
    pub fn title(&self, name: &str) -> Result<Vec<String>, NotionError> {
        match self.get(name)? {
            PropertyValue::Title { title } => {
                Ok(title.iter().map(|f| f.plain_text.clone()).collect())
            }
            other => Err(self.mismatch(name, ColumnType::Title, other)),
        }
    }

    /// Plain text of each rich text fragment.
    pub fn text(&self, name: &str) -> Result<Vec<String>, NotionError> {
        match self.get(name)? {
            PropertyValue::RichText { rich_text } => {
                Ok(rich_text.iter().map(|f| f.plain_text.clone()).collect())
            }
            other => Err(self.mismatch(name, ColumnType::RichText, other)),
        }
    }

    /// ISO start date, or `None` when the field is empty.
    pub fn date(&self, name: &str) -> Result<Option<String>, NotionError> {
        match self.get(name)? {
            PropertyValue::Date { date } => Ok(date.as_ref().map(|d| d.start.clone())),
            other => Err(self.mismatch(name, ColumnType::Date, other)),
        }
    }

    pub fn number(&self, name: &str) -> Result<Option<f64>, NotionError> {
        match self.get(name)? {
            PropertyValue::Number { number } => Ok(*number),
            other => Err(self.mismatch(name, ColumnType::Number, other)),
        }
    }

    /// The selected option's name, or `None` when nothing is selected.
    pub fn select(&self, name: &str) -> Result<Option<String>, NotionError> {
        match self.get(name)? {
            PropertyValue::Select { select } => Ok(select.as_ref().map(|s| s.name.clone())),
            other => Err(self.mismatch(name, ColumnType::Select, other)),
        }
    }

    pub fn multi_select(&self, name: &str) -> Result<Vec<String>, NotionError> {
        match self.get(name)? {
            PropertyValue::MultiSelect { multi_select } => {
                Ok(multi_select.iter().map(|s| s.name.clone()).collect())
            }
            other => Err(self.mismatch(name, ColumnType::MultiSelect, other)),
        }
    }

    /// URLs of the attached files.
    pub fn files(&self, name: &str) -> Result<Vec<String>, NotionError> {
        match self.get(name)? {
            PropertyValue::Files { files } => Ok(files
                .iter()
                .filter_map(|f| f.url().map(str::to_string))
                .collect()),
            other => Err(self.mismatch(name, ColumnType::Files, other)),
        }
    }

    /// Page IDs the relation points at.
    pub fn relation(&self, name: &str) -> Result<Vec<String>, NotionError> {
        match self.get(name)? {
            PropertyValue::Relation { relation } => {
                Ok(relation.iter().map(|r| r.id.clone()).collect())
            }
            other => Err(self.mismatch(name, ColumnType::Relation, other)),
        }
    }

    // ------------------------------------------------------------------
    // Setters (stage into the pending change-set)
    // ------------------------------------------------------------------

    /// Overwrite a rich text field with a single fragment. Always stages,
    /// even when the stored text is identical.
    pub fn set_text(&mut self, name: &str, value: &str) -> Result<(), NotionError> {
        self.text(name)?;
        self.pending
            .insert(name.to_string(), PropertyValue::rich_text(value));
        Ok(())
    }

    /// Write a date, skipping the write when the stored date already matches.
    pub fn set_date(&mut self, name: &str, value: NaiveDate) -> Result<(), NotionError> {
        let current = self.date(name)?;
        let formatted = value.format("%Y-%m-%d").to_string();
        if current.as_deref() == Some(formatted.as_str()) {
            log::debug!("Update not required for field: {name}");
            return Ok(());
        }
        self.pending
            .insert(name.to_string(), PropertyValue::date(&formatted));
        Ok(())
    }

    /// Write a number, skipping the write when the stored number already
    /// matches.
    pub fn set_number(&mut self, name: &str, value: f64) -> Result<(), NotionError> {
        let current = self.number(name)?;
        if current == Some(value) {
            log::debug!("Update not required for field: {name}");
            return Ok(());
        }
        self.pending
            .insert(name.to_string(), PropertyValue::number(value));
        Ok(())
    }

    /// Write a select option, skipping the write when it is already selected.
    pub fn set_select(&mut self, name: &str, value: &str) -> Result<(), NotionError> {
        let current = self.select(name)?;
        if current.as_deref() == Some(value) {
            log::debug!("Update not required for field: {name}");
            return Ok(());
        }
        self.pending
            .insert(name.to_string(), PropertyValue::select(value));
        Ok(())
    }

    /// Replace the tag list. Always stages.
    pub fn set_multi_select(&mut self, name: &str, values: &[String]) -> Result<(), NotionError> {
        self.multi_select(name)?;
        self.pending
            .insert(name.to_string(), PropertyValue::multi_select(values));
        Ok(())
    }

    /// Replace the file list with a single external file, labelled
    /// "Poster for <title>" (or "Unnamed file" without a title). Always
    /// stages.
    pub fn set_files(
        &mut self,
        name: &str,
        url: &str,
        title: Option<&str>,
    ) -> Result<(), NotionError> {
        self.files(name)?;
        let label = match title {
            Some(title) => format!("Poster for {title}"),
            None => "Unnamed file".to_string(),
        };
        self.pending
            .insert(name.to_string(), PropertyValue::external_file(&label, url));
        Ok(())
    }

    /// Write relation references. `Combine` appends without deduplicating,
    /// onto the staged references when a write is already pending and onto
    /// the stored ones otherwise. A target database reference is required
    /// even though the write itself does not transmit it; rows related to
    /// nothing are a schema error the caller should hit early.
    pub fn set_relation(
        &mut self,
        name: &str,
        ids: &[String],
        mode: UpdateMode,
        target_db: Option<&str>,
    ) -> Result<(), NotionError> {
        if target_db.is_none_or(str::is_empty) {
            return Err(NotionError::MissingRelationTarget(name.to_string()));
        }
        let current = self.relation(name)?;
        let combined = match mode {
            UpdateMode::Replace => ids.to_vec(),
            UpdateMode::Combine => {
                let base = match self.pending.get(name) {
                    Some(PropertyValue::Relation { relation }) => {
                        relation.iter().map(|r| r.id.clone()).collect()
                    }
                    _ => current,
                };
                base.into_iter().chain(ids.iter().cloned()).collect()
            }
        };
        self.pending
            .insert(name.to_string(), PropertyValue::relation(&combined));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Seeds (establish fields on rows that do not exist in the store yet)
    // ------------------------------------------------------------------

    /// Seed the title field of a new row.
    pub fn seed_title(&mut self, name: &str, value: &str) {
        self.seed(name, PropertyValue::title(value));
    }

    /// Seed a rich text field of a new row, one fragment per string.
    pub fn seed_text(&mut self, name: &str, values: &[String]) {
        self.seed(name, PropertyValue::rich_text_list(values));
    }

    /// Seed a relation field of a new row.
    pub fn seed_relation(&mut self, name: &str, ids: &[String]) {
        self.seed(name, PropertyValue::relation(ids));
    }

    /// Seed a select field of a new row.
    pub fn seed_select(&mut self, name: &str, value: &str) {
        self.seed(name, PropertyValue::select(value));
    }

    fn seed(&mut self, name: &str, value: PropertyValue) {
        self.properties.insert(name.to_string(), value.clone());
        self.pending.insert(name.to_string(), value);
    }

    // ------------------------------------------------------------------
    // Clear / commit / archive
    // ------------------------------------------------------------------

    /// Stage a reset of the field to its empty representation.
    ///
    /// Formula fields are computed by the store, so clearing one just drops
    /// any staged write. Checkboxes have no empty representation.
    pub fn clear(&mut self, column: ColumnType, name: &str) -> Result<(), NotionError> {
        let empty = match column {
            ColumnType::Title => PropertyValue::Title { title: Vec::new() },
            ColumnType::RichText => PropertyValue::RichText {
                rich_text: Vec::new(),
            },
            ColumnType::Date => PropertyValue::Date { date: None },
            ColumnType::Number => PropertyValue::Number { number: None },
            ColumnType::Select => PropertyValue::Select { select: None },
            ColumnType::MultiSelect => PropertyValue::MultiSelect {
                multi_select: Vec::new(),
            },
            ColumnType::Files => PropertyValue::Files { files: Vec::new() },
            ColumnType::Relation => PropertyValue::Relation {
                relation: Vec::new(),
            },
            ColumnType::Formula => {
                self.pending.remove(name);
                return Ok(());
            }
            ColumnType::Checkbox => {
                return Err(NotionError::Unsupported {
                    op: "clear",
                    column,
                });
            }
        };
        self.pending.insert(name.to_string(), empty);
        Ok(())
    }

    /// Send the pending change-set to the store.
    ///
    /// An empty change-set makes no store call at all. A row without an ID is
    /// created into its database (adopting the server-assigned ID and
    /// canonical properties); otherwise the page is updated in place. On
    /// failure the change-set is left intact so the caller can retry or
    /// report.
    pub fn commit(&mut self, store: &impl NotionApi) -> Result<CommitOutcome, NotionError> {
        if self.pending.is_empty() {
            return Ok(CommitOutcome::Skipped);
        }
        if self.row_id.is_empty() {
            let database_id = self
                .database_id
                .as_deref()
                .ok_or(NotionError::MissingDatabaseId)?;
            let page = store.create_page(database_id, &self.pending, self.icon.as_deref())?;
            self.row_id = page.id.clone();
            self.properties = parse_properties(&page.properties);
            self.pending.clear();
            return Ok(CommitOutcome::Created);
        }
        store.update_page(&self.row_id, &self.pending)?;
        self.pending.clear();
        Ok(CommitOutcome::Updated)
    }

    /// Archive the row in the store (a soft delete) and forget its state.
    pub fn archive(&mut self, store: &impl NotionApi) -> Result<(), NotionError> {
        if self.row_id.is_empty() {
            return Err(NotionError::RowNotPersisted);
        }
        store.archive_page(&self.row_id)?;
        self.row_id.clear();
        self.properties.clear();
        self.pending.clear();
        Ok(())
    }
}
