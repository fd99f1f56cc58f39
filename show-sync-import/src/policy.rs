//! Staleness and eligibility rules driven by the "[IMPORT]" control fields.

use chrono::NaiveDate;

/// Days between refreshes for rows marked "Automate".
pub const AUTOMATE_INTERVAL_DAYS: i64 = 3;

/// Parsed value of the "[IMPORT] Next Import Hint" select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportHint {
    /// One manual refresh, after which the row goes back to "Check Status".
    Update,
    /// Like [`ImportHint::Update`], but the provider cache is bypassed.
    ForceUpdate,
    /// Refreshed on a rolling interval with no manual attention.
    Automate,
    /// Parked until a person decides what to do with the row.
    CheckStatus,
    /// Any other select option someone typed in by hand.
    Other(String),
    /// The select is empty.
    Unset,
}

impl ImportHint {
    pub fn from_select(value: Option<&str>) -> Self {
        match value {
            None => Self::Unset,
            Some("Update") => Self::Update,
            Some("Force Update") => Self::ForceUpdate,
            Some("Automate") => Self::Automate,
            Some("Check Status") => Self::CheckStatus,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// The select option name, as stored in the database.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Update => "Update",
            Self::ForceUpdate => "Force Update",
            Self::Automate => "Automate",
            Self::CheckStatus => "Check Status",
            Self::Other(name) => name,
            Self::Unset => "unset",
        }
    }
}

impl std::fmt::Display for ImportHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides, for a given hint and last import date, whether a row should be
/// refreshed from the provider and whether it should be written at all.
///
/// A row with no last import date has never been synced and is always treated
/// as stale, whatever its hint says.
#[derive(Debug, Clone, Copy)]
pub struct UpdatePolicy {
    today: NaiveDate,
}

impl UpdatePolicy {
    pub fn new() -> Self {
        Self {
            today: chrono::Local::now().date_naive(),
        }
    }

    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Whether the provider fetch should bypass its cache.
    pub fn needs_refresh(&self, hint: &ImportHint, last_import: Option<NaiveDate>) -> bool {
        let Some(last) = last_import else {
            return true;
        };
        match hint {
            ImportHint::ForceUpdate => true,
            ImportHint::Automate => self.interval_elapsed(last),
            _ => false,
        }
    }

    /// Whether a refresh now would be the rolling interval acting rather than
    /// a person asking for one.
    pub fn is_automated(&self, hint: &ImportHint, last_import: Option<NaiveDate>) -> bool {
        let Some(last) = last_import else {
            return true;
        };
        matches!(hint, ImportHint::Automate) && self.interval_elapsed(last)
    }

    /// Whether the row gets written this run.
    pub fn is_eligible(&self, hint: &ImportHint, last_import: Option<NaiveDate>) -> bool {
        matches!(hint, ImportHint::Update | ImportHint::ForceUpdate)
            || self.is_automated(hint, last_import)
    }

    fn interval_elapsed(&self, last: NaiveDate) -> bool {
        (self.today - last).num_days() >= AUTOMATE_INTERVAL_DAYS
    }
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self::new()
    }
}
