//! Structured outcome of a sync run, rendered verdict-first.

/// Counters for one run. Shows, watchlist rows, and movies all land in the
/// top-level counters; the season counters only move during a shows run.
#[derive(Debug, Default, Clone)]
pub struct SyncStats {
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub archived: usize,
    pub seasons_updated: usize,
    pub seasons_created: usize,
    pub seasons_failed: usize,
}

/// Everything a caller needs to report on a finished run: error lines in the
/// order they happened, the requested IDs that matched nothing, and counters.
#[derive(Debug, Default, Clone)]
pub struct SyncReport {
    errors: Vec<String>,
    invalid_ids: Vec<String>,
    stats: SyncStats,
}

impl SyncReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, line: impl Into<String>) {
        self.errors.push(line.into());
    }

    pub fn set_invalid_ids(&mut self, ids: Vec<String>) {
        self.invalid_ids = ids;
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn invalid_ids(&self) -> &[String] {
        &self.invalid_ids
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut SyncStats {
        &mut self.stats
    }

    pub fn succeeded(&self) -> bool {
        self.errors.is_empty() && self.invalid_ids.is_empty()
    }

    /// Render the action log: the verdict line first, then every error line,
    /// then the IDs that matched no row.
    pub fn render(&self, scope: &str) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.errors.len() + 2);
        if self.succeeded() {
            lines.push(format!("Successfully updated {scope}"));
        } else {
            lines.push(format!("Failed to update {scope}"));
        }
        lines.extend(self.errors.iter().cloned());
        if !self.invalid_ids.is_empty() {
            lines.push(format!("Invalid IMDB IDs: [{}]", self.invalid_ids.join(", ")));
        }
        lines
    }
}
