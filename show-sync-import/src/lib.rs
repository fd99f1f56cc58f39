//! Sync orchestration: the staleness policy, the provider-to-row field
//! mappings, and the flows that reconcile TMDB and OMDB snapshots into the
//! Notion databases.

pub mod add;
pub mod error;
pub mod fields;
pub mod movies;
pub mod policy;
pub mod report;
pub mod shows;
pub mod watchlist;

pub use add::{SHOW_ICON, WATCHLIST_ICON, add_show, create_show_row};
pub use error::SyncError;
pub use movies::MovieSync;
pub use policy::{AUTOMATE_INTERVAL_DAYS, ImportHint, UpdatePolicy};
pub use report::{SyncReport, SyncStats};
pub use shows::{SEASON_ICON, ShowSync};
pub use watchlist::WatchlistSync;
