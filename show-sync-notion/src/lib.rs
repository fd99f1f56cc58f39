pub mod client;
pub mod error;
pub mod property;
pub mod row;

pub use client::{NotionApi, NotionClient, Page};
pub use error::NotionError;
pub use property::{ColumnType, PropertyValue, parse_properties};
pub use row::{CommitOutcome, NotionRow, UpdateMode};
