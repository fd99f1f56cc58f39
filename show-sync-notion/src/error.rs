use crate::property::ColumnType;

/// Errors that can occur while reading, mutating, or committing store rows.
#[derive(Debug, thiserror::Error)]
pub enum NotionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Notion API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Field not present in row: {0}")]
    FieldMissing(String),

    #[error("Field \"{name}\" is {found}, not {expected}")]
    TypeMismatch {
        name: String,
        expected: ColumnType,
        found: ColumnType,
    },

    #[error("{op} is not supported for {column} fields")]
    Unsupported {
        op: &'static str,
        column: ColumnType,
    },

    #[error("Relation field \"{0}\" has no target database configured")]
    MissingRelationTarget(String),

    #[error("Row has not been created in the store yet")]
    RowNotPersisted,

    #[error("Row has no database ID to create into")]
    MissingDatabaseId,
}
