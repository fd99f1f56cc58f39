use show_sync_core::ProviderError;
use show_sync_notion::NotionError;
use thiserror::Error;

/// Failures that stop a whole run, as opposed to the per-row problems that
/// land in the [`crate::SyncReport`].
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Store error: {0}")]
    Notion(#[from] NotionError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}
