pub mod client;
pub mod provider;
pub mod search;
pub mod types;

pub use client::TmdbClient;
pub use provider::{CACHE_TTL_DAYS, TmdbProvider, default_cache};
pub use search::search_tv;
pub use types::{SearchResult, TvDetails};
