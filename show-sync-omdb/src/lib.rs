pub mod client;
pub mod provider;

pub use client::{OmdbClient, OmdbRecord};
pub use provider::{CACHE_TTL_DAYS, OmdbProvider, default_cache};
