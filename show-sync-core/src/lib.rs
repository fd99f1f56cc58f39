pub mod cache;
pub mod config;
pub mod entity;
pub mod error;
pub mod provider;

pub use cache::{CacheEntry, CacheStats, EntityCache, cache_root};
pub use config::{Config, ConfigError, ConfigSource, ConfigSources, config_path};
pub use entity::{MovieEntity, SeasonEntity, ShowEntity};
pub use error::ProviderError;
pub use provider::EntityProvider;
