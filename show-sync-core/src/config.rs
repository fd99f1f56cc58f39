use std::path::PathBuf;

/// Errors raised when a flow asks for configuration that was never provided.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing {0}. Set the {0} env var or add it to the config file")]
    Missing(&'static str),
}

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of each configuration value.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    pub notion_token: ConfigSource,
    pub tmdb_api_key: ConfigSource,
    pub omdb_api_key: ConfigSource,
    pub shows_db: ConfigSource,
    pub seasons_db: ConfigSource,
    pub watchlist_db: ConfigSource,
    pub movies_db: ConfigSource,
}

/// TOML config file format.
#[derive(Debug, serde::Deserialize)]
struct ConfigFile {
    notion: Option<NotionSection>,
    tmdb: Option<ApiSection>,
    omdb: Option<ApiSection>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct NotionSection {
    token: Option<String>,
    shows_db: Option<String>,
    seasons_db: Option<String>,
    future_shows_db: Option<String>,
    movies_db: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ApiSection {
    api_key: Option<String>,
}

/// Tokens and database IDs, loaded once at startup and read-only after.
///
/// Every value is optional at load time; flows ask for what they need through
/// the accessors and fail with a [`ConfigError`] naming the env var to set.
#[derive(Debug, Clone)]
pub struct Config {
    notion_token: Option<String>,
    tmdb_api_key: Option<String>,
    omdb_api_key: Option<String>,
    shows_db: Option<String>,
    seasons_db: Option<String>,
    watchlist_db: Option<String>,
    movies_db: Option<String>,
    sources: ConfigSources,
}

impl Config {
    /// Load configuration from environment variables and the config file.
    ///
    /// Priority: env vars > config file. An unreadable config file is treated
    /// as absent.
    pub fn load() -> Self {
        let file = load_config_file();
        Self::from_sources(|key| std::env::var(key).ok(), file)
    }

    fn from_sources(env: impl Fn(&'static str) -> Option<String>, file: Option<ConfigFile>) -> Self {
        let notion = file.as_ref().and_then(|f| f.notion.as_ref());
        let tmdb = file.as_ref().and_then(|f| f.tmdb.as_ref());
        let omdb = file.as_ref().and_then(|f| f.omdb.as_ref());

        let (notion_token, notion_token_src) =
            pick(&env, "NOTION_TOKEN", notion.and_then(|n| n.token.clone()));
        let (tmdb_api_key, tmdb_api_key_src) =
            pick(&env, "TMDB_API_KEY", tmdb.and_then(|t| t.api_key.clone()));
        let (omdb_api_key, omdb_api_key_src) =
            pick(&env, "OMDB_API_KEY", omdb.and_then(|o| o.api_key.clone()));
        let (shows_db, shows_db_src) =
            pick(&env, "SHOWS_DB", notion.and_then(|n| n.shows_db.clone()));
        let (seasons_db, seasons_db_src) =
            pick(&env, "SEASONS_DB", notion.and_then(|n| n.seasons_db.clone()));
        let (watchlist_db, watchlist_db_src) = pick(
            &env,
            "FUTURE_SHOWS_DB",
            notion.and_then(|n| n.future_shows_db.clone()),
        );
        let (movies_db, movies_db_src) =
            pick(&env, "MOVIES_DB", notion.and_then(|n| n.movies_db.clone()));

        Self {
            notion_token,
            tmdb_api_key,
            omdb_api_key,
            shows_db,
            seasons_db,
            watchlist_db,
            movies_db,
            sources: ConfigSources {
                notion_token: notion_token_src,
                tmdb_api_key: tmdb_api_key_src,
                omdb_api_key: omdb_api_key_src,
                shows_db: shows_db_src,
                seasons_db: seasons_db_src,
                watchlist_db: watchlist_db_src,
                movies_db: movies_db_src,
            },
        }
    }

    pub fn notion_token(&self) -> Result<&str, ConfigError> {
        self.notion_token
            .as_deref()
            .ok_or(ConfigError::Missing("NOTION_TOKEN"))
    }

    pub fn tmdb_api_key(&self) -> Result<&str, ConfigError> {
        self.tmdb_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("TMDB_API_KEY"))
    }

    pub fn omdb_api_key(&self) -> Result<&str, ConfigError> {
        self.omdb_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("OMDB_API_KEY"))
    }

    /// ID of the main shows database.
    pub fn shows_db(&self) -> Result<&str, ConfigError> {
        self.shows_db
            .as_deref()
            .ok_or(ConfigError::Missing("SHOWS_DB"))
    }

    /// ID of the seasons database joined to shows by relation.
    pub fn seasons_db(&self) -> Result<&str, ConfigError> {
        self.seasons_db
            .as_deref()
            .ok_or(ConfigError::Missing("SEASONS_DB"))
    }

    /// ID of the watchlist database for shows not yet tracked in full.
    pub fn watchlist_db(&self) -> Result<&str, ConfigError> {
        self.watchlist_db
            .as_deref()
            .ok_or(ConfigError::Missing("FUTURE_SHOWS_DB"))
    }

    pub fn movies_db(&self) -> Result<&str, ConfigError> {
        self.movies_db
            .as_deref()
            .ok_or(ConfigError::Missing("MOVIES_DB"))
    }

    /// Where each value came from, for startup diagnostics.
    pub fn sources(&self) -> &ConfigSources {
        &self.sources
    }
}

fn pick(
    env: &impl Fn(&'static str) -> Option<String>,
    var: &'static str,
    file_value: Option<String>,
) -> (Option<String>, ConfigSource) {
    if let Some(value) = env(var) {
        (Some(value), ConfigSource::EnvVar(var))
    } else if let Some(value) = file_value {
        (Some(value), ConfigSource::ConfigFile)
    } else {
        (None, ConfigSource::Missing)
    }
}

/// Return the path to the config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("show-sync").join("config.toml"))
}

fn load_config_file() -> Option<ConfigFile> {
    let path = config_path()?;
    let content = std::fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}
