//! show-sync CLI
//!
//! Command-line interface for syncing TV show and movie metadata from TMDB
//! and OMDB into Notion databases.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use show_sync_core::{CacheStats, Config, ConfigError, ProviderError, config_path};
use show_sync_import::{
    MovieSync, SHOW_ICON, ShowSync, SyncReport, WATCHLIST_ICON, WatchlistSync, add_show, fields,
};
use show_sync_notion::NotionClient;
use show_sync_omdb::OmdbProvider;
use show_sync_tmdb::TmdbProvider;

#[derive(Parser)]
#[command(name = "show-sync")]
#[command(about = "Sync TV show and movie metadata into Notion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Update show rows from TMDB
    Update {
        /// IMDB IDs to update (every eligible row when omitted)
        ids: Vec<String>,
    },

    /// Refresh watchlist rows and archive the ones promoted to the shows database
    Watchlist,

    /// Update the shows database and the watchlist in one pass
    Everything,

    /// Add a show to Notion by its TMDB series id
    Add {
        /// TMDB series id (find it with 'show-sync search')
        tmdb_id: u64,

        /// Add to the watchlist instead of the shows database
        #[arg(long)]
        watchlist: bool,
    },

    /// Search TMDB for a show
    Search {
        /// Title to search for
        query: Vec<String>,
    },

    /// Update movie rows from OMDB
    Movies,

    /// Manage the local API response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show entry counts and sizes per provider
    Stats,

    /// Remove all cached API responses
    Clear,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current settings and their sources
    Show,

    /// Print the config file path
    Path,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Commands::Update { ids } => run_update(&config, ids),
        Commands::Watchlist => run_watchlist(&config),
        Commands::Everything => run_everything(&config),
        Commands::Add { tmdb_id, watchlist } => run_add(&config, tmdb_id, watchlist),
        Commands::Search { query } => run_search(&config, query.join(" ")),
        Commands::Movies => run_movies(&config),
        Commands::Cache { action } => match action {
            CacheAction::Stats => run_cache_stats(),
            CacheAction::Clear => run_cache_clear(),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => run_config_show(&config),
            ConfigAction::Path => run_config_path(),
        },
    }
}

/// Run the update command.
fn run_update(config: &Config, ids: Vec<String>) {
    let provider = match tmdb_provider(config) {
        Some(p) => p,
        None => return,
    };
    let store = match notion_store(config) {
        Some(s) => s,
        None => return,
    };
    let shows_db = match require(config.shows_db()) {
        Some(v) => v,
        None => return,
    };
    let seasons_db = match require(config.seasons_db()) {
        Some(v) => v,
        None => return,
    };

    if ids.is_empty() {
        println!("Updating every eligible show row...");
    } else {
        println!("Updating {}...", ids.join(", "));
    }

    if let Some(report) = sync_shows(&provider, &store, shows_db, seasons_db, &ids) {
        print_report(&report);
    }
}

/// Run the watchlist command.
fn run_watchlist(config: &Config) {
    let provider = match tmdb_provider(config) {
        Some(p) => p,
        None => return,
    };
    let store = match notion_store(config) {
        Some(s) => s,
        None => return,
    };
    let watchlist_db = match require(config.watchlist_db()) {
        Some(v) => v,
        None => return,
    };

    println!("Refreshing the watchlist...");

    if let Some(report) = sync_watchlist(&provider, &store, watchlist_db) {
        print_report(&report);
    }
}

/// Run the shows sync and the watchlist sync back to back.
fn run_everything(config: &Config) {
    let provider = match tmdb_provider(config) {
        Some(p) => p,
        None => return,
    };
    let store = match notion_store(config) {
        Some(s) => s,
        None => return,
    };
    let shows_db = match require(config.shows_db()) {
        Some(v) => v,
        None => return,
    };
    let seasons_db = match require(config.seasons_db()) {
        Some(v) => v,
        None => return,
    };
    let watchlist_db = match require(config.watchlist_db()) {
        Some(v) => v,
        None => return,
    };

    println!("{}", "Shows".if_supports_color(Stdout, |t| t.bold()));
    if let Some(report) = sync_shows(&provider, &store, shows_db, seasons_db, &[]) {
        print_report(&report);
    }

    println!();
    println!("{}", "Watchlist".if_supports_color(Stdout, |t| t.bold()));
    if let Some(report) = sync_watchlist(&provider, &store, watchlist_db) {
        print_report(&report);
    }
}

/// Run the add command.
fn run_add(config: &Config, tmdb_id: u64, watchlist: bool) {
    let provider = match tmdb_provider(config) {
        Some(p) => p,
        None => return,
    };
    let store = match notion_store(config) {
        Some(s) => s,
        None => return,
    };
    let (database_id, icon) = if watchlist {
        match require(config.watchlist_db()) {
            Some(db) => (db, WATCHLIST_ICON),
            None => return,
        }
    } else {
        match require(config.shows_db()) {
            Some(db) => (db, SHOW_ICON),
            None => return,
        }
    };

    let pb = spinner(format!("Looking up TMDB series {}...", tmdb_id));
    let result = add_show(&provider, &store, database_id, icon, tmdb_id);
    pb.finish_and_clear();

    match result {
        Ok(row) => {
            let title = row
                .title(fields::TITLE)
                .ok()
                .and_then(|t| t.first().cloned())
                .unwrap_or_else(|| format!("TMDB series {}", tmdb_id));
            println!(
                "{} Added {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                title.if_supports_color(Stdout, |t| t.bold()),
            );
        }
        Err(e) => {
            eprintln!(
                "{} Failed to add TMDB series {}: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                tmdb_id,
                e,
            );
        }
    }
}

/// Run the search command.
fn run_search(config: &Config, query: String) {
    let provider = match tmdb_provider(config) {
        Some(p) => p,
        None => return,
    };

    if query.trim().is_empty() {
        eprintln!(
            "{} Nothing to search for",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
        );
        return;
    }

    let pb = spinner(format!("Searching TMDB for \"{}\"...", query));
    let result = provider.search(&query);
    pb.finish_and_clear();

    match result {
        Ok(results) if results.is_empty() => {
            println!(
                "{}",
                format!("No shows found for \"{}\"", query)
                    .if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        Ok(results) => {
            for show in &results {
                let year = show
                    .first_air_date
                    .as_deref()
                    .filter(|d| d.len() >= 4)
                    .map(|d| &d[..4])
                    .unwrap_or("????");
                println!(
                    "  {} {} {} {}",
                    format!("{:>8}", show.id).if_supports_color(Stdout, |t| t.cyan()),
                    show.name.if_supports_color(Stdout, |t| t.bold()),
                    format!("({})", year).if_supports_color(Stdout, |t| t.dimmed()),
                    format!("[{:.1}]", show.vote_average).if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
            println!();
            println!("Add one with 'show-sync add <TMDB_ID>'");
        }
        Err(e) => {
            eprintln!(
                "{} Search failed: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
        }
    }
}

/// Run the movies command.
fn run_movies(config: &Config) {
    let provider = match omdb_provider(config) {
        Some(p) => p,
        None => return,
    };
    let store = match notion_store(config) {
        Some(s) => s,
        None => return,
    };
    let movies_db = match require(config.movies_db()) {
        Some(v) => v,
        None => return,
    };

    println!("Updating movie rows...");

    let pb = spinner("Syncing movies...");
    let result = MovieSync::new(&provider, &store, movies_db).run();
    pb.finish_and_clear();

    match result {
        Ok(report) => print_report(&report),
        Err(e) => {
            eprintln!(
                "{} Movie sync failed: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
        }
    }
}

/// Run the show sync behind a spinner; a top-level failure is printed here.
fn sync_shows(
    provider: &TmdbProvider,
    store: &NotionClient,
    shows_db: &str,
    seasons_db: &str,
    ids: &[String],
) -> Option<SyncReport> {
    let pb = spinner("Syncing shows...");
    let result = ShowSync::new(provider, store, shows_db, seasons_db).run(ids);
    pb.finish_and_clear();

    match result {
        Ok(report) => Some(report),
        Err(e) => {
            eprintln!(
                "{} Show sync failed: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            None
        }
    }
}

/// Run the watchlist sync behind a spinner.
fn sync_watchlist(
    provider: &TmdbProvider,
    store: &NotionClient,
    watchlist_db: &str,
) -> Option<SyncReport> {
    let pb = spinner("Syncing the watchlist...");
    let result = WatchlistSync::new(provider, store, watchlist_db).run();
    pb.finish_and_clear();

    match result {
        Ok(report) => Some(report),
        Err(e) => {
            eprintln!(
                "{} Watchlist sync failed: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            None
        }
    }
}

/// Print the per-run summary block.
fn print_report(report: &SyncReport) {
    let stats = report.stats();

    println!();
    println!("{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));

    if stats.updated > 0 {
        println!(
            "  {} {} rows updated",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            stats.updated,
        );
    }
    if stats.seasons_updated > 0 || stats.seasons_created > 0 {
        println!(
            "  {} {} season rows updated, {} created",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            stats.seasons_updated,
            stats.seasons_created,
        );
    }
    if stats.archived > 0 {
        println!(
            "  {} {} rows archived",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            stats.archived,
        );
    }
    if stats.skipped > 0 {
        println!(
            "  {} {} rows skipped",
            "?".if_supports_color(Stdout, |t| t.yellow()),
            stats.skipped,
        );
    }
    if stats.failed > 0 {
        println!(
            "  {} {} rows failed",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            stats.failed,
        );
    }
    if stats.seasons_failed > 0 {
        println!(
            "  {} {} season writes failed",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            stats.seasons_failed,
        );
    }

    let quiet = stats.updated == 0
        && stats.archived == 0
        && stats.skipped == 0
        && stats.failed == 0
        && stats.seasons_updated == 0
        && stats.seasons_created == 0
        && stats.seasons_failed == 0;
    if quiet {
        println!(
            "  {}",
            "Nothing to do".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    for line in report.errors() {
        println!(
            "  {} {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            line,
        );
    }
    if !report.invalid_ids().is_empty() {
        println!(
            "  {} Invalid IMDB IDs: [{}]",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            report.invalid_ids().join(", "),
        );
    }
}

/// Show entry counts and sizes for both provider caches.
fn run_cache_stats() {
    print_cache_stats("TMDB", show_sync_tmdb::default_cache().and_then(|c| c.stats()));
    print_cache_stats("OMDB", show_sync_omdb::default_cache().and_then(|c| c.stats()));
}

fn print_cache_stats(name: &str, stats: Result<CacheStats, ProviderError>) {
    match stats {
        Ok(stats) => {
            println!(
                "  {} {} entries, {}",
                format!("{}:", name).if_supports_color(Stdout, |t| t.bold()),
                stats.entries,
                format_bytes(stats.total_size),
            );
        }
        Err(e) => {
            eprintln!(
                "  {} Could not read the {} cache: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                name,
                e,
            );
        }
    }
}

/// Remove all cached API responses.
fn run_cache_clear() {
    let mut freed = 0u64;

    for (name, cache) in [
        ("TMDB", show_sync_tmdb::default_cache()),
        ("OMDB", show_sync_omdb::default_cache()),
    ] {
        match cache.and_then(|c| c.clear()) {
            Ok(bytes) => freed += bytes,
            Err(e) => {
                eprintln!(
                    "  {} Could not clear the {} cache: {}",
                    "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                    name,
                    e,
                );
            }
        }
    }

    println!(
        "{} Cache cleared ({} freed)",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        format_bytes(freed),
    );
}

/// Show current settings and their sources.
fn run_config_show(config: &Config) {
    let path = config_path();
    let sources = config.sources();

    println!(
        "{}",
        "show-sync Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    println!();

    // Config file status
    match &path {
        Some(p) if p.exists() => {
            println!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(exists)".if_supports_color(Stdout, |t| t.green()),
            );
        }
        Some(p) => {
            println!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        None => {
            println!(
                "  Config file: {}",
                "could not determine path".if_supports_color(Stdout, |t| t.red()),
            );
        }
    }
    println!();

    let fields = vec![
        ("notion_token", &sources.notion_token, config.notion_token(), true),
        ("tmdb_api_key", &sources.tmdb_api_key, config.tmdb_api_key(), true),
        ("omdb_api_key", &sources.omdb_api_key, config.omdb_api_key(), true),
        ("shows_db", &sources.shows_db, config.shows_db(), false),
        ("seasons_db", &sources.seasons_db, config.seasons_db(), false),
        ("watchlist_db", &sources.watchlist_db, config.watchlist_db(), false),
        ("movies_db", &sources.movies_db, config.movies_db(), false),
    ];

    for (name, source, value, is_secret) in fields {
        let source_str = format!("({})", source);
        match value {
            Ok(v) => {
                let shown = if is_secret { mask_value(v) } else { v.to_string() };
                println!(
                    "  {} {} {}",
                    format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
                    shown,
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
            Err(_) => {
                println!(
                    "  {} {} {}",
                    format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
                    "not set".if_supports_color(Stdout, |t| t.yellow()),
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
        }
    }
}

/// Print the config file path.
fn run_config_path() {
    match config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Could not determine config directory");
            std::process::exit(1);
        }
    }
}

// -- Shared helpers --

/// Resolve a required config value, printing a hint when it is missing.
fn require(value: Result<&str, ConfigError>) -> Option<&str> {
    match value {
        Ok(value) => Some(value),
        Err(e) => {
            eprintln!(
                "{} {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            eprintln!();
            eprintln!("Run 'show-sync config show' to check the current settings.");
            None
        }
    }
}

fn tmdb_provider(config: &Config) -> Option<TmdbProvider> {
    let api_key = require(config.tmdb_api_key())?;
    match TmdbProvider::new(api_key) {
        Ok(provider) => Some(provider),
        Err(e) => {
            eprintln!(
                "{} Failed to set up the TMDB provider: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            None
        }
    }
}

fn omdb_provider(config: &Config) -> Option<OmdbProvider> {
    let api_key = require(config.omdb_api_key())?;
    match OmdbProvider::new(api_key) {
        Ok(provider) => Some(provider),
        Err(e) => {
            eprintln!(
                "{} Failed to set up the OMDB provider: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            None
        }
    }
}

fn notion_store(config: &Config) -> Option<NotionClient> {
    let token = require(config.notion_token())?;
    match NotionClient::new(token) {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!(
                "{} Failed to build the Notion client: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                e,
            );
            None
        }
    }
}

fn spinner(msg: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("/-\\|"),
    );
    pb.set_message(msg.into());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 && bytes % (1024 * 1024) == 0 {
        format!("{} MB", bytes / (1024 * 1024))
    } else if bytes >= 1024 && bytes % 1024 == 0 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{} bytes", bytes)
    }
}

fn mask_value(s: &str) -> String {
    if s.len() <= 2 {
        "****".to_string()
    } else {
        format!("{}****", &s[..2])
    }
}
