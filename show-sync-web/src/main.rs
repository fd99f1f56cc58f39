//! show-sync web front end
//!
//! A small form-driven surface for kicking off show updates from a browser.
//! Submissions either name specific IMDB IDs or use the "update all" sentinel
//! to sweep every eligible row; the response is the rendered action log.

use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use show_sync_core::{Config, ConfigError};
use show_sync_import::ShowSync;
use show_sync_notion::NotionClient;
use show_sync_tmdb::TmdbProvider;

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>show-sync</title></head>
<body>
  <h1>show-sync</h1>
  <form action="/update" method="post">
    <label for="imdb_ids">IMDB IDs (comma separated, or "update all"):</label>
    <input type="text" id="imdb_ids" name="imdb_ids">
    <input type="submit" value="Update">
  </form>
</body>
</html>
"#;

/// Form payload for the update endpoint.
#[derive(Deserialize)]
struct UpdateRequest {
    imdb_ids: String,
}

/// Everything a sync run needs, resolved once at startup so that missing
/// configuration fails the process instead of the first request.
#[derive(Clone)]
struct AppState {
    notion_token: String,
    tmdb_api_key: String,
    shows_db: String,
    seasons_db: String,
}

impl AppState {
    fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            notion_token: config.notion_token()?.to_string(),
            tmdb_api_key: config.tmdb_api_key()?.to_string(),
            shows_db: config.shows_db()?.to_string(),
            seasons_db: config.seasons_db()?.to_string(),
        })
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::load();
    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let app = Router::new()
        .route("/", get(index))
        .route("/update", post(update))
        .with_state(state);

    let addr =
        std::env::var("SHOW_SYNC_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind the listen address");
    log::info!("Listening on {}", addr);

    axum::serve(listener, app).await.expect("Server failed");
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn update(
    State(state): State<AppState>,
    Form(request): Form<UpdateRequest>,
) -> Html<String> {
    let lines = match parse_submission(&request.imdb_ids) {
        Submission::Empty => vec!["Will not run with an empty IMDB ID list.".to_string()],
        Submission::All => run_sync(state, Vec::new()).await,
        Submission::Ids(ids) => run_sync(state, ids).await,
    };
    Html(render_page(&lines))
}

/// Run the blocking sync on the blocking pool and return the action log.
async fn run_sync(state: AppState, ids: Vec<String>) -> Vec<String> {
    let scope = if ids.is_empty() {
        "all shows".to_string()
    } else {
        format!("IMDB IDs: {}", ids.join(", "))
    };
    log::info!("Starting update run for {}", scope);

    let result = tokio::task::spawn_blocking(move || {
        let provider = TmdbProvider::new(&state.tmdb_api_key)?;
        let store = NotionClient::new(&state.notion_token)?;
        ShowSync::new(&provider, &store, state.shows_db, state.seasons_db).run(&ids)
    })
    .await;

    match result {
        Ok(Ok(report)) => report.render(&scope),
        Ok(Err(e)) => vec![format!("Failed to update {}", scope), e.to_string()],
        Err(e) => vec![
            format!("Failed to update {}", scope),
            format!("Sync task failed: {}", e),
        ],
    }
}

#[derive(Debug, PartialEq)]
enum Submission {
    Empty,
    All,
    Ids(Vec<String>),
}

/// Interpret the submitted text: blank, the update-all sentinel, or a list of
/// comma or whitespace separated IMDB IDs.
fn parse_submission(raw: &str) -> Submission {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Submission::Empty;
    }
    if trimmed.eq_ignore_ascii_case("update all") || trimmed.eq_ignore_ascii_case("all") {
        return Submission::All;
    }

    let ids: Vec<String> = trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    if ids.is_empty() {
        Submission::Empty
    } else {
        Submission::Ids(ids)
    }
}

fn render_page(lines: &[String]) -> String {
    let mut body = String::from(
        "<!DOCTYPE html>\n<html>\n<head><title>show-sync</title></head>\n<body>\n<h1>Update result</h1>\n<ul>\n",
    );
    for line in lines {
        body.push_str("  <li>");
        body.push_str(&escape_html(line));
        body.push_str("</li>\n");
    }
    body.push_str("</ul>\n<p><a href=\"/\">Back</a></p>\n</body>\n</html>\n");
    body
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
