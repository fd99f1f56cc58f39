#![allow(dead_code)]

//! Shared in-memory fakes and fixtures for the flow tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde_json::{Value, json};
use show_sync_core::{EntityProvider, MovieEntity, ProviderError, SeasonEntity, ShowEntity};
use show_sync_notion::{NotionApi, NotionError, Page, PropertyValue};

// ── Store fake ──────────────────────────────────────────────────────────────

pub struct CreatedPage {
    pub id: String,
    pub database_id: String,
    pub properties: BTreeMap<String, PropertyValue>,
    pub icon: Option<String>,
}

pub struct UpdatedPage {
    pub page_id: String,
    pub properties: BTreeMap<String, PropertyValue>,
}

/// In-memory store: canned query results plus a log of every write.
#[derive(Default)]
pub struct FakeStore {
    pub pages: RefCell<HashMap<String, Vec<Page>>>,
    pub created: RefCell<Vec<CreatedPage>>,
    pub updated: RefCell<Vec<UpdatedPage>>,
    pub archived: RefCell<Vec<String>>,
    templates: RefCell<HashMap<String, Page>>,
    failing_pages: RefCell<HashSet<String>>,
    next_id: Cell<u32>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_db(&self, database_id: &str, pages: Vec<Page>) {
        self.pages.borrow_mut().insert(database_id.to_string(), pages);
    }

    /// The real API echoes every column of the database on create, not just
    /// the staged ones. Tests that create rows register a full-schema page
    /// here so the fake echoes the same shape.
    pub fn set_create_template(&self, database_id: &str, page: Page) {
        self.templates.borrow_mut().insert(database_id.to_string(), page);
    }

    /// Make every update of `page_id` fail with a server error.
    pub fn fail_updates_for(&self, page_id: &str) {
        self.failing_pages.borrow_mut().insert(page_id.to_string());
    }

    pub fn updates_for(&self, page_id: &str) -> Vec<UpdatedPage> {
        self.updated
            .borrow()
            .iter()
            .filter(|update| update.page_id == page_id)
            .map(|update| UpdatedPage {
                page_id: update.page_id.clone(),
                properties: update.properties.clone(),
            })
            .collect()
    }
}

impl NotionApi for FakeStore {
    fn query_all(&self, database_id: &str) -> Result<Vec<Page>, NotionError> {
        Ok(self
            .pages
            .borrow()
            .get(database_id)
            .cloned()
            .unwrap_or_default())
    }

    fn create_page(
        &self,
        database_id: &str,
        properties: &BTreeMap<String, PropertyValue>,
        icon: Option<&str>,
    ) -> Result<Page, NotionError> {
        let serial = self.next_id.get() + 1;
        self.next_id.set(serial);
        let id = format!("created-{serial}");
        self.created.borrow_mut().push(CreatedPage {
            id: id.clone(),
            database_id: database_id.to_string(),
            properties: properties.clone(),
            icon: icon.map(str::to_string),
        });

        let mut merged = match self.templates.borrow().get(database_id) {
            Some(template) => template.properties.clone(),
            None => serde_json::Map::new(),
        };
        if let Value::Object(staged) = serde_json::to_value(properties)? {
            merged.extend(staged);
        }
        Ok(Page {
            id,
            properties: merged,
        })
    }

    fn update_page(
        &self,
        page_id: &str,
        properties: &BTreeMap<String, PropertyValue>,
    ) -> Result<Page, NotionError> {
        if self.failing_pages.borrow().contains(page_id) {
            return Err(NotionError::Api {
                status: 500,
                message: "injected store failure".to_string(),
            });
        }
        self.updated.borrow_mut().push(UpdatedPage {
            page_id: page_id.to_string(),
            properties: properties.clone(),
        });
        page_from_properties(page_id, properties)
    }

    fn archive_page(&self, page_id: &str) -> Result<(), NotionError> {
        self.archived.borrow_mut().push(page_id.to_string());
        Ok(())
    }
}

fn page_from_properties(
    id: &str,
    properties: &BTreeMap<String, PropertyValue>,
) -> Result<Page, NotionError> {
    let value = json!({ "id": id, "properties": properties });
    Ok(serde_json::from_value(value)?)
}

// ── Provider fakes ──────────────────────────────────────────────────────────

/// Scripted show provider with failure injection and a fetch log.
#[derive(Default)]
pub struct FakeShowProvider {
    entities: RefCell<HashMap<String, ShowEntity>>,
    failing: RefCell<HashSet<String>>,
    pub fetches: RefCell<Vec<(String, bool)>>,
}

impl FakeShowProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, entity: ShowEntity) {
        self.entities
            .borrow_mut()
            .insert(entity.imdb_id.clone(), entity);
    }

    pub fn fail(&self, imdb_id: &str) {
        self.failing.borrow_mut().insert(imdb_id.to_string());
    }
}

impl EntityProvider for FakeShowProvider {
    type Entity = ShowEntity;

    fn fetch(&self, imdb_id: &str, force_refresh: bool) -> Result<ShowEntity, ProviderError> {
        self.fetches
            .borrow_mut()
            .push((imdb_id.to_string(), force_refresh));
        if self.failing.borrow().contains(imdb_id) {
            return Err(ProviderError::Api("injected provider failure".to_string()));
        }
        self.entities
            .borrow()
            .get(imdb_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("No TV show found for IMDB ID: {imdb_id}")))
    }
}

/// Scripted movie provider.
#[derive(Default)]
pub struct FakeMovieProvider {
    entities: RefCell<HashMap<String, MovieEntity>>,
    failing: RefCell<HashSet<String>>,
}

impl FakeMovieProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, entity: MovieEntity) {
        self.entities
            .borrow_mut()
            .insert(entity.imdb_id.clone(), entity);
    }

    pub fn fail(&self, imdb_id: &str) {
        self.failing.borrow_mut().insert(imdb_id.to_string());
    }
}

impl EntityProvider for FakeMovieProvider {
    type Entity = MovieEntity;

    fn fetch(&self, imdb_id: &str, _force_refresh: bool) -> Result<MovieEntity, ProviderError> {
        if self.failing.borrow().contains(imdb_id) {
            return Err(ProviderError::Api("injected provider failure".to_string()));
        }
        self.entities
            .borrow()
            .get(imdb_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("Movie not found! (IMDB ID: {imdb_id})")))
    }
}

// ── Entity fixtures ─────────────────────────────────────────────────────────

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

pub fn season_entity(number: u32) -> SeasonEntity {
    SeasonEntity {
        air_date: Some(date("2020-01-01")),
        finale_date: Some(date("2020-03-01")),
        overview: format!("Season {number} overview"),
        episode_count: 8,
        episode_runtimes: vec![42; 8],
    }
}

pub fn show_entity(imdb_id: &str, title: &str, season_count: u32) -> ShowEntity {
    let seasons = (1..=season_count)
        .map(|number| (number, season_entity(number)))
        .collect();
    ShowEntity {
        imdb_id: imdb_id.to_string(),
        tmdb_id: 100,
        title: title.to_string(),
        original_title: title.to_string(),
        tagline: "A tagline".to_string(),
        plot: "A plot".to_string(),
        backdrop_url: Some("https://image.tmdb.org/t/p/w780/backdrop.jpg".to_string()),
        release_date: Some(date("2019-06-01")),
        status: "Returning Series".to_string(),
        kind: "Scripted".to_string(),
        content_rating: Some("TV-MA".to_string()),
        cast: vec!["Lead, Jr.".to_string(), "Support".to_string()],
        creators: vec!["Creator".to_string()],
        production_companies: vec!["Studio".to_string()],
        networks: vec!["Network".to_string()],
        watch_providers: vec!["Stream+".to_string()],
        countries: vec!["United States of America".to_string()],
        languages: vec!["English".to_string()],
        genres: vec!["Drama".to_string()],
        keywords: vec!["time travel".to_string()],
        season_count,
        rating: 8.1,
        fetched_at: date("2024-06-10"),
        seasons,
    }
}

pub fn movie_entity(imdb_id: &str, title: &str) -> MovieEntity {
    MovieEntity {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        rated: Some("PG-13".to_string()),
        release_date: Some(date("2010-07-16")),
        plot: "A heist staged inside layered dreams.".to_string(),
        genres: vec!["Action".to_string(), "Sci-Fi".to_string()],
        countries: vec!["United States".to_string()],
        actors: vec!["Lead Actor".to_string()],
        languages: vec!["English".to_string()],
        poster_url: Some("https://example.com/poster.jpg".to_string()),
        total_seasons: 0,
        fetched_at: date("2024-06-10"),
    }
}

// ── Page fixtures ───────────────────────────────────────────────────────────

fn text_fragment(content: &str) -> Value {
    json!({ "type": "text", "plain_text": content, "text": { "content": content } })
}

/// A show row carrying every column the mapping touches.
pub fn show_page(
    page_id: &str,
    imdb_id: &str,
    hint: Option<&str>,
    last_import: Option<&str>,
) -> Page {
    let hint_value = match hint {
        Some(name) => json!({ "name": name }),
        None => Value::Null,
    };
    let last_value = match last_import {
        Some(start) => json!({ "start": start }),
        None => Value::Null,
    };
    let value = json!({
        "id": page_id,
        "properties": {
            "Title": { "type": "title", "title": [text_fragment("Some Show")] },
            "IMDB ID": { "type": "rich_text", "rich_text": [text_fragment(imdb_id)] },
            "Original Title": { "type": "rich_text", "rich_text": [] },
            "Tagline": { "type": "rich_text", "rich_text": [] },
            "Plot": { "type": "rich_text", "rich_text": [] },
            "Backdrop": { "type": "files", "files": [] },
            "Release Date": { "type": "date", "date": null },
            "Status": { "type": "select", "select": null },
            "Type": { "type": "select", "select": null },
            "Content Rating (US)": { "type": "select", "select": null },
            "Cast": { "type": "multi_select", "multi_select": [] },
            "Creators": { "type": "multi_select", "multi_select": [] },
            "Production Companies": { "type": "multi_select", "multi_select": [] },
            "Networks": { "type": "multi_select", "multi_select": [] },
            "Watch Providers (US)": { "type": "multi_select", "multi_select": [] },
            "Countries": { "type": "multi_select", "multi_select": [] },
            "Languages": { "type": "multi_select", "multi_select": [] },
            "Genres": { "type": "multi_select", "multi_select": [] },
            "Keywords": { "type": "multi_select", "multi_select": [] },
            "Number of Seasons": { "type": "number", "number": null },
            "TMDB Rating": { "type": "number", "number": null },
            "[IMPORT] Next Import Hint": { "type": "select", "select": hint_value },
            "[IMPORT] Last Import Date": { "type": "date", "date": last_value },
            "[IMPORT] Errors": { "type": "rich_text", "rich_text": [] },
        }
    });
    serde_json::from_value(value).unwrap()
}

/// A watchlist row: a show row plus the promotion marker relation.
pub fn watchlist_page(
    page_id: &str,
    imdb_id: &str,
    hint: Option<&str>,
    last_import: Option<&str>,
    shows_refs: &[&str],
) -> Page {
    let mut page = show_page(page_id, imdb_id, hint, last_import);
    let refs: Vec<Value> = shows_refs.iter().map(|id| json!({ "id": id })).collect();
    page.properties.insert(
        "Shows DB Reference".to_string(),
        json!({ "type": "relation", "relation": refs }),
    );
    page
}

pub fn season_page(page_id: &str, label: &str, show_row_id: &str) -> Page {
    let value = json!({
        "id": page_id,
        "properties": {
            "Season Index": { "type": "title", "title": [text_fragment(label)] },
            "Show": { "type": "relation", "relation": [{ "id": show_row_id }] },
            "Air Date": { "type": "date", "date": null },
            "Finale Date": { "type": "date", "date": null },
            "Overview": { "type": "rich_text", "rich_text": [] },
            "Number of Episodes": { "type": "number", "number": null },
            "Total Runtime (mins)": { "type": "number", "number": null },
            "Per Episode Runtimes (mins)": { "type": "rich_text", "rich_text": [] },
            "Backdrop": { "type": "files", "files": [] },
            "Watch Status": { "type": "select", "select": { "name": "Watching" } },
            "[IMPORT] Last Import Date": { "type": "date", "date": null },
        }
    });
    serde_json::from_value(value).unwrap()
}

pub fn movie_page(page_id: &str, imdb_id: &str, title: &str) -> Page {
    let value = json!({
        "id": page_id,
        "properties": {
            "Title": { "type": "title", "title": [text_fragment(title)] },
            "IMDB ID": { "type": "rich_text", "rich_text": [text_fragment(imdb_id)] },
            "Plot": { "type": "rich_text", "rich_text": [] },
            "Genres": { "type": "multi_select", "multi_select": [] },
            "Languages": { "type": "multi_select", "multi_select": [] },
            "Actors": { "type": "multi_select", "multi_select": [] },
            "Countries": { "type": "multi_select", "multi_select": [] },
            "Poster": { "type": "files", "files": [] },
            "Rated": { "type": "select", "select": null },
            "Release Date": { "type": "date", "date": null },
            "Total Seasons": { "type": "number", "number": null },
            "[IMPORT] Last Import Date": { "type": "date", "date": null },
        }
    });
    serde_json::from_value(value).unwrap()
}
