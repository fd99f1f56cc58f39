use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::NotionError;
use crate::property::PropertyValue;

const BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// One page as returned by the store: its ID plus the raw property map.
/// Typed parsing happens in [`crate::property::parse_properties`].
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<Page>,
    #[serde(default)]
    next_cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

/// The store operations the sync needs.
///
/// [`NotionClient`] implements this against the real API; test suites
/// substitute an in-memory fake so orchestration logic runs without a
/// network.
pub trait NotionApi {
    /// Every page of a database, pagination fully drained.
    fn query_all(&self, database_id: &str) -> Result<Vec<Page>, NotionError>;

    fn create_page(
        &self,
        database_id: &str,
        properties: &BTreeMap<String, PropertyValue>,
        icon: Option<&str>,
    ) -> Result<Page, NotionError>;

    fn update_page(
        &self,
        page_id: &str,
        properties: &BTreeMap<String, PropertyValue>,
    ) -> Result<Page, NotionError>;

    /// Soft-delete a page.
    fn archive_page(&self, page_id: &str) -> Result<(), NotionError>;
}

/// Blocking HTTP client for the Notion API.
pub struct NotionClient {
    http: reqwest::blocking::Client,
    token: String,
}

impl NotionClient {
    pub fn new(token: &str) -> Result<Self, NotionError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            token: token.to_string(),
        })
    }

    /// Send a prepared request with auth and version headers, classifying
    /// non-success statuses into [`NotionError::Api`].
    fn send(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<serde_json::Value, NotionError> {
        let resp = request
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()?;

        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            // Notion error bodies carry a "message" field worth surfacing
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or_else(|| body_snippet(&text).to_string());
            return Err(NotionError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// First 200 bytes of an error body, or the whole body when a character
/// straddles the cut.
fn body_snippet(text: &str) -> &str {
    text.get(..200).unwrap_or(text)
}

impl NotionApi for NotionClient {
    fn query_all(&self, database_id: &str) -> Result<Vec<Page>, NotionError> {
        let url = format!("{BASE_URL}/databases/{database_id}/query");
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = serde_json::Map::new();
            if let Some(ref c) = cursor {
                body.insert("start_cursor".to_string(), c.clone().into());
            }
            let value = self.send(self.http.post(&url).json(&body))?;
            let resp: QueryResponse = serde_json::from_value(value)?;

            pages.extend(resp.results);
            match (resp.has_more, resp.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        log::debug!("Loaded {} pages from database {database_id}", pages.len());
        Ok(pages)
    }

    fn create_page(
        &self,
        database_id: &str,
        properties: &BTreeMap<String, PropertyValue>,
        icon: Option<&str>,
    ) -> Result<Page, NotionError> {
        let mut body = serde_json::json!({
            "parent": {"database_id": database_id},
            "properties": properties,
        });
        if let Some(url) = icon {
            body["icon"] = serde_json::json!({
                "type": "external",
                "external": {"url": url},
            });
        }

        let value = self.send(self.http.post(format!("{BASE_URL}/pages")).json(&body))?;
        Ok(serde_json::from_value(value)?)
    }

    fn update_page(
        &self,
        page_id: &str,
        properties: &BTreeMap<String, PropertyValue>,
    ) -> Result<Page, NotionError> {
        let body = serde_json::json!({"properties": properties});
        let value = self.send(
            self.http
                .patch(format!("{BASE_URL}/pages/{page_id}"))
                .json(&body),
        )?;
        Ok(serde_json::from_value(value)?)
    }

    fn archive_page(&self, page_id: &str) -> Result<(), NotionError> {
        let body = serde_json::json!({"archived": true});
        self.send(
            self.http
                .patch(format!("{BASE_URL}/pages/{page_id}"))
                .json(&body),
        )?;
        Ok(())
    }
}
