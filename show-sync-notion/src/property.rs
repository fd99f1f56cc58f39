use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The column types the sync knows how to read and write.
///
/// Notion databases can hold other property types (people, rollups, URLs,
/// ...); those are dropped when a page is parsed and no flow addresses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Title,
    RichText,
    Date,
    Number,
    Select,
    MultiSelect,
    Files,
    Relation,
    Formula,
    Checkbox,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Wire names, matching the "type" tag in property JSON
        let name = match self {
            Self::Title => "title",
            Self::RichText => "rich_text",
            Self::Date => "date",
            Self::Number => "number",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::Files => "files",
            Self::Relation => "relation",
            Self::Formula => "formula",
            Self::Checkbox => "checkbox",
        };
        write!(f, "{name}")
    }
}

/// One fragment of a rich text value.
///
/// The store returns fragments with annotations, links, and mention payloads
/// we never touch; only the plain text and the writable content survive the
/// round trip. Mention fragments have no `text` payload at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextFragment {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
}

impl RichTextFragment {
    pub fn new(content: &str) -> Self {
        Self {
            plain_text: content.to_string(),
            text: Some(TextContent {
                content: content.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
    pub start: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

/// A file attachment. Writes always use external URLs; reads also tolerate
/// files hosted by the store itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<FileUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileUrl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUrl {
    pub url: String,
}

impl FileRef {
    /// Build an externally hosted file reference.
    pub fn external(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: Some("external".to_string()),
            external: Some(FileUrl {
                url: url.to_string(),
            }),
            file: None,
        }
    }

    /// The file's URL, wherever it is hosted.
    pub fn url(&self) -> Option<&str> {
        self.external
            .as_ref()
            .or(self.file.as_ref())
            .map(|f| f.url.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRef {
    pub id: String,
}

/// A typed property value, shaped exactly like the store's wire JSON
/// (`{"type": "date", "date": {"start": "2024-01-01"}}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        title: Vec<RichTextFragment>,
    },
    RichText {
        rich_text: Vec<RichTextFragment>,
    },
    Date {
        date: Option<DateValue>,
    },
    Number {
        number: Option<f64>,
    },
    Select {
        select: Option<SelectOption>,
    },
    MultiSelect {
        multi_select: Vec<SelectOption>,
    },
    Files {
        files: Vec<FileRef>,
    },
    Relation {
        relation: Vec<RelationRef>,
    },
    /// Computed by the store; readable but never written.
    Formula {
        formula: serde_json::Value,
    },
    Checkbox {
        checkbox: bool,
    },
}

impl PropertyValue {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Title { .. } => ColumnType::Title,
            Self::RichText { .. } => ColumnType::RichText,
            Self::Date { .. } => ColumnType::Date,
            Self::Number { .. } => ColumnType::Number,
            Self::Select { .. } => ColumnType::Select,
            Self::MultiSelect { .. } => ColumnType::MultiSelect,
            Self::Files { .. } => ColumnType::Files,
            Self::Relation { .. } => ColumnType::Relation,
            Self::Formula { .. } => ColumnType::Formula,
            Self::Checkbox { .. } => ColumnType::Checkbox,
        }
    }

    pub fn title(value: &str) -> Self {
        Self::Title {
            title: vec![RichTextFragment::new(value)],
        }
    }

    /// A single-fragment rich text value.
    pub fn rich_text(value: &str) -> Self {
        Self::RichText {
            rich_text: vec![RichTextFragment::new(value)],
        }
    }

    /// One fragment per input string.
    pub fn rich_text_list(values: &[String]) -> Self {
        Self::RichText {
            rich_text: values.iter().map(|v| RichTextFragment::new(v)).collect(),
        }
    }

    pub fn date(start: &str) -> Self {
        Self::Date {
            date: Some(DateValue {
                start: start.to_string(),
            }),
        }
    }

    pub fn number(value: f64) -> Self {
        Self::Number {
            number: Some(value),
        }
    }

    pub fn select(name: &str) -> Self {
        Self::Select {
            select: Some(SelectOption {
                name: name.to_string(),
            }),
        }
    }

    pub fn multi_select(values: &[String]) -> Self {
        Self::MultiSelect {
            multi_select: values
                .iter()
                .map(|v| SelectOption { name: v.clone() })
                .collect(),
        }
    }

    pub fn external_file(name: &str, url: &str) -> Self {
        Self::Files {
            files: vec![FileRef::external(name, url)],
        }
    }

    pub fn relation(ids: &[String]) -> Self {
        Self::Relation {
            relation: ids.iter().map(|id| RelationRef { id: id.clone() }).collect(),
        }
    }
}

/// Parse a page's raw property map, dropping anything outside the supported
/// type set.
pub fn parse_properties(
    raw: &serde_json::Map<String, serde_json::Value>,
) -> BTreeMap<String, PropertyValue> {
    let mut properties = BTreeMap::new();
    for (name, value) in raw {
        match serde_json::from_value::<PropertyValue>(value.clone()) {
            Ok(parsed) => {
                properties.insert(name.clone(), parsed);
            }
            Err(_) => {
                let kind = value
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("unknown");
                log::debug!("Dropping unsupported {kind} property: {name}");
            }
        }
    }
    properties
}
