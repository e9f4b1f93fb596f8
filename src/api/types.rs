//! Wire types for the `/chat` endpoint

use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::text::string;

/// Label used when a source carries no name at all
pub const FALLBACK_SOURCE_NAME: &str = "Source";

/// Number of characters of `page_content` shown in a preview
pub const PREVIEW_CHARS: usize = 200;

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

impl ChatRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into() }
    }
}

/// Successful answer from the backend.
///
/// `sources` is optional on the wire; an absent or `null` list is kept as
/// `None` so callers can decide on the fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}

/// A retrieved document fragment backing an answer.
///
/// The backend only fills the fields it knows about, so every field
/// tolerates being missing or `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, deserialize_with = "null_as_default")]
    pub document: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub chunk: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub page_content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SourceMetadata>,
}

impl Source {
    /// Name to show: `metadata.source`, then `document`, then a fixed label
    pub fn display_name(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.source.as_deref())
            .filter(|s| !s.is_empty())
            .or_else(|| Some(self.document.as_str()).filter(|d| !d.is_empty()))
            .unwrap_or(FALLBACK_SOURCE_NAME)
    }

    /// Page to show: `metadata.page_number`, then `page`
    pub fn display_page(&self) -> Option<i64> {
        self.metadata
            .as_ref()
            .and_then(|m| m.page_number)
            .or(self.page)
    }

    /// Link to the original document, if the backend sent one
    pub fn url(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.url.as_deref())
            .filter(|u| !u.is_empty())
    }

    /// First [`PREVIEW_CHARS`] characters of the content, always followed by `...`
    pub fn preview(&self) -> String {
        string::preview(&self.page_content, PREVIEW_CHARS)
    }
}

/// Display overrides attached to a source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
