use crate::error::ExportError;
use reqwest::Url;
use serde::Deserialize;

// Endpoint-specific modules
pub mod cards;
pub mod decks;

/// A card exactly as the API returns it. Field keys differ from card to
/// card, so it stays an untyped JSON value until the parser picks it apart.
pub type RawCard = serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct Deck {
    pub id: String,
    pub name: String,
}

/// One page of a paginated listing
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub docs: Vec<T>,
    #[serde(default)]
    pub bookmark: Option<String>,
}

impl<T> Page<T> {
    /// Cursor for the following page. Empty cursors count as absent.
    pub fn next_bookmark(&self) -> Option<&str> {
        self.bookmark.as_deref().filter(|b| !b.is_empty())
    }
}

/// Build `<base_url>/<path>` with the given query parameters
pub fn endpoint(base_url: &str, path: &str, params: &[(&str, &str)]) -> Result<Url, ExportError> {
    let mut url = Url::parse(&format!("{}/{}", base_url.trim_end_matches('/'), path))
        .map_err(|e| ExportError::Config(format!("Invalid API URL '{}': {}", base_url, e)))?;

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }

    Ok(url)
}
