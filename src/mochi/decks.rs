use crate::error::ExportError;
use crate::mochi::{endpoint, Deck, Page};
use crate::utils::http::PageSource;
use tracing::{debug, info};

const OPERATION: &str = "fetch decks";

/// Finds a deck's id by walking the paginated deck listing.
pub struct DeckResolver<S> {
    source: S,
    base_url: String,
}

impl<S: PageSource> DeckResolver<S> {
    pub fn new(source: S, base_url: impl Into<String>) -> Self {
        Self {
            source,
            base_url: base_url.into(),
        }
    }

    /// Return the id of the first deck whose name equals `name`, ignoring case.
    ///
    /// Pages are requested only until the deck turns up. Paging ends on a
    /// page without a bookmark or with no decks, and then the lookup fails
    /// with [`ExportError::DeckNotFound`].
    pub async fn resolve_deck_id(&self, name: &str) -> Result<String, ExportError> {
        let wanted = name.to_lowercase();
        let mut url = endpoint(&self.base_url, "decks", &[])?;
        let mut pages = 0;

        loop {
            let body = self.source.get_text(&url, OPERATION).await?;
            let page: Page<Deck> = serde_json::from_str(&body)?;
            pages += 1;
            debug!("Deck page {} has {} decks", pages, page.docs.len());

            if let Some(deck) = page.docs.iter().find(|d| d.name.to_lowercase() == wanted) {
                info!("Found deck '{}' (id {})", deck.name, deck.id);
                return Ok(deck.id.clone());
            }

            match page.next_bookmark() {
                Some(bookmark) if !page.docs.is_empty() => {
                    url = endpoint(&self.base_url, "decks", &[("bookmark", bookmark)])?;
                }
                _ => break,
            }
        }

        debug!("Searched {} deck pages without a match", pages);
        Err(ExportError::DeckNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mochi::testing::{FakeSource, BASE_URL};
    use serde_json::json;

    const PAGE_1: &str = "https://mochi.test/api/decks";
    const PAGE_2: &str = "https://mochi.test/api/decks?bookmark=b2";
    const PAGE_3: &str = "https://mochi.test/api/decks?bookmark=b3";

    fn three_pages() -> FakeSource {
        FakeSource::new()
            .with_page(
                PAGE_1,
                json!({"docs": [{"id": "d1", "name": "Spanish"}], "bookmark": "b2"}),
            )
            .with_page(
                PAGE_2,
                json!({"docs": [{"id": "d2", "name": "German"}, {"id": "d3", "name": "Chinese"}], "bookmark": "b3"}),
            )
            .with_page(
                PAGE_3,
                json!({"docs": [{"id": "d4", "name": "Japanese"}]}),
            )
    }

    #[tokio::test]
    async fn test_finds_deck_on_first_page() {
        let source = three_pages();
        let resolver = DeckResolver::new(&source, BASE_URL);

        assert_eq!(resolver.resolve_deck_id("Spanish").await.unwrap(), "d1");
        assert_eq!(source.requests(), vec![PAGE_1]);
    }

    #[tokio::test]
    async fn test_match_ignores_case_and_stops_paging() {
        let source = three_pages();
        let resolver = DeckResolver::new(&source, BASE_URL);

        assert_eq!(resolver.resolve_deck_id("cHINESE").await.unwrap(), "d3");
        assert_eq!(source.requests(), vec![PAGE_1, PAGE_2]);
    }

    #[tokio::test]
    async fn test_finds_deck_on_last_page() {
        let source = three_pages();
        let resolver = DeckResolver::new(&source, BASE_URL);

        assert_eq!(resolver.resolve_deck_id("japanese").await.unwrap(), "d4");
    }

    #[tokio::test]
    async fn test_missing_deck_reads_every_page_once() {
        let source = three_pages();
        let resolver = DeckResolver::new(&source, BASE_URL);

        let err = resolver.resolve_deck_id("French").await.unwrap_err();

        assert!(matches!(err, ExportError::DeckNotFound(ref name) if name == "French"));
        assert_eq!(err.to_string(), "Deck 'French' not found");
        assert_eq!(source.requests(), vec![PAGE_1, PAGE_2, PAGE_3]);
    }

    #[tokio::test]
    async fn test_empty_page_ends_paging_even_with_bookmark() {
        let source = FakeSource::new()
            .with_page(PAGE_1, json!({"docs": [], "bookmark": "b2"}))
            .with_page(PAGE_2, json!({"docs": [{"id": "d2", "name": "Chinese"}]}));
        let resolver = DeckResolver::new(&source, BASE_URL);

        let err = resolver.resolve_deck_id("Chinese").await.unwrap_err();

        assert!(matches!(err, ExportError::DeckNotFound(_)));
        assert_eq!(source.requests(), vec![PAGE_1]);
    }

    #[tokio::test]
    async fn test_name_must_match_exactly() {
        let source = FakeSource::new().with_page(
            PAGE_1,
            json!({"docs": [{"id": "d1", "name": "Chinese HSK1"}]}),
        );
        let resolver = DeckResolver::new(&source, BASE_URL);

        assert!(matches!(
            resolver.resolve_deck_id("Chinese").await,
            Err(ExportError::DeckNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_http_failure_propagates() {
        let source = FakeSource::new();
        let resolver = DeckResolver::new(&source, BASE_URL);

        let err = resolver.resolve_deck_id("Chinese").await.unwrap_err();
        assert!(matches!(err, ExportError::Http { status: 404, .. }));
    }
}
