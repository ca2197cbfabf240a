use crate::error::ExportError;
use crate::mochi::{endpoint, Page, RawCard};
use crate::utils::http::PageSource;
use indicatif::ProgressBar;
use std::time::Duration;
use tracing::info;

const OPERATION: &str = "fetch cards";

/// Largest page the cards endpoint hands out
pub const PAGE_SIZE: usize = 100;

/// Downloads every card of a deck, one page after another.
pub struct CardFetcher<S> {
    source: S,
    base_url: String,
    progress: ProgressBar,
}

impl<S: PageSource> CardFetcher<S> {
    pub fn new(source: S, base_url: impl Into<String>) -> Self {
        Self {
            source,
            base_url: base_url.into(),
            progress: ProgressBar::hidden(),
        }
    }

    /// Report page progress on `progress` instead of staying silent
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Fetch all cards of `deck_id` in page order.
    pub async fn fetch_all_cards(&self, deck_id: &str) -> Result<Vec<RawCard>, ExportError> {
        self.progress.enable_steady_tick(Duration::from_millis(120));
        let result = self.fetch_pages(deck_id).await;
        self.progress.finish_and_clear();
        result
    }

    async fn fetch_pages(&self, deck_id: &str) -> Result<Vec<RawCard>, ExportError> {
        let limit = PAGE_SIZE.to_string();
        let mut bookmark: Option<String> = None;
        let mut cards = Vec::new();

        loop {
            let url = {
                let mut params = vec![("deck-id", deck_id), ("limit", limit.as_str())];
                if let Some(bookmark) = bookmark.as_deref() {
                    params.push(("bookmark", bookmark));
                }
                endpoint(&self.base_url, "cards", &params)?
            };

            let body = self.source.get_text(&url, OPERATION).await?;
            let page: Page<RawCard> = serde_json::from_str(&body)?;
            info!("Fetched {} cards from page", page.docs.len());

            if page.docs.is_empty() {
                break;
            }

            let next = page.next_bookmark().map(str::to_string);
            cards.extend(page.docs);
            self.progress.inc(1);
            self.progress
                .set_message(format!("{} cards fetched", cards.len()));

            match next {
                Some(next) => bookmark = Some(next),
                None => break,
            }
        }

        Ok(cards)
    }
}
