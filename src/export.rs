use crate::config::Config;
use crate::error::ExportError;
use crate::mochi::cards::CardFetcher;
use crate::mochi::decks::DeckResolver;
use crate::mochi::RawCard;
use crate::utils::http::PageSource;
use crate::vocab::{parse_cards, writer};
use indicatif::ProgressBar;
use std::path::Path;
use tracing::info;

/// What a finished export did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub deck_id: String,
    pub fetched: usize,
    pub written: usize,
}

impl ExportSummary {
    pub fn skipped(&self) -> usize {
        self.fetched - self.written
    }
}

/// Resolve the configured deck, download its cards and write the vocabulary file.
///
/// `connect` is called once per API operation, so the deck lookup and the
/// card download each get their own client that is dropped when they finish.
pub async fn export_deck<S, F>(
    config: &Config,
    connect: F,
    progress: ProgressBar,
) -> Result<ExportSummary, ExportError>
where
    S: PageSource,
    F: Fn() -> Result<S, ExportError>,
{
    info!("Fetching deck '{}'...", config.deck_name);
    let deck_id = DeckResolver::new(connect()?, config.api_base_url.as_str())
        .resolve_deck_id(&config.deck_name)
        .await?;

    info!("Fetching cards...");
    let cards = CardFetcher::new(connect()?, config.api_base_url.as_str())
        .with_progress(progress)
        .fetch_all_cards(&deck_id)
        .await?;
    info!("Found {} cards", cards.len());

    let written = export_cards(&cards, &config.output_file)?;

    Ok(ExportSummary {
        deck_id,
        fetched: cards.len(),
        written,
    })
}

/// Parse `cards` and write them to `output_file`. An empty deck leaves the file untouched.
pub fn export_cards(cards: &[RawCard], output_file: &Path) -> Result<usize, ExportError> {
    if cards.is_empty() {
        info!("No cards found in the deck");
        return Ok(0);
    }

    let entries = parse_cards(cards);
    info!("Writing to {}...", output_file.display());
    writer::write_vocab_file(&entries, output_file)?;

    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mochi::testing::{FakeSource, BASE_URL};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    const DECKS: &str = "https://mochi.test/api/decks";
    const CARDS: &str = "https://mochi.test/api/cards?deck-id=zh&limit=100";
    const CARDS_2: &str = "https://mochi.test/api/cards?deck-id=zh&limit=100&bookmark=next";

    fn config(dir: &TempDir) -> Config {
        Config {
            api_key: "secret".to_string(),
            api_base_url: BASE_URL.to_string(),
            deck_name: "chinese".to_string(),
            output_file: dir.path().join("chinese_vocab.txt"),
        }
    }

    fn decks() -> serde_json::Value {
        json!({"docs": [{"id": "es", "name": "Spanish"}, {"id": "zh", "name": "Chinese"}]})
    }

    #[tokio::test]
    async fn test_exports_deck_end_to_end() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let source = FakeSource::new()
            .with_page(DECKS, decks())
            .with_page(
                CARDS,
                json!({"docs": [{
                    "component-cache": {"pinyin": {"a": {"text": "{没}(méi) {V}(V)"}}},
                    "fields": {"name": {"value": "x"}, "f1": {"value": "没 V"}},
                    "name": "not",
                    "created-at": {"date": "2023-01-01T10:00:00Z"}
                }], "bookmark": "next"}),
            )
            .with_page(
                CARDS_2,
                json!({"docs": [{"name": ""}, {"name": "good", "fields": {"f": {"value": "好"}}}]}),
            );

        let summary = export_deck(&config, || Ok(&source), ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(
            summary,
            ExportSummary {
                deck_id: "zh".to_string(),
                fetched: 3,
                written: 2,
            }
        );
        assert_eq!(summary.skipped(), 1);
        assert_eq!(
            fs::read_to_string(&config.output_file).unwrap(),
            "Pinyin: méi\nHanzi: 没\nMeaning: not\nAdded: 2023-01-01 10:00:00\n\
             ---\n\
             Pinyin: \nHanzi: 好\nMeaning: good\nAdded: \n"
        );
    }

    #[tokio::test]
    async fn test_empty_deck_does_not_touch_output() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let source = FakeSource::new()
            .with_page(DECKS, decks())
            .with_page(CARDS, json!({"docs": []}));

        let summary = export_deck(&config, || Ok(&source), ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(summary.written, 0);
        assert!(!config.output_file.exists());
    }

    #[tokio::test]
    async fn test_unknown_deck_fails_before_fetching_cards() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.deck_name = "Klingon".to_string();
        let source = FakeSource::new().with_page(DECKS, decks());

        let err = export_deck(&config, || Ok(&source), ProgressBar::hidden())
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::DeckNotFound(_)));
        assert_eq!(source.requests(), vec![DECKS]);
        assert!(!config.output_file.exists());
    }

    #[tokio::test]
    async fn test_connect_failure_aborts_the_run() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);

        let err = export_deck::<&FakeSource, _>(
            &config,
            || Err(ExportError::Config("no client".to_string())),
            ProgressBar::hidden(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ExportError::Config(_)));
    }
}
