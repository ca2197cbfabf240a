//! Turning raw cards into vocabulary entries and writing them out
//!
//! - `parser`: extracts pinyin, hanzi, meaning and creation date from a card
//! - `writer`: serializes entries to the study text format

pub mod parser;
pub mod writer;

use crate::mochi::RawCard;

/// One exported word. Any field may be empty, but never all of pinyin, hanzi and meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocabEntry {
    pub pinyin: String,
    pub hanzi: String,
    pub meaning: String,
    pub added: String,
}

/// Parse every card in order, dropping the ones that yield nothing
pub fn parse_cards(cards: &[RawCard]) -> Vec<VocabEntry> {
    cards.iter().filter_map(parser::parse_card).collect()
}
