use crate::utils::files::write_atomically;
use crate::vocab::VocabEntry;
use std::io;
use std::path::Path;
use tracing::info;

/// Line between two entries
pub const SEPARATOR: &str = "---";

/// Render entries as labelled four-line blocks separated by `---`
pub fn render(entries: &[VocabEntry]) -> String {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push_str(SEPARATOR);
            out.push('\n');
        }
        out.push_str(&format!(
            "Pinyin: {}\nHanzi: {}\nMeaning: {}\nAdded: {}\n",
            entry.pinyin, entry.hanzi, entry.meaning, entry.added
        ));
    }
    out
}

/// Replace the file at `path` with the rendered entries
pub fn write_vocab_file(entries: &[VocabEntry], path: &Path) -> io::Result<()> {
    write_atomically(path, render(entries).as_bytes())?;
    info!("Wrote {} valid cards to {}", entries.len(), path.display());
    Ok(())
}
