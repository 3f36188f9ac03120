//! Keyword file loading

use crate::{
    error::{SearchError, SearchResult},
    types::Keyword,
};
use std::path::Path;

/// Split newline-delimited text into keywords
///
/// Lines are trimmed and blank lines dropped. Duplicates are kept.
pub fn parse_keywords(text: &str) -> Vec<Keyword> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.split('\n')
        .filter_map(|line| Keyword::new(line).ok())
        .collect()
}

/// Read a UTF-8 keyword file
pub fn load_keywords<P: AsRef<Path>>(path: P) -> SearchResult<Vec<Keyword>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| SearchError::Io(format!("Could not read {}: {e}", path.display())))?;

    let text = String::from_utf8(bytes).map_err(|e| {
        SearchError::InvalidInput(format!(
            "{} is not valid UTF-8 (byte {})",
            path.display(),
            e.utf8_error().valid_up_to()
        ))
    })?;

    let keywords = parse_keywords(&text);
    log::info!("Loaded {} keywords from {}", keywords.len(), path.display());
    Ok(keywords)
}
