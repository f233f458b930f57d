/*!
 * Glossary file loading.
 *
 * Two formats are accepted: a `.json` file holding an array of strings, or a
 * plain text file with one term per line where blank lines and lines starting
 * with `#` are ignored.
 */

use std::fs;
use std::path::Path;

use log::debug;

use crate::errors::GlossaryError;

/// Read the terms of every file in `paths`, in order
pub fn load_terms<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<String>, GlossaryError> {
    let mut terms = Vec::new();
    for path in paths {
        terms.extend(load_terms_from_file(path.as_ref())?);
    }
    Ok(terms)
}

/// Read the terms of a single glossary file
pub fn load_terms_from_file(path: &Path) -> Result<Vec<String>, GlossaryError> {
    let file_error = |message: String| GlossaryError::File {
        path: path.display().to_string(),
        message,
    };

    let content = fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let terms = if is_json {
        serde_json::from_str::<Vec<String>>(&content)
            .map_err(|e| file_error(format!("expected a JSON array of strings ({})", e)))?
    } else {
        parse_term_lines(&content)
    };

    debug!("Loaded {} glossary terms from {}", terms.len(), path.display());
    Ok(terms)
}

fn parse_term_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
