use crate::{Error, Result};

/// Convert rendered reply markup into plain text.
///
/// The markup goes through an HTML-to-Markdown conversion, then every line
/// is trimmed and blank lines are dropped, so paragraphs end up on
/// consecutive lines.
pub fn normalize(markup: &str) -> Result<String> {
    let converted = htmd::convert(markup).map_err(|e| Error::Normalize(e.to_string()))?;
    Ok(compact_lines(&converted))
}

/// Trim every line and drop the empty ones
fn compact_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_empty_paragraphs() {
        let text = normalize("<p>Hello</p>\n<p></p>\n<p>World</p>").unwrap();
        assert_eq!(text, "Hello\nWorld");
    }

    #[test]
    fn test_normalize_keeps_inline_formatting_as_markdown() {
        let text = normalize("<p>Use <strong>cargo</strong> here</p>").unwrap();
        assert_eq!(text, "Use **cargo** here");
    }

    #[test]
    fn test_normalize_blank_markup_is_empty() {
        assert_eq!(normalize("<div>  </div>").unwrap(), "");
    }

    #[test]
    fn test_compact_lines_trims_and_joins() {
        assert_eq!(compact_lines("  one  \n\n\t two\n   \nthree"), "one\ntwo\nthree");
    }
}
