//! Shared text helpers.
//!
//! Generated content is free-form text, so "empty" always means
//! "blank after trimming" throughout the crate.

/// True when the string has no visible characters.
#[inline]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Split text into paragraphs on blank-line boundaries.
///
/// Lines inside a paragraph are joined with a single space; blank
/// paragraphs are dropped. Windows line endings are accepted.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs
}

/// Trimmed, non-blank entries of a list.
pub fn non_blank_lines(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("  \n\t"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn test_split_paragraphs() {
        let text = "First line\ncontinues here.\n\n\nSecond paragraph.\r\n\r\n  ";
        assert_eq!(
            split_paragraphs(text),
            vec![
                "First line continues here.".to_string(),
                "Second paragraph.".to_string()
            ]
        );
    }

    #[test]
    fn test_split_paragraphs_blank() {
        assert!(split_paragraphs("\n \n").is_empty());
    }

    #[test]
    fn test_non_blank_lines() {
        let items = vec![" a ".to_string(), "".to_string(), "  ".to_string(), "b".to_string()];
        assert_eq!(non_blank_lines(&items), vec!["a".to_string(), "b".to_string()]);
    }
}
