//! Tail-biased truncation.
//!
//! Diagnostic data is assumed to be ordered oldest-first, so whenever content
//! exceeds a budget the most recent lines are kept and the oldest dropped.

/// Keep at most `max_lines` items from the end of `lines`.
///
/// Returns the kept items in original order and whether anything was dropped.
/// A zero budget yields nothing, reported as truncated iff `lines` was non-empty.
pub fn truncate_tail<T: Clone>(lines: &[T], max_lines: usize) -> (Vec<T>, bool) {
    if lines.len() <= max_lines {
        return (lines.to_vec(), false);
    }
    let start = lines.len() - max_lines;
    (lines[start..].to_vec(), true)
}

/// Result of fitting a text into a word budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordTruncation {
    pub text: String,
    pub truncated: bool,
    pub kept_words: usize,
}

/// Keep whole lines from the end of `text` while their word count fits in
/// `max_words`.
pub fn truncate_words(text: &str, max_words: usize) -> WordTruncation {
    let total = crate::utils::count_words(text);
    if total <= max_words {
        return WordTruncation {
            text: text.to_string(),
            truncated: false,
            kept_words: total,
        };
    }
    let mut kept: Vec<&str> = Vec::new();
    let mut words = 0usize;
    for line in text.split_inclusive('\n').rev() {
        let n = crate::utils::count_words(line);
        if words + n > max_words {
            break;
        }
        kept.push(line);
        words += n;
    }
    kept.reverse();
    WordTruncation {
        text: kept.concat(),
        truncated: true,
        kept_words: words,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("line {}", i)).collect()
    }

    #[test]
    fn test_within_budget_is_identity() {
        let lines = numbered(3);
        let (kept, truncated) = truncate_tail(&lines, 5);
        assert_eq!(kept, lines);
        assert!(!truncated);
        let (kept, truncated) = truncate_tail(&lines, 3);
        assert_eq!(kept, lines);
        assert!(!truncated);
    }

    #[test]
    fn test_over_budget_keeps_last_lines() {
        let lines = numbered(10);
        let (kept, truncated) = truncate_tail(&lines, 5);
        assert!(truncated);
        assert_eq!(kept, lines[5..].to_vec());
        assert_eq!(kept.first().map(String::as_str), Some("line 6"));
        assert_eq!(kept.last().map(String::as_str), Some("line 10"));
    }

    #[test]
    fn test_zero_budget() {
        let (kept, truncated) = truncate_tail(&numbered(2), 0);
        assert!(kept.is_empty());
        assert!(truncated);
        let empty: Vec<String> = Vec::new();
        let (kept, truncated) = truncate_tail(&empty, 0);
        assert!(kept.is_empty());
        assert!(!truncated);
    }

    #[test]
    fn test_truncate_words_keeps_tail_lines() {
        let text = "a b c\nd e\nf g h\n";
        let out = truncate_words(text, 5);
        assert!(out.truncated);
        assert_eq!(out.text, "d e\nf g h\n");
        assert_eq!(out.kept_words, 5);

        let fits = truncate_words(text, 8);
        assert!(!fits.truncated);
        assert_eq!(fits.text, text);
    }
}
