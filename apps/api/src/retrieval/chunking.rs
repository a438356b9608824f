/// Chunk size used for résumé ingestion, in characters.
pub const CV_CHUNK_SIZE: usize = 4000;
/// Overlap between consecutive résumé chunks, in characters.
pub const CV_CHUNK_OVERLAP: usize = 400;

/// Splits `text` into windows of `size` characters, each starting
/// `size - overlap` characters after the previous one. The overlap is
/// dropped when it is not smaller than `size`. Splits on char boundaries.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || size == 0 {
        return Vec::new();
    }
    let overlap = if overlap >= size { 0 } else { overlap };
    let step = size - overlap;

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Joins at most `max` snippets with a `---` separator line.
pub fn join_snippets(snippets: &[String], max: usize) -> String {
    snippets
        .iter()
        .take(max)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n---\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_single_chunk() {
        assert_eq!(chunk_text("hello", 10, 2), vec!["hello".to_string()]);
    }

    #[test]
    fn test_chunks_overlap() {
        let chunks = chunk_text("abcdefghij", 4, 1);
        assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn test_overlap_not_smaller_than_size_is_ignored() {
        let chunks = chunk_text("abcdef", 3, 3);
        assert_eq!(chunks, vec!["abc", "def"]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(chunk_text("", 4000, 400).is_empty());
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let chunks = chunk_text("héllo wörld", 5, 0);
        assert_eq!(chunks, vec!["héllo", " wörl", "d"]);
    }

    #[test]
    fn test_join_snippets_caps_count() {
        let snips: Vec<String> = (1..=8).map(|i| format!("s{i}")).collect();
        let joined = join_snippets(&snips, 6);
        assert_eq!(joined.matches("\n---\n").count(), 5);
        assert!(joined.starts_with("s1"));
        assert!(!joined.contains("s7"));
    }
}
