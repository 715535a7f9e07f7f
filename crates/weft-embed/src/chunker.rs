//! Word-window chunking.
//!
//! Long documents are split into overlapping word windows before embedding,
//! so that one logical document maps to several fixed-size chunks. The
//! splitter is a pure function of its input: finite, deterministic, and
//! restartable.

use weft_core::{Error, Result};

/// Split text into overlapping word windows.
///
/// Windows are `chunk_size` whitespace-delimited words wide and advance by
/// `chunk_size - overlap` words, so consecutive chunks share `overlap`
/// words. The last window may be shorter than `chunk_size`.
///
/// Texts of `overlap` words or fewer produce exactly one chunk (possibly
/// empty, for empty input). Otherwise, for `W` words and stride `s`, the
/// chunk count is `ceil((W - overlap) / s)`.
///
/// # Errors
///
/// Returns a configuration error when `chunk_size` is zero or
/// `overlap >= chunk_size`; a non-positive stride would never terminate.
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        return Err(Error::config("chunk_size must be greater than zero"));
    }
    if overlap >= chunk_size {
        return Err(Error::config(format!(
            "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
        )));
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= overlap {
        return Ok(vec![words.join(" ")]);
    }

    let stride = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start += stride;
    }

    Ok(chunks)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_split_short_text_single_chunk() {
        let chunks = split("hello world", 500, 50).unwrap();
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_split_empty_text_single_empty_chunk() {
        let chunks = split("", 500, 50).unwrap();
        assert_eq!(chunks, vec![String::new()]);
    }

    #[test]
    fn test_split_thousand_words_three_chunks() {
        // W=1000, chunk_size=500, overlap=50 (stride 450):
        // ceil((1000 - 50) / 450) = 3
        let chunks = split(&words(1000), 500, 50).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].split_whitespace().count(), 500);
        assert_eq!(chunks[1].split_whitespace().count(), 500);
        assert_eq!(chunks[2].split_whitespace().count(), 100);
    }

    #[test]
    fn test_split_exact_window_single_chunk() {
        let chunks = split(&words(500), 500, 50).unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_split_one_past_window_two_chunks() {
        let chunks = split(&words(501), 500, 50).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].split_whitespace().count(), 51);
    }

    #[test]
    fn test_split_consecutive_chunks_overlap() {
        let chunks = split(&words(20), 10, 3).unwrap();
        let first: Vec<&str> = chunks[0].split_whitespace().collect();
        let second: Vec<&str> = chunks[1].split_whitespace().collect();
        // The last `overlap` words of one chunk open the next.
        assert_eq!(&first[first.len() - 3..], &second[..3]);
    }

    #[test]
    fn test_split_rejects_overlap_not_smaller() {
        assert!(split("a b c", 10, 10).is_err());
        assert!(split("a b c", 10, 11).is_err());
    }

    #[test]
    fn test_split_rejects_zero_chunk_size() {
        assert!(split("a b c", 0, 0).is_err());
    }

    #[test]
    fn test_split_is_deterministic() {
        let text = words(777);
        assert_eq!(split(&text, 100, 10).unwrap(), split(&text, 100, 10).unwrap());
    }

    proptest! {
        #[test]
        fn prop_chunk_count_matches_formula(
            w in 0usize..2000,
            chunk_size in 2usize..300,
            overlap_frac in 0usize..100,
        ) {
            let overlap = overlap_frac * (chunk_size - 1) / 100;
            let chunks = split(&words(w), chunk_size, overlap).unwrap();
            let stride = chunk_size - overlap;
            let expected = if w <= overlap {
                1
            } else {
                (w - overlap).div_ceil(stride)
            };
            prop_assert_eq!(chunks.len(), expected);
        }

        #[test]
        fn prop_chunks_cover_all_words(
            w in 1usize..1000,
            chunk_size in 2usize..200,
        ) {
            let overlap = chunk_size / 4;
            let text = words(w);
            let chunks = split(&text, chunk_size, overlap).unwrap();
            // Every input word appears in at least one chunk.
            let joined = chunks.join(" ");
            let seen: std::collections::HashSet<&str> = joined.split_whitespace().collect();
            for word in text.split_whitespace() {
                prop_assert!(seen.contains(word));
            }
        }

        #[test]
        fn prop_windows_never_exceed_chunk_size(
            w in 0usize..1500,
            chunk_size in 1usize..250,
        ) {
            let overlap = chunk_size.saturating_sub(1) / 2;
            let chunks = split(&words(w), chunk_size, overlap).unwrap();
            for chunk in &chunks {
                prop_assert!(chunk.split_whitespace().count() <= chunk_size);
            }
        }
    }
}
