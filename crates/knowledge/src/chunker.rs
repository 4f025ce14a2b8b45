//! Text chunking with configurable size and overlap.
//!
//! Splits prefer natural boundaries — a paragraph break, then a sentence
//! end, then any whitespace — and fall back to a hard cut at a character
//! boundary. Consecutive chunks share roughly `overlap` characters so no
//! split point loses local context, and every input character appears in at
//! least one chunk.

/// Chunk text into overlapping segments of at most `target_size` bytes.
///
/// Deterministic: the same text and parameters always yield the same
/// sequence. Input that already fits in one chunk (including empty input)
/// yields a single chunk.
pub fn chunk_text(text: &str, target_size: usize, overlap: usize) -> Vec<String> {
    if target_size == 0 || text.len() <= target_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        if text.len() - start <= target_size {
            chunks.push(text[start..].to_string());
            break;
        }

        // Find valid UTF-8 boundary for the hard cut position
        let mut hard_end = start + target_size;
        while hard_end > start && !text.is_char_boundary(hard_end) {
            hard_end -= 1;
        }

        let end = find_break(text, start, hard_end);
        chunks.push(text[start..end].to_string());

        // Step back by the overlap, but always make forward progress
        let mut next_start = end.saturating_sub(overlap);
        if next_start <= start {
            next_start = end;
        }
        while next_start < text.len() && !text.is_char_boundary(next_start) {
            next_start += 1;
        }
        start = next_start;
    }

    tracing::debug!(
        "Chunked {} bytes into {} chunks (size: {}, overlap: {})",
        text.len(),
        chunks.len(),
        target_size,
        overlap
    );

    chunks
}

/// Truncate text to at most `max_len` bytes, cutting on the same boundary
/// ladder the chunker uses (paragraph, sentence, whitespace, hard cut) so a
/// cap never lands mid-sentence when that is avoidable.
pub fn truncate_at_boundary(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len || max_len == 0 {
        return text;
    }

    let mut hard_end = max_len;
    while hard_end > 0 && !text.is_char_boundary(hard_end) {
        hard_end -= 1;
    }

    &text[..find_break(text, 0, hard_end)]
}

/// Pick the split position in `(start, hard_end]`, preferring a paragraph
/// break, then a sentence end, then whitespace, then the hard cut.
fn find_break(text: &str, start: usize, hard_end: usize) -> usize {
    let window = &text[start..hard_end];

    // Paragraph break: cut after the blank line
    if let Some(pos) = window.rfind("\n\n") {
        if pos > 0 {
            return start + pos + 2;
        }
    }

    // Sentence end: cut after the punctuation and its trailing separator
    let sentence_breaks = [". ", ".\n", "! ", "!\n", "? ", "?\n"];
    if let Some(pos) = sentence_breaks
        .iter()
        .filter_map(|sep| window.rfind(sep))
        .max()
    {
        if pos > 0 {
            return start + pos + 2;
        }
    }

    // Any whitespace: cut after it
    if let Some(pos) = window.rfind(char::is_whitespace) {
        if pos > 0 {
            let ws_len = window[pos..].chars().next().map(char::len_utf8).unwrap_or(1);
            return start + pos + ws_len;
        }
    }

    hard_end
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rebuild the original text by merging the overlap between adjacent
    /// chunks; equality proves no character was lost at any split point.
    fn reassemble(chunks: &[String]) -> String {
        let mut out = chunks[0].clone();
        for chunk in &chunks[1..] {
            let max = chunk.len().min(out.len());
            let mut k = max;
            while k > 0 && !(chunk.is_char_boundary(k) && out.ends_with(&chunk[..k])) {
                k -= 1;
            }
            out.push_str(&chunk[k..]);
        }
        out
    }

    fn numbered_text(sentences: usize) -> String {
        (0..sentences)
            .map(|i| format!("Sentence number {} covers a distinct policy topic. ", i))
            .collect()
    }

    #[test]
    fn test_chunks_respect_target_size() {
        let text = numbered_text(100);
        let chunks = chunk_text(&text, 200, 50);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 200, "chunk of {} bytes", chunk.len());
        }
    }

    #[test]
    fn test_no_characters_lost() {
        let text = numbered_text(80);
        let chunks = chunk_text(&text, 250, 60);
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_no_characters_lost_without_whitespace() {
        // Forces the hard-cut path
        let text: String = (0..500).map(|i| char::from(b'a' + (i % 23) as u8)).collect();
        let chunks = chunk_text(&text, 64, 16);
        assert_eq!(reassemble(&chunks), text);
        for chunk in &chunks {
            assert!(chunk.len() <= 64);
        }
    }

    #[test]
    fn test_deterministic() {
        let text = numbered_text(50);
        let first = chunk_text(&text, 300, 80);
        let second = chunk_text(&text, 300, 80);
        assert_eq!(first, second);
    }

    #[test]
    fn test_degenerate_input_single_chunk() {
        assert_eq!(chunk_text("", 100, 10), vec!["".to_string()]);
        assert_eq!(chunk_text("short", 100, 10), vec!["short".to_string()]);
    }

    #[test]
    fn test_prefers_paragraph_breaks() {
        let text = format!("{}\n\n{}", "First paragraph body here.", numbered_text(20));
        let chunks = chunk_text(&text, 60, 10);

        assert!(chunks[0].ends_with("\n\n"));
        assert!(chunks[0].starts_with("First paragraph"));
    }

    #[test]
    fn test_prefers_sentence_breaks_over_hard_cut() {
        let text = numbered_text(10);
        let chunks = chunk_text(&text, 120, 20);

        // Every non-final chunk should end at a sentence boundary
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(
                chunk.trim_end().ends_with('.'),
                "chunk did not end at a sentence: {:?}",
                chunk
            );
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let text = numbered_text(60);
        let chunks = chunk_text(&text, 200, 50);

        for pair in chunks.windows(2) {
            let tail: String = {
                let prev = &pair[0];
                let mut idx = prev.len().saturating_sub(20);
                while !prev.is_char_boundary(idx) {
                    idx += 1;
                }
                prev[idx..].to_string()
            };
            assert!(
                pair[1].contains(tail.trim()) || tail.trim().is_empty(),
                "no shared context between chunks"
            );
        }
    }

    #[test]
    fn test_truncate_at_boundary() {
        let text = "First sentence here. Second sentence here. Third sentence here.";
        let truncated = truncate_at_boundary(text, 30);

        assert!(truncated.len() <= 30);
        assert!(truncated.trim_end().ends_with('.'), "cut mid-sentence: {:?}", truncated);
        assert!(text.starts_with(truncated));
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_at_boundary("short", 100), "short");
    }

    #[test]
    fn test_utf8_safety() {
        let text = "política de biblioteca é rígida — multas diárias. ".repeat(40);
        let chunks = chunk_text(&text, 100, 25);
        assert!(chunks.len() > 1);
        assert_eq!(reassemble(&chunks), text);
    }
}
