//! Fixed-size sliding window chunking.

use super::Chunk;

/// Slides a window of `chunk_size` characters over the text with `overlap`
/// characters of overlap between adjacent windows.
///
/// Stride is `max(chunk_size - overlap, 1)`, so the loop always advances
/// even when the overlap is configured at or above the window size. Windows
/// are measured in characters, not bytes, so multibyte text never splits
/// inside a code point. The final window may be shorter than `chunk_size`.
pub fn chunk_regular(text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    let stride = chunk_size.saturating_sub(overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        chunks.push(Chunk::with_text("regular", &window));
        start += stride;
    }
    chunks
}
