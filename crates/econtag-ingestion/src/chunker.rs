//! Fixed-width excerpt chunking for model input.

/// Configuration for the chunker.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Maximum characters per chunk. Characters are Unicode scalar values,
    /// never raw bytes, so a window cannot split a multi-byte character.
    pub max_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self { max_chars: 1500 }
    }
}

/// Split the excerpt into non-overlapping windows of at most
/// `max_chars` characters; the final chunk may be shorter.
///
/// The chunks cover the excerpt exactly once, in order, with no gaps or
/// overlaps; an empty excerpt yields zero chunks.
pub fn chunk_excerpt(excerpt: &str, config: &ChunkerConfig) -> Vec<String> {
    let window = config.max_chars.max(1);
    let chars: Vec<char> = excerpt.chars().collect();
    chars
        .chunks(window)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
