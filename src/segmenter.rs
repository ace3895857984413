//! Character-budgeted text segmentation with semantic boundary preference.
//!
//! The [`Segmenter`] splits raw document text into an ordered sequence of
//! [`Chunk`]s, each at most `max_chunk_chars` characters, preferring to cut at
//! paragraph breaks, then line breaks, then sentence ends, then word
//! boundaries, before falling back to a hard character-level split. Adjacent
//! chunks share a trailing overlap so context survives a boundary.
//!
//! Segmentation is deterministic: the same input and parameters always yield
//! the same chunk sequence.

/// Separator priority, coarsest first. An empty-string (character-level) hard
/// split is the implicit last resort.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " "];

/// A bounded contiguous slice of document text with positional metadata.
///
/// `index` is 1-based and defines the chunk's position in the final
/// aggregation; `total` is the number of chunks produced for the same input.
/// Chunks are immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based position of this chunk within the document.
    pub index: usize,
    /// Total number of chunks produced for the document.
    pub total: usize,
    /// The chunk text, including any leading overlap from the previous chunk.
    pub text: String,
}

impl Chunk {
    /// Character length of the chunk text.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits document text into overlapping chunks under a character budget.
#[derive(Clone, Copy, Debug)]
pub struct Segmenter {
    max_chunk_chars: usize,
    overlap_chars: usize,
}

impl Segmenter {
    /// Creates a segmenter with the given budget and overlap.
    ///
    /// A zero budget is clamped to 1 so segmentation always terminates.
    #[must_use]
    pub fn new(max_chunk_chars: usize, overlap_chars: usize) -> Self {
        Self {
            max_chunk_chars: max_chunk_chars.max(1),
            overlap_chars,
        }
    }

    /// Splits `text` into an ordered sequence of chunks.
    ///
    /// Empty input yields an empty sequence; non-empty input yields at least
    /// one chunk. No chunk exceeds the budget: a piece that no separator can
    /// break down is hard-split at character boundaries, leaving its
    /// neighbors untouched.
    pub fn segment(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        let chunks = if char_len(text) <= self.max_chunk_chars {
            vec![text.to_string()]
        } else {
            self.merge(self.split_pieces(text, 0))
        };

        let total = chunks.len();
        chunks
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk {
                index: i + 1,
                total,
                text,
            })
            .collect()
    }

    /// Splits on the separator at `depth`, recursing into only the pieces
    /// that still exceed the budget with the next finer separator. Once the
    /// separator list is exhausted, the remaining oversized piece is
    /// hard-split at character boundaries.
    ///
    /// Separators stay attached to the preceding piece so that concatenating
    /// the pieces reconstructs the input exactly.
    fn split_pieces(&self, text: &str, depth: usize) -> Vec<String> {
        let Some(sep) = SEPARATORS.get(depth) else {
            return hard_split(text, self.max_chunk_chars);
        };
        let mut pieces = Vec::new();
        for piece in text.split_inclusive(sep) {
            if char_len(piece) <= self.max_chunk_chars {
                pieces.push(piece.to_string());
            } else {
                pieces.extend(self.split_pieces(piece, depth + 1));
            }
        }
        pieces
    }

    /// Greedily merges pieces back up to the budget, carrying a trailing
    /// overlap from each finished chunk into the next.
    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for piece in pieces {
            let piece_len = char_len(&piece);
            if current_len > 0 && current_len + piece_len > self.max_chunk_chars {
                let finished = std::mem::take(&mut current);
                current_len = 0;
                // Seed the next chunk with the previous tail when the overlap
                // still leaves room for the incoming piece.
                if self.overlap_chars > 0 {
                    let tail = tail_chars(&finished, self.overlap_chars);
                    let tail_len = char_len(tail);
                    if tail_len + piece_len <= self.max_chunk_chars {
                        current.push_str(tail);
                        current_len = tail_len;
                    }
                }
                chunks.push(finished);
            }
            current.push_str(&piece);
            current_len += piece_len;
        }

        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Last `n` characters of `s`, respecting UTF-8 boundaries.
fn tail_chars(s: &str, n: usize) -> &str {
    let len = char_len(s);
    if len <= n {
        return s;
    }
    s.char_indices()
        .nth(len - n)
        .map(|(i, _)| &s[i..])
        .unwrap_or(s)
}

/// Character-level split for text with no usable separator.
fn hard_split(text: &str, max: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;
    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == max {
            out.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}
