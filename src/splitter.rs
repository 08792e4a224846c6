//! Text splitters: the external contract the planner consumes.
//!
//! A [`Splitter`] takes a document string and returns an ordered,
//! non-empty sequence of atomic segments whose concatenation reconstructs
//! the document losslessly modulo whitespace rules the splitter chooses.
//! It must be deterministic and pure; the planner never inspects segment
//! semantics, only their length and identity.
//!
//! Each returned segment's length must be `<= max_chunk_size` for the
//! planner it feeds, or planning fails with `OversizedSegment` — that
//! constraint is a caller contract, not something this module enforces.

use crate::segment::Segment;

/// A pluggable segment producer.
///
/// Implement this to feed custom splitting logic into [`crate::updater::Updater`].
pub trait Splitter: Send + Sync {
    /// Split `text` into an ordered sequence of non-empty segments.
    fn split(&self, text: &str) -> Vec<Segment>;
}

/// Recursive character splitter (LangChain-style).
///
/// Tries separators in descending priority, falling back to a finer one
/// whenever a candidate piece is still too large, and hard-splitting at
/// a character boundary as a last resort.
///
/// Mirrors the reference's default separator hierarchy
/// `["\n\n", "\n", " ", ""]`.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    separators: Vec<String>,
    chunk_size: usize,
    keep_separator: bool,
}

impl RecursiveSplitter {
    /// Create a recursive splitter with an explicit separator hierarchy.
    ///
    /// `chunk_size` is a soft target used to decide when to recurse into a
    /// finer separator — it is guidance, not an enforced bound (the
    /// planner enforces `max_chunk_size` separately).
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size == 0` or `separators` is empty.
    #[must_use]
    pub fn new(separators: &[&str], chunk_size: usize, keep_separator: bool) -> Self {
        assert!(chunk_size > 0, "chunk_size must be > 0");
        assert!(!separators.is_empty(), "separators must not be empty");
        Self {
            separators: separators.iter().map(|s| (*s).to_string()).collect(),
            chunk_size,
            keep_separator,
        }
    }

    /// Default prose hierarchy: paragraphs, lines, words, characters.
    #[must_use]
    pub fn prose(chunk_size: usize) -> Self {
        Self::new(&["\n\n", "\n", " ", ""], chunk_size, true)
    }

    fn split_recursive(&self, text: &str, sep_index: usize) -> Vec<String> {
        if text.chars().count() <= self.chunk_size || sep_index >= self.separators.len() {
            if text.chars().count() <= self.chunk_size {
                return vec![text.to_string()];
            }
            return self.force_split(text);
        }

        let sep = &self.separators[sep_index];
        if sep.is_empty() {
            return self.force_split(text);
        }

        let parts: Vec<&str> = text.split(sep.as_str()).collect();
        if parts.len() == 1 {
            return self.split_recursive(text, sep_index + 1);
        }

        let mut result = Vec::new();
        let mut current = String::new();

        for (i, part) in parts.iter().enumerate() {
            let piece = if self.keep_separator && i < parts.len() - 1 {
                format!("{part}{sep}")
            } else {
                (*part).to_string()
            };
            if piece.is_empty() {
                continue;
            }

            let would_be_len = current.chars().count() + piece.chars().count();
            if current.is_empty() {
                current = piece;
            } else if would_be_len <= self.chunk_size {
                current.push_str(&piece);
            } else {
                result.extend(self.flush(&current, sep_index));
                current = piece;
            }
        }

        result.extend(self.flush(&current, sep_index));
        result
    }

    fn flush(&self, current: &str, sep_index: usize) -> Vec<String> {
        if current.is_empty() {
            return Vec::new();
        }
        if current.chars().count() <= self.chunk_size {
            vec![current.to_string()]
        } else {
            self.split_recursive(current, sep_index + 1)
        }
    }

    /// Force split at char boundaries when no separator works.
    fn force_split(&self, text: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut buf = String::new();
        for ch in text.chars() {
            buf.push(ch);
            if buf.chars().count() >= self.chunk_size {
                result.push(std::mem::take(&mut buf));
            }
        }
        if !buf.is_empty() {
            result.push(buf);
        }
        result
    }
}

impl Splitter for RecursiveSplitter {
    fn split(&self, text: &str) -> Vec<Segment> {
        if text.is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, 0)
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(Segment::new)
            .collect()
    }
}

/// Splits text every `chunk_size` characters, with no overlap.
///
/// The reference's "fixed-size character splitter" (spec.md §4.1).
#[derive(Debug, Clone, Copy)]
pub struct FixedSizeSplitter {
    chunk_size: usize,
}

impl FixedSizeSplitter {
    /// # Panics
    ///
    /// Panics if `chunk_size == 0`.
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be > 0");
        Self { chunk_size }
    }
}

impl Splitter for FixedSizeSplitter {
    fn split(&self, text: &str) -> Vec<Segment> {
        if text.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut buf = String::new();
        for ch in text.chars() {
            buf.push(ch);
            if buf.chars().count() >= self.chunk_size {
                out.push(Segment::new(std::mem::take(&mut buf)));
            }
        }
        if !buf.is_empty() {
            out.push(Segment::new(buf));
        }
        out
    }
}

/// Splits on a single literal separator, optionally keeping it attached
/// to the preceding segment.
///
/// Used in spec.md's literal scenarios (S1, S3): splitting on `"\n"` or
/// `" "` while keeping the separator gives boundary-shift absorption its
/// exact documented behavior.
#[derive(Debug, Clone)]
pub struct WhitespaceSplitter {
    separator: String,
    keep_separator: bool,
}

impl WhitespaceSplitter {
    #[must_use]
    pub fn new(separator: impl Into<String>, keep_separator: bool) -> Self {
        Self {
            separator: separator.into(),
            keep_separator,
        }
    }
}

impl Splitter for WhitespaceSplitter {
    fn split(&self, text: &str) -> Vec<Segment> {
        if text.is_empty() || self.separator.is_empty() {
            return if text.is_empty() {
                Vec::new()
            } else {
                vec![Segment::new(text)]
            };
        }

        let parts: Vec<&str> = text.split(self.separator.as_str()).collect();
        if parts.len() == 1 {
            return if text.is_empty() {
                Vec::new()
            } else {
                vec![Segment::new(text)]
            };
        }

        let mut out = Vec::new();
        for (i, part) in parts.iter().enumerate() {
            let is_last = i == parts.len() - 1;
            let piece = if self.keep_separator && !is_last {
                format!("{part}{}", self.separator)
            } else {
                (*part).to_string()
            };
            if !piece.is_empty() {
                out.push(Segment::new(piece));
            }
        }
        out
    }
}

/// A tokenizer-and-inverse pair, for token-based splitting.
///
/// Spec.md §4.1 names "a token-based splitter parametrized by a
/// tokenizer-and-inverse pair" as a recommended realization; this trait
/// is that pair's encode half (decode is implicit — token spans are
/// reconstructed by rejoining the original text at token boundaries).
pub trait Tokenizer: Send + Sync {
    /// Split `text` into token boundary offsets (byte offsets, ascending,
    /// the last one equal to `text.len()`).
    fn token_boundaries(&self, text: &str) -> Vec<usize>;
}

/// Reference tokenizer: one character is one token.
///
/// A real deployment would plug in a BPE tokenizer here; this
/// implementation exists so [`TokenSplitter`] is exercised without an
/// external model dependency.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn token_boundaries(&self, text: &str) -> Vec<usize> {
        let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).skip(1).collect();
        bounds.push(text.len());
        bounds
    }
}

/// Splits text into segments of `tokens_per_segment` tokens each, per a
/// pluggable [`Tokenizer`].
#[derive(Debug)]
pub struct TokenSplitter<T: Tokenizer> {
    tokenizer: T,
    tokens_per_segment: usize,
}

impl<T: Tokenizer> TokenSplitter<T> {
    /// # Panics
    ///
    /// Panics if `tokens_per_segment == 0`.
    #[must_use]
    pub fn new(tokenizer: T, tokens_per_segment: usize) -> Self {
        assert!(tokens_per_segment > 0, "tokens_per_segment must be > 0");
        Self {
            tokenizer,
            tokens_per_segment,
        }
    }
}

impl<T: Tokenizer> Splitter for TokenSplitter<T> {
    fn split(&self, text: &str) -> Vec<Segment> {
        if text.is_empty() {
            return Vec::new();
        }
        let boundaries = self.tokenizer.token_boundaries(text);
        let mut out = Vec::new();
        let mut start = 0;
        for group in boundaries.chunks(self.tokens_per_segment) {
            if let Some(&end) = group.last() {
                if end > start {
                    out.push(Segment::new(&text[start..end]));
                }
                start = end;
            }
        }
        out
    }
}
