//! [`Chunk`] and [`ChunkedDocument`]: the planner's output value types.

use std::collections::{BTreeSet, HashSet};

use crate::hash::Digest;
use crate::segment::Segment;

/// An ordered, non-empty list of contiguous segments drawn from one
/// document.
///
/// Invariants (spec.md §3):
/// - `content` is the concatenation of `segments`, in order.
/// - `content.chars().count() <= max_chunk_size` (enforced by the planner
///   that constructs it; not re-checked here).
/// - `digest == hasher.hash(content.as_bytes())` (likewise planner-enforced).
#[derive(Debug, Clone)]
pub struct Chunk {
    content: String,
    digest: Digest,
    segments: Vec<Segment>,
    document_id: usize,
}

impl Chunk {
    /// Construct a chunk. Only the planner should call this — it is the
    /// sole authority for the invariants above.
    pub(crate) fn new(segments: Vec<Segment>, digest: Digest, document_id: usize) -> Self {
        debug_assert!(!segments.is_empty(), "a chunk must have at least one segment");
        let content: String = segments.iter().map(Segment::as_str).collect();
        Self {
            content,
            digest,
            segments,
            document_id,
        }
    }

    /// The chunk's text: the concatenation of its segments.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The chunk's content digest.
    #[must_use]
    pub fn digest(&self) -> Digest {
        self.digest
    }

    /// The segments this chunk was built from, preserved for round-trip.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Index of the producing document in the caller's input list.
    #[must_use]
    pub fn document_id(&self) -> usize {
        self.document_id
    }
}

/// An ordered sequence of chunks, immutable once built.
///
/// Invariants (spec.md §3):
/// - Chunks within the same document appear in source order.
/// - Per-document blocks are contiguous: all chunks of document `i`
///   precede all chunks of document `j` for `i < j`.
/// - Within a document, the concatenation of chunk contents equals the
///   concatenation of that document's segments.
///
/// Plain owned data with no interior mutability — `Send + Sync` and
/// freely shareable by reference across concurrent readers.
#[derive(Debug, Clone, Default)]
pub struct ChunkedDocument {
    chunks: Vec<Chunk>,
}

impl ChunkedDocument {
    /// Construct a `ChunkedDocument` from chunks already in the required
    /// order. Only [`crate::updater::Updater`] should call this.
    pub(crate) fn new(chunks: Vec<Chunk>) -> Self {
        Self { chunks }
    }

    /// All chunks, in order.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// The set of content digests across all chunks.
    #[must_use]
    pub fn digest_set(&self) -> HashSet<Digest> {
        self.chunks.iter().map(Chunk::digest).collect()
    }

    /// Chunk contents, in order.
    #[must_use]
    pub fn contents(&self) -> Vec<&str> {
        self.chunks.iter().map(Chunk::content).collect()
    }

    /// Chunks belonging to a single document, in source order.
    #[must_use]
    pub fn chunks_of(&self, document_id: usize) -> Vec<&Chunk> {
        self.chunks
            .iter()
            .filter(|c| c.document_id == document_id)
            .collect()
    }

    /// The set of document ids present.
    #[must_use]
    pub fn document_ids(&self) -> BTreeSet<usize> {
        self.chunks.iter().map(Chunk::document_id).collect()
    }

    /// Whether any chunks are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }
}

impl PartialEq for ChunkedDocument {
    /// Equality is by ordered chunk-content equality (spec.md §4.4).
    fn eq(&self, other: &Self) -> bool {
        self.chunks.len() == other.chunks.len()
            && self
                .chunks
                .iter()
                .zip(other.chunks.iter())
                .all(|(a, b)| a.content == b.content)
    }
}

impl Eq for ChunkedDocument {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{Hasher, Sha256Hasher};

    fn mk_chunk(text: &str, document_id: usize) -> Chunk {
        let segments = vec![Segment::new(text)];
        let digest = Sha256Hasher.hash(text.as_bytes());
        Chunk::new(segments, digest, document_id)
    }

    #[test]
    fn test_chunks_of_filters_by_document() {
        let doc = ChunkedDocument::new(vec![mk_chunk("a", 0), mk_chunk("b", 1), mk_chunk("c", 0)]);
        assert_eq!(doc.chunks_of(0).len(), 2);
        assert_eq!(doc.chunks_of(1).len(), 1);
        assert_eq!(doc.document_ids(), BTreeSet::from([0, 1]));
    }

    #[test]
    fn test_digest_set_dedups() {
        let doc = ChunkedDocument::new(vec![mk_chunk("a", 0), mk_chunk("a", 1)]);
        assert_eq!(doc.digest_set().len(), 1);
    }

    #[test]
    fn test_equality_by_content() {
        let a = ChunkedDocument::new(vec![mk_chunk("a", 0)]);
        let b = ChunkedDocument::new(vec![mk_chunk("a", 5)]);
        assert_eq!(a, b);
    }
}
