//! The `Updater` facade: the crate's single public entry point.
//!
//! Wraps a [`Splitter`] and [`Hasher`] behind `create`/`update`, hiding
//! the per-document split-then-plan fan-out and the cross-document reuse
//! accounting described in spec.md §4.5.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::chunk::{Chunk, ChunkedDocument};
use crate::config::PlannerConfig;
use crate::error::Result;
use crate::hash::{Digest, Hasher, Sha256Hasher};
use crate::planner;
use crate::splitter::Splitter;

/// The outcome of a `create` or `update` call.
///
/// `num_reused + num_added` equals the number of chunks in
/// `new_document`, assuming no duplicate chunk content within the new
/// document set (the common case — see spec.md §8 property 7 and
/// DESIGN.md for the pathological-duplicate edge case this crate
/// resolves by counting per chunk occurrence, not per unique digest).
#[derive(Debug, Clone)]
pub struct UpdateResult {
    /// The freshly planned document set.
    pub new_document: ChunkedDocument,
    /// Chunks whose digest was not found among the previously consumed
    /// digests — brand-new content, or a repeat occurrence of a digest
    /// already credited as reused.
    pub num_added: usize,
    /// Chunks whose digest matched a not-yet-consumed previous digest.
    pub num_reused: usize,
    /// Previous digests that no surviving chunk consumed.
    pub num_deleted: usize,
}

impl UpdateResult {
    /// Fraction of added, reused, and deleted chunks that were reused
    /// (spec.md §3). `0.0` when the denominator is `0`.
    #[must_use]
    pub fn efficiency(&self) -> f64 {
        let total = self.num_added + self.num_reused + self.num_deleted;
        if total == 0 {
            0.0
        } else {
            self.num_reused as f64 / total as f64
        }
    }
}

/// Splits, plans, and accounts for a mutating set of documents.
///
/// Holds no document state between calls — callers hold the
/// [`ChunkedDocument`] returned from one call and pass it back as
/// `previous` to the next (spec.md §9: the reference's mutable
/// `_current_chunks`/`_chunk_hashes` instance state is not carried
/// forward).
pub struct Updater<S: Splitter, H: Hasher = Sha256Hasher> {
    splitter: S,
    hasher: H,
    config: PlannerConfig,
}

impl<S: Splitter> Updater<S, Sha256Hasher> {
    /// Construct an updater with the default `Sha256Hasher`.
    pub fn new(splitter: S, config: PlannerConfig) -> Self {
        Self {
            splitter,
            hasher: Sha256Hasher,
            config,
        }
    }
}

impl<S: Splitter, H: Hasher> Updater<S, H> {
    /// Construct an updater with an explicit hasher.
    pub fn with_hasher(splitter: S, hasher: H, config: PlannerConfig) -> Self {
        Self {
            splitter,
            hasher,
            config,
        }
    }

    /// Plan a fresh document set with no prior chunks to reuse.
    ///
    /// Equivalent to `update` against an empty [`ChunkedDocument`]: every
    /// chunk is an addition, nothing is deleted.
    pub fn create(&self, documents: &[String]) -> Result<UpdateResult> {
        self.update(&ChunkedDocument::default(), documents)
    }

    /// Re-plan `documents` against `previous`, maximizing reuse of
    /// `previous`'s chunks by content digest.
    ///
    /// Each document is split and planned independently (in parallel,
    /// via rayon, when more than one document is given); results are
    /// then reassembled in caller order and walked once, sequentially,
    /// to perform consume-once reuse/addition/deletion accounting
    /// against `previous`'s global digest set (spec.md §4.5).
    pub fn update(
        &self,
        previous: &ChunkedDocument,
        documents: &[String],
    ) -> Result<UpdateResult> {
        let previous_digests = previous.digest_set();

        let per_document: Result<Vec<Vec<Chunk>>> = documents
            .par_iter()
            .enumerate()
            .map(|(document_id, text)| {
                let segments = self.splitter.split(text);
                planner::plan(&segments, &self.config, &previous_digests, &self.hasher, document_id)
            })
            .collect();
        let per_document = per_document?;

        let chunks: Vec<Chunk> = per_document.into_iter().flatten().collect();

        let mut consumed: HashSet<Digest> = HashSet::new();
        let mut num_added = 0usize;
        let mut num_reused = 0usize;

        for chunk in &chunks {
            let digest = chunk.digest();
            if previous_digests.contains(&digest) && consumed.insert(digest) {
                num_reused += 1;
            } else {
                num_added += 1;
            }
        }

        let num_deleted = previous_digests.difference(&consumed).count();

        Ok(UpdateResult {
            new_document: ChunkedDocument::new(chunks),
            num_added,
            num_reused,
            num_deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::WhitespaceSplitter;

    fn updater(max_chunk_size: usize) -> Updater<WhitespaceSplitter> {
        let splitter = WhitespaceSplitter::new(" ", true);
        let config = PlannerConfig::with_max_chunk_size(max_chunk_size).unwrap();
        Updater::new(splitter, config)
    }

    fn docs(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_create_has_no_reuse() {
        let u = updater(20);
        let result = u.create(&docs(&["one two three"])).unwrap();
        assert_eq!(result.num_reused, 0);
        assert_eq!(result.num_deleted, 0);
        assert!(result.num_added > 0);
    }

    #[test]
    fn test_update_identical_is_fixed_point() {
        let u = updater(20);
        let text = docs(&["alpha beta gamma delta epsilon"]);
        let created = u.create(&text).unwrap();
        let updated = u.update(&created.new_document, &text).unwrap();

        assert_eq!(updated.num_added, 0);
        assert_eq!(updated.num_deleted, 0);
        assert_eq!(updated.new_document, created.new_document);
    }

    #[test]
    fn test_empty_document_list() {
        let u = updater(20);
        let result = u.create(&[]).unwrap();
        assert!(result.new_document.is_empty());
        assert_eq!(result.num_added, 0);
        assert_eq!(result.num_reused, 0);
        assert_eq!(result.num_deleted, 0);
    }

    #[test]
    fn test_update_against_empty_previous_then_remove_all() {
        let u = updater(20);
        let created = u.create(&docs(&["hello world"])).unwrap();
        let removed = u.update(&created.new_document, &[]).unwrap();
        assert_eq!(removed.num_added, 0);
        assert_eq!(removed.num_reused, 0);
        assert_eq!(removed.num_deleted, created.new_document.digest_set().len());
        assert!(removed.new_document.is_empty());
    }

    #[test]
    fn test_reordered_documents_reuse_everything() {
        let u = updater(20);
        let d1 = docs(&["document one content", "document two content"]);
        let created = u.create(&d1).unwrap();

        let d2 = docs(&["document two content", "document one content"]);
        let updated = u.update(&created.new_document, &d2).unwrap();

        assert_eq!(updated.num_added, 0);
        assert_eq!(updated.num_deleted, 0);
        assert_eq!(updated.num_reused, created.new_document.len());
    }

    #[test]
    fn test_efficiency_ratio() {
        let result = UpdateResult {
            new_document: ChunkedDocument::default(),
            num_added: 1,
            num_reused: 3,
            num_deleted: 0,
        };
        assert!((result.efficiency() - 0.75).abs() < 1e-9);

        let empty = UpdateResult {
            new_document: ChunkedDocument::default(),
            num_added: 0,
            num_reused: 0,
            num_deleted: 0,
        };
        assert_eq!(empty.efficiency(), 0.0);
    }
}
