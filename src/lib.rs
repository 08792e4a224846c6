//! KARA: a shortest-path chunk planner for re-chunking a mutating text
//! corpus while maximizing reuse of previously computed chunks.
//!
//! Re-embedding or re-indexing a large corpus is expensive; re-chunking
//! it from scratch on every edit throws away chunks whose content never
//! changed. This crate treats re-chunking as a shortest-path problem over
//! an implicit DAG of split-boundary positions, where a chunk that
//! exactly matches a previously computed chunk (by content digest) costs
//! almost nothing to "reuse," while a genuinely new chunk costs full
//! price. The result is the size-bounded partition that reuses the most
//! previously-seen content, not merely a locally greedy one.
//!
//! # Quick start
//!
//! ```
//! use kara::{PlannerConfig, Updater};
//! use kara::splitter::WhitespaceSplitter;
//!
//! let config = PlannerConfig::with_max_chunk_size(64).unwrap();
//! let updater = Updater::new(WhitespaceSplitter::new(" ", true), config);
//!
//! let v1 = vec!["the quick brown fox jumps over the lazy dog".to_string()];
//! let created = updater.create(&v1).unwrap();
//! assert_eq!(created.num_deleted, 0);
//!
//! let v2 = vec!["the quick brown fox jumps over the lazy cat".to_string()];
//! let updated = updater.update(&created.new_document, &v2).unwrap();
//! assert!(updated.num_reused > 0, "most of the sentence is unchanged");
//! ```
//!
//! # Module map
//!
//! - [`splitter`] — turns a document string into atomic [`segment::Segment`]s.
//! - [`hash`] — content-addressed [`hash::Digest`] and the [`hash::Hasher`] trait.
//! - [`config`] — validated [`config::PlannerConfig`].
//! - [`planner`] — the shortest-path core (internal algorithm, public for
//!   callers who want to plan a single document without the `Updater`
//!   facade's multi-document accounting).
//! - [`chunk`] — [`chunk::Chunk`] and [`chunk::ChunkedDocument`], the
//!   planner's immutable output types.
//! - [`updater`] — [`updater::Updater`] and [`updater::UpdateResult`], the
//!   facade most callers want.

pub mod chunk;
pub mod config;
pub mod error;
pub mod hash;
pub mod planner;
pub mod segment;
pub mod splitter;
pub mod updater;

pub use chunk::{Chunk, ChunkedDocument};
pub use config::PlannerConfig;
pub use error::{KaraError, Result};
pub use hash::{Digest, Hasher, Sha256Hasher};
pub use segment::Segment;
pub use splitter::Splitter;
pub use updater::{UpdateResult, Updater};
