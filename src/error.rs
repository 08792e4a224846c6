//! Error types for the KARA chunk planner.

/// Errors that can occur while configuring or running the planner.
///
/// `EmptyInput` is deliberately not a variant here: an empty document
/// list or an empty segment sequence is a normal, successful case (see
/// [`crate::updater::Updater`] and [`crate::planner::plan`]), not a
/// failure.
#[derive(Debug, thiserror::Error)]
pub enum KaraError {
    /// Raised at [`crate::config::PlannerConfig::new`] when `max_chunk_size`
    /// is zero or `epsilon` falls outside `(0, 1)`.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A single segment's length exceeds `max_chunk_size`, so no valid
    /// partition exists. The caller's remedy is to tighten the splitter
    /// or raise `max_chunk_size`.
    #[error(
        "segment {segment_index} of document {document_id} has length {length}, \
         exceeding max_chunk_size"
    )]
    OversizedSegment {
        /// Index of the offending document in the input list.
        document_id: usize,
        /// Index of the offending segment within that document's splits.
        segment_index: usize,
        /// The segment's length in characters.
        length: usize,
    },
}

/// Result type for KARA operations.
pub type Result<T> = std::result::Result<T, KaraError>;
