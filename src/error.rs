//! Error taxonomy for the crate's public, surfaced failures.
//!
//! Contract violations that are purely programmer errors (an out-of-range
//! term index, an `append_bits` width over 64, a read past the end of a
//! bit-vector) are not part of this enum: they are fatal and reported via
//! `panic!`/`assert!`, the same way the teacher's `codes` module uses
//! `debug_assert!` for its own internal invariants.

use thiserror::Error;

/// Errors surfaced by the public API, per the taxonomy in the specification's
/// error-handling design.
#[derive(Debug, Error)]
pub enum FreqIndexError {
    /// `add_posting_list` was called with `n == 0`.
    #[error("posting list must be nonempty (n=0)")]
    EmptyPostingList,

    /// A posting list violates one of its preconditions: non-monotone or
    /// out-of-range docids, a zero frequency, or a frequency sum that
    /// disagrees with the declared occurrence count.
    #[error("malformed posting list: {reason}")]
    MalformedPosting { reason: String },

    /// A `PostingRange::restrict` request does not satisfy
    /// `first <= low < hi <= last`.
    #[error("range [{low}, {hi}) is out of bounds of [{first}, {last})")]
    RangeOutOfBounds { low: u64, hi: u64, first: u64, last: u64 },

    /// A read-time check found the encoded record inconsistent with its
    /// header (e.g. a decoded posting length that exceeds `num_docs`, or a
    /// mismatch between the docs and freqs collection sizes).
    #[error("corrupt index: {reason}")]
    CorruptIndex { reason: String },

    /// The underlying mapping or byte stream could not be read or written.
    #[error("I/O failure while reading or writing the index")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for the crate's fallible, surfaced operations.
pub type Result<T> = std::result::Result<T, FreqIndexError>;
