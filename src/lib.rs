//! A compressed inverted-index library for information retrieval.
//!
//! An index maps each term to a sorted list of docids and a parallel list
//! of term frequencies, both bit-packed with a reference Elias-Fano codec.
//! Query evaluation is built around a [`cursor::Cursor`] abstraction:
//! `next`/`next_geq`/`move_to` drive a posting list forward, and
//! [`cursor::PostingRange`] restricts that traversal to a document window
//! without copying the underlying list.
//!
//! ```
//! use freq_index::prelude::*;
//!
//! let mut builder = FreqIndexBuilder::new(/* num_docs */ 100, GlobalParameters::default());
//! builder.add_posting_list(&[1, 5, 40], &[2, 1, 3], 6).unwrap();
//! let index = builder.build().unwrap();
//!
//! let mut cursor = index.cursor(0).unwrap();
//! assert_eq!(cursor.docid(), 1);
//! assert_eq!(cursor.next_geq(10), 40);
//! ```

pub mod bitvector;
pub mod codes;
pub mod collection;
pub mod cursor;
pub mod error;
pub mod freq_index;
pub mod params;
pub mod query;
pub mod sequence;

/// Re-exports of the types most callers need.
pub mod prelude {
    pub use crate::cursor::{Cursor, PostingRange};
    pub use crate::error::{FreqIndexError, Result};
    pub use crate::freq_index::{FreqIndex, FreqIndexBuilder};
    pub use crate::params::GlobalParameters;
    pub use crate::query::{and_termdid_search, and_termdidlist_search, termdid_search, termdidlist_search, Scored, TfCursor};
}
