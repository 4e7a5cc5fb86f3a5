//! The per-term record layout combining docids and freqs, and its
//! builder/reader pair. Grounded on `examples/original_source/include/pisa/freq_index.hpp`'s
//! `freq_index<DocsSequence, FreqsSequence>` template, specialized to a
//! single reference codec (`EliasFanoSequence`) rather than carrying the
//! codec as a type parameter — see DESIGN.md for that simplification.

use std::io::{Read, Write};
use std::path::Path;

use itertools::Itertools;

use crate::bitvector::BitVectorBuilder;
use crate::codes::{ceil_log2, read_gamma_nonzero, write_gamma_nonzero};
use crate::collection::{BitVectorCollection, BitVectorCollectionBuilder};
use crate::cursor::{Cursor, PostingRange};
use crate::error::{FreqIndexError, Result};
use crate::params::GlobalParameters;
use crate::sequence::{EliasFanoEnumerator, EliasFanoSequence};

/// Builder for a `FreqIndex`: one `add_posting_list` call per term, in
/// term-id order, then a terminal `build`.
pub struct FreqIndexBuilder {
    num_docs: u64,
    params: GlobalParameters,
    docs_sequences: BitVectorCollectionBuilder,
    freqs_sequences: BitVectorCollectionBuilder,
}

impl FreqIndexBuilder {
    #[must_use]
    pub fn new(num_docs: u64, params: GlobalParameters) -> Self {
        Self {
            num_docs,
            params,
            docs_sequences: BitVectorCollectionBuilder::new(),
            freqs_sequences: BitVectorCollectionBuilder::new(),
        }
    }

    /// Validates and appends the posting list for the next term.
    ///
    /// `docids` must be strictly increasing and `< num_docs`; `freqs` must
    /// all be `>= 1` and sum to `occurrences`. Violations are surfaced as
    /// `MalformedPosting`/`EmptyPostingList`, and the builder does not
    /// append to either sub-collection on failure.
    pub fn add_posting_list(&mut self, docids: &[u64], freqs: &[u64], occurrences: u64) -> Result<()> {
        let n = docids.len() as u64;
        if n == 0 {
            return Err(FreqIndexError::EmptyPostingList);
        }
        if freqs.len() as u64 != n {
            return Err(FreqIndexError::MalformedPosting {
                reason: format!("docids has {n} entries but freqs has {}", freqs.len()),
            });
        }

        if let Some((&p, &d)) = docids.iter().tuple_windows().find(|(&p, &d)| d <= p) {
            return Err(FreqIndexError::MalformedPosting {
                reason: format!("docids must be strictly increasing, got {p} then {d}"),
            });
        }

        let mut sum = 0u64;
        for (i, (&d, &f)) in docids.iter().zip(freqs.iter()).enumerate() {
            if d >= self.num_docs {
                return Err(FreqIndexError::MalformedPosting {
                    reason: format!("docid {d} at position {i} is >= num_docs ({})", self.num_docs),
                });
            }
            if f == 0 {
                return Err(FreqIndexError::MalformedPosting {
                    reason: format!("freq at position {i} must be >= 1, got 0"),
                });
            }
            sum += f;
        }
        if sum != occurrences {
            return Err(FreqIndexError::MalformedPosting {
                reason: format!("sum of freqs ({sum}) does not match occurrences ({occurrences})"),
            });
        }

        log::trace!("add_posting_list: n={n} occurrences={occurrences}");

        let num_docs = self.num_docs;
        let params = self.params;
        let (docs_record, freqs_record) = rayon::join(
            || {
                let mut bits = BitVectorBuilder::new();
                write_gamma_nonzero(&mut bits, occurrences);
                if occurrences > 1 {
                    bits.append_bits(n, ceil_log2(occurrences + 1) as usize);
                }
                EliasFanoSequence::write(&mut bits, docids.iter().copied(), num_docs, n, &params);
                bits.build()
            },
            || {
                let mut bits = BitVectorBuilder::new();
                let mut prefix = 0u64;
                let prefix_sums: Vec<u64> = freqs
                    .iter()
                    .map(|&f| {
                        prefix += f;
                        prefix
                    })
                    .collect();
                EliasFanoSequence::write(&mut bits, prefix_sums.into_iter(), occurrences + 1, n, &params);
                bits.build()
            },
        );

        self.docs_sequences.append(&docs_record);
        self.freqs_sequences.append(&freqs_record);
        Ok(())
    }

    /// Finalizes both sub-collections into an immutable `FreqIndex`.
    pub fn build(self) -> anyhow::Result<FreqIndex> {
        log::info!("finalizing freq index: {} terms, {} docs", self.docs_sequences.len(), self.num_docs);
        let docs_sequences = self.docs_sequences.build()?;
        let freqs_sequences = self.freqs_sequences.build()?;
        Ok(FreqIndex { num_docs: self.num_docs, params: self.params, docs_sequences, freqs_sequences })
    }
}

/// An immutable, compressed frequency index: for each term, a sorted docid
/// list and a parallel term-frequency list.
pub struct FreqIndex {
    num_docs: u64,
    params: GlobalParameters,
    docs_sequences: BitVectorCollection,
    freqs_sequences: BitVectorCollection,
}

impl FreqIndex {
    /// Number of terms in the index.
    #[must_use]
    pub fn size(&self) -> usize {
        self.docs_sequences.size()
    }

    #[must_use]
    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }

    #[must_use]
    pub fn params(&self) -> &GlobalParameters {
        &self.params
    }

    /// Builds a cursor over term `term`'s full posting list.
    ///
    /// # Panics
    /// Panics if `term >= size()` (`IndexOutOfBounds`, a contract
    /// violation).
    pub fn cursor(&self, term: usize) -> Result<Cursor<'_>> {
        self.cursor_with_last(term, self.num_docs)
    }

    pub(crate) fn cursor_with_last(&self, term: usize, last: u64) -> Result<Cursor<'_>> {
        assert!(term < self.size(), "FreqIndex: term index {term} out of bounds (size={})", self.size());

        let mut docs_reader = self.docs_sequences.get(term);
        let occurrences = read_gamma_nonzero(&mut docs_reader);
        let n = if occurrences > 1 { docs_reader.take(ceil_log2(occurrences + 1) as usize) } else { 1 };
        if n == 0 || n > self.num_docs {
            return Err(FreqIndexError::CorruptIndex {
                reason: format!("term {term}: decoded posting length n={n} is inconsistent with num_docs={}", self.num_docs),
            });
        }

        let docs_enum = EliasFanoEnumerator::new(self.docs_sequences.bits(), docs_reader.position(), self.num_docs, n, &self.params);

        let freqs_reader = self.freqs_sequences.get(term);
        let freqs_enum = EliasFanoEnumerator::new(self.freqs_sequences.bits(), freqs_reader.position(), occurrences + 1, n, &self.params);

        Ok(Cursor::new(docs_enum, freqs_enum, last))
    }

    /// Returns the full-range `PostingRange` for term `term`.
    ///
    /// # Panics
    /// Panics if `term >= size()`.
    #[must_use]
    pub fn posting_range(&self, term: usize) -> PostingRange<'_> {
        assert!(term < self.size(), "FreqIndex: term index {term} out of bounds (size={})", self.size());
        PostingRange::new(self, term, 0, self.num_docs)
    }

    /// Hints to the OS that the pages backing term `term`'s two records
    /// should be prefaulted. Best-effort; left unimplemented by the source
    /// this spec was distilled from (see SPEC_FULL.md §11).
    pub fn warmup(&self, term: usize) {
        assert!(term < self.size());
        const PAGE_WORDS: usize = 4096 / 8;
        for collection in [&self.docs_sequences, &self.freqs_sequences] {
            let (start_bit, end_bit) = collection.record_bit_range(term);
            let words = collection.bits().words();
            let start_word = (start_bit / 64) as usize;
            let end_word = (end_bit.div_ceil(64) as usize).min(words.len());
            let mut w = start_word;
            while w < end_word {
                std::hint::black_box(words[w]);
                w += PAGE_WORDS;
            }
        }
    }

    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        self.docs_sequences.size_in_bytes() + self.freqs_sequences.size_in_bytes() + std::mem::size_of::<GlobalParameters>() + 8
    }

    /// Serializes the index per the layout in SPEC_FULL.md §6.1:
    /// `global_parameters`, `num_docs`, docs collection, freqs collection.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.params.ef_log_sampling0.to_le_bytes())?;
        w.write_all(&self.num_docs.to_le_bytes())?;
        self.docs_sequences.write_to(w)?;
        self.freqs_sequences.write_to(w)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let mut buf8 = [0u8; 8];
        r.read_exact(&mut buf8)?;
        let ef_log_sampling0 = u64::from_le_bytes(buf8);
        r.read_exact(&mut buf8)?;
        let num_docs = u64::from_le_bytes(buf8);

        let docs_sequences = BitVectorCollection::read_from(r)?;
        let freqs_sequences = BitVectorCollection::read_from(r)?;
        if docs_sequences.size() != freqs_sequences.size() {
            return Err(FreqIndexError::CorruptIndex {
                reason: format!(
                    "docs collection has {} records but freqs collection has {}",
                    docs_sequences.size(),
                    freqs_sequences.size()
                ),
            });
        }

        Ok(Self { num_docs, params: GlobalParameters::new(ef_log_sampling0), docs_sequences, freqs_sequences })
    }

    /// Memory-maps `path` and loads the index from it.
    ///
    /// The specification's memory model calls for bit-vector words to be
    /// read in place from a read-only mapping; this constructor maps the
    /// file (so the OS can satisfy it from the page cache without a second
    /// copy and `warmup` can prefault real backing pages) but then copies
    /// the mapped bytes into the index's owned buffers rather than
    /// retaining a live borrow of the mapping — see DESIGN.md's note on
    /// this Open Question.
    pub fn mmap(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)?;
        let mmap = unsafe {
            mmap_rs::MmapOptions::new(file.metadata()?.len() as usize)?
                .with_file(&file, 0)
                .map()?
        };
        log::info!("mapped index, {} bytes", mmap.len());
        let mut cursor = std::io::Cursor::new(mmap.as_slice());
        Ok(Self::read_from(&mut cursor)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_posting_list_rejects_empty() {
        let mut b = FreqIndexBuilder::new(100, GlobalParameters::default());
        let err = b.add_posting_list(&[], &[], 0).unwrap_err();
        assert!(matches!(err, FreqIndexError::EmptyPostingList));
    }

    #[test]
    fn add_posting_list_rejects_non_monotone_docids() {
        let mut b = FreqIndexBuilder::new(100, GlobalParameters::default());
        let err = b.add_posting_list(&[5, 3, 9], &[1, 1, 1], 3).unwrap_err();
        assert!(matches!(err, FreqIndexError::MalformedPosting { .. }));
    }

    #[test]
    fn add_posting_list_rejects_repeated_docid() {
        let mut b = FreqIndexBuilder::new(100, GlobalParameters::default());
        let err = b.add_posting_list(&[5, 5, 9], &[1, 1, 1], 3).unwrap_err();
        assert!(matches!(err, FreqIndexError::MalformedPosting { .. }));
    }

    #[test]
    fn add_posting_list_rejects_out_of_range_docid() {
        let mut b = FreqIndexBuilder::new(100, GlobalParameters::default());
        let err = b.add_posting_list(&[3, 100], &[1, 1], 2).unwrap_err();
        assert!(matches!(err, FreqIndexError::MalformedPosting { .. }));
    }

    #[test]
    fn add_posting_list_rejects_zero_freq() {
        let mut b = FreqIndexBuilder::new(100, GlobalParameters::default());
        let err = b.add_posting_list(&[3, 9], &[1, 0], 1).unwrap_err();
        assert!(matches!(err, FreqIndexError::MalformedPosting { .. }));
    }

    #[test]
    fn add_posting_list_rejects_occurrence_sum_mismatch() {
        let mut b = FreqIndexBuilder::new(100, GlobalParameters::default());
        let err = b.add_posting_list(&[3, 9], &[1, 2], 5).unwrap_err();
        assert!(matches!(err, FreqIndexError::MalformedPosting { .. }));
    }

    #[test]
    fn add_posting_list_rejects_mismatched_lengths() {
        let mut b = FreqIndexBuilder::new(100, GlobalParameters::default());
        let err = b.add_posting_list(&[3, 9], &[1], 1).unwrap_err();
        assert!(matches!(err, FreqIndexError::MalformedPosting { .. }));
    }
}
