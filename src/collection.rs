//! A sequence of variable-length, unaligned bit-records with an O(1)-access
//! offset directory.
//!
//! The offset directory is itself a monotone, standalone sequence (it owns
//! its storage and is never embedded at an arbitrary bit offset inside
//! another buffer), which is exactly the shape `sux::EliasFano` is built
//! for: this mirrors the teacher's own `build_eliasfano.rs`, which feeds a
//! graph's node-offset sequence through `sux::EliasFanoBuilder` one push at
//! a time and serializes the result with `epserde`.

use std::io::{Read, Write};

use epserde::prelude::*;
use sux::prelude::*;

use crate::bitvector::{BitReader, BitVector, BitVectorBuilder};
use crate::error::{FreqIndexError, Result};

type OffsetDirectory = EliasFano;

fn read_u64<R: Read>(r: &mut R) -> std::io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Builder for a `BitVectorCollection`: records are appended in order and
/// never rewritten once appended (I5).
pub struct BitVectorCollectionBuilder {
    bits: BitVectorBuilder,
    offsets: Vec<u64>,
}

impl BitVectorCollectionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self { bits: BitVectorBuilder::new(), offsets: vec![0] }
    }

    /// Number of records appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remembers the current end offset, then concatenates `record`'s bits
    /// onto the payload.
    pub fn append(&mut self, record: &BitVector) {
        self.bits.append_bitvector(record);
        self.offsets.push(self.bits.len() as u64);
    }

    /// Freezes the offsets into a compact monotone form and transfers
    /// ownership of the payload.
    pub fn build(self) -> anyhow::Result<BitVectorCollection> {
        let bits = self.bits.build();
        let count = self.offsets.len() - 1;
        let universe = bits.len() as u64 + 1;
        let mut efb = EliasFanoBuilder::new(universe as _, self.offsets.len() as _);
        for o in &self.offsets {
            efb.push(*o as usize);
        }
        let offsets: OffsetDirectory = efb.build();
        Ok(BitVectorCollection { bits, offsets, count })
    }
}

impl Default for BitVectorCollectionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable sequence of bit-records plus its offset directory.
pub struct BitVectorCollection {
    bits: BitVector,
    offsets: OffsetDirectory,
    count: usize,
}

impl BitVectorCollection {
    /// Number of records (= number of terms, for the docs/freqs
    /// collections of a `FreqIndex`).
    #[must_use]
    pub fn size(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn bits(&self) -> &BitVector {
        &self.bits
    }

    /// Returns a reader seeded at the start of record `k`.
    ///
    /// # Panics
    /// Panics if `k >= size()`: an out-of-range term index is a programmer
    /// contract violation (`IndexOutOfBounds`), not a recoverable error.
    #[must_use]
    pub fn get(&self, k: usize) -> BitReader<'_> {
        assert!(k < self.count, "BitVectorCollection::get: index {k} out of bounds (size={})", self.count);
        let start = self.offsets.get(k) as usize;
        self.bits.reader_at(start)
    }

    /// The `[start, end)` bit range occupied by record `k`, used by
    /// `FreqIndex::warmup`.
    #[must_use]
    pub fn record_bit_range(&self, k: usize) -> (u64, u64) {
        assert!(k < self.count);
        (self.offsets.get(k) as u64, self.offsets.get(k + 1) as u64)
    }

    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        self.bits.words().len() * 8
    }

    pub(crate) fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&(self.count as u64).to_le_bytes())?;

        let mut offsets_buf = Vec::new();
        self.offsets
            .serialize(&mut offsets_buf)
            .map_err(|e| FreqIndexError::CorruptIndex { reason: format!("failed to serialize offsets: {e}") })?;
        w.write_all(&(offsets_buf.len() as u64).to_le_bytes())?;
        w.write_all(&offsets_buf)?;

        let words = self.bits.words();
        w.write_all(&(words.len() as u64).to_le_bytes())?;
        for word in words {
            w.write_all(&word.to_le_bytes())?;
        }
        Ok(())
    }

    pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let count = read_u64(r)? as usize;

        let offsets_len = read_u64(r)? as usize;
        let mut offsets_buf = vec![0u8; offsets_len];
        r.read_exact(&mut offsets_buf)?;
        let offsets: OffsetDirectory = OffsetDirectory::deserialize_full(&mut &offsets_buf[..])
            .map_err(|e| FreqIndexError::CorruptIndex { reason: format!("failed to deserialize offsets: {e}") })?;

        let word_count = read_u64(r)? as usize;
        let mut words = Vec::with_capacity(word_count);
        for _ in 0..word_count {
            words.push(read_u64(r)?);
        }
        if count > 0 && offsets.len() != count + 1 {
            return Err(FreqIndexError::CorruptIndex {
                reason: format!("offsets directory has {} entries, expected {}", offsets.len(), count + 1),
            });
        }
        let total_bits = if count > 0 { offsets.get(count) } else { 0 };
        let bits = BitVector::from_words(words, total_bits);

        Ok(Self { bits, offsets, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::write_gamma_nonzero;
    use crate::params::GlobalParameters;
    use crate::sequence::EliasFanoSequence;

    fn posting_record(docids: &[u64], universe: u64) -> BitVector {
        let mut b = BitVectorBuilder::new();
        write_gamma_nonzero(&mut b, docids.len() as u64);
        EliasFanoSequence::write(&mut b, docids.iter().copied(), universe, docids.len() as u64, &GlobalParameters::default());
        b.build()
    }

    #[test]
    fn append_and_get_roundtrip() {
        let mut builder = BitVectorCollectionBuilder::new();
        builder.append(&posting_record(&[1, 5, 9], 100));
        builder.append(&posting_record(&[2, 3], 100));
        assert_eq!(builder.len(), 2);
        let collection = builder.build().unwrap();
        assert_eq!(collection.size(), 2);

        let mut r0 = collection.get(0);
        assert_eq!(crate::codes::read_gamma_nonzero(&mut r0), 3);
        let mut r1 = collection.get(1);
        assert_eq!(crate::codes::read_gamma_nonzero(&mut r1), 2);
    }
}
