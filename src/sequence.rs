//! The pluggable `IntegerSequence` collaborator: a codec for a monotone
//! non-decreasing sequence of `n` values in `[0, universe)`, embedded
//! unaligned inside a shared `BitVector` (so it must be fully
//! self-delimiting from its construction arguments — it cannot read a
//! length prefix from the stream, since there may be sibling fields already
//! packed before or after it).
//!
//! `sux::EliasFano` (already a dependency, used in `collection.rs` for the
//! top-level offsets directory) is a standalone structure designed to own
//! its storage; it is not meant to be instantiated at an arbitrary bit
//! offset inside someone else's buffer. The per-posting codec here instead
//! follows the teacher's own habit (`codes::gamma`, `codes::delta`,
//! `codes::zeta` in `examples/vigna-webgraph-rs/src/codes/`) of hand-rolling a code
//! directly against `BitReader`/`BitVectorBuilder`: a plain (non-partitioned)
//! compact Elias-Fano scheme, split into a fixed-width low-bits array and a
//! unary-gap-coded high-bits stream, exactly as described in the
//! specification's component design.

use crate::bitvector::{BitVector, BitVectorBuilder};
use crate::codes::ceil_log2;
use crate::params::GlobalParameters;

/// Width of the low-bits field for `n` values drawn from `[0, universe)`,
/// per the specification: `ceil_log2(universe / n)`.
fn low_width(universe: u64, n: u64) -> u32 {
    if n == 0 {
        return 0;
    }
    ceil_log2(universe / n)
}

/// Writer half of the `IntegerSequence` contract.
pub struct EliasFanoSequence;

impl EliasFanoSequence {
    /// Encodes `n` monotone non-decreasing `values` with `values[n-1] <
    /// universe`, appending them to `out`.
    pub fn write(
        out: &mut BitVectorBuilder,
        values: impl Iterator<Item = u64> + Clone,
        universe: u64,
        n: u64,
        _params: &GlobalParameters,
    ) {
        if n == 0 {
            return;
        }
        let l = low_width(universe, n);
        for v in values.clone() {
            out.append_bits(v, l as usize);
        }
        let mut prev_high = 0u64;
        for v in values {
            let high = v >> l;
            out.append_unary(high - prev_high);
            prev_high = high;
        }
    }
}

/// The enumerator half of the `IntegerSequence` contract (specification
/// §4.3/§9's "parametric codec dispatch" note), decoupled from any one
/// concrete codec. `FreqIndex`/`Cursor` hold `EliasFanoEnumerator` directly
/// rather than `dyn SequenceEnumerator` or a generic parameter — this crate
/// implements only the one reference codec, so monomorphizing to it avoids
/// dispatch overhead on the hot loop the specification calls out; this
/// trait documents the seam a second codec (partitioned Elias-Fano,
/// block-based) would implement to plug into the same call sites.
pub trait SequenceEnumerator {
    /// Number of values in the sequence.
    fn size(&self) -> u64;
    /// `move(i) -> (i, values[i])` for `0 <= i <= n`; `move(n)` is the
    /// legal sentinel access.
    fn move_to(&mut self, i: u64) -> (u64, u64);
    /// Advances by one position.
    fn next(&mut self) -> (u64, u64);
    /// Least position whose value is `>= v`; `(n, universe)` if none.
    fn next_geq(&mut self, v: u64) -> (u64, u64);
}

/// Enumerator half of the `IntegerSequence` contract: forward iteration,
/// positional random access, and monotone skip-forward over the decoded
/// stream.
///
/// `move`/`next_geq` to an index or value not yet reached by the internal
/// high-bits scan advance it in amortized O(1) per step; moving to an index
/// *behind* the current scan position rescans the high-bits stream from its
/// start (this codec carries no auxiliary select index — the specification
/// names partitioning into blocks as the optional way to bound that cost,
/// and `SPEC_FULL.md` records it as a documented, unimplemented extension
/// point).
pub struct EliasFanoEnumerator<'a> {
    bits: &'a BitVector,
    low_start: usize,
    high_start: usize,
    low_width: u32,
    n: u64,
    universe: u64,
    pos: u64,
    cur_high: u64,
    high_bit_pos: usize,
    high_idx: u64,
}

impl<'a> EliasFanoEnumerator<'a> {
    /// Constructs an enumerator over the record embedded at
    /// `start_bit_offset` inside `bits`.
    #[must_use]
    pub fn new(
        bits: &'a BitVector,
        start_bit_offset: usize,
        universe: u64,
        n: u64,
        _params: &GlobalParameters,
    ) -> Self {
        let l = low_width(universe, n);
        let low_start = start_bit_offset;
        let high_start = low_start + (n as usize) * (l as usize);
        let mut e = Self {
            bits,
            low_start,
            high_start,
            low_width: l,
            n,
            universe,
            pos: 0,
            cur_high: 0,
            high_bit_pos: high_start,
            high_idx: 0,
        };
        e.move_to(0);
        e
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.n
    }

    fn low_at(&self, i: u64) -> u64 {
        let mut r = self.bits.reader_at(self.low_start + (i as usize) * (self.low_width as usize));
        r.take(self.low_width as usize)
    }

    fn value_at(&self, i: u64, high: u64) -> u64 {
        (high << self.low_width) | self.low_at(i)
    }

    /// Decodes one more unary gap, advancing `cur_high`/`high_idx` by one.
    fn advance_high(&mut self) {
        let mut r = self.bits.reader_at(self.high_bit_pos);
        let gap = r.read_unary();
        self.high_bit_pos = r.position();
        self.cur_high += gap;
        self.high_idx += 1;
    }

    /// Jumps to position `i` (0 <= i <= n); `move(n)` is the legal sentinel
    /// access and returns `(n, universe)`.
    pub fn move_to(&mut self, i: u64) -> (u64, u64) {
        if i >= self.n {
            self.pos = self.n;
            return (self.n, self.universe);
        }
        if self.high_idx > i + 1 {
            self.high_bit_pos = self.high_start;
            self.cur_high = 0;
            self.high_idx = 0;
        }
        while self.high_idx <= i {
            self.advance_high();
        }
        self.pos = i;
        (i, self.value_at(i, self.cur_high))
    }

    /// Advances by one position.
    pub fn next(&mut self) -> (u64, u64) {
        self.move_to(self.pos + 1)
    }

    /// Returns the least position whose value is `>= v`; if none, `(n,
    /// universe)`.
    pub fn next_geq(&mut self, v: u64) -> (u64, u64) {
        if self.pos < self.n {
            let cur = self.value_at(self.pos, self.cur_high);
            if cur >= v {
                return (self.pos, cur);
            }
        }
        let mut i = self.pos + 1;
        while i < self.n {
            let (_, val) = self.move_to(i);
            if val >= v {
                return (i, val);
            }
            i += 1;
        }
        self.pos = self.n;
        (self.n, self.universe)
    }
}

impl<'a> SequenceEnumerator for EliasFanoEnumerator<'a> {
    fn size(&self) -> u64 {
        self.size()
    }

    fn move_to(&mut self, i: u64) -> (u64, u64) {
        self.move_to(i)
    }

    fn next(&mut self) -> (u64, u64) {
        self.next()
    }

    fn next_geq(&mut self, v: u64) -> (u64, u64) {
        self.next_geq(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitvector::BitVectorBuilder;

    fn encode(values: &[u64], universe: u64) -> BitVector {
        let mut b = BitVectorBuilder::new();
        EliasFanoSequence::write(&mut b, values.iter().copied(), universe, values.len() as u64, &GlobalParameters::default());
        b.build()
    }

    #[test]
    fn move_and_next_roundtrip() {
        let values = [2u64, 5, 5, 9, 40, 41, 100];
        let bits = encode(&values, 128);
        let mut e = EliasFanoEnumerator::new(&bits, 0, 128, values.len() as u64, &GlobalParameters::default());
        for (i, &v) in values.iter().enumerate() {
            let (pos, val) = e.move_to(i as u64);
            assert_eq!((pos, val), (i as u64, v));
        }
        // sentinel at n
        assert_eq!(e.move_to(values.len() as u64), (values.len() as u64, 128));

        let mut e2 = EliasFanoEnumerator::new(&bits, 0, 128, values.len() as u64, &GlobalParameters::default());
        let mut collected = Vec::new();
        let (mut pos, mut val) = e2.move_to(0);
        loop {
            collected.push(val);
            if pos == values.len() as u64 {
                break;
            }
            let r = e2.next();
            pos = r.0;
            val = r.1;
        }
        assert_eq!(collected, vec![2, 5, 5, 9, 40, 41, 100, 128]);
    }

    #[test]
    fn next_geq_exact_and_miss() {
        let values = [10u64, 20, 30];
        let bits = encode(&values, 100);
        let mut e = EliasFanoEnumerator::new(&bits, 0, 100, 3, &GlobalParameters::default());
        assert_eq!(e.next_geq(20), (1, 20));
        assert_eq!(e.next_geq(21), (2, 30));
        assert_eq!(e.next_geq(31), (3, 100));
    }

    #[test]
    fn backward_move_rescans() {
        let values = [1u64, 2, 3, 4, 5];
        let bits = encode(&values, 8);
        let mut e = EliasFanoEnumerator::new(&bits, 0, 8, 5, &GlobalParameters::default());
        e.move_to(4);
        assert_eq!(e.move_to(1), (1, 2));
        assert_eq!(e.move_to(0), (0, 1));
    }
}
