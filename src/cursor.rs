//! Cursor state machine and restricted-range posting views, grounded on
//! `examples/original_source/include/pisa/freq_index.hpp`'s `Cursor` and
//! `Posting_Range` classes.

use crate::error::{FreqIndexError, Result};
use crate::freq_index::FreqIndex;
use crate::sequence::EliasFanoEnumerator;

/// A single term's posting list, positioned at some document. `last` is an
/// exclusive upper bound: `next`/`next_geq`/`reset` never report a docid
/// `>= last`, reporting `last` itself instead once the bound (or the end of
/// the underlying list) is reached — the cursor's own "document-universe
/// sentinel" (`DOCUMENT_BOUND` in the design notes). For a cursor built via
/// `FreqIndex::cursor`, `last` defaults to `num_docs`, so that sentinel is
/// the whole index's document universe; for one built from a restricted
/// `PostingRange`, it is the range's own upper bound instead.
pub struct Cursor<'a> {
    docs: EliasFanoEnumerator<'a>,
    freqs: EliasFanoEnumerator<'a>,
    pos: u64,
    cur_docid: u64,
    last: u64,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(docs: EliasFanoEnumerator<'a>, freqs: EliasFanoEnumerator<'a>, last: u64) -> Self {
        let mut c = Self { docs, freqs, pos: 0, cur_docid: 0, last };
        c.reset();
        c
    }

    fn clamp(&mut self, pos: u64, docid: u64) -> u64 {
        self.pos = pos;
        self.cur_docid = if docid >= self.last { self.last } else { docid };
        self.cur_docid
    }

    /// Repositions at the first document, respecting `last`.
    pub fn reset(&mut self) -> u64 {
        let (pos, docid) = self.docs.move_to(0);
        self.clamp(pos, docid)
    }

    /// Advances to the next document in the list, respecting `last`. Once
    /// `docid() == last`, every subsequent `next()` stays there (P4:
    /// absorbing terminal state) because docids are strictly increasing.
    pub fn next(&mut self) -> u64 {
        let (pos, docid) = self.docs.next();
        self.clamp(pos, docid)
    }

    /// Advances to the least docid `>= target`, respecting `last`.
    pub fn next_geq(&mut self, target: u64) -> u64 {
        let (pos, docid) = self.docs.next_geq(target);
        self.clamp(pos, docid)
    }

    /// Jumps to absolute position `position` within the underlying list.
    ///
    /// Unlike `next`/`next_geq`, `move_to` does not clamp against `last`:
    /// it is the escape hatch a caller bounding by position rather than by
    /// value uses, per the original source's `Cursor::move`.
    pub fn move_to(&mut self, position: u64) -> u64 {
        let (pos, docid) = self.docs.move_to(position);
        self.pos = pos;
        self.cur_docid = docid;
        docid
    }

    #[must_use]
    pub fn docid(&self) -> u64 {
        self.cur_docid
    }

    /// The term frequency at the current position.
    ///
    /// # Panics
    /// Panics if the cursor's underlying position has run off the end of
    /// the posting list (`position() >= size()`).
    pub fn freq(&mut self) -> u64 {
        assert!(self.pos < self.size(), "Cursor::freq called on an exhausted cursor");
        let (_, hi) = self.freqs.move_to(self.pos);
        let lo = if self.pos == 0 { 0 } else { self.freqs.move_to(self.pos - 1).1 };
        hi - lo
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// The cursor's own document-universe sentinel: `num_docs` for an
    /// unrestricted cursor, or a `PostingRange`'s upper bound otherwise.
    #[must_use]
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Length of the *underlying* posting list (not the restricted window,
    /// if any — see `PostingRange::size`'s documented inconsistency).
    #[must_use]
    pub fn size(&self) -> u64 {
        self.docs.size()
    }
}

/// A restricted, move-only view over a term's posting list bounded to the
/// document window `[first, last)`. Mirrors `PISA`'s `Posting_Range`: a
/// lightweight handle that knows how to construct a `Cursor` at its own
/// window's start, but is not itself a cursor.
pub struct PostingRange<'a> {
    index: &'a FreqIndex,
    term: usize,
    first: u64,
    last: u64,
}

impl<'a> PostingRange<'a> {
    pub(crate) fn new(index: &'a FreqIndex, term: usize, first: u64, last: u64) -> Self {
        Self { index, term, first, last }
    }

    /// Builds a cursor over this range, clamped to `[first, last)` and
    /// initially positioned at the first docid `>= first`.
    pub fn cursor(&self) -> Result<Cursor<'a>> {
        let mut c = self.index.cursor_with_last(self.term, self.last)?;
        if self.first > 0 {
            c.next_geq(self.first);
        }
        Ok(c)
    }

    /// Returns a new range further restricted to `[low, hi)`.
    ///
    /// Fails with `RangeOutOfBounds` if `[low, hi)` is not contained in
    /// `[first_document(), last_document())` — this can happen with
    /// ordinary, non-adversarial inputs (a caller-computed window drifting
    /// outside a previously restricted range), so unlike an out-of-range
    /// term index it is a surfaced error rather than a panic.
    pub fn restrict(&self, low: u64, hi: u64) -> Result<PostingRange<'a>> {
        if low < self.first || hi > self.last || low >= hi {
            return Err(FreqIndexError::RangeOutOfBounds { low, hi, first: self.first, last: self.last });
        }
        Ok(PostingRange { index: self.index, term: self.term, first: low, last: hi })
    }

    #[must_use]
    pub fn first_document(&self) -> u64 {
        self.first
    }

    #[must_use]
    pub fn last_document(&self) -> u64 {
        self.last
    }

    /// The full underlying posting list's length, **not** the number of
    /// documents that fall inside `[first, last)`. This mirrors the
    /// original source's own `Posting_Range::size`, which delegates to the
    /// unrestricted cursor's `size()` rather than counting the window;
    /// SPEC_FULL.md records this as a preserved, intentional inconsistency
    /// rather than a bug to fix.
    pub fn size(&self) -> Result<u64> {
        Ok(self.index.cursor_with_last(self.term, self.last)?.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freq_index::FreqIndexBuilder;
    use crate::params::GlobalParameters;

    fn sample_index() -> FreqIndex {
        let mut b = FreqIndexBuilder::new(100, GlobalParameters::default());
        b.add_posting_list(&[1, 5, 9, 40, 99], &[1, 2, 1, 3, 1], 8).unwrap();
        b.add_posting_list(&[0, 50], &[4, 6], 10).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn cursor_next_and_freq() {
        let index = sample_index();
        let mut c = index.cursor(0).unwrap();
        assert_eq!(c.docid(), 1);
        assert_eq!(c.freq(), 1);
        assert_eq!(c.next(), 5);
        assert_eq!(c.freq(), 2);
        assert_eq!(c.next(), 9);
        assert_eq!(c.next(), 40);
        assert_eq!(c.next(), 99);
        assert_eq!(c.freq(), 1);
        assert_eq!(c.next(), 100); // DOCUMENT_BOUND == num_docs for an unrestricted cursor
    }

    #[test]
    fn cursor_next_geq() {
        let index = sample_index();
        let mut c = index.cursor(0).unwrap();
        assert_eq!(c.next_geq(10), 40);
        assert_eq!(c.next_geq(100), 100);
    }

    #[test]
    fn posting_range_restrict_clamps_docids_to_its_own_last() {
        // Reproduces S5: term 0's docids are [1, 5, 9, 40, 99]; restricted to
        // (15, 25), next_geq(15) lands on 40, which is >= 25, so the clamp
        // reports the range's own last (25), not num_docs (100).
        let index = sample_index();
        let range = index.posting_range(0).restrict(15, 25).unwrap();
        let mut c = range.cursor().unwrap();
        assert_eq!(c.docid(), 25);
        assert_eq!(c.next(), 25);
    }

    #[test]
    fn restrict_outside_window_is_rejected() {
        let index = sample_index();
        let range = index.posting_range(0).restrict(10, 50).unwrap();
        assert!(range.restrict(5, 20).is_err());
        assert!(range.restrict(20, 60).is_err());
    }

    #[test]
    fn empty_query_term_not_representable_but_bounds_respected() {
        let index = sample_index();
        let mut c = index.cursor_with_last(1, 0).unwrap();
        assert_eq!(c.docid(), 0);
    }
}
