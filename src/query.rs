//! Query evaluation over scoring cursors, grounded on
//! `examples/original_source/include/pisa/query/algorithm/extern_query.hpp`'s
//! `termdid_search`/`termdidlist_search` functors. Both are degenerate by
//! design: they drive only `cursors[0]`, the rest of `cursors` is along for
//! the ride (present so a caller already holding a per-term cursor vector
//! doesn't need to special-case a single term). `max_docid` is accepted for
//! parity with the original signature but is not otherwise used by either
//! operator.

use crate::cursor::Cursor;

/// A cursor augmented with a scoring function, the "scoring cursor" the
/// specification's query operators are built on top of. `Cursor` itself
/// carries term frequency but not a score — wrap it, as `TfCursor` does, to
/// supply one.
pub trait Scored {
    /// Advances to the least docid `>= target`, returning it (or the
    /// cursor's own document-universe sentinel if none remains).
    fn next_geq(&mut self, target: u64) -> u64;

    /// The docid at the current position.
    fn docid(&self) -> u64;

    /// The score at the current position.
    fn score(&mut self) -> f64;
}

/// A `Scored` cursor whose score is the term frequency at the current
/// position, the simplest concrete weighting the specification names.
pub struct TfCursor<'a> {
    cursor: Cursor<'a>,
}

impl<'a> TfCursor<'a> {
    #[must_use]
    pub fn new(cursor: Cursor<'a>) -> Self {
        Self { cursor }
    }
}

impl<'a> Scored for TfCursor<'a> {
    fn next_geq(&mut self, target: u64) -> u64 {
        self.cursor.next_geq(target)
    }

    fn docid(&self) -> u64 {
        self.cursor.docid()
    }

    fn score(&mut self) -> f64 {
        self.cursor.freq() as f64
    }
}

/// **PointScore**. Returns `-1` if `cursors` is empty. Otherwise advances
/// `cursors[0]` to the least docid `>= target_docid`: if that docid equals
/// `target_docid`, returns its score; if it overshot (or the cursor is now
/// terminal), returns `0`.
pub fn termdid_search<S: Scored>(cursors: &mut [S], _max_docid: u64, target_docid: u64) -> f64 {
    let Some(first) = cursors.first_mut() else {
        return -1.0;
    };
    first.next_geq(target_docid);
    if first.docid() != target_docid {
        return 0.0;
    }
    first.score()
}

/// **ListScore**. `target_docids` is assumed monotone non-decreasing (each
/// `next_geq` call picks up where the last left off). Returns `[-1]` if
/// `cursors` is empty; otherwise a parallel vector of per-target scores (`0`
/// where the target is absent from `cursors[0]`'s list).
pub fn termdidlist_search<S: Scored>(cursors: &mut [S], _max_docid: u64, target_docids: &[u64]) -> Vec<f64> {
    let Some(first) = cursors.first_mut() else {
        return vec![-1.0];
    };
    target_docids
        .iter()
        .map(|&target| {
            first.next_geq(target);
            if first.docid() != target {
                0.0
            } else {
                first.score()
            }
        })
        .collect()
}

/// Multi-term **PointScore**: the "obvious extension" the specification
/// names for intersecting all query-term cursors at `target_docid`,
/// summing each cursor's score where every one of them is actually
/// positioned on `target_docid`. Returns `0.0` (not `-1`) on an empty
/// `cursors` slice, since unlike the single-cursor operator there is no
/// degenerate "no query" case to special-case at this arity; see
/// DESIGN.md for the combining-function choice (sum, not product).
pub fn and_termdid_search<S: Scored>(cursors: &mut [S], target_docid: u64) -> f64 {
    let mut all_present = !cursors.is_empty();
    let mut total = 0.0;
    for c in cursors.iter_mut() {
        c.next_geq(target_docid);
        if c.docid() != target_docid {
            all_present = false;
        }
    }
    if !all_present {
        return 0.0;
    }
    for c in cursors.iter_mut() {
        total += c.score();
    }
    total
}

/// Multi-term **ListScore**: `and_termdid_search` evaluated at each of
/// `target_docids` in turn.
pub fn and_termdidlist_search<S: Scored>(cursors: &mut [S], target_docids: &[u64]) -> Vec<f64> {
    target_docids.iter().map(|&target| and_termdid_search(cursors, target)).collect()
}
