//! Codec-tuning constants persisted alongside the index.

/// Immutable, index-wide tuning knobs for the reference codec.
///
/// `ef_log_sampling0` is reserved for a future partitioned/sampled
/// Elias-Fano variant (see `sequence::EliasFanoSequence`'s module docs); the
/// plain reference codec implemented here does not use it, but it is
/// persisted so that an index built today can be read by a decoder that
/// later adds partitioning without bumping the on-disk format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlobalParameters {
    pub ef_log_sampling0: u64,
}

impl GlobalParameters {
    pub fn new(ef_log_sampling0: u64) -> Self {
        Self { ef_log_sampling0 }
    }
}
