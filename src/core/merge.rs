//! Pairwise combination of two series into one gap-aware series.
//!
//! Overlapping regions are never resolved by picking a winner: identical
//! data passes through untouched, disagreeing data is masked wholesale.

use crate::core::series::{SampleData, SampleSeries};
use crate::core::types::sample_delta;
use crate::error::{WaveError, WaveResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    /// The later series starts at least one sample after the earlier ends.
    Gap { filler: usize },
    /// The later series starts exactly one sample period after the earlier ends.
    Contiguous,
    /// The later series lies entirely inside the earlier one.
    Containment,
    /// The later series starts inside the earlier one and extends beyond it.
    Overlap,
}

impl SampleSeries {
    /// Combines two series covering different (or conflicting) stretches of
    /// the same channel into one series.
    ///
    /// Requires identical channel key, sampling rate and dtype. Gaps between
    /// the inputs become masked filler samples. Where the inputs overlap,
    /// element-wise identical data is kept as-is; any disagreement masks the
    /// entire overlap region.
    ///
    /// Combining more than two series by repeated application is
    /// order-sensitive when data disagree; callers should apply it in
    /// ascending start-time order.
    pub fn merge(&self, other: &Self) -> WaveResult<Self> {
        self.check_compatible(other)?;

        // An empty side contributes nothing.
        if self.is_empty() {
            return Ok(other.clone());
        }
        if other.is_empty() {
            return Ok(self.clone());
        }

        let (l, r) = if other.start() < self.start() {
            (other, self)
        } else {
            (self, other)
        };
        let rate = l.sampling_rate();
        let offset_signed = sample_delta(r.start() - l.start(), rate, true);
        debug_assert!(offset_signed >= 0);
        let offset = offset_signed.max(0) as usize;

        let alignment = if offset > l.npts() {
            Alignment::Gap {
                filler: offset - l.npts(),
            }
        } else if offset == l.npts() {
            Alignment::Contiguous
        } else if offset + r.npts() <= l.npts() {
            Alignment::Containment
        } else {
            Alignment::Overlap
        };

        let data = match alignment {
            Alignment::Gap { filler } => concat_with_filler(l.data(), filler, r.data()),
            Alignment::Contiguous => concat_with_filler(l.data(), 0, r.data()),
            Alignment::Containment => resolve_contained(l.data(), r.data(), offset),
            Alignment::Overlap => resolve_overlap(l.data(), r.data(), offset),
        };

        let mut result = l.with_data(l.start(), data);
        result.push_history(format!(
            "merge(other_start={}, other_npts={})",
            r.start(),
            r.npts()
        ));
        Ok(result)
    }

    fn check_compatible(&self, other: &Self) -> WaveResult<()> {
        if self.channel() != other.channel() {
            return Err(WaveError::IncompatibleSeries {
                reason: format!(
                    "channel mismatch: {} vs {}",
                    self.channel(),
                    other.channel()
                ),
            });
        }
        if self.sampling_rate() != other.sampling_rate() {
            return Err(WaveError::IncompatibleSeries {
                reason: format!(
                    "sampling rate mismatch: {} vs {}",
                    self.sampling_rate(),
                    other.sampling_rate()
                ),
            });
        }
        if self.dtype() != other.dtype() {
            return Err(WaveError::IncompatibleSeries {
                reason: format!("dtype mismatch: {:?} vs {:?}", self.dtype(), other.dtype()),
            });
        }
        Ok(())
    }
}

fn mask_of(data: &SampleData) -> Vec<bool> {
    match data {
        SampleData::Plain(values) => vec![false; values.len()],
        SampleData::Masked { mask, .. } => mask.clone(),
    }
}

fn concat_with_filler(l: &SampleData, filler: usize, r: &SampleData) -> SampleData {
    let total = l.len() + filler + r.len();
    let mut values = Vec::with_capacity(total);
    let mut mask = Vec::with_capacity(total);
    values.extend_from_slice(l.values());
    mask.extend(mask_of(l));
    values.resize(l.len() + filler, 0.0);
    mask.resize(l.len() + filler, true);
    values.extend_from_slice(r.values());
    mask.extend(mask_of(r));
    SampleData::Masked { values, mask }.normalized()
}

/// Whether two aligned positions carry the same information: matching
/// validity, and matching values where valid.
fn pair_agrees(l: &SampleData, li: usize, r: &SampleData, ri: usize) -> bool {
    match (l.is_valid(li), r.is_valid(ri)) {
        (true, true) => l.values()[li] == r.values()[ri],
        (false, false) => true,
        _ => false,
    }
}

fn region_agrees(l: &SampleData, r: &SampleData, offset: usize, shared: usize) -> bool {
    (0..shared).all(|i| pair_agrees(l, offset + i, r, i))
}

/// R lies entirely inside L: the result spans exactly L.
fn resolve_contained(l: &SampleData, r: &SampleData, offset: usize) -> SampleData {
    let shared = r.len();
    if region_agrees(l, r, offset, shared) {
        return l.clone().normalized();
    }
    let values = l.values().to_vec();
    let mut mask = mask_of(l);
    for m in &mut mask[offset..offset + shared] {
        *m = true;
    }
    SampleData::Masked { values, mask }
}

/// R starts inside L and extends beyond it: head from L, shared region
/// resolved, tail from R.
fn resolve_overlap(l: &SampleData, r: &SampleData, offset: usize) -> SampleData {
    let shared = l.len() - offset;
    let total = offset + r.len();
    let mut values = Vec::with_capacity(total);
    let mut mask = Vec::with_capacity(total);

    values.extend_from_slice(&l.values()[..offset]);
    mask.extend(&mask_of(l)[..offset]);

    if region_agrees(l, r, offset, shared) {
        values.extend_from_slice(&l.values()[offset..]);
        mask.extend(&mask_of(l)[offset..]);
    } else {
        values.resize(offset + shared, 0.0);
        mask.resize(offset + shared, true);
    }

    values.extend_from_slice(&r.values()[shared..]);
    mask.extend(&mask_of(r)[shared..]);
    SampleData::Masked { values, mask }.normalized()
}
