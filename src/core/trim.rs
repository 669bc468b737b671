//! Sample-accurate trimming of a series to a time boundary or window.
//!
//! All trim operations return a freshly owned series; the source is never
//! mutated or aliased.

use crate::core::series::{SampleData, SampleSeries};
use crate::core::types::{TimeWindow, TrimPoint, sample_delta};
use crate::error::WaveResult;

impl SampleSeries {
    /// Cuts samples before `point`.
    ///
    /// With `nearest` the boundary rounds to the closest sample, half away
    /// from zero; otherwise it snaps inward to the first sample at or after
    /// the requested time. A boundary before the current start either moves
    /// the start timestamp only (`pad == false`, degenerate bounds accepted)
    /// or prepends masked filler samples (`pad == true`). A boundary past
    /// the end collapses the series to zero samples at the requested time,
    /// dtype preserved.
    pub fn left_trim(&self, point: TrimPoint, nearest: bool, pad: bool) -> WaveResult<Self> {
        let t = match point {
            TrimPoint::Offset(seconds) => self.start() + seconds,
            TrimPoint::Absolute(at) => at,
        };
        let rate = self.sampling_rate();
        let delta = -sample_delta(self.start() - t, rate, nearest);

        let mut result = if delta < 0 {
            let fill = (-delta) as usize;
            if pad {
                let data = pad_masked(self.data(), fill, 0);
                self.with_data(self.start() - fill as f64 / rate, data)
            } else {
                let mut unchanged = self.clone();
                unchanged.move_start(t);
                unchanged
            }
        } else if delta as usize >= self.npts() {
            self.collapsed_at(t)
        } else {
            let drop = delta as usize;
            let data = slice(self.data(), drop, self.npts());
            self.with_data(self.start() + drop as f64 / rate, data)
        };
        result.push_history(format!("left_trim(t={t}, nearest={nearest}, pad={pad})"));
        Ok(result)
    }

    /// Cuts samples after `point`; the mirror of [`SampleSeries::left_trim`]
    /// anchored at the end.
    ///
    /// An offset point counts seconds back from the end. A boundary past the
    /// end leaves the series unchanged (`pad == false`; the end bound is
    /// derived and cannot move without samples) or appends masked filler
    /// (`pad == true`). A boundary before the start collapses the series to
    /// zero samples at the requested time.
    pub fn right_trim(&self, point: TrimPoint, nearest: bool, pad: bool) -> WaveResult<Self> {
        let t = match point {
            TrimPoint::Offset(seconds) => self.end() - seconds,
            TrimPoint::Absolute(at) => at,
        };
        let rate = self.sampling_rate();
        let drop = -sample_delta(t - self.end(), rate, nearest);

        let mut result = if drop < 0 {
            if pad {
                let fill = (-drop) as usize;
                let data = pad_masked(self.data(), 0, fill);
                self.with_data(self.start(), data)
            } else {
                self.clone()
            }
        } else if drop as usize >= self.npts() {
            self.collapsed_at(t)
        } else {
            let keep = self.npts() - drop as usize;
            let data = slice(self.data(), 0, keep);
            self.with_data(self.start(), data)
        };
        result.push_history(format!("right_trim(t={t}, nearest={nearest}, pad={pad})"));
        Ok(result)
    }

    /// Trims to a time window: left trim, then right trim.
    ///
    /// Unlike a direct [`SampleSeries::left_trim`], a window start before
    /// the series start is ignored when not padding, so an out-of-bounds
    /// window never moves timestamps it has no samples for. A window lying
    /// entirely outside the series collapses it to zero samples at the
    /// clipped bound.
    pub fn trim(&self, window: TimeWindow, pad: bool, nearest: bool) -> WaveResult<Self> {
        let left = if pad || window.start() > self.start() {
            self.left_trim(TrimPoint::Absolute(window.start()), nearest, pad)?
        } else {
            self.clone()
        };
        left.right_trim(TrimPoint::Absolute(window.end()), nearest, pad)
    }
}

fn slice(data: &SampleData, from: usize, to: usize) -> SampleData {
    match data {
        SampleData::Plain(values) => SampleData::Plain(values[from..to].to_vec()),
        SampleData::Masked { values, mask } => SampleData::Masked {
            values: values[from..to].to_vec(),
            mask: mask[from..to].to_vec(),
        },
    }
}

fn pad_masked(data: &SampleData, front: usize, back: usize) -> SampleData {
    let npts = data.len();
    let mut values = Vec::with_capacity(front + npts + back);
    let mut mask = Vec::with_capacity(front + npts + back);
    values.resize(front, 0.0);
    mask.resize(front, true);
    values.extend_from_slice(data.values());
    match data {
        SampleData::Plain(_) => mask.resize(front + npts, false),
        SampleData::Masked { mask: src, .. } => mask.extend_from_slice(src),
    }
    values.resize(front + npts + back, 0.0);
    mask.resize(front + npts + back, true);
    SampleData::Masked { values, mask }
}
