//! Display-oriented min/max reduction.
//!
//! Downsamples a series to a fixed pixel count by taking the peak-to-peak
//! amplitude of contiguous sample buckets, rescaled to [0, 100] for display
//! consumers.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::series::{SampleData, SampleSeries};
use crate::core::types::{Dtype, TimeWindow};
use crate::error::{WaveError, WaveResult};

/// Floor applied to faint-but-real activity after rescaling, so it stays
/// visible at display resolution. True data gaps (exact zeros) are exempt.
pub const MIN_VISIBLE_VALUE: f64 = 0.5;

/// Tuning controls for the min/max reducer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxConfig {
    /// Number of output samples (display pixels).
    pub pixel_count: usize,
    /// Optional logarithmic base applied as `log(v + 1) / log(base)` before
    /// rescaling.
    pub log_base: Option<f64>,
}

impl Default for MinMaxConfig {
    fn default() -> Self {
        Self {
            pixel_count: 500,
            log_base: None,
        }
    }
}

impl MinMaxConfig {
    fn validate(self) -> WaveResult<Self> {
        if self.pixel_count == 0 {
            return Err(WaveError::InvalidData(
                "pixel count must be > 0".to_owned(),
            ));
        }
        if let Some(base) = self.log_base
            && (!base.is_finite() || base <= 1.0)
        {
            return Err(WaveError::InvalidData(format!(
                "log base must be finite and > 1, got {base}"
            )));
        }
        Ok(self)
    }
}

/// Reduces a series to exactly `pixel_count` peak-to-peak values in [0, 100].
///
/// Each output value is the peak-to-peak amplitude of one contiguous input
/// bucket; remainder samples beyond the last full bucket fold into the final
/// bucket. Buckets with no valid sample yield 0. The output is a plain
/// series with the input's identity and bounds.
///
/// Fails when the input holds fewer samples than the requested pixel count;
/// upstream trim/merge is expected to deliver one full contiguous window.
pub fn reduce_to_pixels(series: &SampleSeries, config: MinMaxConfig) -> WaveResult<SampleSeries> {
    let config = config.validate()?;
    let npts = series.npts();
    if npts < config.pixel_count {
        return Err(WaveError::InvalidData(format!(
            "cannot reduce {npts} samples to {} pixels",
            config.pixel_count
        )));
    }

    let bucket = npts / config.pixel_count;
    let mut out = Vec::with_capacity(config.pixel_count);
    for p in 0..config.pixel_count {
        let mut ptp = bucket_ptp(series, p * bucket, (p + 1) * bucket);
        if p + 1 == config.pixel_count {
            // Remainder samples fold into the final bucket.
            let remainder = bucket_ptp(series, config.pixel_count * bucket, npts);
            ptp = ptp.max(remainder);
        }
        out.push(ptp);
    }

    if let Some(base) = config.log_base {
        let denom = base.ln();
        for v in &mut out {
            *v = (*v + 1.0).ln() / denom;
        }
    }

    let peak = out
        .iter()
        .copied()
        .map(OrderedFloat)
        .max()
        .map_or(0.0, OrderedFloat::into_inner);
    if peak > 0.0 {
        let scale = 100.0 / peak;
        for v in &mut out {
            *v *= scale;
            if *v > 0.0 && *v < MIN_VISIBLE_VALUE {
                *v = MIN_VISIBLE_VALUE;
            }
        }
    }

    let duration = series.end() - series.start();
    let rate = if config.pixel_count > 1 && duration > 0.0 {
        (config.pixel_count - 1) as f64 / duration
    } else {
        series.sampling_rate()
    };
    let mut result = series.derived(series.start(), rate, Dtype::F32, SampleData::Plain(out))?;
    result.push_history(format!(
        "minmax(pixels={}, log_base={:?})",
        config.pixel_count, config.log_base
    ));
    Ok(result)
}

/// The display pipeline: pad-trim the series to the requested window, then
/// reduce it for display.
pub fn prepare_window(
    series: &SampleSeries,
    window: TimeWindow,
    config: MinMaxConfig,
) -> WaveResult<SampleSeries> {
    let trimmed = series.trim(window, true, true)?;
    reduce_to_pixels(&trimmed, config)
}

/// Peak-to-peak over the valid samples of `[from, to)`; 0 when none are valid.
fn bucket_ptp(series: &SampleSeries, from: usize, to: usize) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for i in from..to {
        if let Some(v) = series.sample(i) {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if min > max { 0.0 } else { max - min }
}
