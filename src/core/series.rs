use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::core::types::{ChannelId, Dtype};
use crate::error::{WaveError, WaveResult};

/// Sample storage. Validity is a type-level fact: a series either carries no
/// invalid samples at all or carries an explicit per-sample validity bitmap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SampleData {
    Plain(Vec<f64>),
    Masked { values: Vec<f64>, mask: Vec<bool> },
}

impl SampleData {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Plain(values) => values.len(),
            Self::Masked { values, .. } => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        match self {
            Self::Plain(values) => values,
            Self::Masked { values, .. } => values,
        }
    }

    /// True when position `i` holds a valid sample.
    #[must_use]
    pub fn is_valid(&self, i: usize) -> bool {
        match self {
            Self::Plain(_) => true,
            Self::Masked { mask, .. } => !mask[i],
        }
    }

    /// Collapses a masked buffer whose bitmap marks nothing back to plain.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Masked { values, mask } => {
                if mask.iter().any(|&m| m) {
                    Self::Masked { values, mask }
                } else {
                    Self::Plain(values)
                }
            }
            plain => plain,
        }
    }
}

/// A fixed-rate sequence of numeric measurements anchored to an absolute
/// start time.
///
/// `end` is derived: `start + (npts - 1) / sampling_rate` when samples are
/// present. An empty series keeps an explicit end bound so trim results can
/// report `start == end == requested time`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSeries {
    channel: ChannelId,
    start: f64,
    empty_end: f64,
    sampling_rate: f64,
    dtype: Dtype,
    data: SampleData,
    history: Vec<String>,
}

impl SampleSeries {
    /// Creates a plain series with no invalid samples.
    pub fn new(
        channel: ChannelId,
        start: f64,
        sampling_rate: f64,
        dtype: Dtype,
        samples: Vec<f64>,
    ) -> WaveResult<Self> {
        Self::from_data(channel, start, sampling_rate, dtype, SampleData::Plain(samples))
    }

    /// Creates a series carrying a validity bitmap (`true` marks invalid).
    pub fn new_masked(
        channel: ChannelId,
        start: f64,
        sampling_rate: f64,
        dtype: Dtype,
        values: Vec<f64>,
        mask: Vec<bool>,
    ) -> WaveResult<Self> {
        if values.len() != mask.len() {
            return Err(WaveError::InvalidData(format!(
                "mask length {} does not match sample length {}",
                mask.len(),
                values.len()
            )));
        }
        Self::from_data(
            channel,
            start,
            sampling_rate,
            dtype,
            SampleData::Masked { values, mask }.normalized(),
        )
    }

    pub(crate) fn from_data(
        channel: ChannelId,
        start: f64,
        sampling_rate: f64,
        dtype: Dtype,
        data: SampleData,
    ) -> WaveResult<Self> {
        if !start.is_finite() {
            return Err(WaveError::InvalidData(format!(
                "series start must be finite, got {start}"
            )));
        }
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(WaveError::InvalidData(format!(
                "sampling rate must be positive and finite, got {sampling_rate}"
            )));
        }
        Ok(Self {
            channel,
            start,
            empty_end: start,
            sampling_rate,
            dtype,
            data,
            history: Vec::new(),
        })
    }

    /// Zero-sample series collapsed onto a single time point.
    pub(crate) fn collapsed_at(&self, t: f64) -> Self {
        Self {
            channel: self.channel.clone(),
            start: t,
            empty_end: t,
            sampling_rate: self.sampling_rate,
            dtype: self.dtype,
            data: SampleData::Plain(Vec::new()),
            history: self.history.clone(),
        }
    }

    /// Rebuilds this series around new bounds and data, keeping identity,
    /// rate, dtype and history.
    pub(crate) fn with_data(&self, start: f64, data: SampleData) -> Self {
        Self {
            channel: self.channel.clone(),
            start,
            empty_end: start,
            sampling_rate: self.sampling_rate,
            dtype: self.dtype,
            data: data.normalized(),
            history: self.history.clone(),
        }
    }

    /// Builds a derived series that keeps this one's channel and history but
    /// carries new timing, dtype and data.
    pub(crate) fn derived(
        &self,
        start: f64,
        sampling_rate: f64,
        dtype: Dtype,
        data: SampleData,
    ) -> WaveResult<Self> {
        let mut result = Self::from_data(self.channel.clone(), start, sampling_rate, dtype, data)?;
        result.history = self.history.clone();
        Ok(result)
    }

    /// Moves the start timestamp without touching samples. Only the
    /// degenerate no-pad left trim uses this.
    pub(crate) fn move_start(&mut self, t: f64) {
        self.start = t;
        self.empty_end = t;
    }

    #[must_use]
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// End of the recording: time of the last sample, or the stored bound
    /// when the series is empty.
    #[must_use]
    pub fn end(&self) -> f64 {
        let npts = self.data.len();
        if npts == 0 {
            self.empty_end
        } else {
            self.start + (npts - 1) as f64 / self.sampling_rate
        }
    }

    #[must_use]
    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    #[must_use]
    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    #[must_use]
    pub fn npts(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether this series carries a validity bitmap. An observable property
    /// of the value, not a runtime probe of its contents.
    #[must_use]
    pub fn is_masked(&self) -> bool {
        matches!(self.data, SampleData::Masked { .. })
    }

    #[must_use]
    pub fn data(&self) -> &SampleData {
        &self.data
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        self.data.values()
    }

    /// The sample at position `i`, or `None` when masked.
    #[must_use]
    pub fn sample(&self, i: usize) -> Option<f64> {
        if self.data.is_valid(i) {
            Some(self.data.values()[i])
        } else {
            None
        }
    }

    /// Ordered log of transforms applied to this series.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub(crate) fn push_history(&mut self, entry: String) {
        self.history.push(entry);
    }

    /// Relational ordering between series is undefined by contract.
    pub fn relative_order(&self, _other: &Self) -> WaveResult<Ordering> {
        Err(WaveError::UnsupportedOrdering)
    }
}

/// Equality covers identity, sampling rate, start, dtype and sample data
/// including the mask pattern. The processing history is excluded; filler
/// values under masked positions are ignored.
impl PartialEq for SampleSeries {
    fn eq(&self, other: &Self) -> bool {
        if self.channel != other.channel
            || self.sampling_rate != other.sampling_rate
            || self.start != other.start
            || self.dtype != other.dtype
            || self.npts() != other.npts()
        {
            return false;
        }
        (0..self.npts()).all(|i| match (self.sample(i), other.sample(i)) {
            (Some(a), Some(b)) => a == b,
            (None, None) => true,
            _ => false,
        })
    }
}
