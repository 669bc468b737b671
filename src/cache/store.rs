use serde::{Deserialize, Serialize};

use crate::core::series::SampleSeries;
use crate::core::types::{ChannelId, TimeWindow};
use crate::error::WaveResult;

/// Handle to one persisted cache segment: where a channel's samples for a
/// contiguous time span live.
///
/// Per channel the assembler keeps descriptors non-overlapping and sorted by
/// start time; that invariant is maintained by replace-on-merge compaction,
/// never by ad-hoc insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDescriptor {
    pub channel: ChannelId,
    pub start: f64,
    pub end: f64,
    /// Opaque storage handle (a path for the filesystem store).
    pub handle: String,
}

/// Persistent segment storage.
///
/// Required property: `load(save(channel, x))` reproduces `x` exactly,
/// covering identity fields, rate, start, dtype, sample values and mask
/// pattern.
/// The on-disk layout is the implementation's concern.
pub trait SegmentStore {
    /// All descriptors stored for a channel, sorted by start time.
    fn list(&self, channel: &ChannelId) -> WaveResult<Vec<SegmentDescriptor>>;

    fn load(&self, descriptor: &SegmentDescriptor) -> WaveResult<SampleSeries>;

    /// Persists a series durably; a reader must never observe a partially
    /// written segment.
    fn save(&mut self, channel: &ChannelId, series: &SampleSeries)
    -> WaveResult<SegmentDescriptor>;

    fn delete(&mut self, descriptor: &SegmentDescriptor) -> WaveResult<()>;
}

/// External source of waveform data, authoritative for every channel.
///
/// Returning `None` or fewer samples than the window asks for is a valid,
/// non-error result. The call blocks; deadlines and cancellation live above
/// this layer.
pub trait FetchService {
    fn fetch(
        &mut self,
        channel: &ChannelId,
        window: TimeWindow,
    ) -> WaveResult<Option<SampleSeries>>;
}
