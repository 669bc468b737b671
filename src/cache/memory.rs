//! In-memory segment store, used as a test double and for ephemeral caches.

use indexmap::IndexMap;

use crate::cache::store::{SegmentDescriptor, SegmentStore};
use crate::core::series::SampleSeries;
use crate::core::types::ChannelId;
use crate::error::{WaveError, WaveResult};

#[derive(Default)]
pub struct MemorySegmentStore {
    segments: IndexMap<String, (SegmentDescriptor, SampleSeries)>,
    corrupt: Vec<String>,
    next_id: u64,
}

impl MemorySegmentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Marks a stored segment so subsequent loads report corruption.
    pub fn poison(&mut self, handle: &str) {
        self.corrupt.push(handle.to_owned());
    }
}

impl SegmentStore for MemorySegmentStore {
    fn list(&self, channel: &ChannelId) -> WaveResult<Vec<SegmentDescriptor>> {
        let mut descriptors: Vec<SegmentDescriptor> = self
            .segments
            .values()
            .filter(|(d, _)| &d.channel == channel)
            .map(|(d, _)| d.clone())
            .collect();
        descriptors.sort_by(|a, b| a.start.total_cmp(&b.start));
        Ok(descriptors)
    }

    fn load(&self, descriptor: &SegmentDescriptor) -> WaveResult<SampleSeries> {
        if self.corrupt.contains(&descriptor.handle) {
            return Err(WaveError::StorageCorruption {
                handle: descriptor.handle.clone(),
                detail: "segment marked corrupt".to_owned(),
            });
        }
        self.segments
            .get(&descriptor.handle)
            .map(|(_, series)| series.clone())
            .ok_or_else(|| WaveError::StorageCorruption {
                handle: descriptor.handle.clone(),
                detail: "unknown segment handle".to_owned(),
            })
    }

    fn save(
        &mut self,
        channel: &ChannelId,
        series: &SampleSeries,
    ) -> WaveResult<SegmentDescriptor> {
        let handle = format!("mem:{}", self.next_id);
        self.next_id += 1;
        let descriptor = SegmentDescriptor {
            channel: channel.clone(),
            start: series.start(),
            end: series.end(),
            handle: handle.clone(),
        };
        self.segments
            .insert(handle, (descriptor.clone(), series.clone()));
        Ok(descriptor)
    }

    fn delete(&mut self, descriptor: &SegmentDescriptor) -> WaveResult<()> {
        self.segments.shift_remove(&descriptor.handle);
        self.corrupt.retain(|h| h != &descriptor.handle);
        Ok(())
    }
}
