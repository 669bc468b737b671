//! The cache assembler: reconciles cached segments against a requested
//! window, fetches the gaps, merges everything and compacts storage.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::cache::store::{FetchService, SegmentDescriptor, SegmentStore};
use crate::core::series::SampleSeries;
use crate::core::types::{ChannelId, TimeWindow};
use crate::error::{WaveError, WaveResult};

/// Tuning controls for cache assembly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssemblerConfig {
    /// Seconds added to gap fetches on interior edges, so near-adjacent
    /// follow-up requests don't trigger repeat fetches.
    pub buffer_margin: f64,
    /// Merged results with at most this many samples are returned without
    /// being persisted.
    pub materialize_threshold: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            buffer_margin: 3.0,
            materialize_threshold: 200,
        }
    }
}

impl AssemblerConfig {
    fn validate(self) -> WaveResult<Self> {
        if !self.buffer_margin.is_finite() || self.buffer_margin < 0.0 {
            return Err(WaveError::InvalidData(format!(
                "buffer margin must be finite and >= 0, got {}",
                self.buffer_margin
            )));
        }
        Ok(self)
    }
}

/// Assembles arbitrary time windows of a channel from previously cached
/// segments plus freshly fetched gap fillers.
///
/// All work happens on the caller's thread. Concurrent use for different
/// channels is safe by value semantics; concurrent requests for the *same*
/// channel are not serialized here: callers provide per-key mutual
/// exclusion.
pub struct CacheAssembler<S, F> {
    store: S,
    fetch: F,
    config: AssemblerConfig,
}

impl<S: SegmentStore, F: FetchService> CacheAssembler<S, F> {
    pub fn new(store: S, fetch: F, config: AssemblerConfig) -> WaveResult<Self> {
        Ok(Self {
            store,
            fetch,
            config: config.validate()?,
        })
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetch
    }

    pub fn into_parts(self) -> (S, F) {
        (self.store, self.fetch)
    }

    /// Returns one series covering `window` for `channel`, assembled from
    /// cache and fetch.
    ///
    /// Partial coverage is not an error: the result is masked where no
    /// source had data. `NoData` is reported only when neither the cache nor
    /// the fetch service produced a single sample. When the merged result is
    /// large enough it replaces the segments it was built from (full
    /// replace-on-merge, deletion strictly after the new segment is durably
    /// written).
    pub fn get(&mut self, channel: &ChannelId, window: TimeWindow) -> WaveResult<SampleSeries> {
        let descriptors = self.store.list(channel)?;
        let intersecting: Vec<SegmentDescriptor> = descriptors
            .into_iter()
            .filter(|d| window.intersects(d.start, d.end))
            .collect();

        if intersecting.is_empty() {
            debug!(%channel, "no cached segments intersect the window, fetching it whole");
            let fetched = self
                .fetch
                .fetch(channel, window)?
                .ok_or_else(|| WaveError::NoData {
                    channel: channel.to_string(),
                })?;
            if fetched.npts() > self.config.materialize_threshold
                && let Err(err) = self.store.save(channel, &fetched)
            {
                warn!(%channel, %err, "failed to persist fetched segment");
            }
            return Ok(fetched);
        }

        let mut gaps = coverage_gaps(&intersecting, window, self.config.buffer_margin)?;
        debug!(
            %channel,
            segments = intersecting.len(),
            gaps = gaps.len(),
            "assembling window from cache"
        );

        let mut pieces: Vec<SampleSeries> = Vec::with_capacity(intersecting.len() + gaps.len());
        for descriptor in &intersecting {
            match self.store.load(descriptor) {
                Ok(series) => pieces.push(series),
                Err(err) => {
                    // The fetch service is authoritative and the cache is
                    // reconstructible: degrade to a cache miss for this
                    // segment and re-fetch its window intersection.
                    warn!(%channel, handle = %descriptor.handle, %err,
                        "cached segment unreadable, re-fetching its range");
                    let start = descriptor.start.max(window.start());
                    let end = descriptor.end.min(window.end());
                    gaps.push(TimeWindow::new(start, end)?);
                }
            }
        }

        for gap in &gaps {
            if let Some(series) = self.fetch.fetch(channel, *gap)?
                && !series.is_empty()
            {
                pieces.push(series);
            }
        }

        pieces.sort_by(|a, b| a.start().total_cmp(&b.start()));
        let mut iter = pieces.into_iter();
        let Some(mut merged) = iter.next() else {
            return Err(WaveError::NoData {
                channel: channel.to_string(),
            });
        };
        for piece in iter {
            merged = merged.merge(&piece)?;
        }
        if merged.is_empty() {
            return Err(WaveError::NoData {
                channel: channel.to_string(),
            });
        }

        if merged.npts() > self.config.materialize_threshold {
            self.compact(channel, &merged, &intersecting);
        }
        Ok(merged)
    }

    /// Replaces the segments a merge was assembled from with one segment
    /// spanning the merged bounds. Storage failures degrade: the caller
    /// still gets the merged series.
    fn compact(
        &mut self,
        channel: &ChannelId,
        merged: &SampleSeries,
        superseded: &[SegmentDescriptor],
    ) {
        match self.store.save(channel, merged) {
            Ok(descriptor) => {
                debug!(%channel, handle = %descriptor.handle, "compacted cache segments");
                for old in superseded {
                    if old.handle == descriptor.handle {
                        continue;
                    }
                    if let Err(err) = self.store.delete(old) {
                        warn!(%channel, handle = %old.handle, %err,
                            "failed to delete superseded segment");
                    }
                }
            }
            Err(err) => warn!(%channel, %err, "failed to persist merged segment"),
        }
    }
}

/// Sub-ranges of `window` not covered by any descriptor, widened by
/// `margin` on interior edges. Edges coinciding with the window boundary
/// are never widened.
fn coverage_gaps(
    sorted: &[SegmentDescriptor],
    window: TimeWindow,
    margin: f64,
) -> WaveResult<SmallVec<[TimeWindow; 4]>> {
    let mut gaps = SmallVec::new();
    let Some(first) = sorted.first() else {
        gaps.push(window);
        return Ok(gaps);
    };
    let last = sorted.last().unwrap_or(first);

    if window.start() < first.start {
        gaps.push(TimeWindow::new(window.start(), first.start + margin)?);
    }
    for pair in sorted.windows(2) {
        gaps.push(TimeWindow::new(pair[0].end - margin, pair[1].start + margin)?);
    }
    if window.end() > last.end {
        gaps.push(TimeWindow::new(last.end - margin, window.end())?);
    }
    Ok(gaps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(start: f64, end: f64) -> SegmentDescriptor {
        SegmentDescriptor {
            channel: ChannelId::new("BW", "MANZ", "", "EHZ"),
            start,
            end,
            handle: format!("seg-{start}"),
        }
    }

    #[test]
    fn no_descriptors_yields_the_whole_window() {
        let window = TimeWindow::new(0.0, 100.0).expect("valid window");
        let gaps = coverage_gaps(&[], window, 3.0).expect("gaps");
        assert_eq!(gaps.as_slice(), &[window]);
    }

    #[test]
    fn interior_edges_are_widened_outer_edges_are_not() {
        let window = TimeWindow::new(0.0, 100.0).expect("valid window");
        let segments = [descriptor(10.0, 40.0), descriptor(60.0, 90.0)];
        let gaps = coverage_gaps(&segments, window, 3.0).expect("gaps");

        assert_eq!(gaps.len(), 3);
        // Leading: outer edge stays at the window boundary.
        assert_eq!(gaps[0].start(), 0.0);
        assert_eq!(gaps[0].end(), 13.0);
        // Interior: widened on both sides.
        assert_eq!(gaps[1].start(), 37.0);
        assert_eq!(gaps[1].end(), 63.0);
        // Trailing: outer edge stays at the window boundary.
        assert_eq!(gaps[2].start(), 87.0);
        assert_eq!(gaps[2].end(), 100.0);
    }

    #[test]
    fn fully_covered_window_has_no_gaps() {
        let window = TimeWindow::new(20.0, 80.0).expect("valid window");
        let segments = [descriptor(10.0, 90.0)];
        let gaps = coverage_gaps(&segments, window, 3.0).expect("gaps");
        assert!(gaps.is_empty());
    }

    #[test]
    fn negative_margin_is_rejected() {
        let config = AssemblerConfig {
            buffer_margin: -1.0,
            materialize_threshold: 200,
        };
        assert!(config.validate().is_err());
    }
}
