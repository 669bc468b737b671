//! Filesystem-backed segment store.
//!
//! Segments live under `<root>/<network>/<station>/` and are named with the
//! legacy key scheme `<channel>[<location>]--<start>--<end>--cache`. The
//! payload is a versioned JSON envelope so format evolution cannot silently
//! corrupt stored segments.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::store::{SegmentDescriptor, SegmentStore};
use crate::core::series::SampleSeries;
use crate::core::types::ChannelId;
use crate::error::{WaveError, WaveResult};

const SEGMENT_FORMAT_VERSION: u32 = 1;
const SEGMENT_SUFFIX: &str = "--cache";

#[derive(Serialize, Deserialize)]
struct SegmentEnvelope {
    version: u32,
    series: SampleSeries,
}

pub struct FsSegmentStore {
    root: PathBuf,
}

impl FsSegmentStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> WaveResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn station_dir(&self, channel: &ChannelId) -> PathBuf {
        self.root.join(&channel.network).join(&channel.station)
    }

    fn segment_key(channel: &ChannelId) -> String {
        format!("{}[{}]", channel.channel, channel.location)
    }

    /// Parses `<key>--<start>--<end>--cache`; `None` for foreign files.
    fn parse_name(name: &str, key: &str) -> Option<(f64, f64)> {
        let stem = name.strip_suffix(SEGMENT_SUFFIX)?;
        let rest = stem.strip_prefix(key)?.strip_prefix("--")?;
        let (start, end) = rest.split_once("--")?;
        Some((start.parse().ok()?, end.parse().ok()?))
    }
}

impl SegmentStore for FsSegmentStore {
    fn list(&self, channel: &ChannelId) -> WaveResult<Vec<SegmentDescriptor>> {
        let dir = self.station_dir(channel);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let key = Self::segment_key(channel);
        let mut descriptors = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some((start, end)) = Self::parse_name(name, &key) else {
                continue;
            };
            descriptors.push(SegmentDescriptor {
                channel: channel.clone(),
                start,
                end,
                handle: entry.path().to_string_lossy().into_owned(),
            });
        }
        descriptors.sort_by(|a, b| a.start.total_cmp(&b.start));
        Ok(descriptors)
    }

    fn load(&self, descriptor: &SegmentDescriptor) -> WaveResult<SampleSeries> {
        let bytes = fs::read(Path::new(&descriptor.handle))?;
        let envelope: SegmentEnvelope =
            serde_json::from_slice(&bytes).map_err(|err| WaveError::StorageCorruption {
                handle: descriptor.handle.clone(),
                detail: err.to_string(),
            })?;
        if envelope.version != SEGMENT_FORMAT_VERSION {
            return Err(WaveError::StorageCorruption {
                handle: descriptor.handle.clone(),
                detail: format!(
                    "unsupported segment format version {}",
                    envelope.version
                ),
            });
        }
        Ok(envelope.series)
    }

    fn save(
        &mut self,
        channel: &ChannelId,
        series: &SampleSeries,
    ) -> WaveResult<SegmentDescriptor> {
        let dir = self.station_dir(channel);
        fs::create_dir_all(&dir)?;
        let name = format!(
            "{}--{}--{}{}",
            Self::segment_key(channel),
            series.start(),
            series.end(),
            SEGMENT_SUFFIX
        );
        let path = dir.join(&name);
        let envelope = SegmentEnvelope {
            version: SEGMENT_FORMAT_VERSION,
            series: series.clone(),
        };
        let bytes = serde_json::to_vec(&envelope)?;

        // Write fully, then rename into place: a reader can never observe a
        // half-written segment.
        let tmp = dir.join(format!("{name}.tmp"));
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path)?;

        Ok(SegmentDescriptor {
            channel: channel.clone(),
            start: series.start(),
            end: series.end(),
            handle: path.to_string_lossy().into_owned(),
        })
    }

    fn delete(&mut self, descriptor: &SegmentDescriptor) -> WaveResult<()> {
        fs::remove_file(Path::new(&descriptor.handle))?;
        Ok(())
    }
}
