//! wavecache: disk-backed assembly of fixed-rate waveform windows.
//!
//! The crate provides sample-accurate trimming and merging of time-anchored
//! sample series, a cache assembler that reconstructs arbitrary time windows
//! from persisted segments plus an external fetch service, and a min/max
//! reducer for display consumers.

pub mod cache;
pub mod core;
pub mod display;
pub mod error;
pub mod telemetry;

pub use cache::{
    AssemblerConfig, CacheAssembler, FetchService, FsSegmentStore, MemorySegmentStore,
    SegmentDescriptor, SegmentStore,
};
pub use core::{ChannelId, Dtype, SampleData, SampleSeries, TimeWindow, TrimPoint};
pub use display::{MinMaxConfig, prepare_window, reduce_to_pixels};
pub use error::{WaveError, WaveResult};
