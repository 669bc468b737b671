pub mod merge;
pub mod series;
pub mod trim;
pub mod types;

pub use series::{SampleData, SampleSeries};
pub use types::{ChannelId, Dtype, TimeWindow, TrimPoint, datetime_to_unix_seconds, sample_delta};
