pub mod minmax;

pub use minmax::{MIN_VISIBLE_VALUE, MinMaxConfig, prepare_window, reduce_to_pixels};
