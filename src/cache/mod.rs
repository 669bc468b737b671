pub mod assembler;
pub mod fs_store;
pub mod memory;
pub mod store;

pub use assembler::{AssemblerConfig, CacheAssembler};
pub use fs_store::FsSegmentStore;
pub use memory::MemorySegmentStore;
pub use store::{FetchService, SegmentDescriptor, SegmentStore};
