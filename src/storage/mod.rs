//! In-memory sample storage.

pub mod buffer;
pub mod model;

pub use buffer::SampleBuffer;
pub use model::Sample;
