//! Storage-side building blocks shared by the service and adapters

pub mod memory;
pub mod streaming;

pub use memory::InMemoryObjectStore;
pub use streaming::{AudioStream, StreamingReader};
