mod model;
mod persist;

pub use model::{Bubble, BubbleGraph, Link, LinkError};
#[cfg(test)]
pub(crate) use persist::memory::MemoryStore;
pub use persist::{JsonFileStore, SnapshotError, SnapshotStore, load_or_default};
