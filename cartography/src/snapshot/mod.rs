pub mod context;
pub mod engine;
pub mod model;
mod projection;

pub use context::GraphContext;
pub use engine::{normalize_value, SnapshotEngine};
pub use model::{Snapshot, SnapshotEdge, SnapshotNode};
