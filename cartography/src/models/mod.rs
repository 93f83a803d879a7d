mod edge;
mod graph;
mod profile;
mod record;

pub use edge::*;
pub use graph::*;
pub use profile::*;
pub use record::*;
