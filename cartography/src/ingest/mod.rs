pub mod assembler;
pub mod extract;

pub use assembler::{connection_ids, ConnectionLookup, UserAssembler, UserOutcome};
pub use extract::{extract, extract_followers, extract_profile};
