pub mod assembler;
pub mod relevance;

pub use assembler::assemble;
pub use relevance::{filter, rank_by_weakest_link, score, weakest_link};
