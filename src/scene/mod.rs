//! Scene adapter: the structure's solids and the obstacles derived from them

pub mod graph;
pub mod obstacles;

pub use graph::*;
pub use obstacles::*;
