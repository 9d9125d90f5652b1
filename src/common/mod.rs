//! Common types, traits, and error definitions for ship_routing
//!
//! This module provides the geometric building blocks shared by the
//! planners, the simplifier, and the scene adapter.

pub mod types;
pub mod aabb;
pub mod traits;
pub mod error;

pub use types::*;
pub use aabb::*;
pub use traits::*;
pub use error::*;
