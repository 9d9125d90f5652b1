// Route planning algorithms module

pub mod nudge;
pub mod grid_a_star;
pub mod steering;
pub mod simplify;

pub use nudge::*;
pub use grid_a_star::*;
pub use steering::*;
pub use simplify::*;
