//! Error types for ship_routing

use thiserror::Error;

/// Main error type for route planning
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Search or steering exhausted without reaching the goal
    #[error("No path found")]
    NoPathFound,
    /// Degenerate or out-of-range query
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The caller cancelled the search between node expansions
    #[error("Planning cancelled")]
    Cancelled,
    /// Configuration could not be parsed or serialized
    #[error("Configuration error: {0}")]
    Config(String),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for routing operations
pub type RoutingResult<T> = Result<T, RoutingError>;
