pub use error::AppError;

/// Main architecture layers (dependency flow: CLI → Core → Query/API)
pub mod cli; // Command-line interface
pub mod core; // Sessions, permissions, state mapping and services
pub mod query; // Query builder
pub mod storage; // Configuration persistence

/// Support modules (used across layers)
pub mod api; // Church management REST client
pub mod display; // Output formatting
pub mod error; // Error handling
pub mod utils; // Shared utilities and helpers

pub type Result<T> = std::result::Result<T, AppError>;
