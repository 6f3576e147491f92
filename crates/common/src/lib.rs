//! ScholarFlow Common Library
//!
//! Shared code for the ScholarFlow services including:
//! - Error types and handling
//! - Configuration management
//! - Role/session context extraction
//! - Metrics and observability
//! - Navigation menu trees

pub mod auth;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod nav;

// Re-export commonly used types
pub use auth::{Role, RoleContext};
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use nav::{MenuBuilder, MenuNode};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default currency for publication fees
pub const DEFAULT_CURRENCY: &str = "USD";
