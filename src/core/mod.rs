/*!
 * Core Module
 * Errors, limits and small shared helpers
 */

pub mod cancel;
pub mod errors;
pub mod limits;
pub mod serde;
pub mod time;

// Re-export for convenience
pub use cancel::{CancelToken, PassGuard};
pub use errors::*;
pub use time::{duration_ms, now_ms};
