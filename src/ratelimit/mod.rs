//! Rate limiting logic and state management.

mod identity;
mod limiter;

pub use identity::{client_identity, DEFAULT_TRUSTED_HEADERS};
pub use limiter::{Decision, RateLimiter};
