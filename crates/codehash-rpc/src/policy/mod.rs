//! Reliability policies applied by the HTTP transport.
//!
//! ```text
//! Request → [RateLimiter] → [RetryPolicy] → HTTP
//! ```

pub mod rate_limiter;
pub mod retry;

pub use rate_limiter::{RateLimiter, RateLimiterConfig};
pub use retry::{retry_with, RetryConfig, RetryPolicy};
