//! Production-friendly observability hooks for provider attempts.
//!
//! ```rust
//! use robserve::{MetricsAttemptHooks, SafeAttemptHooks, TracingAttemptHooks};
//!
//! let _hooks = SafeAttemptHooks::new(TracingAttemptHooks);
//! let _metrics = MetricsAttemptHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsAttemptHooks;
pub use safe_hooks::SafeAttemptHooks;
pub use tracing_hooks::TracingAttemptHooks;

pub mod prelude {
    pub use crate::{MetricsAttemptHooks, SafeAttemptHooks, TracingAttemptHooks};
}

#[cfg(test)]
mod tests;
