#![forbid(unsafe_code)]

//! Trace events for component state transitions.
//!
//! Overlay install/show/dismiss, the session sync outcome, reveal hits and
//! swallowed storage errors are emitted through the macros here. With the
//! `tracing` feature they are `tracing`'s own; without it they expand to
//! nothing, so call sites (`crate::debug!`, `crate::debug_span!`, ...) stay
//! identical either way. Events go to whatever subscriber the embedder
//! installs and never reach the visitor.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, info, trace, warn};

#[cfg(not(feature = "tracing"))]
mod disabled {
    /// Expands to nothing; enable `tracing` to record transitions.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Evaluates to a [`crate::logging::NoopSpan`] so `span.enter()` still
    /// type-checks.
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// Expands to nothing. Used for the boot summary.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// Expands to nothing. Used per revealed element.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// Expands to nothing. Used when a storage error is swallowed.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}

/// Stand-in for a `tracing::Span` around `Page::boot`, session sync and
/// overlay show.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }
}

#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct NoopGuard;
