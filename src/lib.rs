//! # ternary
//!
//! Conditional selection for Rust, over plain values and over memoized
//! deferred values.
//!
//! ## Overview
//!
//! - **Selection**: [`ternary`](select::ternary) picks one of two values,
//!   [`ternary_lazy`](select::ternary_lazy) picks one of two deferred values
//!   and only ever evaluates the chosen one.
//! - **Deferred values**: [`Lazy`](control::Lazy) and
//!   [`ConcurrentLazy`](control::ConcurrentLazy) run a computation on first
//!   access and cache the result.
//!
//! ## Feature Flags
//!
//! - `control`: Deferred values (`Lazy`, `ConcurrentLazy`, `Deferred`)
//! - `select`: Conditional selectors (implies `control`, enabled by default)
//! - `full`: Enable all features
//!
//! ## Logging
//!
//! Evaluation and branch selection emit `tracing` events at `trace` level,
//! poisoning emits a `warn` event. Install any `tracing` subscriber to see
//! them.
//!
//! ## Example
//!
//! ```rust
//! use ternary::prelude::*;
//!
//! let result = ternary_lazy(
//!     Lazy::new(|| true),
//!     Lazy::new(|| "branch1"),
//!     Lazy::new(|| "branch2"),
//! );
//! assert_eq!(*result.force(), "branch1");
//! assert_eq!(ternary(false, 10, 20), 20);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use ternary::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "control")]
    pub use crate::control::*;

    #[cfg(feature = "select")]
    pub use crate::select::*;
}

#[cfg(feature = "control")]
pub mod control;

#[cfg(feature = "select")]
pub mod select;
