//! Deferred values.
//!
//! This module provides the memoized deferred values that the lazy
//! selectors in [`select`](crate::select) are built on:
//!
//! - [`Lazy`]: single-threaded deferred value with memoization
//! - [`ConcurrentLazy`]: thread-safe deferred value with memoization
//! - [`Deferred`]: the "force it and give me the value" trait implemented by
//!   both, and by the shared handles wrapping them
//!
//! Every deferred value moves from *unevaluated* to *evaluated* on its first
//! force and stays there. A computation that panics leaves the value
//! *poisoned* instead; it is never retried.
//!
//! # Examples
//!
//! ```rust
//! use ternary::control::Lazy;
//!
//! let lazy = Lazy::new(|| {
//!     println!("Computing...");
//!     42
//! });
//! // "Computing..." is not printed yet
//!
//! let value = lazy.force();
//! // Now "Computing..." is printed and value is 42
//! assert_eq!(*value, 42);
//! ```

mod concurrent_lazy;
mod deferred;
mod lazy;

pub use concurrent_lazy::{ConcurrentLazy, ConcurrentLazyPoisonedError};
pub use deferred::Deferred;
pub use lazy::{Lazy, LazyPoisonedError, LazyState};
