//! Conditional selection, the expression form of `if`/`else`.
//!
//! - [`ternary`] and [`Select`]: choose between two values that are already
//!   evaluated.
//! - [`ternary_lazy`]: choose between two [`Deferred`](crate::control::Deferred)
//!   values, evaluating only the chosen one when the result is forced.
//! - [`ternary_concurrent`]: the same, producing a thread-safe result.
//!
//! # Examples
//!
//! ```rust
//! use ternary::control::Lazy;
//! use ternary::select::{ternary, ternary_lazy};
//!
//! assert_eq!(ternary(true, 10, 20), 10);
//!
//! let result = ternary_lazy(
//!     Lazy::new(|| false),
//!     Lazy::new(|| -> i32 { unreachable!("not chosen") }),
//!     Lazy::new(|| 20),
//! );
//! assert_eq!(*result.force(), 20);
//! ```

mod eager;
mod lazy;

pub use eager::{Select, ternary};
pub use lazy::{ternary_concurrent, ternary_lazy};
