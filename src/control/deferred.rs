//! The `Deferred` trait: a handle whose value is produced on request.
//!
//! Every memoized value in this crate implements `Deferred`, and so do the
//! usual ways of sharing one (`&D`, `Box<D>`, `Rc<D>`, `Arc<D>`). Code that
//! only needs "give me the value now" should be generic over `Deferred`
//! rather than over a concrete lazy type.
//!
//! # Examples
//!
//! ```rust
//! use ternary::control::{Deferred, Lazy};
//! use std::rc::Rc;
//!
//! fn twice<D: Deferred<Output = i32>>(deferred: &D) -> i32 {
//!     deferred.evaluate() * 2
//! }
//!
//! let shared = Rc::new(Lazy::new(|| 21));
//! let handle = Rc::clone(&shared);
//!
//! assert_eq!(twice(&handle), 42);
//! assert!(shared.is_evaluated());
//! ```

use std::rc::Rc;
use std::sync::Arc;

use super::{ConcurrentLazy, Lazy};

/// A value whose computation runs when it is requested.
///
/// `evaluate` forces the underlying computation (memoizing it if the
/// implementor memoizes) and returns an owned copy of the result.
pub trait Deferred {
    /// The type of the produced value.
    type Output;

    /// Forces the value and returns it.
    ///
    /// # Panics
    ///
    /// Implementations propagate panics raised by the computation and
    /// panic when the underlying value is poisoned.
    fn evaluate(&self) -> Self::Output;
}

impl<T: Clone, F: FnOnce() -> T> Deferred for Lazy<T, F> {
    type Output = T;

    #[inline]
    fn evaluate(&self) -> T {
        self.force().clone()
    }
}

impl<T: Clone, F: FnOnce() -> T> Deferred for ConcurrentLazy<T, F> {
    type Output = T;

    #[inline]
    fn evaluate(&self) -> T {
        self.force().clone()
    }
}

impl<D: Deferred + ?Sized> Deferred for &D {
    type Output = D::Output;

    #[inline]
    fn evaluate(&self) -> Self::Output {
        (**self).evaluate()
    }
}

impl<D: Deferred + ?Sized> Deferred for Box<D> {
    type Output = D::Output;

    #[inline]
    fn evaluate(&self) -> Self::Output {
        (**self).evaluate()
    }
}

impl<D: Deferred + ?Sized> Deferred for Rc<D> {
    type Output = D::Output;

    #[inline]
    fn evaluate(&self) -> Self::Output {
        (**self).evaluate()
    }
}

impl<D: Deferred + ?Sized> Deferred for Arc<D> {
    type Output = D::Output;

    #[inline]
    fn evaluate(&self) -> Self::Output {
        (**self).evaluate()
    }
}
