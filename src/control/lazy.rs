//! Single-threaded deferred values with memoization.
//!
//! This module provides the `Lazy<T, F>` type. A `Lazy` holds a
//! zero-argument computation, runs it the first time the value is
//! requested, and hands out the cached result on every later request.
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
//!
//! // No output yet - computation is deferred
//! println!("Created lazy value");
//!
//! // Now "Computing..." is printed
//! let value = lazy.force();
//! assert_eq!(*value, 42);
//!
//! // No recomputation - result is memoized
//! let value2 = lazy.force();
//! assert_eq!(*value2, 42);
//! ```

use std::cell::{Ref, RefCell};
use std::fmt;

use static_assertions::assert_not_impl_any;

const POISONED_MESSAGE: &str = "Lazy instance has been poisoned";

/// Error returned when a poisoned [`Lazy`] is accessed through a fallible method.
///
/// A `Lazy` becomes poisoned when its computation panics. The computation
/// is never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Lazy: computation panicked, value is poisoned")]
pub struct LazyPoisonedError;

/// The internal state of a `Lazy` value.
#[derive(Debug)]
pub enum LazyState<T, F> {
    /// The computation has not run yet.
    Unevaluated(F),
    /// The computation ran and produced this value. Terminal.
    Evaluated(T),
    /// The computation panicked. Terminal.
    Poisoned,
}

/// A deferred value with memoization.
///
/// `Lazy<T, F>` defers computation until the value is first accessed via
/// [`force`](Lazy::force). Once computed, the value is cached and every
/// subsequent `force()` returns it without running the computation again.
///
/// # Type Parameters
///
/// * `T` - The type of the computed value
/// * `F` - The type of the computation (defaults to `fn() -> T`)
///
/// # Thread Safety
///
/// This type is NOT thread-safe and is never `Sync`. For concurrent access
/// use [`ConcurrentLazy`](super::ConcurrentLazy).
///
/// # Examples
///
/// ```rust
/// use ternary::control::Lazy;
/// use std::cell::Cell;
///
/// let call_count = Cell::new(0);
/// let lazy = Lazy::new(|| {
///     call_count.set(call_count.get() + 1);
///     42
/// });
///
/// assert_eq!(call_count.get(), 0); // Not called yet
///
/// let _ = lazy.force();
/// assert_eq!(call_count.get(), 1); // Called once
///
/// let _ = lazy.force();
/// assert_eq!(call_count.get(), 1); // Still only once - memoized
/// ```
pub struct Lazy<T, F = fn() -> T> {
    state: RefCell<LazyState<T, F>>,
}

assert_not_impl_any!(Lazy<i32>: Sync);

impl<T, F: FnOnce() -> T> Lazy<T, F> {
    /// Creates a new deferred value with the given computation.
    ///
    /// The computation will not be called until `force()` is invoked.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ternary::control::Lazy;
    ///
    /// let lazy = Lazy::new(|| {
    ///     println!("Initializing...");
    ///     42
    /// });
    /// assert!(!lazy.is_evaluated());
    /// ```
    #[inline]
    pub const fn new(initializer: F) -> Self {
        Self {
            state: RefCell::new(LazyState::Unevaluated(initializer)),
        }
    }

    /// Forces evaluation and returns a reference to the value.
    ///
    /// The first call runs the computation and caches its result. Every
    /// later call returns the cached value.
    ///
    /// # Panics
    ///
    /// - If the computation panics. The panic propagates unchanged and the
    ///   instance becomes poisoned.
    /// - If the instance is already poisoned.
    /// - If called re-entrantly from inside its own computation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ternary::control::Lazy;
    ///
    /// let lazy = Lazy::new(|| 42);
    /// assert_eq!(*lazy.force(), 42);
    /// ```
    pub fn force(&self) -> Ref<'_, T> {
        match self.try_force() {
            Ok(value) => value,
            Err(_) => panic!("{POISONED_MESSAGE}"),
        }
    }

    /// Forces evaluation, reporting a poisoned instance as an error.
    ///
    /// # Errors
    ///
    /// Returns `Err(LazyPoisonedError)` if a previous computation panicked.
    ///
    /// # Panics
    ///
    /// A panic raised by the computation itself is not caught; it
    /// propagates and poisons the instance.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ternary::control::{Lazy, LazyPoisonedError};
    /// use std::panic::{AssertUnwindSafe, catch_unwind};
    ///
    /// let lazy = Lazy::new(|| -> i32 { panic!("boom") });
    /// let _ = catch_unwind(AssertUnwindSafe(|| lazy.force()));
    ///
    /// assert_eq!(lazy.try_force().err(), Some(LazyPoisonedError));
    /// ```
    pub fn try_force(&self) -> Result<Ref<'_, T>, LazyPoisonedError> {
        let needs_evaluation = match &*self.state.borrow() {
            LazyState::Evaluated(_) => false,
            LazyState::Unevaluated(_) => true,
            LazyState::Poisoned => {
                tracing::debug!("access to poisoned Lazy");
                return Err(LazyPoisonedError);
            }
        };

        if needs_evaluation {
            self.evaluate_once();
        }

        Ok(Ref::map(self.state.borrow(), |state| match state {
            LazyState::Evaluated(value) => value,
            _ => unreachable!("Lazy is evaluated at this point"),
        }))
    }

    /// Runs the computation and stores its result.
    ///
    /// The state is switched to `Poisoned` before the computation runs, so
    /// a panic leaves it there.
    fn evaluate_once(&self) {
        let mut state = self.state.borrow_mut();

        let LazyState::Unevaluated(initializer) =
            std::mem::replace(&mut *state, LazyState::Poisoned)
        else {
            unreachable!("evaluate_once is only reached from the Unevaluated state")
        };

        *state = LazyState::Evaluated(run_traced(initializer));
    }

    /// Consumes the `Lazy` and returns the inner value, forcing it if needed.
    ///
    /// # Errors
    ///
    /// Returns `Err(LazyPoisonedError)` if the instance is poisoned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ternary::control::Lazy;
    ///
    /// assert_eq!(Lazy::new(|| 42).into_inner(), Ok(42));
    /// assert_eq!(Lazy::new_with_value(7).into_inner(), Ok(7));
    /// ```
    pub fn into_inner(self) -> Result<T, LazyPoisonedError> {
        match self.state.into_inner() {
            LazyState::Evaluated(value) => Ok(value),
            LazyState::Unevaluated(initializer) => Ok(run_traced(initializer)),
            LazyState::Poisoned => Err(LazyPoisonedError),
        }
    }

    /// Applies a function to the deferred value, producing a new deferred value.
    ///
    /// Nothing runs when `map` is called. Forcing the result forces `self`
    /// and then applies `function`.
    ///
    /// # Panics
    ///
    /// The returned value panics when forced if `self` is poisoned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ternary::control::Lazy;
    ///
    /// let doubled = Lazy::new(|| 21).map(|x| x * 2);
    /// assert_eq!(*doubled.force(), 42);
    /// ```
    pub fn map<U, G>(self, function: G) -> Lazy<U, impl FnOnce() -> U>
    where
        G: FnOnce(T) -> U,
    {
        Lazy::new(move || match self.into_inner() {
            Ok(value) => function(value),
            Err(_) => panic!("{POISONED_MESSAGE}"),
        })
    }
}

/// Runs a computation, emitting the evaluation event first.
fn run_traced<T>(initializer: impl FnOnce() -> T) -> T {
    tracing::trace!(value_type = std::any::type_name::<T>(), "evaluating Lazy");
    initializer()
}

impl<T> Lazy<T, fn() -> T> {
    /// Creates a deferred value that is already evaluated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ternary::control::Lazy;
    ///
    /// let lazy = Lazy::new_with_value(42);
    /// assert!(lazy.is_evaluated());
    /// ```
    #[inline]
    pub const fn new_with_value(value: T) -> Self {
        Self {
            state: RefCell::new(LazyState::Evaluated(value)),
        }
    }

    /// Lifts a value into `Lazy`. Alias for [`new_with_value`](Lazy::new_with_value).
    #[inline]
    pub const fn pure(value: T) -> Self {
        Self::new_with_value(value)
    }
}

impl<T, F> Lazy<T, F> {
    /// Returns a reference to the value if it has been evaluated.
    ///
    /// Unlike `force()`, this method never runs the computation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ternary::control::Lazy;
    ///
    /// let lazy = Lazy::new(|| 42);
    /// assert!(lazy.get().is_none());
    ///
    /// let _ = lazy.force();
    /// assert_eq!(*lazy.get().unwrap(), 42);
    /// ```
    pub fn get(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.state.borrow(), |state| match state {
            LazyState::Evaluated(value) => Some(value),
            _ => None,
        })
        .ok()
    }

    /// Returns whether the computation has run successfully.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        matches!(&*self.state.borrow(), LazyState::Evaluated(_))
    }

    /// Returns whether the computation panicked.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ternary::control::Lazy;
    /// use std::panic::catch_unwind;
    ///
    /// let lazy = Lazy::new(|| -> i32 { panic!("initialization failed") });
    /// let _ = catch_unwind(std::panic::AssertUnwindSafe(|| lazy.force()));
    ///
    /// assert!(lazy.is_poisoned());
    /// ```
    #[inline]
    pub fn is_poisoned(&self) -> bool {
        matches!(&*self.state.borrow(), LazyState::Poisoned)
    }
}

impl<T: Default> Default for Lazy<T> {
    fn default() -> Self {
        Self::new(T::default)
    }
}

impl<T: fmt::Debug, F> fmt::Debug for Lazy<T, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.state.borrow() {
            LazyState::Evaluated(value) => formatter.debug_tuple("Lazy").field(value).finish(),
            LazyState::Unevaluated(_) => formatter
                .debug_tuple("Lazy")
                .field(&format_args!("<unevaluated>"))
                .finish(),
            LazyState::Poisoned => formatter
                .debug_tuple("Lazy")
                .field(&format_args!("<poisoned>"))
                .finish(),
        }
    }
}

impl<T: fmt::Display, F> fmt::Display for Lazy<T, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.state.borrow() {
            LazyState::Evaluated(value) => write!(formatter, "Lazy({value})"),
            LazyState::Unevaluated(_) => formatter.write_str("Lazy(<unevaluated>)"),
            LazyState::Poisoned => formatter.write_str("Lazy(<poisoned>)"),
        }
    }
}

// Deref is not implemented: force() hands out a Ref<'_, T>, which cannot be
// turned into the &T that Deref requires.
