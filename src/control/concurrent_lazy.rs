//! Thread-safe deferred values with memoization.
//!
//! This module provides the `ConcurrentLazy<T, F>` type. It has the same
//! contract as [`Lazy`](super::Lazy), and additionally keeps the
//! "computation runs at most once" guarantee when many threads force the
//! same instance at the same time.
//!
//! # Poisoning
//!
//! If the computation panics, the instance becomes **poisoned**:
//!
//! - the panic is re-raised to the thread that ran the computation;
//! - threads that were waiting for the value panic as well;
//! - every later `force()` panics and `try_force()` returns
//!   [`ConcurrentLazyPoisonedError`].
//!
//! The computation is never retried.
//!
//! # Re-entry
//!
//! Forcing an instance from inside its own computation is a programming
//! error. It blocks or panics; it never recomputes.
//!
//! # Examples
//!
//! ```rust
//! use ternary::control::ConcurrentLazy;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let lazy = Arc::new(ConcurrentLazy::new(|| {
//!     println!("Computing...");
//!     42
//! }));
//!
//! let handles: Vec<_> = (0..10).map(|_| {
//!     let lazy = Arc::clone(&lazy);
//!     thread::spawn(move || *lazy.force())
//! }).collect();
//!
//! // All threads get the same value, and the computation ran once
//! for handle in handles {
//!     assert_eq!(handle.join().unwrap(), 42);
//! }
//! ```

use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use static_assertions::assert_impl_all;

const POISONED_MESSAGE: &str = "ConcurrentLazy instance has been poisoned";

/// Error returned when a poisoned [`ConcurrentLazy`] is accessed through a
/// fallible method.
///
/// Note: [`ConcurrentLazy::force`] panics instead of returning this error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("ConcurrentLazy: computation panicked, value is poisoned")]
pub struct ConcurrentLazyPoisonedError;

/// A thread-safe deferred value with memoization.
///
/// `ConcurrentLazy<T, F>` defers computation until the value is first
/// accessed via [`force`](ConcurrentLazy::force). If several threads force
/// it concurrently, exactly one of them runs the computation and the others
/// block until the value is available.
///
/// # Thread Safety
///
/// `ConcurrentLazy<T, F>` is `Send` and `Sync` when `T: Send + Sync` and
/// `F: Send`. After evaluation, reading the value does not take a lock.
///
/// # Examples
///
/// ```rust
/// use ternary::control::ConcurrentLazy;
///
/// let lazy = ConcurrentLazy::new(|| 6 * 7);
/// assert!(!lazy.is_evaluated());
/// assert_eq!(*lazy.force(), 42);
/// assert!(lazy.is_evaluated());
/// ```
pub struct ConcurrentLazy<T, F = fn() -> T> {
    value: OnceLock<T>,
    initializer: Mutex<Option<F>>,
    poisoned: AtomicBool,
}

assert_impl_all!(ConcurrentLazy<i32>: Send, Sync);
assert_impl_all!(ConcurrentLazy<String, Box<dyn FnOnce() -> String + Send>>: Send, Sync);

/// Marks the owning instance as poisoned unless disarmed before it drops.
struct PoisonOnUnwind<'a> {
    poisoned: &'a AtomicBool,
}

impl Drop for PoisonOnUnwind<'_> {
    fn drop(&mut self) {
        self.poisoned.store(true, Ordering::Release);
        tracing::warn!("ConcurrentLazy computation panicked, instance is poisoned");
    }
}

/// Runs a computation, emitting the evaluation event first.
fn run_traced<T>(initializer: impl FnOnce() -> T) -> T {
    tracing::trace!(
        value_type = std::any::type_name::<T>(),
        "evaluating ConcurrentLazy"
    );
    initializer()
}

impl<T, F: FnOnce() -> T> ConcurrentLazy<T, F> {
    /// Creates a new thread-safe deferred value with the given computation.
    ///
    /// The computation will not be called until `force()` is invoked.
    #[inline]
    pub fn new(initializer: F) -> Self {
        Self {
            value: OnceLock::new(),
            initializer: Mutex::new(Some(initializer)),
            poisoned: AtomicBool::new(false),
        }
    }

    /// Forces evaluation and returns a reference to the value.
    ///
    /// The first caller runs the computation. Concurrent callers block
    /// until it finishes and then observe the same value.
    ///
    /// # Panics
    ///
    /// - If the computation panics (the instance becomes poisoned).
    /// - If the instance is already poisoned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ternary::control::ConcurrentLazy;
    ///
    /// let lazy = ConcurrentLazy::new(|| 42);
    /// assert_eq!(*lazy.force(), 42);
    /// ```
    pub fn force(&self) -> &T {
        if let Some(value) = self.value.get() {
            return value;
        }
        self.value.get_or_init(|| self.run_initializer())
    }

    /// Forces evaluation, reporting a poisoned instance as an error.
    ///
    /// # Errors
    ///
    /// Returns `Err(ConcurrentLazyPoisonedError)` if the computation
    /// previously panicked.
    ///
    /// # Panics
    ///
    /// A panic raised by the computation itself is not caught. A thread
    /// that is blocked waiting on a computation which then panics also
    /// panics.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ternary::control::ConcurrentLazy;
    /// use std::panic::catch_unwind;
    ///
    /// let lazy = ConcurrentLazy::new(|| 42);
    /// assert_eq!(lazy.try_force().copied(), Ok(42));
    ///
    /// let poisoned = ConcurrentLazy::new(|| -> i32 { panic!("init failed") });
    /// let _ = catch_unwind(std::panic::AssertUnwindSafe(|| poisoned.force()));
    /// assert!(poisoned.try_force().is_err());
    /// ```
    pub fn try_force(&self) -> Result<&T, ConcurrentLazyPoisonedError> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        if self.is_poisoned() {
            tracing::debug!("access to poisoned ConcurrentLazy");
            return Err(ConcurrentLazyPoisonedError);
        }
        Ok(self.force())
    }

    /// Takes the computation out of its slot and runs it.
    ///
    /// Only ever called from inside `OnceLock::get_or_init`, so at most one
    /// thread is here at a time.
    fn run_initializer(&self) -> T {
        let Some(initializer) = self.initializer.lock().take() else {
            panic!("{POISONED_MESSAGE}");
        };

        let guard = PoisonOnUnwind {
            poisoned: &self.poisoned,
        };
        let value = run_traced(initializer);
        std::mem::forget(guard);
        value
    }

    /// Consumes the `ConcurrentLazy` and returns the inner value, forcing it
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns `Err(ConcurrentLazyPoisonedError)` if the instance is poisoned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ternary::control::ConcurrentLazy;
    ///
    /// let lazy = ConcurrentLazy::new(|| 42);
    /// assert_eq!(lazy.into_inner(), Ok(42));
    /// ```
    pub fn into_inner(self) -> Result<T, ConcurrentLazyPoisonedError> {
        let Self {
            value, initializer, ..
        } = self;

        if let Some(value) = value.into_inner() {
            return Ok(value);
        }
        initializer
            .into_inner()
            .map(run_traced)
            .ok_or(ConcurrentLazyPoisonedError)
    }

    /// Applies a function to the deferred value, producing a new deferred value.
    ///
    /// # Panics
    ///
    /// The returned value panics when forced if `self` is poisoned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ternary::control::ConcurrentLazy;
    ///
    /// let doubled = ConcurrentLazy::new(|| 21).map(|x| x * 2);
    /// assert_eq!(*doubled.force(), 42);
    /// ```
    pub fn map<U, G>(self, function: G) -> ConcurrentLazy<U, impl FnOnce() -> U>
    where
        G: FnOnce(T) -> U,
    {
        ConcurrentLazy::new(move || match self.into_inner() {
            Ok(value) => function(value),
            Err(_) => panic!("{POISONED_MESSAGE}"),
        })
    }
}

impl<T> ConcurrentLazy<T, fn() -> T> {
    /// Creates a deferred value that is already evaluated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ternary::control::ConcurrentLazy;
    ///
    /// let lazy = ConcurrentLazy::new_with_value(42);
    /// assert!(lazy.is_evaluated());
    /// ```
    #[inline]
    pub fn new_with_value(value: T) -> Self {
        Self {
            value: OnceLock::from(value),
            initializer: Mutex::new(None),
            poisoned: AtomicBool::new(false),
        }
    }

    /// Lifts a value into `ConcurrentLazy`. Alias for
    /// [`new_with_value`](ConcurrentLazy::new_with_value).
    #[inline]
    pub fn pure(value: T) -> Self {
        Self::new_with_value(value)
    }
}

impl<T, F> ConcurrentLazy<T, F> {
    /// Returns a reference to the value if it has been evaluated.
    ///
    /// Unlike `force()`, this method never runs the computation.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Returns whether the computation has run successfully.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.value.get().is_some()
    }

    /// Returns whether the computation panicked.
    #[inline]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }
}

impl<T: Default> Default for ConcurrentLazy<T> {
    fn default() -> Self {
        Self::new(T::default)
    }
}

impl<T: fmt::Debug, F> fmt::Debug for ConcurrentLazy<T, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => fmt::Debug::fmt(value, formatter),
            None if self.is_poisoned() => formatter.write_str("<poisoned>"),
            None => formatter.write_str("<unevaluated>"),
        }
    }
}

impl<T: fmt::Display, F> fmt::Display for ConcurrentLazy<T, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => fmt::Display::fmt(value, formatter),
            None if self.is_poisoned() => formatter.write_str("<poisoned>"),
            None => formatter.write_str("<unevaluated>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::thread;

    #[rstest]
    fn test_display_unevaluated() {
        let lazy = ConcurrentLazy::new(|| 42);
        assert_eq!(format!("{lazy}"), "<unevaluated>");
    }

    #[rstest]
    fn test_display_evaluated() {
        let lazy = ConcurrentLazy::new(|| 42);
        let _ = lazy.force();
        assert_eq!(format!("{lazy}"), "42");
    }

    #[rstest]
    fn test_display_poisoned() {
        let lazy = ConcurrentLazy::new(|| -> i32 { panic!("initialization failed") });
        let _ = catch_unwind(AssertUnwindSafe(|| lazy.force()));
        assert_eq!(format!("{lazy}"), "<poisoned>");
        assert_eq!(format!("{lazy:?}"), "<poisoned>");
    }

    #[rstest]
    fn test_poison_is_terminal() {
        let counter = AtomicUsize::new(0);
        let lazy = ConcurrentLazy::new(|| -> i32 {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
            panic!("boom")
        });

        assert!(catch_unwind(AssertUnwindSafe(|| lazy.force())).is_err());
        assert!(catch_unwind(AssertUnwindSafe(|| lazy.force())).is_err());
        assert_eq!(lazy.try_force(), Err(ConcurrentLazyPoisonedError));
        assert!(lazy.is_poisoned());
        assert!(!lazy.is_evaluated());
        assert_eq!(counter.load(AtomicOrdering::SeqCst), 1);
    }

    #[rstest]
    fn test_into_inner_poisoned() {
        let lazy = ConcurrentLazy::new(|| -> i32 { panic!("initialization failed") });
        let _ = catch_unwind(AssertUnwindSafe(|| lazy.force()));
        assert_eq!(lazy.into_inner(), Err(ConcurrentLazyPoisonedError));
    }

    #[rstest]
    fn test_into_inner_after_force() {
        let lazy = ConcurrentLazy::new(|| String::from("ready"));
        let _ = lazy.force();
        assert_eq!(lazy.into_inner(), Ok(String::from("ready")));
    }

    #[rstest]
    fn test_evaluated_exactly_once_across_threads() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        let lazy = Arc::new(ConcurrentLazy::new(move || {
            counter_clone.fetch_add(1, AtomicOrdering::SeqCst);
            42
        }));

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let lazy = Arc::clone(&lazy);
                thread::spawn(move || *lazy.force())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 42);
        }
        assert_eq!(counter.load(AtomicOrdering::SeqCst), 1);
    }

    #[rstest]
    fn test_drop_evaluated_value() {
        struct DropTracker {
            dropped: Arc<AtomicUsize>,
        }
        impl Drop for DropTracker {
            fn drop(&mut self) {
                self.dropped.fetch_add(1, AtomicOrdering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicUsize::new(0));
        let dropped_clone = Arc::clone(&dropped);
        let lazy = ConcurrentLazy::new(move || DropTracker {
            dropped: dropped_clone,
        });
        let _ = lazy.force();
        assert_eq!(dropped.load(AtomicOrdering::SeqCst), 0);

        drop(lazy);
        assert_eq!(dropped.load(AtomicOrdering::SeqCst), 1);
    }
}
