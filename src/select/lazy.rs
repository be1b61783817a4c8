//! Lazy two-branch selection over deferred values.
//!
//! [`ternary_lazy`] and [`ternary_concurrent`] return a deferred value that,
//! once forced, evaluates the condition and then exactly one branch. The
//! other branch is never evaluated by the selector.

use crate::control::{ConcurrentLazy, Deferred, Lazy};

/// Evaluates `condition`, then only the branch it selects.
fn select_branch<T, C, A, B>(condition: &C, value1: &A, value2: &B) -> T
where
    C: Deferred<Output = bool>,
    A: Deferred<Output = T>,
    B: Deferred<Output = T>,
{
    if condition.evaluate() {
        tracing::trace!(branch = "value1", "lazy ternary selected branch");
        value1.evaluate()
    } else {
        tracing::trace!(branch = "value2", "lazy ternary selected branch");
        value2.evaluate()
    }
}

/// Selects between two deferred values based on a deferred condition.
///
/// Returns immediately with an unevaluated [`Lazy`]; none of the three
/// arguments is evaluated by this call. Forcing the result:
///
/// 1. evaluates `condition`;
/// 2. if it is true, evaluates `value1` and returns its value, otherwise
///    evaluates `value2` and returns its value.
///
/// The branch that is not chosen is never evaluated by the selector, and the
/// result is memoized like any other `Lazy`.
///
/// The arguments are moved into the result. Pass `&lazy`, `Rc<Lazy<..>>`, or
/// any other [`Deferred`] handle to keep access to a branch: forcing the
/// untaken branch later through such a handle evaluates it independently.
///
/// # Panics
///
/// Forcing the result panics if the condition or the chosen branch panics
/// or is poisoned. The result is then poisoned too.
///
/// # Examples
///
/// ```rust
/// use ternary::control::Lazy;
/// use ternary::select::ternary_lazy;
/// use std::cell::Cell;
///
/// let expensive_called = Cell::new(false);
/// let condition = Lazy::new(|| 2 + 2 == 4);
/// let cheap = Lazy::new(|| "cheap");
/// let expensive = Lazy::new(|| {
///     expensive_called.set(true);
///     "expensive"
/// });
///
/// let chosen = ternary_lazy(&condition, &cheap, &expensive);
/// assert!(!condition.is_evaluated());
///
/// assert_eq!(*chosen.force(), "cheap");
/// assert!(!expensive_called.get());
/// ```
pub fn ternary_lazy<T, C, A, B>(condition: C, value1: A, value2: B) -> Lazy<T, impl FnOnce() -> T>
where
    C: Deferred<Output = bool>,
    A: Deferred<Output = T>,
    B: Deferred<Output = T>,
{
    Lazy::new(move || select_branch(&condition, &value1, &value2))
}

/// Thread-safe form of [`ternary_lazy`].
///
/// The result is a [`ConcurrentLazy`], so it can be shared between threads;
/// the condition and the chosen branch are evaluated exactly once no matter
/// how many threads force it.
///
/// # Examples
///
/// ```rust
/// use ternary::control::ConcurrentLazy;
/// use ternary::select::ternary_concurrent;
/// use std::sync::Arc;
/// use std::thread;
///
/// let chosen = Arc::new(ternary_concurrent(
///     ConcurrentLazy::new(|| false),
///     ConcurrentLazy::new(|| 1),
///     ConcurrentLazy::new(|| 2),
/// ));
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let chosen = Arc::clone(&chosen);
///         thread::spawn(move || *chosen.force())
///     })
///     .collect();
///
/// for handle in handles {
///     assert_eq!(handle.join().unwrap(), 2);
/// }
/// ```
pub fn ternary_concurrent<T, C, A, B>(
    condition: C,
    value1: A,
    value2: B,
) -> ConcurrentLazy<T, impl FnOnce() -> T + Send>
where
    C: Deferred<Output = bool> + Send,
    A: Deferred<Output = T> + Send,
    B: Deferred<Output = T> + Send,
{
    ConcurrentLazy::new(move || select_branch(&condition, &value1, &value2))
}
