//! Eager two-branch selection.

/// Returns `value1` if `condition` is true, otherwise `value2`.
///
/// Both values are already evaluated by the caller; nothing is deferred.
/// Use [`ternary_lazy`](super::ternary_lazy) when a branch is expensive or
/// has side effects that must only happen when it is chosen.
///
/// # Examples
///
/// ```rust
/// use ternary::select::ternary;
///
/// assert_eq!(ternary(true, 10, 20), 10);
/// assert_eq!(ternary(false, 10, 20), 20);
/// assert_eq!(ternary(true, "yes", "no"), "yes");
/// ```
#[inline]
pub fn ternary<T>(condition: bool, value1: T, value2: T) -> T {
    if condition { value1 } else { value2 }
}

/// Method form of [`ternary`] on `bool`.
///
/// # Examples
///
/// ```rust
/// use ternary::select::Select;
///
/// let count = 1;
/// assert_eq!((count == 1).select("item", "items"), "item");
/// ```
pub trait Select {
    /// Returns `value1` if `self` is true, otherwise `value2`.
    fn select<T>(self, value1: T, value2: T) -> T;
}

impl Select for bool {
    #[inline]
    fn select<T>(self, value1: T, value2: T) -> T {
        ternary(self, value1, value2)
    }
}
