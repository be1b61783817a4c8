#![cfg(feature = "select")]
//! Tests for the lazy conditional selectors.
//!
//! Tests cover:
//! - No evaluation at construction time
//! - Only the chosen branch is evaluated
//! - Memoization of the selection result
//! - Sharing branch handles with the caller
//! - Poisoning
//! - The thread-safe selector

use rstest::rstest;
use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use ternary::control::{ConcurrentLazy, Lazy};
use ternary::select::{ternary_concurrent, ternary_lazy};

// =============================================================================
// Branch Selection
// =============================================================================

#[rstest]
#[case::true_condition(true, "branch1", true, false)]
#[case::false_condition(false, "branch2", false, true)]
fn ternary_lazy_evaluates_only_chosen_branch(
    #[case] condition: bool,
    #[case] expected: &str,
    #[case] expect_first: bool,
    #[case] expect_second: bool,
) {
    let evaluated1 = Cell::new(false);
    let evaluated2 = Cell::new(false);

    let value1 = Lazy::new(|| {
        evaluated1.set(true);
        "branch1"
    });
    let value2 = Lazy::new(|| {
        evaluated2.set(true);
        "branch2"
    });

    let result = ternary_lazy(Lazy::new(move || condition), value1, value2);

    assert!(!evaluated1.get());
    assert!(!evaluated2.get());

    assert_eq!(*result.force(), expected);
    assert_eq!(evaluated1.get(), expect_first);
    assert_eq!(evaluated2.get(), expect_second);
}

#[rstest]
fn ternary_lazy_int() {
    let result = ternary_lazy(
        Lazy::new(|| true),
        Lazy::new(|| 100),
        Lazy::new(|| 200),
    );
    assert_eq!(*result.force(), 100);
}

#[rstest]
fn ternary_lazy_construction_evaluates_nothing() {
    let condition_calls = Cell::new(0);
    let condition = Lazy::new(|| {
        condition_calls.set(condition_calls.get() + 1);
        true
    });
    let value1 = Lazy::new(|| 1);
    let value2 = Lazy::new(|| 2);

    let result = ternary_lazy(&condition, &value1, &value2);

    assert_eq!(condition_calls.get(), 0);
    assert!(!condition.is_evaluated());
    assert!(!value1.is_evaluated());
    assert!(!value2.is_evaluated());
    assert!(!result.is_evaluated());
}

// =============================================================================
// Memoization
// =============================================================================

#[rstest]
fn ternary_lazy_multiple_forces_evaluate_once() {
    let condition_calls = Cell::new(0);
    let call_count1 = Cell::new(0);
    let call_count2 = Cell::new(0);

    let result = ternary_lazy(
        Lazy::new(|| {
            condition_calls.set(condition_calls.get() + 1);
            true
        }),
        Lazy::new(|| {
            call_count1.set(call_count1.get() + 1);
            "branch1"
        }),
        Lazy::new(|| {
            call_count2.set(call_count2.get() + 1);
            "branch2"
        }),
    );

    let values = [*result.force(), *result.force(), *result.force()];

    assert_eq!(values, ["branch1"; 3]);
    assert_eq!(condition_calls.get(), 1);
    assert_eq!(call_count1.get(), 1);
    assert_eq!(call_count2.get(), 0);
}

#[rstest]
fn ternary_lazy_reuses_already_evaluated_condition() {
    let condition_calls = Cell::new(0);
    let condition = Lazy::new(|| {
        condition_calls.set(condition_calls.get() + 1);
        false
    });
    assert!(!*condition.force());

    let result = ternary_lazy(&condition, Lazy::new(|| 'a'), Lazy::new(|| 'b'));

    assert_eq!(*result.force(), 'b');
    assert_eq!(condition_calls.get(), 1);
}

// =============================================================================
// Sharing
// =============================================================================

#[rstest]
fn ternary_lazy_untaken_branch_can_be_forced_independently() {
    let evaluated2 = Rc::new(Cell::new(false));
    let flag = Rc::clone(&evaluated2);

    let value1 = Rc::new(Lazy::new(|| "branch1".to_string()));
    let value2 = Rc::new(Lazy::new(move || {
        flag.set(true);
        "branch2".to_string()
    }));

    let result = ternary_lazy(
        Lazy::new(|| true),
        Rc::clone(&value1),
        Rc::clone(&value2),
    );

    assert_eq!(*result.force(), "branch1");
    assert!(value1.is_evaluated());
    assert!(!evaluated2.get());

    assert_eq!(*value2.force(), "branch2");
    assert!(evaluated2.get());
    assert_eq!(*result.force(), "branch1");
}

#[rstest]
fn ternary_lazy_same_branch_shared_by_two_selections() {
    let shared_calls = Cell::new(0);
    let shared = Lazy::new(|| {
        shared_calls.set(shared_calls.get() + 1);
        7
    });

    let first = ternary_lazy(Lazy::new(|| true), &shared, Lazy::new(|| 0));
    let second = ternary_lazy(Lazy::new(|| false), Lazy::new(|| 0), &shared);

    assert_eq!(*first.force(), 7);
    assert_eq!(*second.force(), 7);
    assert_eq!(shared_calls.get(), 1);
}

#[rstest]
fn ternary_lazy_results_compose() {
    let inner = ternary_lazy(Lazy::new(|| false), Lazy::new(|| 1), Lazy::new(|| 2));
    let outer = ternary_lazy(Lazy::new(|| true), inner, Lazy::new(|| 3));

    assert_eq!(*outer.force(), 2);
}

// =============================================================================
// Poisoning
// =============================================================================

#[rstest]
fn ternary_lazy_panicking_condition_evaluates_no_branch() {
    let branch_calls = Cell::new(0);
    let result = ternary_lazy(
        Lazy::new(|| -> bool { panic!("condition failed") }),
        Lazy::new(|| {
            branch_calls.set(branch_calls.get() + 1);
            1
        }),
        Lazy::new(|| {
            branch_calls.set(branch_calls.get() + 1);
            2
        }),
    );

    assert!(catch_unwind(AssertUnwindSafe(|| {
        let _ = result.force();
    }))
    .is_err());

    assert!(result.is_poisoned());
    assert!(result.try_force().is_err());
    assert_eq!(branch_calls.get(), 0);
}

// =============================================================================
// Thread-safe Selector
// =============================================================================

#[rstest]
#[case(true, 1)]
#[case(false, 2)]
fn ternary_concurrent_evaluates_once_across_threads(#[case] condition: bool, #[case] expected: i32) {
    let condition_calls = Arc::new(AtomicUsize::new(0));
    let calls1 = Arc::new(AtomicUsize::new(0));
    let calls2 = Arc::new(AtomicUsize::new(0));

    let result = {
        let condition_calls = Arc::clone(&condition_calls);
        let calls1 = Arc::clone(&calls1);
        let calls2 = Arc::clone(&calls2);
        Arc::new(ternary_concurrent(
            ConcurrentLazy::new(move || {
                condition_calls.fetch_add(1, Ordering::SeqCst);
                condition
            }),
            ConcurrentLazy::new(move || {
                calls1.fetch_add(1, Ordering::SeqCst);
                1
            }),
            ConcurrentLazy::new(move || {
                calls2.fetch_add(1, Ordering::SeqCst);
                2
            }),
        ))
    };

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let result = Arc::clone(&result);
            thread::spawn(move || *result.force())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }

    assert_eq!(condition_calls.load(Ordering::SeqCst), 1);
    assert_eq!(calls1.load(Ordering::SeqCst), usize::from(condition));
    assert_eq!(calls2.load(Ordering::SeqCst), usize::from(!condition));
}

#[rstest]
fn ternary_concurrent_with_shared_arc_branches() {
    let value1 = Arc::new(ConcurrentLazy::new(|| String::from("left")));
    let value2 = Arc::new(ConcurrentLazy::new(|| String::from("right")));

    let result = ternary_concurrent(
        ConcurrentLazy::new(|| false),
        Arc::clone(&value1),
        Arc::clone(&value2),
    );

    assert!(!value2.is_evaluated());
    assert_eq!(*result.force(), "right");
    assert!(value2.is_evaluated());
    assert!(!value1.is_evaluated());
}
