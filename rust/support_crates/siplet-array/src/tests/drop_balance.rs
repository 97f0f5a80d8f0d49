use std::panic::{AssertUnwindSafe, catch_unwind};

use super::{Tracker, values};
use crate::{Array, FixedArray};

#[test]
fn test_every_operation_balances_live_count() {
    let tracker = Tracker::default();
    {
        let mut a = Array::new();
        for v in 0..10 {
            a.push_back(tracker.make(v)).unwrap();
        }
        a.insert(3, tracker.make(100)).unwrap();
        a.insert_slice(0, &tracker.make_all([7, 8])).unwrap();
        a.replace_slice(2, 4, &tracker.make_all([1])).unwrap();
        a.erase(1, 2);
        a.replace_within(0, 1, 3..6).unwrap();
        a.insert_within(2, 0..4).unwrap();
        a.erase_if(|t| t.value % 2 == 0);
        a.pop_front();
        a.pop_back();
        a.resize(20, &tracker.make(5)).unwrap();
        a.truncate(4);
        let b = a.clone();
        a.assign_slice(b.as_slice()).unwrap();
        a.assign_fill(3, &tracker.make(9)).unwrap();
        a.shrink_to_fit().unwrap();
        let mut c = a.take();
        c.swap(&mut a);
        assert!(tracker.live() > 0);
    }
    assert_eq!(tracker.live(), 0);
}

#[test]
fn test_clone_panic_while_reallocating_leaves_array_unchanged() {
    let tracker = Tracker::default();
    let mut a = Array::from_slice(&tracker.make_all(0..4)).unwrap();
    assert_eq!(a.capacity(), 4);
    let source = tracker.make_all(10..15);
    let live_before = tracker.live();

    tracker.panic_after(2);
    let result = catch_unwind(AssertUnwindSafe(|| a.insert_slice(1, &source)));
    assert!(result.is_err());
    tracker.disarm();

    assert_eq!(values(&a), [0, 1, 2, 3]);
    assert_eq!(a.capacity(), 4);
    assert_eq!(tracker.live(), live_before);
    drop(a);
    drop(source);
    assert_eq!(tracker.live(), 0);
}

#[test]
fn test_clone_panic_in_place_closes_gap() {
    let tracker = Tracker::default();
    let mut a = Array::with_capacity(16).unwrap();
    a.append_slice(&tracker.make_all(0..6)).unwrap();
    let source = tracker.make_all(20..23);

    tracker.panic_after(1);
    let result = catch_unwind(AssertUnwindSafe(|| a.replace_slice(1, 2, &source)));
    assert!(result.is_err());
    tracker.disarm();

    // The replaced elements are gone; the tail is back in place.
    assert_eq!(values(&a), [0, 3, 4, 5]);
    drop(a);
    drop(source);
    assert_eq!(tracker.live(), 0);
}

#[test]
fn test_clone_panic_in_fill_and_within() {
    let tracker = Tracker::default();
    let mut a = FixedArray::<_, 12>::from_slice(&tracker.make_all(0..5)).unwrap();

    tracker.panic_after(1);
    let result = catch_unwind(AssertUnwindSafe(|| a.insert_within(1, 2..5)));
    assert!(result.is_err());
    tracker.disarm();
    assert_eq!(values(&a), [0, 1, 2, 3, 4]);

    tracker.panic_after(2);
    let result = catch_unwind(AssertUnwindSafe(|| a.replace_within(0, 3, 1..4)));
    assert!(result.is_err());
    tracker.disarm();
    assert_eq!(values(&a), [0, 1, 2, 3, 4]);

    let filler = tracker.make(9);
    tracker.panic_after(4);
    let result = catch_unwind(AssertUnwindSafe(|| a.append_fill(6, &filler)));
    assert!(result.is_err());
    tracker.disarm();
    assert_eq!(values(&a), [0, 1, 2, 3, 4]);

    drop(a);
    drop(filler);
    assert_eq!(tracker.live(), 0);
}

#[test]
fn test_failed_push_drops_value() {
    let tracker = Tracker::default();
    let mut f = FixedArray::<_, 1>::new();
    f.push_back(tracker.make(1)).unwrap();
    assert!(f.push_back(tracker.make(2)).is_err());
    assert!(f.insert(0, tracker.make(3)).is_err());
    assert_eq!(tracker.live(), 1);
    f.clear();
    assert_eq!(tracker.live(), 0);
}
