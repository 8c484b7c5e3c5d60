//! Tests for the per-thread dispatch queue.

use std::cell::RefCell;
use std::rc::Rc;

use iris_scene::dispatch::{self, Priority};
use iris_scene::node::SceneNode;

#[test]
fn test_drain_runs_tasks_in_fifo_order() {
    let seen = Rc::new(RefCell::new(Vec::new()));

    for index in 0..3 {
        let log = seen.clone();
        dispatch::post(Priority::Normal, move || log.borrow_mut().push(index));
    }

    assert_eq!(dispatch::drain(), 3);
    assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    assert_eq!(dispatch::pending(), 0);
}

#[test]
fn test_high_priority_drains_before_normal() {
    let seen = Rc::new(RefCell::new(Vec::new()));

    let log = seen.clone();
    dispatch::post(Priority::Normal, move || log.borrow_mut().push("normal"));
    let log = seen.clone();
    dispatch::post(Priority::High, move || log.borrow_mut().push("high"));

    dispatch::drain();
    assert_eq!(*seen.borrow(), vec!["high", "normal"]);
}

#[test]
fn test_tasks_posted_during_drain_run_in_same_drain() {
    let seen = Rc::new(RefCell::new(Vec::new()));

    let log = seen.clone();
    dispatch::post(Priority::Normal, move || {
        log.borrow_mut().push("outer");
        let inner_log = log.clone();
        dispatch::post(Priority::Normal, move || {
            inner_log.borrow_mut().push("inner");
        });
    });

    assert_eq!(dispatch::drain(), 2);
    assert_eq!(*seen.borrow(), vec!["outer", "inner"]);
}

#[test]
fn test_high_posted_during_drain_preempts_queued_normal() {
    let seen = Rc::new(RefCell::new(Vec::new()));

    let log = seen.clone();
    dispatch::post(Priority::Normal, move || {
        log.borrow_mut().push("first");
        let inner_log = log.clone();
        dispatch::post(Priority::High, move || inner_log.borrow_mut().push("urgent"));
    });
    let log = seen.clone();
    dispatch::post(Priority::Normal, move || log.borrow_mut().push("second"));

    dispatch::drain();
    assert_eq!(*seen.borrow(), vec!["first", "urgent", "second"]);
}

#[test]
fn test_nested_drain_is_noop() {
    let seen = Rc::new(RefCell::new(Vec::new()));

    let log = seen.clone();
    dispatch::post(Priority::Normal, move || {
        log.borrow_mut().push("a");
        // The outer drain is already running; this must not recurse.
        assert_eq!(dispatch::drain(), 0);
    });
    let log = seen.clone();
    dispatch::post(Priority::Normal, move || log.borrow_mut().push("b"));

    assert_eq!(dispatch::drain(), 2);
    assert_eq!(*seen.borrow(), vec!["a", "b"]);
}

#[test]
fn test_delivery_reaches_live_node() {
    dispatch::reset_metrics();
    let node = SceneNode::new_plain();
    let seen = Rc::new(RefCell::new(None));

    let slot = seen.clone();
    dispatch::post_to(&node, Priority::High, move |target| {
        *slot.borrow_mut() = Some(target.id());
    });
    dispatch::drain();

    assert_eq!(*seen.borrow(), Some(node.id()));
    assert_eq!(dispatch::metrics().delivered, 1);
    assert_eq!(dispatch::metrics().dropped, 0);
}

#[test]
fn test_delivery_to_dropped_node_is_discarded() {
    dispatch::reset_metrics();
    let node = SceneNode::new_plain();
    let ran = Rc::new(RefCell::new(false));

    let flag = ran.clone();
    dispatch::post_to(&node, Priority::High, move |_| *flag.borrow_mut() = true);
    drop(node);

    assert_eq!(dispatch::drain(), 0);
    assert!(!*ran.borrow());

    let metrics = dispatch::metrics();
    assert_eq!(metrics.posted, 1);
    assert_eq!(metrics.delivered, 0);
    assert_eq!(metrics.dropped, 1);
}

#[test]
fn test_pending_counts_both_tiers() {
    assert_eq!(dispatch::pending(), 0);
    dispatch::post(Priority::High, || {});
    dispatch::post(Priority::Normal, || {});
    assert_eq!(dispatch::pending(), 2);
    dispatch::drain();
    assert_eq!(dispatch::pending(), 0);
}

#[test]
fn test_reset_metrics_clears_counters() {
    dispatch::post(Priority::Normal, || {});
    dispatch::drain();
    assert_ne!(dispatch::metrics().posted, 0);

    dispatch::reset_metrics();
    let metrics = dispatch::metrics();
    assert_eq!(metrics.posted, 0);
    assert_eq!(metrics.delivered, 0);
    assert_eq!(metrics.dropped, 0);
}
