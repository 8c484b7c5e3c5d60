//! The per-thread deferred dispatch queue.
//!
//! Work posted here runs later on the same thread, when the owner of
//! the thread (an event loop, or a test) calls [drain]. The queue has
//! two tiers: [Priority::High] entries always drain before
//! [Priority::Normal] ones, and entries within a tier run in FIFO
//! order.
//!
//! Deliveries posted to a [SceneNode] hold only a weak handle to their
//! target. A node dropped between posting and draining makes the
//! delivery disappear silently; [metrics] counts how often that
//! happens.
//!
//! The queue is deliberately not thread safe. Every thread gets its
//! own queue, and posting from one thread never makes work run on
//! another.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::node::SceneNode;

/// Scheduling tier of a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Drains before all [Priority::Normal] entries.
    High,
    /// The default tier for ordinary deferred work.
    Normal,
}

/// Counters describing what the current thread's queue has processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchMetrics {
    /// Entries posted to the queue.
    pub posted: u64,
    /// Entries that ran to completion.
    pub delivered: u64,
    /// Deliveries discarded because their target node was dropped.
    pub dropped: u64,
}

enum Entry {
    Task(Box<dyn FnOnce()>),
    Delivery {
        target: Weak<SceneNode>,
        run: Box<dyn FnOnce(Rc<SceneNode>)>,
    },
}

#[derive(Default)]
struct Queue {
    high: VecDeque<Entry>,
    normal: VecDeque<Entry>,
    metrics: DispatchMetrics,
    draining: bool,
}

thread_local! {
    static QUEUE: RefCell<Queue> = RefCell::new(Queue::default());
}

/// Posts a task to the current thread's queue.
pub fn post(priority: Priority, task: impl FnOnce() + 'static) {
    push(priority, Entry::Task(Box::new(task)));
}

/// Posts a delivery bound to `node`.
///
/// The task runs with a strong handle to the node when the queue
/// drains. If the node has been dropped by then, the delivery is
/// discarded.
pub fn post_to(node: &Rc<SceneNode>, priority: Priority, task: impl FnOnce(Rc<SceneNode>) + 'static) {
    push(
        priority,
        Entry::Delivery {
            target: Rc::downgrade(node),
            run: Box::new(task),
        },
    );
}

fn push(priority: Priority, entry: Entry) {
    QUEUE.with(|queue| {
        let mut queue = queue.borrow_mut();
        match priority {
            Priority::High => queue.high.push_back(entry),
            Priority::Normal => queue.normal.push_back(entry),
        }
        queue.metrics.posted += 1;
    });
}

/// Runs queued entries until the queue is empty, high tier first.
///
/// Entries posted while draining are picked up by the same drain.
/// Nested calls (from inside a running entry) return `0` immediately;
/// the outer drain handles everything. Returns the number of entries
/// that ran.
pub fn drain() -> usize {
    let nested = QUEUE.with(|queue| {
        let mut queue = queue.borrow_mut();
        if queue.draining {
            true
        } else {
            queue.draining = true;
            false
        }
    });
    if nested {
        return 0;
    }
    let _guard = DrainGuard;

    let mut executed = 0;
    loop {
        let entry = QUEUE.with(|queue| {
            let mut queue = queue.borrow_mut();
            queue.high.pop_front().or_else(|| queue.normal.pop_front())
        });
        let Some(entry) = entry else {
            break;
        };
        match entry {
            Entry::Task(task) => {
                task();
                executed += 1;
                QUEUE.with(|queue| queue.borrow_mut().metrics.delivered += 1);
            }
            Entry::Delivery { target, run } => match target.upgrade() {
                Some(node) => {
                    run(node);
                    executed += 1;
                    QUEUE.with(|queue| queue.borrow_mut().metrics.delivered += 1);
                }
                None => {
                    log::trace!("discarding queued delivery to a dropped node");
                    QUEUE.with(|queue| queue.borrow_mut().metrics.dropped += 1);
                }
            },
        }
    }
    executed
}

struct DrainGuard;

impl Drop for DrainGuard {
    fn drop(&mut self) {
        QUEUE.with(|queue| queue.borrow_mut().draining = false);
    }
}

/// Returns the number of entries waiting in the current thread's queue.
pub fn pending() -> usize {
    QUEUE.with(|queue| {
        let queue = queue.borrow();
        queue.high.len() + queue.normal.len()
    })
}

/// Returns the current thread's dispatch counters.
pub fn metrics() -> DispatchMetrics {
    QUEUE.with(|queue| queue.borrow().metrics)
}

/// Resets the current thread's dispatch counters to zero.
pub fn reset_metrics() {
    QUEUE.with(|queue| queue.borrow_mut().metrics = DispatchMetrics::default());
}
