//! Tests for the scene tree node structure.

use std::cell::RefCell;
use std::rc::Rc;

use iris_scene::node::{NodeKind, SceneNode};

#[test]
fn test_new_node_is_detached() {
    let node = SceneNode::new_plain();
    assert!(node.parent().is_none());
    assert_eq!(node.child_count(), 0);
    assert!(!node.has_children());
}

#[test]
fn test_node_ids_are_unique() {
    let a = SceneNode::new_plain();
    let b = SceneNode::new_themed();
    let c = SceneNode::new_plain();
    assert_ne!(a.id(), b.id());
    assert_ne!(b.id(), c.id());
    assert_ne!(a.id(), c.id());
}

#[test]
fn test_kind_is_fixed_at_construction() {
    let plain = SceneNode::new_plain();
    let themed = SceneNode::new_themed();
    assert_eq!(plain.kind(), NodeKind::Plain);
    assert_eq!(themed.kind(), NodeKind::Themed);
    assert!(!plain.is_themed());
    assert!(themed.is_themed());
}

#[test]
fn test_add_child_links_both_sides() {
    let parent = SceneNode::new_plain();
    let child = SceneNode::new_plain();

    parent.add_child(&child);

    assert!(Rc::ptr_eq(&child.parent().unwrap(), &parent));
    assert_eq!(parent.child_count(), 1);
    assert!(Rc::ptr_eq(&parent.children()[0], &child));
}

#[test]
fn test_reparent_moves_between_parents() {
    let first = SceneNode::new_plain();
    let second = SceneNode::new_plain();
    let child = SceneNode::new_plain();

    first.add_child(&child);
    second.add_child(&child);

    assert_eq!(first.child_count(), 0);
    assert_eq!(second.child_count(), 1);
    assert!(Rc::ptr_eq(&child.parent().unwrap(), &second));
}

#[test]
fn test_detach_clears_parent() {
    let parent = SceneNode::new_plain();
    let child = SceneNode::new_plain();
    parent.add_child(&child);

    child.detach();

    assert!(child.parent().is_none());
    assert_eq!(parent.child_count(), 0);
}

#[test]
fn test_parent_changed_fires_once_per_move() {
    let first = SceneNode::new_plain();
    let second = SceneNode::new_plain();
    let child = SceneNode::new_plain();

    let seen: Rc<RefCell<Vec<Option<u64>>>> = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let _sub = child.observe_parent_changed(move |new_parent| {
        log.borrow_mut()
            .push(new_parent.as_ref().map(|p| p.id().get()));
    });

    first.add_child(&child);
    second.add_child(&child);
    child.detach();

    let expected = vec![
        Some(first.id().get()),
        Some(second.id().get()),
        None,
    ];
    assert_eq!(*seen.borrow(), expected);
}

#[test]
fn test_reparent_to_same_parent_is_noop() {
    let parent = SceneNode::new_plain();
    let child = SceneNode::new_plain();
    parent.add_child(&child);

    let fired = Rc::new(RefCell::new(0));
    let count = fired.clone();
    let _sub = child.observe_parent_changed(move |_| *count.borrow_mut() += 1);

    parent.add_child(&child);
    child.set_parent(Some(&parent));

    assert_eq!(*fired.borrow(), 0);
    assert_eq!(parent.child_count(), 1);
}

#[test]
fn test_detach_of_detached_node_is_noop() {
    let node = SceneNode::new_plain();

    let fired = Rc::new(RefCell::new(0));
    let count = fired.clone();
    let _sub = node.observe_parent_changed(move |_| *count.borrow_mut() += 1);

    node.detach();
    assert_eq!(*fired.borrow(), 0);
}

#[test]
fn test_observer_sees_link_already_updated() {
    let parent = SceneNode::new_plain();
    let child = SceneNode::new_plain();

    let ok = Rc::new(RefCell::new(false));
    let flag = ok.clone();
    let child_handle = child.clone();
    let _sub = child.observe_parent_changed(move |new_parent| {
        // Both sides of the link must be in place when observers run.
        let linked = match new_parent {
            Some(p) => {
                child_handle
                    .parent()
                    .map(|current| Rc::ptr_eq(&current, p))
                    .unwrap_or(false)
                    && p.children().iter().any(|c| Rc::ptr_eq(c, &child_handle))
            }
            None => child_handle.parent().is_none(),
        };
        *flag.borrow_mut() = linked;
    });

    parent.add_child(&child);
    assert!(*ok.borrow());
}

#[test]
fn test_dropped_subscription_stops_parent_notifications() {
    let parent = SceneNode::new_plain();
    let child = SceneNode::new_plain();

    let fired = Rc::new(RefCell::new(0));
    let count = fired.clone();
    let sub = child.observe_parent_changed(move |_| *count.borrow_mut() += 1);
    drop(sub);

    parent.add_child(&child);
    assert_eq!(*fired.borrow(), 0);
}

#[test]
fn test_children_snapshot_is_detached_from_live_list() {
    let parent = SceneNode::new_plain();
    let first = SceneNode::new_plain();
    parent.add_child(&first);

    let snapshot = parent.children();
    let second = SceneNode::new_plain();
    parent.add_child(&second);

    assert_eq!(snapshot.len(), 1);
    assert_eq!(parent.child_count(), 2);
}

#[test]
fn test_is_ancestor_of_walks_the_chain() {
    let root = SceneNode::new_plain();
    let mid = SceneNode::new_plain();
    let leaf = SceneNode::new_plain();
    root.add_child(&mid);
    mid.add_child(&leaf);

    assert!(root.is_ancestor_of(&leaf));
    assert!(mid.is_ancestor_of(&leaf));
    assert!(!leaf.is_ancestor_of(&root));
    assert!(!root.is_ancestor_of(&root.clone()));
}

#[test]
#[should_panic]
fn test_reparent_under_descendant_panics() {
    let root = SceneNode::new_plain();
    let child = SceneNode::new_plain();
    root.add_child(&child);

    root.set_parent(Some(&child));
}

#[test]
#[should_panic]
fn test_self_parent_panics() {
    let node = SceneNode::new_plain();
    node.set_parent(Some(&node.clone()));
}

struct Marker {
    value: u32,
}

#[test]
fn test_attachment_is_created_once() {
    let node = SceneNode::new_plain();

    let first = node.attach_with(|| Marker { value: 1 });
    let second = node.attach_with(|| Marker { value: 2 });

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(second.value, 1);
}

#[test]
fn test_attachment_lookup_by_type() {
    let node = SceneNode::new_plain();
    assert!(node.attachment::<Marker>().is_none());

    node.attach_with(|| Marker { value: 7 });

    let found = node.attachment::<Marker>();
    assert_eq!(found.map(|m| m.value), Some(7));
}

#[test]
fn test_dropping_subtree_root_releases_descendants() {
    let root = SceneNode::new_plain();
    let child = SceneNode::new_plain();
    root.add_child(&child);

    let weak_child = Rc::downgrade(&child);
    drop(child);
    assert!(weak_child.upgrade().is_some());

    drop(root);
    assert!(weak_child.upgrade().is_none());
}
