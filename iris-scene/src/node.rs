//! The scene tree node structure.
//!
//! A [SceneNode] is a reference-counted node with at most one parent
//! and an ordered list of children. Nodes mutate freely at runtime:
//! they can be inserted, removed and reparented, and every link change
//! is announced through a parent-changed observer list.
//!
//! Two things about nodes are fixed at construction:
//!
//! - their [NodeId], and
//! - their [NodeKind], which records whether the node type exposes a
//!   settable theme. Capability is a property of the node type, not of
//!   runtime state, so it never changes after construction.
//!
//! Nodes also carry a typed attachment registry. Subsystems (such as
//! theming) lazily attach per-node state without the node type knowing
//! about them; see [SceneNode::attach_with].

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::observer::{ObserverList, Subscription};

/// Unique identifier of a [SceneNode].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Generates a new unique node id.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a node type exposes a settable theme.
///
/// The kind is decided when the node is constructed and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The node relays theming to its subtree but has no theme of its own.
    Plain,
    /// The node owns a theme reference and participates in theming directly.
    Themed,
}

/// A node in the mutable scene tree.
///
/// Nodes are handled through `Rc<SceneNode>`. A parent owns strong
/// references to its children; children hold a weak reference back to
/// the parent, so dropping a subtree root releases the whole subtree.
pub struct SceneNode {
    id: NodeId,
    kind: NodeKind,
    parent: RefCell<Option<Weak<SceneNode>>>,
    children: RefCell<Vec<Rc<SceneNode>>>,
    parent_changed: ObserverList<Option<Rc<SceneNode>>>,
    attachments: RefCell<HashMap<TypeId, Rc<dyn Any>>>,
}

impl SceneNode {
    /// Creates a new detached node of the given kind.
    pub fn new(kind: NodeKind) -> Rc<Self> {
        Rc::new(Self {
            id: NodeId::new(),
            kind,
            parent: RefCell::new(None),
            children: RefCell::new(Vec::new()),
            parent_changed: ObserverList::new(),
            attachments: RefCell::new(HashMap::new()),
        })
    }

    /// Creates a new detached [NodeKind::Plain] node.
    pub fn new_plain() -> Rc<Self> {
        Self::new(NodeKind::Plain)
    }

    /// Creates a new detached [NodeKind::Themed] node.
    pub fn new_themed() -> Rc<Self> {
        Self::new(NodeKind::Themed)
    }

    /// Returns the unique id of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the kind fixed at construction.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns `true` if the node exposes a settable theme.
    pub fn is_themed(&self) -> bool {
        matches!(self.kind, NodeKind::Themed)
    }

    /// Returns the current parent, if the node is linked into a tree.
    pub fn parent(&self) -> Option<Rc<SceneNode>> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Returns a snapshot of the current children.
    ///
    /// The snapshot is detached from the live list: mutating the tree
    /// while iterating over it is fine.
    pub fn children(&self) -> Vec<Rc<SceneNode>> {
        self.children.borrow().clone()
    }

    /// Returns the number of children.
    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    /// Returns `true` if the node has at least one child.
    pub fn has_children(&self) -> bool {
        !self.children.borrow().is_empty()
    }

    /// Appends `child` to this node's children, unlinking it from its
    /// previous parent first. Equivalent to `child.set_parent(Some(self))`.
    pub fn add_child(self: &Rc<Self>, child: &Rc<SceneNode>) {
        child.set_parent(Some(self));
    }

    /// Moves this node under `parent`, or detaches it when `parent` is
    /// `None`.
    ///
    /// Unlinking from the old parent and linking to the new one happen
    /// as one step: parent-changed observers fire exactly once per
    /// call, with the new parent. Setting the current parent again is a
    /// no-op and fires nothing.
    ///
    /// # Panics
    ///
    /// Panics when the move would create a cycle, i.e. when `parent`
    /// is this node itself or one of its descendants.
    pub fn set_parent(self: &Rc<Self>, parent: Option<&Rc<SceneNode>>) {
        let current = self.parent();
        match (&current, parent) {
            (None, None) => return,
            (Some(old), Some(new)) if Rc::ptr_eq(old, new) => return,
            _ => {}
        }
        if let Some(new_parent) = parent {
            assert!(
                !Rc::ptr_eq(self, new_parent),
                "node {:?} cannot be its own parent",
                self.id
            );
            assert!(
                !self.is_ancestor_of(new_parent),
                "node {:?} cannot be moved under its own descendant {:?}",
                self.id,
                new_parent.id
            );
        }

        if let Some(old_parent) = current {
            old_parent
                .children
                .borrow_mut()
                .retain(|child| !Rc::ptr_eq(child, self));
        }
        match parent {
            Some(new_parent) => {
                new_parent.children.borrow_mut().push(self.clone());
                *self.parent.borrow_mut() = Some(Rc::downgrade(new_parent));
            }
            None => {
                *self.parent.borrow_mut() = None;
            }
        }
        log::trace!(
            "node {:?} reparented to {:?}",
            self.id,
            parent.map(|p| p.id)
        );
        self.parent_changed.notify(&parent.cloned());
    }

    /// Detaches the node from its parent. Shorthand for
    /// `set_parent(None)`.
    pub fn detach(self: &Rc<Self>) {
        self.set_parent(None);
    }

    /// Returns `true` if this node is an ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Rc<SceneNode>) -> bool {
        let mut current = other.parent();
        while let Some(node) = current {
            if std::ptr::eq(Rc::as_ptr(&node), self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Observes parent changes of this node.
    ///
    /// The observer receives the new parent (or `None` on detach) after
    /// the link has been updated on both sides.
    #[must_use = "dropping the subscription unsubscribes the observer"]
    pub fn observe_parent_changed(
        &self,
        observer: impl Fn(&Option<Rc<SceneNode>>) + 'static,
    ) -> Subscription {
        self.parent_changed.subscribe(observer)
    }

    /// Returns the attachment of type `T`, creating it with `init` on
    /// first use.
    ///
    /// At most one attachment per type exists on a node; later calls
    /// return the value created first. Attachments live as long as the
    /// node.
    pub fn attach_with<T: Any>(&self, init: impl FnOnce() -> T) -> Rc<T> {
        if let Some(existing) = self.attachment::<T>() {
            return existing;
        }
        let value = Rc::new(init());
        self.attachments
            .borrow_mut()
            .insert(TypeId::of::<T>(), value.clone());
        value
    }

    /// Returns the attachment of type `T`, if one was created.
    pub fn attachment<T: Any>(&self) -> Option<Rc<T>> {
        let attachment = self.attachments.borrow().get(&TypeId::of::<T>())?.clone();
        attachment.downcast::<T>().ok()
    }
}

impl fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneNode")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("children", &self.child_count())
            .finish()
    }
}
