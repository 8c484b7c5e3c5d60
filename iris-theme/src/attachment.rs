//! Per-node theming state, attached lazily to scene nodes.
//!
//! Theming state is not part of [SceneNode] itself; it rides along in
//! the node's typed attachment registry. [ThemeAttachment::of] creates
//! the state for a node on first contact, which happens either when
//! the node initializes theming explicitly or when an ascendant walk
//! passes through it.
//!
//! The attachment remembers the node's previous parent so reparent
//! handling can compare the theme context the node is leaving with the
//! one it enters, and it carries the node's [ThemeSlot]: plain nodes
//! only relay themes, themed nodes own a [ThemeExtension].

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use iris_scene::node::{NodeKind, SceneNode};
use iris_scene::observer::Subscription;

use crate::event::ThemeEvent;
use crate::extension::ThemeExtension;
use crate::propagation;

/// Theming capability of a node, decided by its [NodeKind] when the
/// attachment is created.
pub(crate) enum ThemeSlot {
    /// The node relays theme events but holds no theme of its own.
    Plain,
    /// The node owns a theme reference and an event handler.
    Themed(ThemeExtension),
}

/// Theming state attached to a single [SceneNode].
pub struct ThemeAttachment {
    node: Weak<SceneNode>,
    previous_parent: RefCell<Option<Weak<SceneNode>>>,
    slot: ThemeSlot,
    parent_watch: RefCell<Option<Subscription>>,
}

impl ThemeAttachment {
    /// Returns the theming state of `node`, creating and wiring it on
    /// first use.
    ///
    /// Creation records the node's current parent as the previous
    /// parent and subscribes to the node's parent changes; the
    /// subscription lives as long as the attachment, so reparent
    /// handling works for the rest of the node's life.
    pub fn of(node: &Rc<SceneNode>) -> Rc<ThemeAttachment> {
        if let Some(existing) = node.attachment::<ThemeAttachment>() {
            return existing;
        }
        let attachment = node.attach_with(|| {
            let slot = match node.kind() {
                NodeKind::Plain => ThemeSlot::Plain,
                NodeKind::Themed => ThemeSlot::Themed(ThemeExtension::new(Rc::downgrade(node))),
            };
            ThemeAttachment {
                node: Rc::downgrade(node),
                previous_parent: RefCell::new(node.parent().map(|p| Rc::downgrade(&p))),
                slot,
                parent_watch: RefCell::new(None),
            }
        });

        let weak = Rc::downgrade(&attachment);
        let watch = node.observe_parent_changed(move |new_parent| {
            if let Some(attachment) = weak.upgrade() {
                attachment.handle_parent_changed(new_parent.clone());
            }
        });
        *attachment.parent_watch.borrow_mut() = Some(watch);
        attachment
    }

    /// Returns the theming state of `node` if it was already created.
    pub fn find(node: &SceneNode) -> Option<Rc<ThemeAttachment>> {
        node.attachment::<ThemeAttachment>()
    }

    /// Returns the node's theme extension, or `None` for plain nodes.
    pub fn extension(&self) -> Option<&ThemeExtension> {
        match &self.slot {
            ThemeSlot::Themed(extension) => Some(extension),
            ThemeSlot::Plain => None,
        }
    }

    /// Returns the parent recorded by the last handled parent change.
    pub fn previous_parent(&self) -> Option<Rc<SceneNode>> {
        self.previous_parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Reacts to the owning node moving to `new_parent`.
    ///
    /// Compares the theme that was effective under the previous parent
    /// with the one effective under the new parent. When they differ,
    /// an update lands on the node itself: themed nodes handle it
    /// synchronously, plain nodes forward it into their subtree. Either
    /// way the new parent becomes the recorded previous parent, so a
    /// redundant notification for an unchanged parent does nothing.
    fn handle_parent_changed(&self, new_parent: Option<Rc<SceneNode>>) {
        let Some(node) = self.node.upgrade() else {
            return;
        };
        let previous = self.previous_parent();
        let unchanged = match (&previous, &new_parent) {
            (Some(old), Some(new)) => Rc::ptr_eq(old, new),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        let old_scope = propagation::nearest_themed(previous);
        let new_scope = propagation::nearest_themed(new_parent.clone());
        let old_theme = propagation::theme_of(old_scope.as_ref());
        let new_theme = propagation::theme_of(new_scope.as_ref());

        if !Rc::ptr_eq(&old_theme, &new_theme) {
            log::trace!(
                "node {:?} changed theme scope: {:?} -> {:?}",
                node.id(),
                old_theme,
                new_theme
            );
            let event = ThemeEvent::updated(old_theme, new_theme);
            match self.extension() {
                Some(extension) => extension.handle_event(&event),
                None => propagation::forward(&node, &event),
            }
        }
        *self.previous_parent.borrow_mut() = new_parent.map(|p| Rc::downgrade(&p));
    }
}

impl fmt::Debug for ThemeAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.slot {
            ThemeSlot::Plain => "plain",
            ThemeSlot::Themed(_) => "themed",
        };
        f.debug_struct("ThemeAttachment")
            .field("node", &self.node.upgrade().map(|n| n.id()))
            .field("slot", &kind)
            .finish()
    }
}
