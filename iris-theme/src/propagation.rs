//! Theme event propagation over the scene tree.
//!
//! Events spread strictly downwards. A broadcast from a node visits
//! its whole plain subtree and stops at themed descendants: each
//! themed node receives the event once and decides on its own whether
//! anything continues below it. Plain nodes never handle events, they
//! only carry them.
//!
//! Individual deliveries are deferred through the high tier of the
//! scene [dispatch] queue, so a broadcast returns immediately and the
//! subtree settles when the queue drains. Nodes dropped while their
//! delivery is queued simply never receive it.
//!
//! The other half of this module is scope resolution:
//! [nearest_themed] finds the themed ascendant a node inherits from,
//! lazily attaching theming state to the plain nodes it walks through
//! so later reparent events on them are seen.

use std::rc::Rc;

use iris_scene::dispatch::{self, Priority};
use iris_scene::node::SceneNode;

use crate::attachment::ThemeAttachment;
use crate::event::ThemeEvent;
use crate::theme::Theme;

/// Delivers `event` to a single node.
///
/// Synchronous delivery runs the node's handler on the spot;
/// asynchronous delivery queues it at [Priority::High] for the next
/// [dispatch::drain]. Delivery to a plain node does nothing.
pub fn deliver(node: &Rc<SceneNode>, event: &ThemeEvent, synchronous: bool) {
    if synchronous {
        receive(node, event);
    } else {
        let event = event.clone();
        dispatch::post_to(node, Priority::High, move |node| receive(&node, &event));
    }
}

/// Forwards `event` to every node of `node`'s subtree that must see
/// it, without delivering to `node` itself.
///
/// Every direct child gets an asynchronous delivery. Recursion
/// continues only through plain children that have children of their
/// own; a themed child ends the walk, its subtree is its business.
pub fn forward(node: &Rc<SceneNode>, event: &ThemeEvent) {
    for child in node.children() {
        deliver(&child, event, false);
        if !child.is_themed() && child.has_children() {
            forward(&child, event);
        }
    }
}

/// Broadcasts an identity change from `node` into its subtree.
pub fn broadcast_change(node: &Rc<SceneNode>, old: Rc<Theme>, new: Rc<Theme>) {
    forward(node, &ThemeEvent::updated(old, new));
}

/// Broadcasts a content reload from `node` into its subtree.
pub fn broadcast_reload(node: &Rc<SceneNode>, theme: Rc<Theme>) {
    forward(node, &ThemeEvent::reloaded(theme));
}

/// Walks up from `from` (inclusive) to the nearest themed node.
///
/// Plain nodes passed on the way up get theming state attached, so a
/// later reparent anywhere on the chain is noticed. Returns `None`
/// when the chain ends without meeting a themed node.
pub fn nearest_themed(from: Option<Rc<SceneNode>>) -> Option<Rc<SceneNode>> {
    let mut current = from;
    while let Some(node) = current {
        if node.is_themed() {
            return Some(node);
        }
        ThemeAttachment::of(&node);
        current = node.parent();
    }
    None
}

/// Returns the theme provided by a resolved scope, or the default
/// theme when there is no scope (or its node never got theming state).
pub fn theme_of(scope: Option<&Rc<SceneNode>>) -> Rc<Theme> {
    scope
        .and_then(|node| ThemeAttachment::find(node))
        .and_then(|attachment| attachment.extension().map(|extension| extension.theme()))
        .unwrap_or_else(Theme::default_theme)
}

/// Resolves the theme currently effective for `node`, whether or not
/// the node participates in theming itself.
pub fn effective_theme(node: &Rc<SceneNode>) -> Rc<Theme> {
    let scope = nearest_themed(Some(node.clone()));
    theme_of(scope.as_ref())
}

fn receive(node: &Rc<SceneNode>, event: &ThemeEvent) {
    if !node.is_themed() {
        return;
    }
    let attachment = ThemeAttachment::find(node);
    assert!(
        attachment.is_some(),
        "theme event delivered to node {:?} before init_theming",
        node.id()
    );
    if let Some(extension) = attachment.as_ref().and_then(|a| a.extension()) {
        extension.handle_event(event);
    }
}
