//! A ready-made themed node for callers that want closures instead of
//! a hook trait.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use iris_scene::node::SceneNode;

use crate::attachment::ThemeAttachment;
use crate::extension::{init_theming, ThemeExtension, ThemeHooks, ThemeMode};
use crate::theme::Theme;

#[derive(Default)]
struct HookCallbacks {
    pre: RefCell<Option<Box<dyn Fn()>>>,
    post: RefCell<Option<Box<dyn Fn()>>>,
}

impl ThemeHooks for HookCallbacks {
    fn pre_theme_changed(&self) {
        if let Some(callback) = &*self.pre.borrow() {
            callback();
        }
    }

    fn post_theme_changed(&self) {
        if let Some(callback) = &*self.post.borrow() {
            callback();
        }
    }
}

/// A themed scene node with theming initialized up front.
///
/// Bundles a fresh [SceneNode](iris_scene::node::SceneNode) with its
/// bound theming state and exposes the theme API directly. Change
/// hooks are optional closures; see [StyledNode::on_theme_changing]
/// and [StyledNode::on_theme_changed].
pub struct StyledNode {
    node: Rc<SceneNode>,
    attachment: Rc<ThemeAttachment>,
    callbacks: Rc<HookCallbacks>,
}

impl StyledNode {
    /// Creates a detached themed node with theming initialized.
    pub fn new() -> Self {
        let node = SceneNode::new_themed();
        let callbacks = Rc::new(HookCallbacks::default());
        let attachment = init_theming(&node, callbacks.clone());
        Self {
            node,
            attachment,
            callbacks,
        }
    }

    /// Returns the underlying scene node.
    pub fn node(&self) -> &Rc<SceneNode> {
        &self.node
    }

    /// Returns the node's current theme reference.
    pub fn theme(&self) -> Rc<Theme> {
        self.extension().theme()
    }

    /// Returns how the node came by its current theme.
    pub fn mode(&self) -> ThemeMode {
        self.extension().mode()
    }

    /// Gives the node an explicit theme; see [ThemeExtension::set_theme].
    pub fn set_theme(&self, theme: Rc<Theme>, mode: ThemeMode) {
        self.extension().set_theme(theme, mode);
    }

    /// Puts the node back on its inherited theme; see
    /// [ThemeExtension::reset_theme].
    pub fn reset_theme(&self) {
        self.extension().reset_theme();
    }

    /// Sets the closure that runs before each theme change on this
    /// node, replacing any previous one.
    pub fn on_theme_changing(&self, callback: impl Fn() + 'static) {
        *self.callbacks.pre.borrow_mut() = Some(Box::new(callback));
    }

    /// Sets the closure that runs after each theme change on this
    /// node, replacing any previous one.
    pub fn on_theme_changed(&self, callback: impl Fn() + 'static) {
        *self.callbacks.post.borrow_mut() = Some(Box::new(callback));
    }

    fn extension(&self) -> &ThemeExtension {
        match self.attachment.extension() {
            Some(extension) => extension,
            None => unreachable!("styled nodes are always themed"),
        }
    }
}

impl Default for StyledNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StyledNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyledNode")
            .field("node", &self.node.id())
            .field("theme", &self.theme())
            .field("mode", &self.mode())
            .finish()
    }
}
