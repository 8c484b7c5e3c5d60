//! The per-node theme state machine.
//!
//! Every themed node owns a [ThemeExtension]: the node's current theme
//! reference, how it got that theme ([ThemeMode]), and the hooks the
//! node runs around theme changes. The extension is created together
//! with the node's attachment, but stays inert until
//! [init_theming] binds the node's hooks; receiving a theme event
//! before that is a programming defect and asserts.
//!
//! The mode decides how events are interpreted:
//!
//! - [ThemeMode::Inherited] nodes track their surroundings. An
//!   identity update adopts the new theme; a content reload runs the
//!   hooks and forwards the event below.
//! - [ThemeMode::Custom] nodes keep their explicit theme. Ancestor
//!   identity updates only re-link the custom theme's parent; ancestor
//!   reloads surface as a parent-theme notification on the custom
//!   theme. The rest of the subtree is untouched either way, because
//!   broadcasts from above never cross a themed node.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use iris_scene::node::SceneNode;
use iris_scene::observer::Subscription;

use crate::attachment::ThemeAttachment;
use crate::event::ThemeEvent;
use crate::propagation;
use crate::theme::Theme;

/// How a themed node came by its current theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeMode {
    /// The theme follows the nearest themed ascendant (or the default
    /// theme). This is the initial mode of every themed node.
    #[default]
    Inherited,
    /// The theme was set explicitly and sticks across ancestor
    /// changes.
    Custom,
}

/// Hooks a themed node runs around every theme change on itself.
///
/// Both hooks default to doing nothing; nodes override what they need.
/// For an identity change the pre hook still sees the old theme
/// reference and the post hook sees the new one. For a content reload
/// both run against the same reference with its new content.
pub trait ThemeHooks {
    /// Runs before the node's theme changes or reloads.
    fn pre_theme_changed(&self) {}

    /// Runs after the node's theme changed or reloaded.
    fn post_theme_changed(&self) {}
}

/// Theme state of a single themed node.
pub struct ThemeExtension {
    owner: Weak<SceneNode>,
    theme: RefCell<Rc<Theme>>,
    mode: Cell<ThemeMode>,
    hooks: RefCell<Option<Rc<dyn ThemeHooks>>>,
    theme_subscriptions: RefCell<Vec<Subscription>>,
}

impl ThemeExtension {
    /// Creates the state for `owner`, pointing at the default theme in
    /// [ThemeMode::Inherited], with no hooks bound yet.
    pub(crate) fn new(owner: Weak<SceneNode>) -> Self {
        Self {
            owner,
            theme: RefCell::new(Theme::default_theme()),
            mode: Cell::new(ThemeMode::Inherited),
            hooks: RefCell::new(None),
            theme_subscriptions: RefCell::new(Vec::new()),
        }
    }

    /// Returns the node's current theme reference.
    pub fn theme(&self) -> Rc<Theme> {
        self.theme.borrow().clone()
    }

    /// Returns the current mode.
    pub fn mode(&self) -> ThemeMode {
        self.mode.get()
    }

    /// Returns `true` once [init_theming] has bound hooks.
    pub fn is_bound(&self) -> bool {
        self.hooks.borrow().is_some()
    }

    /// Replaces the node's theme reference.
    ///
    /// A change runs, in order: the pre hook, the mode switch, moving
    /// the content subscriptions from the old theme to the new one,
    /// re-linking the custom theme's parent (custom mode only), the
    /// post hook, and finally a broadcast of the identity change into
    /// the node's subtree.
    ///
    /// Setting the reference the node already holds is a complete
    /// no-op: no hooks, no broadcast, not even a mode switch.
    pub fn set_theme(&self, new_theme: Rc<Theme>, mode: ThemeMode) {
        let current = self.theme();
        if Rc::ptr_eq(&current, &new_theme) {
            return;
        }
        log::debug!(
            "node {:?} theme change {:?} -> {:?} ({:?})",
            self.owner.upgrade().map(|n| n.id()),
            current,
            new_theme,
            mode
        );

        self.run_pre_hook();
        self.mode.set(mode);
        let old_theme = current;
        self.theme_subscriptions.borrow_mut().clear();
        *self.theme.borrow_mut() = new_theme.clone();
        self.subscribe_theme(&new_theme);
        self.relink_parent_theme();
        self.run_post_hook();

        if let Some(node) = self.owner.upgrade() {
            propagation::broadcast_change(&node, old_theme, new_theme);
        }
    }

    /// Puts the node back into [ThemeMode::Inherited], adopting
    /// whatever theme its ascendants currently provide.
    pub fn reset_theme(&self) {
        let Some(node) = self.owner.upgrade() else {
            return;
        };
        let scope = propagation::nearest_themed(node.parent());
        let inherited = propagation::theme_of(scope.as_ref());
        self.set_theme(inherited, ThemeMode::Inherited);
    }

    /// Reacts to a theme event landing on this node.
    ///
    /// # Panics
    ///
    /// Panics when the node was never initialized through
    /// [init_theming]; an uninitialized node must not be receiving
    /// events.
    pub fn handle_event(&self, event: &ThemeEvent) {
        assert!(
            self.is_bound(),
            "theme event delivered to node {:?} before init_theming",
            self.owner.upgrade().map(|n| n.id())
        );
        match (event, self.mode.get()) {
            (ThemeEvent::Updated { new, .. }, ThemeMode::Inherited) => {
                self.set_theme(new.clone(), ThemeMode::Inherited);
            }
            (ThemeEvent::Updated { new, .. }, ThemeMode::Custom) => {
                self.theme().set_parent_theme(Some(new.clone()));
            }
            (ThemeEvent::Reloaded { .. }, ThemeMode::Inherited) => {
                self.run_pre_hook();
                self.run_post_hook();
                if let Some(node) = self.owner.upgrade() {
                    propagation::forward(&node, event);
                }
            }
            (ThemeEvent::Reloaded { .. }, ThemeMode::Custom) => {
                self.theme().notify_parent_theme_changed();
            }
        }
    }

    /// Reacts to the node's own theme changing content in place.
    fn reload(&self) {
        let Some(node) = self.owner.upgrade() else {
            return;
        };
        log::trace!("node {:?} reloading theme {:?}", node.id(), self.theme());
        self.run_pre_hook();
        self.run_post_hook();
        propagation::broadcast_reload(&node, self.theme());
    }

    /// Links the custom theme's fallback chain to the theme of the
    /// nearest themed ascendant. No-op in inherited mode, and when the
    /// ascendant theme is the node's own theme.
    fn relink_parent_theme(&self) {
        if self.mode.get() != ThemeMode::Custom {
            return;
        }
        let Some(node) = self.owner.upgrade() else {
            return;
        };
        let scope = propagation::nearest_themed(node.parent());
        let surrounding = propagation::theme_of(scope.as_ref());
        let own = self.theme();
        if !Rc::ptr_eq(&own, &surrounding) {
            own.set_parent_theme(Some(surrounding));
        }
    }

    fn bind(&self, node: &Rc<SceneNode>, hooks: Rc<dyn ThemeHooks>) {
        *self.hooks.borrow_mut() = Some(hooks);
        self.subscribe_theme(&self.theme());

        // A node inserted before initialization never saw a reparent
        // event, so resolve its surroundings now.
        if node.parent().is_some() {
            let scope = propagation::nearest_themed(node.parent());
            let effective = propagation::theme_of(scope.as_ref());
            let current = self.theme();
            if !Rc::ptr_eq(&current, &effective) {
                self.handle_event(&ThemeEvent::updated(current, effective));
            }
        }
    }

    fn subscribe_theme(&self, theme: &Rc<Theme>) {
        let owner = self.owner.clone();
        let on_name = theme.observe_name(move |_| reload_owner(&owner));
        let owner = self.owner.clone();
        let on_version = theme.observe_version(move |_| reload_owner(&owner));
        *self.theme_subscriptions.borrow_mut() = vec![on_name, on_version];
    }

    fn run_pre_hook(&self) {
        let hooks = self.hooks.borrow().clone();
        if let Some(hooks) = hooks {
            hooks.pre_theme_changed();
        }
    }

    fn run_post_hook(&self) {
        let hooks = self.hooks.borrow().clone();
        if let Some(hooks) = hooks {
            hooks.post_theme_changed();
        }
    }
}

impl fmt::Debug for ThemeExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeExtension")
            .field("owner", &self.owner.upgrade().map(|n| n.id()))
            .field("theme", &self.theme())
            .field("mode", &self.mode.get())
            .field("bound", &self.is_bound())
            .finish()
    }
}

fn reload_owner(owner: &Weak<SceneNode>) {
    let Some(node) = owner.upgrade() else {
        return;
    };
    let Some(attachment) = ThemeAttachment::find(&node) else {
        return;
    };
    if let Some(extension) = attachment.extension() {
        extension.reload();
    }
}

/// Initializes theming for a themed node, binding its change hooks.
///
/// Must run once per node, after construction and before the node
/// takes part in theme propagation. If the node already sits in a tree,
/// initialization resolves the theme its ascendants provide and adopts
/// it immediately. Calling this again for the same node logs a warning
/// and keeps the first binding.
///
/// Returns the node's theming state.
///
/// # Panics
///
/// Panics when `node` is not a [NodeKind::Themed](iris_scene::node::NodeKind) node.
pub fn init_theming(node: &Rc<SceneNode>, hooks: Rc<dyn ThemeHooks>) -> Rc<ThemeAttachment> {
    assert!(
        node.is_themed(),
        "init_theming called for plain node {:?}",
        node.id()
    );
    let attachment = ThemeAttachment::of(node);
    let Some(extension) = attachment.extension() else {
        unreachable!("themed node attachment always carries an extension");
    };
    if extension.is_bound() {
        log::warn!("init_theming called twice for node {:?}", node.id());
        return attachment.clone();
    }
    extension.bind(node, hooks);
    attachment
}
