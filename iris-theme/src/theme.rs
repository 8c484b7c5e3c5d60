//! The shared theme object.
//!
//! A [Theme] is identified by the `Rc` allocation that holds it, not
//! by its name: two themes with equal names are still different
//! themes, and "same theme" always means [Rc::ptr_eq]. Content (name,
//! version, parent link) can change in place; observers announce each
//! kind of change separately.
//!
//! Themes form their own parent chain, independent of the scene tree:
//! a node with a custom theme links that theme's parent to whatever
//! theme its scene ascendants provide, so style lookups can fall
//! through to the surrounding look.
//!
//! One default theme exists per thread, created lazily by
//! [Theme::default_theme]. Nodes outside any themed scope resolve to
//! it.

use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use iris_scene::observer::{ObserverList, Subscription};

/// Name the default theme starts with when nothing is configured.
pub const DEFAULT_THEME_NAME: &str = "default";

thread_local! {
    static DEFAULT_THEME: OnceCell<Rc<Theme>> = OnceCell::new();
}

/// Unique identifier of a [Theme], used for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThemeId(u64);

impl ThemeId {
    /// Generates a new unique theme id.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Default for ThemeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A mutable, shared theme.
///
/// Handled through `Rc<Theme>`; identity is the allocation. See the
/// [module docs](self) for the identity and parent chain rules.
pub struct Theme {
    id: ThemeId,
    name: RefCell<String>,
    version: Cell<u32>,
    parent: RefCell<Option<Rc<Theme>>>,
    name_changed: ObserverList<()>,
    version_changed: ObserverList<()>,
    parent_theme_changed: ObserverList<()>,
}

impl Theme {
    /// Creates a new theme with the given name, at version 1.
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Self::with_version(name, 1)
    }

    /// Creates a new theme with the given name and version.
    pub fn with_version(name: impl Into<String>, version: u32) -> Rc<Self> {
        Rc::new(Self {
            id: ThemeId::new(),
            name: RefCell::new(name.into()),
            version: Cell::new(version),
            parent: RefCell::new(None),
            name_changed: ObserverList::new(),
            version_changed: ObserverList::new(),
            parent_theme_changed: ObserverList::new(),
        })
    }

    /// Returns the default theme of the current thread, creating it on
    /// first use.
    ///
    /// Every call on the same thread returns the same instance.
    pub fn default_theme() -> Rc<Theme> {
        DEFAULT_THEME.with(|cell| cell.get_or_init(|| Theme::new(DEFAULT_THEME_NAME)).clone())
    }

    /// Returns the unique id of this theme.
    pub fn id(&self) -> ThemeId {
        self.id
    }

    /// Returns the current name.
    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    /// Returns the current version.
    pub fn version(&self) -> u32 {
        self.version.get()
    }

    /// Returns the parent theme, if one is linked.
    pub fn parent_theme(&self) -> Option<Rc<Theme>> {
        self.parent.borrow().clone()
    }

    /// Renames the theme in place and notifies name observers.
    ///
    /// Setting the current name again is a no-op. The theme keeps its
    /// identity; only content observers fire.
    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        if *self.name.borrow() == name {
            return;
        }
        log::debug!("theme {:?} renamed to {:?}", self.id, name);
        *self.name.borrow_mut() = name;
        self.name_changed.notify(&());
    }

    /// Sets the version and notifies version observers when it differs.
    pub fn set_version(&self, version: u32) {
        if self.version.get() == version {
            return;
        }
        self.version.set(version);
        self.version_changed.notify(&());
    }

    /// Increments the version by one and notifies version observers.
    pub fn bump_version(&self) {
        self.version.set(self.version.get() + 1);
        self.version_changed.notify(&());
    }

    /// Links this theme's fallback chain to `parent`.
    ///
    /// Linking a theme to itself is rejected with a warning. Re-linking
    /// to the current parent is a no-op; any real change notifies
    /// parent observers.
    pub fn set_parent_theme(self: &Rc<Self>, parent: Option<Rc<Theme>>) {
        if let Some(new_parent) = &parent {
            if Rc::ptr_eq(self, new_parent) {
                log::warn!("theme {:?} cannot be its own parent theme", self.id);
                return;
            }
        }
        let unchanged = match (&*self.parent.borrow(), &parent) {
            (Some(old), Some(new)) => Rc::ptr_eq(old, new),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        *self.parent.borrow_mut() = parent;
        self.parent_theme_changed.notify(&());
    }

    /// Notifies parent observers without touching the link.
    ///
    /// Used when the linked parent theme reloaded in place, so
    /// dependents re-read its content even though the link itself is
    /// unchanged.
    pub fn notify_parent_theme_changed(&self) {
        self.parent_theme_changed.notify(&());
    }

    /// Observes name changes.
    #[must_use = "dropping the subscription unsubscribes the observer"]
    pub fn observe_name(&self, observer: impl Fn(&()) + 'static) -> Subscription {
        self.name_changed.subscribe(observer)
    }

    /// Observes version changes.
    #[must_use = "dropping the subscription unsubscribes the observer"]
    pub fn observe_version(&self, observer: impl Fn(&()) + 'static) -> Subscription {
        self.version_changed.subscribe(observer)
    }

    /// Observes parent link changes and parent reload notifications.
    #[must_use = "dropping the subscription unsubscribes the observer"]
    pub fn observe_parent_theme(&self, observer: impl Fn(&()) + 'static) -> Subscription {
        self.parent_theme_changed.subscribe(observer)
    }
}

impl fmt::Debug for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Theme")
            .field("id", &self.id)
            .field("name", &*self.name.borrow())
            .field("version", &self.version.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_default_theme_is_one_instance_per_thread() {
        let first = Theme::default_theme();
        let second = Theme::default_theme();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_set_same_name_does_not_notify() {
        let theme = Theme::new("day");
        let fired = Rc::new(Cell::new(0));
        let count = fired.clone();
        let _sub = theme.observe_name(move |_| count.set(count.get() + 1));

        theme.set_name("day");
        assert_eq!(fired.get(), 0);

        theme.set_name("night");
        assert_eq!(fired.get(), 1);
        assert_eq!(theme.name(), "night");
    }

    #[test]
    fn test_bump_version_notifies() {
        let theme = Theme::with_version("day", 3);
        let fired = Rc::new(Cell::new(0));
        let count = fired.clone();
        let _sub = theme.observe_version(move |_| count.set(count.get() + 1));

        theme.bump_version();
        assert_eq!(theme.version(), 4);
        assert_eq!(fired.get(), 1);

        theme.set_version(4);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_self_parent_is_rejected() {
        let theme = Theme::new("day");
        theme.set_parent_theme(Some(theme.clone()));
        assert!(theme.parent_theme().is_none());
    }

    #[test]
    fn test_relink_same_parent_does_not_notify() {
        let theme = Theme::new("day");
        let parent = Theme::new("base");
        let fired = Rc::new(Cell::new(0));
        let count = fired.clone();
        let _sub = theme.observe_parent_theme(move |_| count.set(count.get() + 1));

        theme.set_parent_theme(Some(parent.clone()));
        theme.set_parent_theme(Some(parent.clone()));
        assert_eq!(fired.get(), 1);
        assert!(Rc::ptr_eq(&theme.parent_theme().unwrap(), &parent));
    }

    #[test]
    fn test_notify_parent_theme_changed_keeps_link() {
        let theme = Theme::new("day");
        let parent = Theme::new("base");
        theme.set_parent_theme(Some(parent.clone()));

        let fired = Rc::new(Cell::new(0));
        let count = fired.clone();
        let _sub = theme.observe_parent_theme(move |_| count.set(count.get() + 1));

        theme.notify_parent_theme_changed();
        assert_eq!(fired.get(), 1);
        assert!(Rc::ptr_eq(&theme.parent_theme().unwrap(), &parent));
    }

    #[test]
    fn test_identity_is_not_name_equality() {
        let first = Theme::new("day");
        let second = Theme::new("day");
        assert!(!Rc::ptr_eq(&first, &second));
        assert_ne!(first.id(), second.id());
    }
}
