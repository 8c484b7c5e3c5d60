//! Theme change events.

use std::rc::Rc;

use crate::theme::Theme;

/// Discriminant of a [ThemeEvent], for matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeEventKind {
    /// The effective theme identity changed.
    Updated,
    /// A theme's content changed; the identity stayed.
    Reloaded,
}

/// An event describing a theme change, delivered through the subtree
/// it affects.
///
/// Events are plain values; cloning one shares the `Rc` theme handles
/// rather than the themes themselves.
#[derive(Debug, Clone)]
pub enum ThemeEvent {
    /// The effective theme switched from `old` to `new`.
    Updated {
        /// Theme that was in effect before the change.
        old: Rc<Theme>,
        /// Theme now in effect.
        new: Rc<Theme>,
    },
    /// `theme` changed its content in place and dependents must
    /// re-read it.
    Reloaded {
        /// The theme that reloaded.
        theme: Rc<Theme>,
    },
}

impl ThemeEvent {
    /// Creates an identity change event.
    pub fn updated(old: Rc<Theme>, new: Rc<Theme>) -> Self {
        Self::Updated { old, new }
    }

    /// Creates a content reload event.
    pub fn reloaded(theme: Rc<Theme>) -> Self {
        Self::Reloaded { theme }
    }

    /// Returns the event discriminant.
    pub fn kind(&self) -> ThemeEventKind {
        match self {
            Self::Updated { .. } => ThemeEventKind::Updated,
            Self::Reloaded { .. } => ThemeEventKind::Reloaded,
        }
    }

    /// Returns the theme in effect before the change, for
    /// [ThemeEvent::Updated] events.
    pub fn old_theme(&self) -> Option<&Rc<Theme>> {
        match self {
            Self::Updated { old, .. } => Some(old),
            Self::Reloaded { .. } => None,
        }
    }

    /// Returns the theme carried by the event: the new theme of an
    /// update, or the reloaded theme.
    pub fn theme(&self) -> &Rc<Theme> {
        match self {
            Self::Updated { new, .. } => new,
            Self::Reloaded { theme } => theme,
        }
    }
}
