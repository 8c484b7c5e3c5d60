#![warn(missing_docs)]

//! Scene-tree theming core for the iris UI toolkit.
//!
//! Nodes of a mutable scene tree resolve their look from the tree
//! around them: a themed node inherits the theme of its nearest themed
//! ascendant, or pins an explicit one, and every theme change travels
//! down the tree as an event. This crate re-exports the scene
//! substrate and the theming protocol that implement that model.

pub use iris_scene as scene;
pub use iris_theme as theming;

/// A "prelude" for users of the iris theming core.
///
/// Importing this module brings into scope the most common types
/// needed to build and theme a scene tree.
///
/// ```rust
/// use iris::prelude::*;
/// ```
pub mod prelude {
    pub use crate::scene::dispatch::{self, DispatchMetrics, Priority};
    pub use crate::scene::node::{NodeId, NodeKind, SceneNode};
    pub use crate::scene::observer::{ObserverList, Subscription};

    pub use crate::theming::attachment::ThemeAttachment;
    pub use crate::theming::config::ThemingConfig;
    pub use crate::theming::error::{ThemingError, ThemingResult};
    pub use crate::theming::event::{ThemeEvent, ThemeEventKind};
    pub use crate::theming::extension::{init_theming, ThemeExtension, ThemeHooks, ThemeMode};
    pub use crate::theming::propagation;
    pub use crate::theming::styled::StyledNode;
    pub use crate::theming::theme::{Theme, ThemeId};

    #[cfg(feature = "watch")]
    pub use crate::theming::watch::ThemeConfigWatcher;
}
