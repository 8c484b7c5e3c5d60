#![warn(missing_docs)]

//! # iris theming
//!
//! Theme propagation for the iris scene tree => See the `iris` crate.
//!
//! Themes are shared, mutable objects ([theme::Theme]); nodes resolve
//! theirs from the tree around them. A themed node either inherits the
//! theme of its nearest themed ascendant or pins an explicit one, and
//! every identity change or content reload travels down the tree as a
//! [event::ThemeEvent], stopping at themed descendants that manage
//! their own subtrees.
//!
//! Start with [extension::init_theming] for raw scene nodes, or
//! [styled::StyledNode] for a node with theming already wired.

/// Contains the per-node theming state attached to scene nodes.
pub mod attachment;
/// Contains theme configuration from environment and TOML files.
pub mod config;
/// Contains the error types of this crate.
pub mod error;
/// Contains the theme change events.
pub mod event;
/// Contains the per-node theme state machine and its hooks.
pub mod extension;
/// Contains the event propagation engine and scope resolution.
pub mod propagation;
/// Contains a ready-made themed node type.
pub mod styled;
/// Contains the shared theme object and the default theme.
pub mod theme;
/// Contains live reload of theme configuration from a watched file.
#[cfg(feature = "watch")]
pub mod watch;
