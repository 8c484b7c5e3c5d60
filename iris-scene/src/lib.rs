#![warn(missing_docs)]

//! Scene tree substrate for iris => See the `iris` crate.
//!
//! This crate hosts the pieces the theming layer builds on: the
//! mutable [node::SceneNode] tree, the [observer] primitives used for
//! change notification, and the per-thread deferred [dispatch] queue.

/// Contains the per-thread deferred dispatch queue.
pub mod dispatch;
/// Contains the scene tree node structure.
pub mod node;
/// Contains observer lists with scoped unsubscription.
pub mod observer;
