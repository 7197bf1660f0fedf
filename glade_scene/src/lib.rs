// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glade Scene: a layered scene graph for interactive 2D editors.
//!
//! This crate owns the document model of the Glade engine: an ordered tree
//! of drawable nodes grouped into three fixed layers.
//!
//! - **Background**: rendered first, not user-editable.
//! - **Main**: the user-editable content; the only layer that participates
//!   in selection and undo/redo.
//! - **Foreground**: ephemeral tool overlays; may be cleared freely.
//!
//! Nodes are a closed set of variants ([`Geometry::Path`],
//! [`Geometry::Text`], [`Geometry::Image`], and [`Group`]) dispatched through
//! plain `match`es rather than open-ended trait objects. Each node carries
//! [`NodeFlags`] (visible / selectable / selected), an immutable [`Symbol`]
//! style descriptor, and an optional display name.
//!
//! ## Bounds semantics
//!
//! A node's bounds are reported in world units as `Option<Rect>`:
//! - A leaf with empty geometry has no bounds.
//! - A group's bounds are the union of its *visible* children's bounds, or
//!   `None` if it has no visible child.
//! - A `None`-bounds node is treated as "fully visible" by consumers so that
//!   empty content never forces a spurious viewport change.
//!
//! ## Minimal example
//!
//! ```rust
//! use glade_scene::{Layer, Node, SceneRoot, Symbol};
//! use kurbo::{BezPath, Point, Rect, Shape};
//!
//! let mut scene = SceneRoot::new();
//! let path = Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1);
//! let id = scene.insert(Layer::Main, Node::path(path, Symbol::default()));
//!
//! assert_eq!(scene.main().len(), 1);
//! assert!(scene.visible_bounds().is_some());
//! # let _ = id;
//! ```
//!
//! Selection state lives directly in node flags; there is no second
//! container that could diverge from them. The [`SceneRoot::revision`]
//! counter bumps on every mutation so observers can cheaply detect change.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod node;
mod root;
mod types;

pub use node::{Geometry, Group, Node, NodeKind};
pub use root::{Layer, SceneRoot};
pub use types::{ImageRef, NodeFlags, NodeId, Symbol};
