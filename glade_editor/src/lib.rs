// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glade Editor: the interaction façade over the Glade component crates.
//!
//! [`Editor`] owns a [`SceneRoot`], a [`Viewport`], an undo history, and the
//! render pipeline, and exposes them behind one controller so the pieces
//! cannot drift apart: scene edits notify scene observers, scale changes
//! notify scale observers, and both notifications fire only after the state
//! is fully updated.
//!
//! ## Example
//!
//! ```rust
//! use glade_editor::Editor;
//! use glade_scene::{Layer, Node, Symbol};
//! use kurbo::{Point, Rect, Shape};
//!
//! let mut editor = Editor::new(800.0, 600.0);
//! let id = editor.add_node(
//!     Layer::Main,
//!     Node::path(Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1), Symbol::default()),
//!     false,
//! );
//! editor.push_undo("add square");
//!
//! // Click on the square's edge to select it.
//! let outcome = editor.click_select(Point::new(5.0, 0.0), false, 2.0);
//! assert_eq!(outcome.hit, Some(id));
//!
//! // Undo removes it again.
//! editor.undo().unwrap();
//! assert!(editor.scene().main().is_empty());
//! ```
//!
//! Continuous drags go through [`Editor::begin_gesture`] and
//! [`Editor::end_gesture`], which collapse any number of intermediate edits
//! into a single undo entry.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod editor;
mod error;

pub use editor::{Editor, NotifyGuard, ObserverId};
pub use error::EditorError;

// The façade's method signatures use these component types directly.
pub use glade_hit::SelectionChange;
pub use glade_render::{FrameReport, RenderSurface, Tool};
pub use glade_scene::{Layer, Node, NodeId, SceneRoot};
pub use glade_viewport::{ScaleChange, Viewport};
