// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glade Viewport: pan/zoom state and world↔screen conversion.
//!
//! This crate provides a small, headless model of a world-space view shown
//! through a pixel display surface. It focuses on:
//! - Viewport state: a scale factor (screen pixels per world unit) and a
//!   top-left world anchor.
//! - Coordinate conversion between world space (Y up) and screen space
//!   (Y down), honoring edge insets.
//! - Pan, zoom (display-center- or anchor-point-fixed), zoom-to-rect, and
//!   fit-to-content.
//!
//! It does **not** own a scene graph or rendering backend. Callers maintain
//! their own scene, derive content bounds from it, and hand those to
//! [`Viewport::fit_to_content`]. Scale-affecting operations return a
//! [`ScaleChange`] describing the new state; the layer that owns observer
//! channels (the editor façade) dispatches it after the state is updated, so
//! listeners never observe a stale scale.
//!
//! ## Minimal example
//!
//! ```rust
//! use glade_viewport::Viewport;
//! use kurbo::{Point, Rect};
//!
//! let mut view = Viewport::new(800.0, 600.0);
//! view.fit_to_content(Rect::new(0.0, 0.0, 100.0, 100.0), 0.02);
//!
//! // Convert a screen point into world space (for hit testing, etc.).
//! let world = view.screen_to_world(Point::new(400.0, 300.0));
//! let back = view.world_to_screen(world);
//! assert!((back.x - 400.0).abs() < 1e-9);
//! ```
//!
//! ## Design notes
//!
//! - The camera is axis-aligned with a uniform scale; rotation is out of
//!   scope.
//! - The scale is clamped into a configurable `[min, max]` range; requests
//!   that are non-finite or non-positive are corrected locally and never
//!   propagate as errors.
//! - World Y increases upward while screen Y increases downward; the anchor
//!   `(x0, y0)` is the world point at the top-left corner of the interior
//!   (inset-excluded) display area.
//!
//! This crate is `no_std`.

#![no_std]

mod viewport;

pub use viewport::{ScaleChange, Viewport, ViewportDebugInfo, DEFAULT_PPI, MIN_SCALE};
