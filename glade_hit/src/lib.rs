// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glade Hit: point/rectangle hit testing and selection resolution.
//!
//! This crate answers "what is under the pointer" and turns pointer
//! gestures into selection-flag updates on the scene graph. Selection state
//! lives entirely in [`NodeFlags::SELECTED`](glade_scene::NodeFlags); there
//! is no second container that could diverge from it.
//!
//! ## Picking model
//!
//! [`pick`] scans the direct children of a group from top-most (last drawn)
//! to bottom-most and returns the first whose geometry lies within a pixel
//! tolerance of the query point, converted into world units via the current
//! viewport scale. Group children are hit through any of their visible
//! descendants but are reported as themselves: the direct child is the
//! selection unit, matching how an editor treats a grouped object as one
//! thing.
//!
//! Geometry rules:
//! - Filled paths hit by winding; stroked paths by nearest-distance against
//!   the half stroke width plus the tolerance.
//! - Text and images hit by their bounds inflated by the tolerance.
//!
//! ## Selection resolution
//!
//! [`select_by_point`] and [`select_by_rect`] implement the usual gestures:
//! non-extending selection always collapses to the single hit (or clears on
//! a miss), extending selection toggles the hit or grows by rectangle. Both
//! report whether the selection actually changed so callers can skip
//! repaints and change notifications.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod pick;
mod select;

pub use pick::{pick, PickFilter};
pub use select::{select_by_point, select_by_rect, SelectionChange};
