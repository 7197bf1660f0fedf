// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glade Render: a backend-agnostic render pipeline with a cached raster.
//!
//! This crate turns a [`SceneRoot`](glade_scene::SceneRoot) plus a
//! [`Viewport`](glade_viewport::Viewport) into draw operations on a
//! [`RenderSurface`]. It does not rasterize anything itself; concrete
//! backends (a GPU canvas, a CPU rasterizer, an SVG writer, a test
//! recorder) implement the surface trait.
//!
//! ## Frame structure
//!
//! A frame composites in two passes plus overlays:
//!
//! 1. **Normal pass**: background and main layers, drawn into an off-screen
//!    raster sized to the interior display area. The raster *allocation* is
//!    reused until the pixel dimensions change; its *contents* are reused
//!    until the scale or the scene changes. A pure pan therefore costs one
//!    offset blit, not an O(scene) repaint.
//! 2. **Selected pass**: only selected nodes, in a highlight style with
//!    antialiasing off, optionally pre-transformed by a caller-supplied
//!    affine so drag/scale tools can preview a transform without mutating
//!    the scene.
//! 3. A dashed box around the union of the selected bounds.
//! 4. [`Tool`] hooks: `draw_background` may take over the base pass
//!    entirely; `draw_overlay` contributes on top.
//!
//! If the main layer has no visible nodes, a centered placeholder string is
//! drawn instead of an empty canvas.
//!
//! ## Failure isolation
//!
//! Every surface call is fallible. A failing node draw or tool hook is
//! recorded in the [`FrameReport`] and the frame continues degraded; the
//! next frame is unaffected. The pipeline never panics on a backend error.
//!
//! The cached raster is owned by the pipeline's surface and is never handed
//! out for external mutation; tools that want to reuse it read it through
//! [`RenderSurface::blit_raster`] only.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod pipeline;
mod recording;
mod surface;

pub use pipeline::{BasePass, FrameError, FrameReport, FrameStage, RenderPipeline, Tool};
pub use recording::{RecordedOp, RecordingSurface};
pub use surface::{RasterStatus, RenderError, RenderSurface, StrokeStyle};
