// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The backend surface trait and its supporting value types.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{BezPath, Point, Rect, Vec2};
use peniko::Color;

use glade_scene::ImageRef;

/// Error reported by a backend surface operation.
///
/// Backends are free to put anything in the message; the pipeline treats
/// the operation as failed, records it, and moves on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderError {
    /// Human-readable description of the failure.
    pub message: String,
}

impl RenderError {
    /// Creates an error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "render error: {}", self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RenderError {}

/// Stroke parameters for [`RenderSurface::stroke_path`], in screen pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Stroke width in pixels.
    pub width: f64,
    /// Dash pattern lengths in pixels; empty means solid.
    pub dash: Vec<f64>,
    /// Offset into the dash pattern.
    pub dash_phase: f64,
    /// Antialiasing hint. The selected pass turns this off for speed.
    pub antialias: bool,
}

impl StrokeStyle {
    /// A solid, antialiased stroke of the given pixel width.
    #[must_use]
    pub fn solid(width: f64) -> Self {
        Self {
            width,
            dash: Vec::new(),
            dash_phase: 0.0,
            antialias: true,
        }
    }
}

/// Outcome of [`RenderSurface::prepare_raster`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RasterStatus {
    /// A raster of the requested size was newly allocated.
    Allocated,
    /// The existing allocation already had the requested size and was kept.
    Reused,
}

/// A drawing backend consumed by the render pipeline.
///
/// All coordinates are screen pixels; the pipeline performs the world→screen
/// transform before calling in. Implementations range from real rasterizers
/// to the op recorder used in tests.
///
/// ## Raster contract
///
/// The surface owns one off-screen raster. Between
/// [`RenderSurface::begin_raster_pass`] and
/// [`RenderSurface::end_raster_pass`], draw operations target the raster;
/// otherwise they target the output. [`RenderSurface::blit_raster`]
/// composites the raster's current contents to the output at an offset.
/// The raster is never exposed for external mutation.
pub trait RenderSurface {
    /// Ensures the off-screen raster has exactly the given pixel size,
    /// reallocating only when the size differs.
    fn prepare_raster(&mut self, width: u32, height: u32) -> Result<RasterStatus, RenderError>;

    /// Routes subsequent draw operations into the raster.
    fn begin_raster_pass(&mut self) -> Result<(), RenderError>;

    /// Routes subsequent draw operations back to the output.
    fn end_raster_pass(&mut self) -> Result<(), RenderError>;

    /// Clears the current target to the backend's background color.
    fn clear(&mut self) -> Result<(), RenderError>;

    /// Composites the cached raster onto the output, shifted by `offset`
    /// pixels.
    fn blit_raster(&mut self, offset: Vec2) -> Result<(), RenderError>;

    /// Fills a path.
    fn fill_path(&mut self, path: &BezPath, color: Color) -> Result<(), RenderError>;

    /// Strokes a path.
    fn stroke_path(
        &mut self,
        path: &BezPath,
        style: &StrokeStyle,
        color: Color,
    ) -> Result<(), RenderError>;

    /// Draws a text run at a pixel origin with a pixel size.
    fn draw_text(
        &mut self,
        origin: Point,
        text: &str,
        size: f64,
        color: Color,
    ) -> Result<(), RenderError>;

    /// Draws an image stretched over a pixel rectangle.
    fn draw_image(&mut self, rect: Rect, image: &ImageRef) -> Result<(), RenderError>;
}
