// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A reference [`RenderSurface`] that records draw operations instead of
//! rasterizing, for tests and pipeline debugging.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{BezPath, Point, Rect, Shape, Vec2};
use peniko::Color;

use glade_scene::ImageRef;

use crate::surface::{RasterStatus, RenderError, RenderSurface, StrokeStyle};

/// One recorded surface operation.
///
/// Geometry is reduced to its screen-space bounding box so assertions stay
/// readable; the full path data is not kept.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedOp {
    /// The raster was sized (or re-sized) to the given pixel dimensions.
    PrepareRaster {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// Draw operations started targeting the raster.
    BeginRasterPass,
    /// Draw operations returned to the output.
    EndRasterPass,
    /// The current target was cleared.
    Clear {
        /// Whether the raster (rather than the output) was the target.
        to_raster: bool,
    },
    /// The raster was composited onto the output.
    BlitRaster {
        /// Pixel offset of the composite.
        offset: Vec2,
    },
    /// A path was filled.
    FillPath {
        /// Whether the raster was the target.
        to_raster: bool,
        /// Screen-space bounding box of the path.
        bounds: Rect,
        /// Fill color.
        color: Color,
    },
    /// A path was stroked.
    StrokePath {
        /// Whether the raster was the target.
        to_raster: bool,
        /// Screen-space bounding box of the path.
        bounds: Rect,
        /// Stroke width in pixels.
        width: f64,
        /// Whether a dash pattern was in effect.
        dashed: bool,
        /// Antialiasing hint.
        antialias: bool,
        /// Stroke color.
        color: Color,
    },
    /// A text run was drawn.
    DrawText {
        /// Whether the raster was the target.
        to_raster: bool,
        /// Pixel origin of the run.
        origin: Point,
        /// The text content.
        text: String,
        /// Text size in pixels.
        size: f64,
        /// Text color.
        color: Color,
    },
    /// An image was drawn.
    DrawImage {
        /// Whether the raster was the target.
        to_raster: bool,
        /// Destination rectangle in pixels.
        rect: Rect,
    },
}

/// A [`RenderSurface`] that appends every call to an op list.
///
/// Failure injection flips individual operation kinds into errors so tests
/// can exercise the pipeline's degraded paths.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<RecordedOp>,
    raster_size: Option<(u32, u32)>,
    in_raster_pass: bool,
    fail_fill_paths: bool,
    fail_draw_text: bool,
}

impl RecordingSurface {
    /// Creates an empty recording surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded operations in call order.
    #[must_use]
    pub fn ops(&self) -> &[RecordedOp] {
        &self.ops
    }

    /// Clears the op list, keeping the raster allocation state.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Returns the current raster allocation, if any.
    #[must_use]
    pub fn raster_size(&self) -> Option<(u32, u32)> {
        self.raster_size
    }

    /// Makes every subsequent `fill_path` call fail.
    pub fn fail_fill_paths(&mut self, fail: bool) {
        self.fail_fill_paths = fail;
    }

    /// Makes every subsequent `draw_text` call fail.
    pub fn fail_draw_text(&mut self, fail: bool) {
        self.fail_draw_text = fail;
    }
}

impl RenderSurface for RecordingSurface {
    fn prepare_raster(&mut self, width: u32, height: u32) -> Result<RasterStatus, RenderError> {
        self.ops.push(RecordedOp::PrepareRaster { width, height });
        if self.raster_size == Some((width, height)) {
            Ok(RasterStatus::Reused)
        } else {
            self.raster_size = Some((width, height));
            Ok(RasterStatus::Allocated)
        }
    }

    fn begin_raster_pass(&mut self) -> Result<(), RenderError> {
        self.ops.push(RecordedOp::BeginRasterPass);
        self.in_raster_pass = true;
        Ok(())
    }

    fn end_raster_pass(&mut self) -> Result<(), RenderError> {
        self.ops.push(RecordedOp::EndRasterPass);
        self.in_raster_pass = false;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        self.ops.push(RecordedOp::Clear {
            to_raster: self.in_raster_pass,
        });
        Ok(())
    }

    fn blit_raster(&mut self, offset: Vec2) -> Result<(), RenderError> {
        if self.raster_size.is_none() {
            return Err(RenderError::new("blit without a prepared raster"));
        }
        self.ops.push(RecordedOp::BlitRaster { offset });
        Ok(())
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) -> Result<(), RenderError> {
        if self.fail_fill_paths {
            return Err(RenderError::new("injected fill failure"));
        }
        self.ops.push(RecordedOp::FillPath {
            to_raster: self.in_raster_pass,
            bounds: path.bounding_box(),
            color,
        });
        Ok(())
    }

    fn stroke_path(
        &mut self,
        path: &BezPath,
        style: &StrokeStyle,
        color: Color,
    ) -> Result<(), RenderError> {
        self.ops.push(RecordedOp::StrokePath {
            to_raster: self.in_raster_pass,
            bounds: path.bounding_box(),
            width: style.width,
            dashed: !style.dash.is_empty(),
            antialias: style.antialias,
            color,
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        origin: Point,
        text: &str,
        size: f64,
        color: Color,
    ) -> Result<(), RenderError> {
        if self.fail_draw_text {
            return Err(RenderError::new("injected text failure"));
        }
        self.ops.push(RecordedOp::DrawText {
            to_raster: self.in_raster_pass,
            origin,
            text: String::from(text),
            size,
            color,
        });
        Ok(())
    }

    fn draw_image(&mut self, rect: Rect, image: &ImageRef) -> Result<(), RenderError> {
        let _ = image;
        self.ops.push(RecordedOp::DrawImage {
            to_raster: self.in_raster_pass,
            rect,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_raster_reports_reuse_for_same_size() {
        let mut surface = RecordingSurface::new();
        assert_eq!(surface.prepare_raster(64, 48), Ok(RasterStatus::Allocated));
        assert_eq!(surface.prepare_raster(64, 48), Ok(RasterStatus::Reused));
        assert_eq!(surface.prepare_raster(64, 64), Ok(RasterStatus::Allocated));
    }

    #[test]
    fn ops_track_the_current_target() {
        let mut surface = RecordingSurface::new();
        surface.begin_raster_pass().unwrap();
        surface.clear().unwrap();
        surface.end_raster_pass().unwrap();
        surface.clear().unwrap();

        assert_eq!(
            surface.ops(),
            [
                RecordedOp::BeginRasterPass,
                RecordedOp::Clear { to_raster: true },
                RecordedOp::EndRasterPass,
                RecordedOp::Clear { to_raster: false },
            ]
        );
    }

    #[test]
    fn blit_without_raster_fails() {
        let mut surface = RecordingSurface::new();
        assert!(surface.blit_raster(Vec2::ZERO).is_err());
    }
}
