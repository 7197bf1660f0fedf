// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame pipeline: scene traversal, the cached base raster, the
//! selected-node overlay pass, and tool hooks.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, Point, Shape, Vec2};
use peniko::Color;
use smallvec::SmallVec;

use glade_scene::{Geometry, Group, Node, NodeId, NodeKind, SceneRoot, Symbol};
use glade_viewport::Viewport;

use crate::surface::{RasterStatus, RenderError, RenderSurface, StrokeStyle};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Pixel size of the placeholder text shown for an empty main layer.
const PLACEHOLDER_SIZE: f64 = 16.0;

/// Pixel margin between selected content and the dashed selection box.
const SELECTION_BOX_MARGIN: f64 = 2.0;

/// How the base pass was produced this frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BasePass {
    /// The raster was repainted from the scene and blitted.
    Repainted,
    /// The raster contents were still valid; only an offset blit happened.
    Reused,
    /// A tool's `draw_background` took over and the raster was untouched.
    Tool,
    /// The interior display area was empty; nothing was drawn.
    Skipped,
}

/// The frame stage in which a failure occurred.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameStage {
    /// Clearing, raster management, or the blit.
    Base,
    /// Drawing a scene node in the base or foreground pass.
    Node,
    /// Drawing the empty-content placeholder.
    Placeholder,
    /// Drawing a selected node in the overlay pass.
    Selected,
    /// Drawing the dashed selection box.
    SelectionBox,
    /// A tool's `draw_background` hook.
    ToolBackground,
    /// A tool's `draw_overlay` hook.
    ToolOverlay,
}

/// One recorded failure from a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameError {
    /// Where in the frame the failure occurred.
    pub stage: FrameStage,
    /// The node being drawn, when the stage involves one.
    pub node: Option<NodeId>,
    /// The underlying surface error.
    pub error: RenderError,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Some(id) => write!(
                f,
                "{:?} stage failed at node {}: {}",
                self.stage,
                id.to_raw(),
                self.error
            ),
            None => write!(f, "{:?} stage failed: {}", self.stage, self.error),
        }
    }
}

/// Outcome of one frame.
///
/// A frame never aborts on a surface error; failures are collected here and
/// the rest of the frame continues degraded.
#[derive(Clone, Debug)]
pub struct FrameReport {
    /// How the base pass was produced.
    pub base: BasePass,
    /// Number of leaf nodes drawn across all passes.
    pub nodes_drawn: usize,
    /// Failures recorded during the frame, in occurrence order.
    pub errors: SmallVec<[FrameError; 4]>,
}

impl FrameReport {
    /// Returns `true` if the frame completed without any failure.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Per-frame drawing hooks for interactive tools.
///
/// Both hooks draw directly to the output in screen pixels; the cached base
/// raster is not exposed.
pub trait Tool {
    /// Draws the frame background instead of the normal base pass.
    ///
    /// Return `Ok(true)` to take over; the default declines.
    fn draw_background(
        &mut self,
        surface: &mut dyn RenderSurface,
        viewport: &Viewport,
    ) -> Result<bool, RenderError> {
        let _ = (surface, viewport);
        Ok(false)
    }

    /// Draws on top of everything else.
    fn draw_overlay(
        &mut self,
        surface: &mut dyn RenderSurface,
        viewport: &Viewport,
    ) -> Result<(), RenderError> {
        let _ = (surface, viewport);
        Ok(())
    }
}

/// Cache key for the base raster contents.
#[derive(Clone, Debug)]
struct RasterCache {
    width: u32,
    height: u32,
    scale: f64,
    anchor: Point,
    scene_revision: u64,
}

/// The render pipeline.
///
/// Owns the raster cache key and the frame policy; the raster itself lives
/// in the surface. See the crate docs for the frame structure.
#[derive(Debug)]
pub struct RenderPipeline {
    cache: Option<RasterCache>,
    placeholder: String,
    highlight: Color,
}

impl RenderPipeline {
    /// Creates a pipeline with the default placeholder text and highlight
    /// color.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: None,
            placeholder: String::from("Nothing to show"),
            highlight: Color::new([1.0, 0.25, 0.0, 1.0]),
        }
    }

    /// Sets the text drawn when the main layer has no visible content.
    pub fn set_placeholder_text(&mut self, text: impl Into<String>) {
        self.placeholder = text.into();
        self.cache = None;
    }

    /// Sets the color used for the selected pass and the selection box.
    pub fn set_highlight_color(&mut self, color: Color) {
        self.highlight = color;
    }

    /// Drops the cached raster contents, forcing a repaint next frame.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Renders one frame.
    ///
    /// `preview` is applied in world space to selected nodes and the
    /// selection box only, so drag and scale tools can show a transform
    /// without touching the scene.
    pub fn render(
        &mut self,
        surface: &mut dyn RenderSurface,
        scene: &SceneRoot,
        viewport: &Viewport,
        mut tool: Option<&mut dyn Tool>,
        preview: Option<Affine>,
    ) -> FrameReport {
        let mut errors = SmallVec::new();
        let mut nodes_drawn = 0;
        let preview = preview.unwrap_or(Affine::IDENTITY);

        if let Err(error) = surface.clear() {
            errors.push(FrameError {
                stage: FrameStage::Base,
                node: None,
                error,
            });
        }

        let mut base = None;
        if let Some(t) = tool.as_deref_mut() {
            match t.draw_background(surface, viewport) {
                Ok(true) => base = Some(BasePass::Tool),
                Ok(false) => {}
                Err(error) => errors.push(FrameError {
                    stage: FrameStage::ToolBackground,
                    node: None,
                    error,
                }),
            }
        }
        let base = match base {
            Some(base) => base,
            None => self.base_pass(surface, scene, viewport, &mut errors, &mut nodes_drawn),
        };

        // Foreground overlays are ephemeral and never cached.
        self.draw_group(
            surface,
            scene.layer(glade_scene::Layer::Foreground),
            viewport,
            Affine::IDENTITY,
            None,
            FrameStage::Node,
            &mut errors,
            &mut nodes_drawn,
        );

        self.draw_selected(
            surface,
            scene.main(),
            viewport,
            preview,
            &mut errors,
            &mut nodes_drawn,
        );
        self.draw_selection_box(surface, scene, viewport, preview, &mut errors);

        if let Some(t) = tool.as_deref_mut() {
            if let Err(error) = t.draw_overlay(surface, viewport) {
                errors.push(FrameError {
                    stage: FrameStage::ToolOverlay,
                    node: None,
                    error,
                });
            }
        }

        FrameReport {
            base,
            nodes_drawn,
            errors,
        }
    }

    /// Produces the base raster: reuse, pan blit, or full repaint.
    fn base_pass(
        &mut self,
        surface: &mut dyn RenderSurface,
        scene: &SceneRoot,
        viewport: &Viewport,
        errors: &mut SmallVec<[FrameError; 4]>,
        nodes_drawn: &mut usize,
    ) -> BasePass {
        let (iw, ih) = viewport.interior_size();
        let width = pixel_dim(iw);
        let height = pixel_dim(ih);
        if width == 0 || height == 0 {
            self.cache = None;
            return BasePass::Skipped;
        }

        let status = match surface.prepare_raster(width, height) {
            Ok(status) => status,
            Err(error) => {
                errors.push(FrameError {
                    stage: FrameStage::Base,
                    node: None,
                    error,
                });
                self.cache = None;
                return BasePass::Skipped;
            }
        };

        let scale = viewport.scale();
        let anchor = viewport.anchor();

        // Contents are valid when the allocation, scale, and scene all
        // match; the anchor may differ, which a blit offset absorbs.
        let blit_offset = match (&self.cache, status) {
            (Some(cache), RasterStatus::Reused)
                if cache.width == width
                    && cache.height == height
                    && (cache.scale - scale).abs() < f64::EPSILON
                    && cache.scene_revision == scene.revision() =>
            {
                Some(Vec2::new(
                    (cache.anchor.x - anchor.x) * scale,
                    (anchor.y - cache.anchor.y) * scale,
                ))
            }
            _ => None,
        };

        if let Some(offset) = blit_offset {
            if let Err(error) = surface.blit_raster(offset) {
                errors.push(FrameError {
                    stage: FrameStage::Base,
                    node: None,
                    error,
                });
            }
            return BasePass::Reused;
        }

        let failed_before = errors.len();
        if let Err(error) = surface.begin_raster_pass() {
            errors.push(FrameError {
                stage: FrameStage::Base,
                node: None,
                error,
            });
            self.cache = None;
            return BasePass::Skipped;
        }
        if let Err(error) = surface.clear() {
            errors.push(FrameError {
                stage: FrameStage::Base,
                node: None,
                error,
            });
        }

        self.draw_group(
            surface,
            scene.layer(glade_scene::Layer::Background),
            viewport,
            Affine::IDENTITY,
            None,
            FrameStage::Node,
            errors,
            nodes_drawn,
        );
        if scene.main().any_visible() {
            self.draw_group(
                surface,
                scene.main(),
                viewport,
                Affine::IDENTITY,
                None,
                FrameStage::Node,
                errors,
                nodes_drawn,
            );
        } else {
            self.draw_placeholder(surface, viewport, errors);
        }

        if let Err(error) = surface.end_raster_pass() {
            errors.push(FrameError {
                stage: FrameStage::Base,
                node: None,
                error,
            });
        }
        if let Err(error) = surface.blit_raster(Vec2::ZERO) {
            errors.push(FrameError {
                stage: FrameStage::Base,
                node: None,
                error,
            });
        }

        // A degraded raster must not be reused as if it were complete.
        if errors.len() > failed_before {
            self.cache = None;
        } else {
            self.cache = Some(RasterCache {
                width,
                height,
                scale,
                anchor,
                scene_revision: scene.revision(),
            });
        }
        BasePass::Repainted
    }

    fn draw_placeholder(
        &self,
        surface: &mut dyn RenderSurface,
        viewport: &Viewport,
        errors: &mut SmallVec<[FrameError; 4]>,
    ) {
        let (iw, ih) = viewport.interior_size();
        let insets = viewport.insets();
        let advance = self.placeholder.chars().count() as f64 * PLACEHOLDER_SIZE * 0.5;
        let origin = Point::new(
            insets.x0 + (iw - advance) / 2.0,
            insets.y0 + ih / 2.0,
        );
        let gray = Color::new([0.5, 0.5, 0.5, 1.0]);
        if let Err(error) = surface.draw_text(origin, &self.placeholder, PLACEHOLDER_SIZE, gray) {
            errors.push(FrameError {
                stage: FrameStage::Placeholder,
                node: None,
                error,
            });
        }
    }

    /// Draws the visible nodes of a group in order, bottom-most first.
    fn draw_group(
        &self,
        surface: &mut dyn RenderSurface,
        group: &Group,
        viewport: &Viewport,
        preview: Affine,
        highlight: Option<Color>,
        stage: FrameStage,
        errors: &mut SmallVec<[FrameError; 4]>,
        nodes_drawn: &mut usize,
    ) {
        for node in group.children() {
            if !node.is_visible() {
                continue;
            }
            match node.kind() {
                NodeKind::Leaf { geometry, symbol } => {
                    match self.draw_leaf(surface, viewport, geometry, symbol, preview, highlight) {
                        Ok(()) => *nodes_drawn += 1,
                        Err(error) => errors.push(FrameError {
                            stage,
                            node: Some(node.id()),
                            error,
                        }),
                    }
                }
                NodeKind::Group(inner) => self.draw_group(
                    surface,
                    inner,
                    viewport,
                    preview,
                    highlight,
                    stage,
                    errors,
                    nodes_drawn,
                ),
            }
        }
    }

    /// Draws selected nodes only, in the highlight style. A selected group
    /// highlights its whole subtree; unselected groups are descended into.
    fn draw_selected(
        &self,
        surface: &mut dyn RenderSurface,
        group: &Group,
        viewport: &Viewport,
        preview: Affine,
        errors: &mut SmallVec<[FrameError; 4]>,
        nodes_drawn: &mut usize,
    ) {
        for node in group.children() {
            if !node.is_visible() {
                continue;
            }
            if node.is_selected() {
                self.draw_node_highlighted(surface, node, viewport, preview, errors, nodes_drawn);
            } else if let Some(inner) = node.as_group() {
                self.draw_selected(surface, inner, viewport, preview, errors, nodes_drawn);
            }
        }
    }

    fn draw_node_highlighted(
        &self,
        surface: &mut dyn RenderSurface,
        node: &Node,
        viewport: &Viewport,
        preview: Affine,
        errors: &mut SmallVec<[FrameError; 4]>,
        nodes_drawn: &mut usize,
    ) {
        match node.kind() {
            NodeKind::Leaf { geometry, symbol } => {
                match self.draw_leaf(
                    surface,
                    viewport,
                    geometry,
                    symbol,
                    preview,
                    Some(self.highlight),
                ) {
                    Ok(()) => *nodes_drawn += 1,
                    Err(error) => errors.push(FrameError {
                        stage: FrameStage::Selected,
                        node: Some(node.id()),
                        error,
                    }),
                }
            }
            NodeKind::Group(inner) => self.draw_group(
                surface,
                inner,
                viewport,
                preview,
                Some(self.highlight),
                FrameStage::Selected,
                errors,
                nodes_drawn,
            ),
        }
    }

    /// Draws one leaf. `preview` applies in world space before the viewport
    /// transform; `highlight` overrides colors and disables antialiasing.
    fn draw_leaf(
        &self,
        surface: &mut dyn RenderSurface,
        viewport: &Viewport,
        geometry: &Geometry,
        symbol: &Symbol,
        preview: Affine,
        highlight: Option<Color>,
    ) -> Result<(), RenderError> {
        let transform = screen_transform(viewport) * preview;
        let scale = viewport.scale();
        match geometry {
            Geometry::Path(path) => {
                let screen_path = transform * path.clone();
                if let Some(fill) = symbol.fill {
                    surface.fill_path(&screen_path, highlight.unwrap_or(fill))?;
                }
                if symbol.stroke_width > 0.0 {
                    let style = stroke_style(symbol, scale, highlight.is_none());
                    surface.stroke_path(
                        &screen_path,
                        &style,
                        highlight.unwrap_or(symbol.stroke),
                    )?;
                }
                Ok(())
            }
            Geometry::Text { anchor, text, size } => {
                let origin = transform * *anchor;
                surface.draw_text(
                    origin,
                    text,
                    size * scale,
                    highlight.unwrap_or(symbol.stroke),
                )
            }
            Geometry::Image { rect, image } => {
                let screen_rect = transform.transform_rect_bbox(*rect);
                match highlight {
                    // Selected images get an outline rather than a repaint.
                    Some(color) => {
                        let style = StrokeStyle {
                            width: 1.0,
                            dash: Vec::new(),
                            dash_phase: 0.0,
                            antialias: false,
                        };
                        surface.stroke_path(&screen_rect.to_path(0.1), &style, color)
                    }
                    None => surface.draw_image(screen_rect, image),
                }
            }
        }
    }

    fn draw_selection_box(
        &self,
        surface: &mut dyn RenderSurface,
        scene: &SceneRoot,
        viewport: &Viewport,
        preview: Affine,
        errors: &mut SmallVec<[FrameError; 4]>,
    ) {
        let Some(bounds) = scene.selected_bounds() else {
            return;
        };
        let world = preview.transform_rect_bbox(bounds);
        let screen = screen_transform(viewport)
            .transform_rect_bbox(world)
            .inflate(SELECTION_BOX_MARGIN, SELECTION_BOX_MARGIN);
        let style = StrokeStyle {
            width: 1.0,
            dash: alloc::vec![4.0, 4.0],
            dash_phase: 0.0,
            antialias: false,
        };
        if let Err(error) = surface.stroke_path(&screen.to_path(0.1), &style, self.highlight) {
            errors.push(FrameError {
                stage: FrameStage::SelectionBox,
                node: None,
                error,
            });
        }
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Rounds a pixel dimension to an integer raster size.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the value is clamped to the u32 range first"
)]
fn pixel_dim(value: f64) -> u32 {
    value.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// The world→screen affine for the current viewport state.
fn screen_transform(viewport: &Viewport) -> Affine {
    let s = viewport.scale();
    let anchor = viewport.anchor();
    let insets = viewport.insets();
    Affine::new([
        s,
        0.0,
        0.0,
        -s,
        insets.x0 - s * anchor.x,
        insets.y0 + s * anchor.y,
    ])
}

/// Converts a symbol's stroke parameters into pixel units.
fn stroke_style(symbol: &Symbol, scale: f64, antialias: bool) -> StrokeStyle {
    let factor = if symbol.scale_invariant { 1.0 } else { scale };
    StrokeStyle {
        width: symbol.stroke_width * factor,
        dash: symbol.dash.iter().map(|d| d * factor).collect(),
        dash_phase: symbol.dash_phase * factor,
        antialias,
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use glade_scene::Layer;
    use kurbo::Rect;

    use crate::recording::{RecordedOp, RecordingSurface};

    use super::*;

    fn square_scene() -> (SceneRoot, NodeId) {
        let mut scene = SceneRoot::new();
        let id = scene.insert(
            Layer::Main,
            Node::path(
                Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1),
                Symbol::default(),
            ),
        );
        (scene, id)
    }

    fn output_strokes(surface: &RecordingSurface) -> Vec<&RecordedOp> {
        surface
            .ops()
            .iter()
            .filter(|op| matches!(op, RecordedOp::StrokePath { to_raster: false, .. }))
            .collect()
    }

    #[test]
    fn first_frame_repaints_then_pure_pan_blits() {
        let (scene, _) = square_scene();
        let mut view = Viewport::new(100.0, 100.0);
        let mut pipeline = RenderPipeline::new();
        let mut surface = RecordingSurface::new();

        let report = pipeline.render(&mut surface, &scene, &view, None, None);
        assert_eq!(report.base, BasePass::Repainted);
        assert!(report.is_clean());
        assert_eq!(report.nodes_drawn, 1);

        surface.clear_ops();
        view.pan(5.0, -3.0);
        let report = pipeline.render(&mut surface, &scene, &view, None, None);
        assert_eq!(report.base, BasePass::Reused);

        // No raster pass happened; the old contents were shifted into place.
        assert!(!surface.ops().contains(&RecordedOp::BeginRasterPass));
        assert!(surface.ops().contains(&RecordedOp::BlitRaster {
            offset: Vec2::new(-5.0, -3.0),
        }));
    }

    #[test]
    fn scale_change_invalidates_raster_contents() {
        let (scene, _) = square_scene();
        let mut view = Viewport::new(100.0, 100.0);
        let mut pipeline = RenderPipeline::new();
        let mut surface = RecordingSurface::new();

        let _ = pipeline.render(&mut surface, &scene, &view, None, None);
        let _ = view.zoom(2.0);
        let report = pipeline.render(&mut surface, &scene, &view, None, None);
        assert_eq!(report.base, BasePass::Repainted);
    }

    #[test]
    fn scene_change_invalidates_raster_contents() {
        let (mut scene, _) = square_scene();
        let view = Viewport::new(100.0, 100.0);
        let mut pipeline = RenderPipeline::new();
        let mut surface = RecordingSurface::new();

        let _ = pipeline.render(&mut surface, &scene, &view, None, None);
        scene.insert(
            Layer::Main,
            Node::path(
                Rect::new(20.0, 0.0, 30.0, 10.0).to_path(0.1),
                Symbol::default(),
            ),
        );
        let report = pipeline.render(&mut surface, &scene, &view, None, None);
        assert_eq!(report.base, BasePass::Repainted);
    }

    #[test]
    fn display_resize_reallocates_the_raster() {
        let (scene, _) = square_scene();
        let mut view = Viewport::new(100.0, 100.0);
        let mut pipeline = RenderPipeline::new();
        let mut surface = RecordingSurface::new();

        let _ = pipeline.render(&mut surface, &scene, &view, None, None);
        surface.clear_ops();
        view.set_display_size(200.0, 120.0);
        let report = pipeline.render(&mut surface, &scene, &view, None, None);

        assert_eq!(report.base, BasePass::Repainted);
        assert!(surface.ops().contains(&RecordedOp::PrepareRaster {
            width: 200,
            height: 120,
        }));
        assert_eq!(surface.raster_size(), Some((200, 120)));
    }

    #[test]
    fn unchanged_frame_blits_with_zero_offset() {
        let (scene, _) = square_scene();
        let view = Viewport::new(100.0, 100.0);
        let mut pipeline = RenderPipeline::new();
        let mut surface = RecordingSurface::new();

        let _ = pipeline.render(&mut surface, &scene, &view, None, None);
        surface.clear_ops();
        let report = pipeline.render(&mut surface, &scene, &view, None, None);

        assert_eq!(report.base, BasePass::Reused);
        assert!(surface.ops().contains(&RecordedOp::BlitRaster {
            offset: Vec2::ZERO,
        }));
    }

    #[test]
    fn empty_main_layer_draws_placeholder() {
        let scene = SceneRoot::new();
        let view = Viewport::new(100.0, 100.0);
        let mut pipeline = RenderPipeline::new();
        let mut surface = RecordingSurface::new();

        let report = pipeline.render(&mut surface, &scene, &view, None, None);
        assert!(report.is_clean());

        let drew_placeholder = surface.ops().iter().any(|op| {
            matches!(
                op,
                RecordedOp::DrawText { to_raster: true, text, .. }
                    if text == "Nothing to show"
            )
        });
        assert!(drew_placeholder);
    }

    #[test]
    fn selected_pass_draws_highlight_and_dashed_box() {
        let (mut scene, _) = square_scene();
        scene.select_all();
        let view = Viewport::new(100.0, 100.0);
        let mut pipeline = RenderPipeline::new();
        let mut surface = RecordingSurface::new();

        let _ = pipeline.render(&mut surface, &scene, &view, None, None);
        let strokes = output_strokes(&surface);

        // One aliased highlight stroke for the node, one dashed box.
        assert!(strokes.iter().any(|op| matches!(
            op,
            RecordedOp::StrokePath { dashed: false, antialias: false, .. }
        )));
        assert!(strokes.iter().any(|op| matches!(
            op,
            RecordedOp::StrokePath { dashed: true, antialias: false, .. }
        )));
    }

    #[test]
    fn preview_transform_shifts_selected_overlay_only() {
        let (mut scene, _) = square_scene();
        scene.select_all();
        let view = Viewport::new(100.0, 100.0);
        let mut pipeline = RenderPipeline::new();
        let mut surface = RecordingSurface::new();

        let preview = Some(Affine::translate((5.0, 0.0)));
        let _ = pipeline.render(&mut surface, &scene, &view, None, preview);

        // The base raster stroke stays put; the highlight stroke moves.
        let raster_stroke = surface.ops().iter().find_map(|op| match op {
            RecordedOp::StrokePath { to_raster: true, bounds, .. } => Some(*bounds),
            _ => None,
        });
        let overlay_stroke = surface.ops().iter().find_map(|op| match op {
            RecordedOp::StrokePath { to_raster: false, dashed: false, bounds, .. } => Some(*bounds),
            _ => None,
        });
        let raster_stroke = raster_stroke.unwrap();
        let overlay_stroke = overlay_stroke.unwrap();
        assert!((overlay_stroke.x0 - raster_stroke.x0 - 5.0).abs() < 1e-9);
        assert!((overlay_stroke.y0 - raster_stroke.y0).abs() < 1e-9);
    }

    #[test]
    fn node_failure_is_recorded_and_frame_continues() {
        let mut scene = SceneRoot::new();
        let id = scene.insert(
            Layer::Main,
            Node::path(
                Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1),
                Symbol::default().with_fill(Color::BLACK),
            ),
        );
        let view = Viewport::new(100.0, 100.0);
        let mut pipeline = RenderPipeline::new();
        let mut surface = RecordingSurface::new();
        surface.fail_fill_paths(true);

        let report = pipeline.render(&mut surface, &scene, &view, None, None);
        assert_eq!(report.base, BasePass::Repainted);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].stage, FrameStage::Node);
        assert_eq!(report.errors[0].node, Some(id));

        // The blit still happened; the frame was degraded, not aborted.
        assert!(surface
            .ops()
            .iter()
            .any(|op| matches!(op, RecordedOp::BlitRaster { .. })));

        // A degraded raster is not cached; the next clean frame repaints.
        surface.fail_fill_paths(false);
        let report = pipeline.render(&mut surface, &scene, &view, None, None);
        assert_eq!(report.base, BasePass::Repainted);
        assert!(report.is_clean());
    }

    #[test]
    fn tool_background_takes_over_the_base_pass() {
        struct Takeover;
        impl Tool for Takeover {
            fn draw_background(
                &mut self,
                surface: &mut dyn RenderSurface,
                _viewport: &Viewport,
            ) -> Result<bool, RenderError> {
                surface.fill_path(
                    &Rect::new(0.0, 0.0, 100.0, 100.0).to_path(0.1),
                    Color::WHITE,
                )?;
                Ok(true)
            }
        }

        let (scene, _) = square_scene();
        let view = Viewport::new(100.0, 100.0);
        let mut pipeline = RenderPipeline::new();
        let mut surface = RecordingSurface::new();
        let mut tool = Takeover;

        let report = pipeline.render(&mut surface, &scene, &view, Some(&mut tool), None);
        assert_eq!(report.base, BasePass::Tool);
        assert!(!surface
            .ops()
            .iter()
            .any(|op| matches!(op, RecordedOp::PrepareRaster { .. })));
    }

    #[test]
    fn tool_overlay_failure_is_isolated() {
        struct FailingOverlay;
        impl Tool for FailingOverlay {
            fn draw_overlay(
                &mut self,
                _surface: &mut dyn RenderSurface,
                _viewport: &Viewport,
            ) -> Result<(), RenderError> {
                Err(RenderError::new("overlay failed"))
            }
        }

        let (scene, _) = square_scene();
        let view = Viewport::new(100.0, 100.0);
        let mut pipeline = RenderPipeline::new();
        let mut surface = RecordingSurface::new();
        let mut tool = FailingOverlay;

        let report = pipeline.render(&mut surface, &scene, &view, Some(&mut tool), None);
        assert_eq!(report.base, BasePass::Repainted);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].stage, FrameStage::ToolOverlay);

        // The failure did not poison the raster cache.
        let report = pipeline.render(&mut surface, &scene, &view, None, None);
        assert_eq!(report.base, BasePass::Reused);
        assert!(report.is_clean());
    }

    #[test]
    fn foreground_layer_draws_directly_to_output() {
        let (mut scene, _) = square_scene();
        scene.insert(
            Layer::Foreground,
            Node::path(
                Rect::new(40.0, 40.0, 60.0, 60.0).to_path(0.1),
                Symbol::default(),
            ),
        );
        let view = Viewport::new(100.0, 100.0);
        let mut pipeline = RenderPipeline::new();
        let mut surface = RecordingSurface::new();

        let report = pipeline.render(&mut surface, &scene, &view, None, None);
        assert_eq!(report.nodes_drawn, 2);
        assert_eq!(output_strokes(&surface).len(), 1);
    }

    #[test]
    fn scale_invariant_stroke_width_ignores_zoom() {
        let mut scene = SceneRoot::new();
        scene.insert(
            Layer::Main,
            Node::path(
                Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1),
                Symbol::stroked(Color::BLACK, 2.0).with_scale_invariant(),
            ),
        );
        let mut view = Viewport::new(100.0, 100.0);
        let _ = view.set_scale(4.0);
        let mut pipeline = RenderPipeline::new();
        let mut surface = RecordingSurface::new();

        let _ = pipeline.render(&mut surface, &scene, &view, None, None);
        let width = surface.ops().iter().find_map(|op| match op {
            RecordedOp::StrokePath { to_raster: true, width, .. } => Some(*width),
            _ => None,
        });
        assert_eq!(width, Some(2.0));
    }
}
