// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Insets, Point, Rect};

/// Hard floor for the scale factor, below which the world→screen transform
/// would degenerate and stop being invertible.
pub const MIN_SCALE: f64 = 1e-6;

/// Default display density in pixels per inch, used for the
/// map-units-per-inch readout when the caller has not supplied one.
pub const DEFAULT_PPI: f64 = 96.0;

const DEFAULT_MAX_SCALE: f64 = 1e6;

/// Notification payload for scale changes.
///
/// Produced by every operation that changes the effective scale, after the
/// viewport state has been updated. The editor façade relays these to
/// registered observers in call order, so listeners never observe a stale
/// scale.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScaleChange {
    /// The new scale in screen pixels per world unit.
    pub scale: f64,
    /// World units covered by one physical inch of the display, derived
    /// from the configured display density.
    pub units_per_inch: f64,
}

/// Viewport over a world-space plane: a uniform scale factor plus a top-left
/// world anchor.
///
/// The mapping is `sx = (x − x0)·s + left`, `sy = (y0 − y)·s + top`: world Y
/// increases upward, screen Y increases downward, and `(x0, y0)` is the
/// world point at the top-left corner of the interior (inset-excluded)
/// display area.
///
/// Only the viewport controller mutates this state; all other components
/// read it as an immutable snapshot per frame.
#[derive(Clone, Debug)]
pub struct Viewport {
    scale: f64,
    anchor: Point,
    display_width: f64,
    display_height: f64,
    insets: Insets,
    min_scale: f64,
    max_scale: f64,
    ppi: f64,
    /// Bumped whenever scale or anchor changes; render caches compare this
    /// to decide whether cached content is still valid.
    revision: u64,
}

impl Viewport {
    /// Creates a viewport for a display of the given pixel size.
    ///
    /// Initial scale is `1.0` with the world origin at the top-left interior
    /// corner.
    #[must_use]
    pub fn new(display_width: f64, display_height: f64) -> Self {
        Self {
            scale: 1.0,
            anchor: Point::ZERO,
            display_width: display_width.max(0.0),
            display_height: display_height.max(0.0),
            insets: Insets::ZERO,
            min_scale: MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            ppi: DEFAULT_PPI,
            revision: 0,
        }
    }

    /// Returns the current scale in screen pixels per world unit.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the top-left world anchor `(x0, y0)`.
    #[must_use]
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Returns the revision counter, bumped on every scale or anchor change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns world units per physical display inch at the current scale.
    #[must_use]
    pub fn units_per_inch(&self) -> f64 {
        self.ppi / self.scale
    }

    /// Sets the display size in pixels. Scale and anchor are unchanged.
    pub fn set_display_size(&mut self, width: f64, height: f64) {
        self.display_width = width.max(0.0);
        self.display_height = height.max(0.0);
    }

    /// Returns the display size in pixels.
    #[must_use]
    pub fn display_size(&self) -> (f64, f64) {
        (self.display_width, self.display_height)
    }

    /// Sets the edge insets (left, top, right, bottom) in pixels.
    pub fn set_insets(&mut self, insets: Insets) {
        self.insets = insets;
    }

    /// Returns the edge insets.
    #[must_use]
    pub fn insets(&self) -> Insets {
        self.insets
    }

    /// Sets the display density in pixels per inch.
    ///
    /// Non-finite or non-positive values are ignored.
    pub fn set_ppi(&mut self, ppi: f64) {
        if ppi.is_finite() && ppi > 0.0 {
            self.ppi = ppi;
        }
    }

    /// Sets the minimum and maximum scale factors.
    ///
    /// The range is normalized so `min <= max`, and the minimum never drops
    /// below [`MIN_SCALE`]. Returns a change if re-clamping moved the
    /// current scale.
    pub fn set_scale_limits(&mut self, min_scale: f64, max_scale: f64) -> Option<ScaleChange> {
        let (min_scale, max_scale) = if min_scale <= max_scale {
            (min_scale, max_scale)
        } else {
            (max_scale, min_scale)
        };
        self.min_scale = min_scale.max(MIN_SCALE);
        self.max_scale = max_scale.max(self.min_scale);
        self.set_scale(self.scale)
    }

    /// Returns the interior (inset-excluded) display size in pixels.
    #[must_use]
    pub fn interior_size(&self) -> (f64, f64) {
        let w = (self.display_width - self.insets.x0 - self.insets.x1).max(0.0);
        let h = (self.display_height - self.insets.y0 - self.insets.y1).max(0.0);
        (w, h)
    }

    /// Converts a world-space point into screen pixels.
    #[must_use]
    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.anchor.x) * self.scale + self.insets.x0,
            (self.anchor.y - p.y) * self.scale + self.insets.y0,
        )
    }

    /// Converts a screen-pixel point into world space.
    #[must_use]
    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new(
            self.anchor.x + (p.x - self.insets.x0) / self.scale,
            self.anchor.y - (p.y - self.insets.y0) / self.scale,
        )
    }

    /// Returns the world-space rectangle visible through the interior
    /// display area.
    #[must_use]
    pub fn visible_world_rect(&self) -> Rect {
        let (iw, ih) = self.interior_size();
        let width = iw / self.scale;
        let height = ih / self.scale;
        Rect::new(
            self.anchor.x,
            self.anchor.y - height,
            self.anchor.x + width,
            self.anchor.y,
        )
    }

    /// Converts a pixel distance into world units at the current scale.
    #[must_use]
    pub fn pixels_to_world(&self, pixels: f64) -> f64 {
        pixels / self.scale
    }

    /// Translates the anchor by a world-space delta. No scale change.
    ///
    /// Non-finite deltas are ignored.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if !dx.is_finite() || !dy.is_finite() || (dx == 0.0 && dy == 0.0) {
            return;
        }
        self.anchor = Point::new(self.anchor.x + dx, self.anchor.y + dy);
        self.bump_revision();
    }

    /// Sets the scale directly, keeping the world point at the display
    /// center fixed.
    ///
    /// Non-finite requests are ignored; non-positive requests clamp to the
    /// minimum scale. Returns the change if the effective scale moved.
    pub fn set_scale(&mut self, scale: f64) -> Option<ScaleChange> {
        if !scale.is_finite() {
            return None;
        }
        let clamped = scale.clamp(self.min_scale, self.max_scale);
        if (self.scale - clamped).abs() < f64::EPSILON {
            return None;
        }
        let center = self.interior_center_world();
        self.scale = clamped;
        self.center_on(center);
        self.bump_revision();
        Some(self.change())
    }

    /// Multiplies the scale by `factor`, keeping the world point at the
    /// display center fixed.
    pub fn zoom(&mut self, factor: f64) -> Option<ScaleChange> {
        if !factor.is_finite() || factor <= 0.0 {
            return None;
        }
        self.set_scale(self.scale * factor)
    }

    /// Multiplies the scale by `factor`, keeping `world_pt` fixed at its
    /// current screen position.
    pub fn zoom_at_point(&mut self, factor: f64, world_pt: Point) -> Option<ScaleChange> {
        if !factor.is_finite() || factor <= 0.0 {
            return None;
        }
        let new_scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return None;
        }
        let screen_pt = self.world_to_screen(world_pt);
        self.scale = new_scale;
        self.anchor = Point::new(
            world_pt.x - (screen_pt.x - self.insets.x0) / new_scale,
            world_pt.y + (screen_pt.y - self.insets.y0) / new_scale,
        );
        self.bump_revision();
        Some(self.change())
    }

    /// Centers on `rect` and scales so it fills the interior display area.
    pub fn zoom_to_rect(&mut self, rect: Rect) -> Option<ScaleChange> {
        self.fit(rect, 0.0)
    }

    /// Fits `bounds` into the view, shrunk by `border_frac` of the display
    /// on each side (`0.02` leaves a 2% margin).
    ///
    /// Degenerate bounds (zero width *and* height) fall back to centering on
    /// the centroid at the minimum scale rather than failing. Callers with
    /// an empty scene must not call this at all; they leave the viewport
    /// unchanged and report "nothing to show" themselves.
    pub fn fit_to_content(&mut self, bounds: Rect, border_frac: f64) -> Option<ScaleChange> {
        self.fit(bounds, border_frac.clamp(0.0, 0.49))
    }

    /// Centers the interior display area on a world point. No scale change.
    pub fn center_on(&mut self, world_pt: Point) {
        let (iw, ih) = self.interior_size();
        let width = iw / self.scale;
        let height = ih / self.scale;
        self.anchor = Point::new(world_pt.x - width / 2.0, world_pt.y + height / 2.0);
        self.bump_revision();
    }

    /// Snapshot of the current viewport state for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> ViewportDebugInfo {
        ViewportDebugInfo {
            scale: self.scale,
            anchor: self.anchor,
            display_width: self.display_width,
            display_height: self.display_height,
            insets: self.insets,
            visible_world_rect: self.visible_world_rect(),
            min_scale: self.min_scale,
            max_scale: self.max_scale,
            ppi: self.ppi,
        }
    }

    fn fit(&mut self, bounds: Rect, border_frac: f64) -> Option<ScaleChange> {
        let bounds = bounds.abs();
        let (iw, ih) = self.interior_size();
        if iw <= 0.0 || ih <= 0.0 {
            return None;
        }

        let width = bounds.width();
        let height = bounds.height();
        let target = if width <= 0.0 && height <= 0.0 {
            // A single point has no extent to fit; show it at the minimum
            // scale so the surrounding context is as wide as possible.
            self.min_scale
        } else {
            let sx = (width > 0.0).then(|| iw / width);
            let sy = (height > 0.0).then(|| ih / height);
            let base = match (sx, sy) {
                (Some(sx), Some(sy)) => sx.min(sy),
                (Some(sx), None) => sx,
                (None, Some(sy)) => sy,
                (None, None) => unreachable!(),
            };
            base * (1.0 - 2.0 * border_frac)
        };

        let old_scale = self.scale;
        self.scale = target.clamp(self.min_scale, self.max_scale);
        self.center_on(bounds.center());
        self.bump_revision();
        ((self.scale - old_scale).abs() >= f64::EPSILON).then(|| self.change())
    }

    fn interior_center_world(&self) -> Point {
        let (iw, ih) = self.interior_size();
        self.screen_to_world(Point::new(
            self.insets.x0 + iw / 2.0,
            self.insets.y0 + ih / 2.0,
        ))
    }

    fn change(&self) -> ScaleChange {
        ScaleChange {
            scale: self.scale,
            units_per_inch: self.units_per_inch(),
        }
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Debug snapshot of a [`Viewport`] state.
#[derive(Copy, Clone, Debug)]
pub struct ViewportDebugInfo {
    /// Current scale in pixels per world unit.
    pub scale: f64,
    /// Top-left world anchor.
    pub anchor: Point,
    /// Display width in pixels.
    pub display_width: f64,
    /// Display height in pixels.
    pub display_height: f64,
    /// Edge insets in pixels.
    pub insets: Insets,
    /// World rectangle currently visible through the interior area.
    pub visible_world_rect: Rect,
    /// Minimum scale factor.
    pub min_scale: f64,
    /// Maximum scale factor.
    pub max_scale: f64,
    /// Display density in pixels per inch.
    pub ppi: f64,
}
