// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public value types for the scene graph: node identifiers, flags, and
//! style descriptors.

use alloc::sync::Arc;
use alloc::vec::Vec;
use peniko::Color;

/// Identifier for a node in the scene.
///
/// Identifiers are allocated by [`SceneRoot`](crate::SceneRoot) when a node
/// is inserted and are unique for the lifetime of the scene. They survive
/// snapshot encode/decode, so a node restored by undo keeps its identity.
///
/// A `NodeId` does not dangle in the memory-safety sense; looking up an id
/// whose node has been removed simply finds nothing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    /// Placeholder id carried by nodes that have not been inserted yet.
    pub(crate) const UNASSIGNED: Self = Self(0);

    /// Returns the raw id value.
    ///
    /// Raw values are opaque; they are exposed only so codecs can round-trip
    /// node identity.
    #[must_use]
    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// Reconstructs an id from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

bitflags::bitflags! {
    /// Node flags controlling visibility, pickability, and selection state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible (participates in rendering and bounds unions).
        const VISIBLE    = 0b0000_0001;
        /// Node may be selected (participates in hit testing for selection).
        const SELECTABLE = 0b0000_0010;
        /// Node is currently selected.
        ///
        /// This flag is the single source of truth for selection; there is
        /// no separate selection container that could diverge from it.
        const SELECTED   = 0b0000_0100;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::SELECTABLE
    }
}

/// Immutable style descriptor attached to leaf nodes.
///
/// A `Symbol` is a plain value: cloning it is cheap (the dash pattern is the
/// only allocation) and render pipelines consume it read-only.
#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    /// Stroke width. In world units unless [`Symbol::scale_invariant`] is set.
    pub stroke_width: f64,
    /// Stroke color.
    pub stroke: Color,
    /// Optional fill color for closed geometry.
    pub fill: Option<Color>,
    /// Dash pattern lengths; empty means a solid stroke.
    pub dash: Vec<f64>,
    /// Offset into the dash pattern.
    pub dash_phase: f64,
    /// When set, the stroke width is interpreted in screen pixels and does
    /// not scale with the viewport zoom.
    pub scale_invariant: bool,
}

impl Symbol {
    /// Creates a solid stroke symbol with the given color and width.
    #[must_use]
    pub fn stroked(stroke: Color, stroke_width: f64) -> Self {
        Self {
            stroke_width,
            stroke,
            fill: None,
            dash: Vec::new(),
            dash_phase: 0.0,
            scale_invariant: false,
        }
    }

    /// Returns a copy of this symbol with a fill color.
    #[must_use]
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Returns a copy of this symbol with a dash pattern.
    #[must_use]
    pub fn with_dash(mut self, dash: Vec<f64>, phase: f64) -> Self {
        self.dash = dash;
        self.dash_phase = phase;
        self
    }

    /// Returns a copy of this symbol with the scale-invariance flag set.
    #[must_use]
    pub fn with_scale_invariant(mut self) -> Self {
        self.scale_invariant = true;
        self
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self::stroked(Color::BLACK, 1.0)
    }
}

/// Reference to immutable raster image data, shareable between nodes and
/// snapshots.
///
/// Pixels are tightly packed RGBA8; `data.len()` must equal
/// `width * height * 4`. The scene graph treats the bytes as opaque.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageRef {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 pixel bytes.
    pub data: Arc<[u8]>,
}

impl ImageRef {
    /// Creates an image reference, checking that the byte length matches the
    /// dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32, data: Arc<[u8]>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (data.len() == expected).then_some(Self {
            width,
            height,
            data,
        })
    }
}
