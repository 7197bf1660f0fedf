// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene nodes: the closed set of drawable variants and the ordered group
//! container.

use alloc::string::String;
use alloc::vec::Vec;
use kurbo::{BezPath, Point, Rect, Shape};

use crate::types::{ImageRef, NodeFlags, NodeId, Symbol};

/// Nominal advance width per character relative to the text size, used for
/// text bounds. Precise metrics are a text backend concern; the scene graph
/// only needs a stable, conservative box.
const TEXT_ADVANCE: f64 = 0.6;

/// Leaf geometry, dispatched by `match` rather than trait objects.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// A Bezier path. Filled when the node's symbol carries a fill color.
    Path(BezPath),
    /// A text run anchored at its baseline origin (world units, Y up).
    Text {
        /// Baseline origin of the first glyph.
        anchor: Point,
        /// The text content.
        text: String,
        /// Text size in world units.
        size: f64,
    },
    /// A raster image stretched over a world-space rectangle.
    Image {
        /// Destination rectangle in world units.
        rect: Rect,
        /// The pixel data.
        image: ImageRef,
    },
}

impl Geometry {
    /// Returns the world-space bounding box, or `None` for empty geometry.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Path(path) => {
                if path.elements().is_empty() {
                    None
                } else {
                    Some(path.bounding_box())
                }
            }
            Self::Text { anchor, text, size } => {
                if text.is_empty() {
                    return None;
                }
                let advance = text.chars().count() as f64 * size * TEXT_ADVANCE;
                // World Y increases upward; the run extends up from the baseline.
                Some(Rect::new(
                    anchor.x,
                    anchor.y,
                    anchor.x + advance,
                    anchor.y + size,
                ))
            }
            Self::Image { rect, .. } => Some(*rect),
        }
    }
}

/// The payload of a [`Node`]: either leaf geometry with a style, or a group
/// of child nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// A drawable leaf.
    Leaf {
        /// The geometry.
        geometry: Geometry,
        /// The immutable style descriptor.
        symbol: Symbol,
    },
    /// An ordered container of child nodes.
    Group(Group),
}

/// A node in the scene: flags, optional display name, and a leaf-or-group
/// payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) flags: NodeFlags,
    pub(crate) name: Option<String>,
    pub(crate) kind: NodeKind,
}

impl Node {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            id: NodeId::UNASSIGNED,
            flags: NodeFlags::default(),
            name: None,
            kind,
        }
    }

    /// Creates a path leaf.
    #[must_use]
    pub fn path(path: BezPath, symbol: Symbol) -> Self {
        Self::with_kind(NodeKind::Leaf {
            geometry: Geometry::Path(path),
            symbol,
        })
    }

    /// Creates a text leaf.
    #[must_use]
    pub fn text(anchor: Point, text: String, size: f64, symbol: Symbol) -> Self {
        Self::with_kind(NodeKind::Leaf {
            geometry: Geometry::Text { anchor, text, size },
            symbol,
        })
    }

    /// Creates an image leaf.
    #[must_use]
    pub fn image(rect: Rect, image: ImageRef, symbol: Symbol) -> Self {
        Self::with_kind(NodeKind::Leaf {
            geometry: Geometry::Image { rect, image },
            symbol,
        })
    }

    /// Creates a group node from child nodes.
    #[must_use]
    pub fn group(children: Vec<Self>) -> Self {
        Self::with_kind(NodeKind::Group(Group { children }))
    }

    /// Returns a copy of this node with a display name.
    #[must_use]
    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// Returns a copy of this node with the given flags.
    #[must_use]
    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Returns a copy of this node carrying an explicit id.
    ///
    /// Intended for codecs restoring persisted scenes; elsewhere ids are
    /// assigned by [`SceneRoot::insert`](crate::SceneRoot::insert).
    #[must_use]
    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }

    /// Returns the node id, or the unassigned placeholder before insertion.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the node flags.
    #[must_use]
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Returns `true` if the node is visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE)
    }

    /// Returns `true` if the node may be selected.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.flags.contains(NodeFlags::SELECTABLE)
    }

    /// Returns `true` if the node is currently selected.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.flags.contains(NodeFlags::SELECTED)
    }

    /// Sets the visibility flag. Returns `true` if the flag changed.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        self.set_flag(NodeFlags::VISIBLE, visible)
    }

    /// Sets the selectable flag. Returns `true` if the flag changed.
    pub fn set_selectable(&mut self, selectable: bool) -> bool {
        self.set_flag(NodeFlags::SELECTABLE, selectable)
    }

    /// Sets the selected flag. Returns `true` if the flag changed.
    pub fn set_selected(&mut self, selected: bool) -> bool {
        self.set_flag(NodeFlags::SELECTED, selected)
    }

    fn set_flag(&mut self, flag: NodeFlags, value: bool) -> bool {
        let before = self.flags;
        self.flags.set(flag, value);
        self.flags != before
    }

    /// Returns the node payload.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns the contained group, if this node is a group.
    #[must_use]
    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            NodeKind::Group(group) => Some(group),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Returns the contained group mutably, if this node is a group.
    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match &mut self.kind {
            NodeKind::Group(group) => Some(group),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Returns the world-space bounds of this node.
    ///
    /// Leaf bounds come from the geometry; group bounds are the union of the
    /// *visible* children's bounds. `None` means the node has no extent and
    /// must be treated as fully visible by consumers.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        match &self.kind {
            NodeKind::Leaf { geometry, .. } => geometry.bounds(),
            NodeKind::Group(group) => group.bounds(),
        }
    }

    pub(crate) fn assign_ids(&mut self, next_id: &mut u64) {
        if self.id == NodeId::UNASSIGNED {
            self.id = NodeId(*next_id);
            *next_id += 1;
        }
        if let NodeKind::Group(group) = &mut self.kind {
            for child in &mut group.children {
                child.assign_ids(next_id);
            }
        }
    }

    pub(crate) fn max_id(&self) -> u64 {
        let mut max = self.id.0;
        if let NodeKind::Group(group) = &self.kind {
            for child in &group.children {
                max = max.max(child.max_id());
            }
        }
        max
    }
}

/// An ordered container of nodes. Draw order is vec order; the last child
/// draws on top.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Group {
    pub(crate) children: Vec<Node>,
}

impl Group {
    /// Creates an empty group.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            children: Vec::new(),
        }
    }

    /// Creates a group from child nodes.
    #[must_use]
    pub fn from_nodes(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Returns the number of direct children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if the group has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the children in draw order (first is bottom-most).
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns the children mutably.
    pub fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    /// Appends a node on top of the existing children.
    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Removes all children.
    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Returns the union of the visible children's bounds, or `None` if no
    /// visible child has bounds.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        union_bounds(self.children.iter().filter(|n| n.is_visible()).map(Node::bounds))
    }

    /// Returns the union of the selected nodes' bounds, descending into
    /// unselected groups.
    #[must_use]
    pub fn selected_bounds(&self) -> Option<Rect> {
        union_bounds(self.children.iter().map(|node| {
            if node.is_selected() {
                node.bounds()
            } else if let Some(group) = node.as_group() {
                group.selected_bounds()
            } else {
                None
            }
        }))
    }

    /// Returns `true` if any node in the group (recursively) is selected.
    #[must_use]
    pub fn any_selected(&self) -> bool {
        self.children.iter().any(|node| {
            node.is_selected() || node.as_group().is_some_and(Group::any_selected)
        })
    }

    /// Returns `true` if any direct or nested child is visible.
    #[must_use]
    pub fn any_visible(&self) -> bool {
        self.children.iter().any(|node| {
            node.is_visible()
                && match node.as_group() {
                    Some(group) => group.any_visible(),
                    None => true,
                }
        })
    }

    /// Sets the selected flag on every node in the group (recursively).
    ///
    /// Only selectable nodes are selected; deselection applies to all nodes.
    /// Returns the number of nodes whose flag changed.
    pub fn set_selected_all(&mut self, selected: bool) -> usize {
        let mut changed = 0;
        for node in &mut self.children {
            if !selected || node.is_selectable() {
                changed += usize::from(node.set_selected(selected));
            }
            if let Some(group) = node.as_group_mut() {
                changed += group.set_selected_all(selected);
            }
        }
        changed
    }

    /// Removes every selected node (recursively). A selected group is removed
    /// wholesale. Returns the number of removed nodes.
    pub fn remove_selected(&mut self) -> usize {
        let before = self.children.len();
        self.children.retain(|node| !node.is_selected());
        let mut removed = before - self.children.len();
        for node in &mut self.children {
            if let Some(group) = node.as_group_mut() {
                removed += group.remove_selected();
            }
        }
        removed
    }

    /// Finds a node by id, descending into groups.
    #[must_use]
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        for node in &self.children {
            if node.id == id {
                return Some(node);
            }
            if let Some(group) = node.as_group() {
                if let Some(found) = group.find(id) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Finds a node by id mutably, descending into groups.
    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        for node in &mut self.children {
            if node.id == id {
                return Some(node);
            }
            if let Some(group) = node.as_group_mut() {
                if let Some(found) = group.find_mut(id) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub(crate) fn max_id(&self) -> u64 {
        self.children.iter().map(Node::max_id).max().unwrap_or(0)
    }
}

fn union_bounds<I>(rects: I) -> Option<Rect>
where
    I: Iterator<Item = Option<Rect>>,
{
    rects.flatten().reduce(|acc, r| acc.union(r))
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;
    use kurbo::{Point, Rect, Shape};

    use super::*;

    fn rect_node(r: Rect) -> Node {
        Node::path(r.to_path(0.1), Symbol::default())
    }

    #[test]
    fn empty_path_has_no_bounds() {
        let node = Node::path(BezPath::new(), Symbol::default());
        assert_eq!(node.bounds(), None);
    }

    #[test]
    fn group_bounds_union_visible_children_only() {
        let mut hidden = rect_node(Rect::new(100.0, 100.0, 200.0, 200.0));
        hidden.set_visible(false);

        let group = Group::from_nodes(vec![
            rect_node(Rect::new(0.0, 0.0, 10.0, 10.0)),
            rect_node(Rect::new(5.0, 5.0, 20.0, 20.0)),
            hidden,
        ]);

        let bounds = group.bounds().unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 20.0, 20.0));
    }

    #[test]
    fn group_with_no_visible_children_has_no_bounds() {
        let mut node = rect_node(Rect::new(0.0, 0.0, 10.0, 10.0));
        node.set_visible(false);
        let group = Group::from_nodes(vec![node]);
        assert_eq!(group.bounds(), None);
        assert!(!group.any_visible());
    }

    #[test]
    fn text_bounds_extend_up_from_baseline() {
        let node = Node::text(
            Point::new(2.0, 3.0),
            "ab".to_string(),
            10.0,
            Symbol::default(),
        );
        let bounds = node.bounds().unwrap();
        assert_eq!(bounds.y0, 3.0);
        assert_eq!(bounds.y1, 13.0);
        assert!(bounds.width() > 0.0);
    }

    #[test]
    fn select_all_skips_unselectable_nodes() {
        let mut fixed = rect_node(Rect::new(0.0, 0.0, 1.0, 1.0));
        fixed.set_selectable(false);
        let mut group = Group::from_nodes(vec![fixed, rect_node(Rect::new(2.0, 2.0, 3.0, 3.0))]);

        let changed = group.set_selected_all(true);
        assert_eq!(changed, 1);
        assert!(!group.children()[0].is_selected());
        assert!(group.children()[1].is_selected());

        // Deselection clears everything regardless of selectability.
        let cleared = group.set_selected_all(false);
        assert_eq!(cleared, 1);
        assert!(!group.any_selected());
    }

    #[test]
    fn remove_selected_removes_whole_selected_groups() {
        let mut inner = Node::group(vec![rect_node(Rect::new(0.0, 0.0, 1.0, 1.0))]);
        inner.set_selected(true);
        let mut group = Group::from_nodes(vec![inner, rect_node(Rect::new(2.0, 2.0, 3.0, 3.0))]);

        let removed = group.remove_selected();
        assert_eq!(removed, 1);
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn selected_bounds_descend_into_unselected_groups() {
        let mut leaf = rect_node(Rect::new(4.0, 4.0, 6.0, 6.0));
        leaf.set_selected(true);
        let nested = Node::group(vec![leaf]);
        let group = Group::from_nodes(vec![nested, rect_node(Rect::new(0.0, 0.0, 1.0, 1.0))]);

        assert_eq!(group.selected_bounds(), Some(Rect::new(4.0, 4.0, 6.0, 6.0)));
    }
}
