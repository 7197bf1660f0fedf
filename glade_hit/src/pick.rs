// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point picking over a group's children.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{ParamCurveNearest, Point, Shape};

use glade_scene::{Geometry, Group, Node, NodeId, NodeKind, Symbol};
use glade_viewport::Viewport;

/// Accuracy for nearest-point computation on path segments, in world units.
const NEAREST_ACCURACY: f64 = 1e-6;

/// Filters applied while picking.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PickFilter {
    /// Skip nodes without the selectable flag.
    pub only_selectable: bool,
    /// Skip invisible nodes (and invisible subtrees).
    pub only_visible: bool,
}

impl Default for PickFilter {
    fn default() -> Self {
        Self {
            only_selectable: true,
            only_visible: true,
        }
    }
}

/// Returns the top-most direct child of `group` whose geometry lies within
/// `pixel_tolerance` of `world_pt`, or `None`.
///
/// The tolerance is converted to world units via the viewport scale, so a
/// 3-pixel pick radius behaves the same at every zoom level. Ties are broken
/// by draw order: the last-drawn (visually top-most) node wins.
#[must_use]
pub fn pick(
    group: &Group,
    viewport: &Viewport,
    world_pt: Point,
    pixel_tolerance: f64,
    filter: PickFilter,
) -> Option<NodeId> {
    let tolerance = viewport.pixels_to_world(pixel_tolerance.max(0.0));
    group
        .children()
        .iter()
        .rev()
        .find(|node| {
            if filter.only_visible && !node.is_visible() {
                return false;
            }
            if filter.only_selectable && !node.is_selectable() {
                return false;
            }
            node_hit(node, world_pt, tolerance, viewport.scale(), filter.only_visible)
        })
        .map(Node::id)
}

fn node_hit(node: &Node, pt: Point, tolerance: f64, scale: f64, only_visible: bool) -> bool {
    match node.kind() {
        NodeKind::Leaf { geometry, symbol } => {
            geometry_hit(geometry, symbol, pt, tolerance, scale)
        }
        NodeKind::Group(group) => group.children().iter().any(|child| {
            if only_visible && !child.is_visible() {
                return false;
            }
            // Descendants of a pickable group are hit regardless of their
            // own selectable flag; the group is the selection unit.
            node_hit(child, pt, tolerance, scale, only_visible)
        }),
    }
}

fn geometry_hit(geometry: &Geometry, symbol: &Symbol, pt: Point, tolerance: f64, scale: f64) -> bool {
    let Some(bounds) = geometry.bounds() else {
        // Empty geometry has no extent to hit.
        return false;
    };
    let half_width = stroke_half_width(symbol, scale);
    let limit = tolerance + half_width;
    if !bounds.inflate(limit, limit).contains(pt) {
        return false;
    }

    match geometry {
        Geometry::Path(path) => {
            if symbol.fill.is_some() && path.contains(pt) {
                return true;
            }
            path.segments().any(|seg| {
                let nearest = seg.nearest(pt, NEAREST_ACCURACY);
                nearest.distance_sq.sqrt() <= limit
            })
        }
        // Text and images are hit by their (already inflated) bounds.
        Geometry::Text { .. } | Geometry::Image { .. } => true,
    }
}

fn stroke_half_width(symbol: &Symbol, scale: f64) -> f64 {
    let width = symbol.stroke_width.max(0.0);
    if symbol.scale_invariant {
        // Width is in screen pixels; convert to world units.
        width / scale / 2.0
    } else {
        width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;
    use kurbo::{BezPath, Rect};
    use peniko::Color;

    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(100.0, 100.0)
    }

    fn rect_node(r: Rect) -> Node {
        Node::path(r.to_path(0.1), Symbol::default())
    }

    fn line_path(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
        let mut path = BezPath::new();
        path.move_to((x0, y0));
        path.line_to((x1, y1));
        path
    }

    #[test]
    fn pick_hits_stroke_within_tolerance() {
        let mut group = Group::new();
        group.push(Node::path(line_path(0.0, 0.0, 10.0, 0.0), Symbol::default()));
        let group = assign_ids(group);

        let vp = viewport();
        let filter = PickFilter::default();
        assert!(pick(&group, &vp, Point::new(5.0, 1.0), 3.0, filter).is_some());
        assert!(pick(&group, &vp, Point::new(5.0, 10.0), 3.0, filter).is_none());
    }

    #[test]
    fn tolerance_scales_with_zoom() {
        let mut group = Group::new();
        group.push(Node::path(line_path(0.0, 0.0, 10.0, 0.0), Symbol::default()));
        let group = assign_ids(group);

        let mut vp = viewport();
        let _ = vp.set_scale(10.0);
        // 3 px at scale 10 is 0.3 world units: a point 1 world unit away misses.
        let filter = PickFilter::default();
        assert!(pick(&group, &vp, Point::new(5.0, 1.0), 3.0, filter).is_none());
        assert!(pick(&group, &vp, Point::new(5.0, 0.2), 3.0, filter).is_some());
    }

    #[test]
    fn topmost_node_wins_ties() {
        let mut group = Group::new();
        group.push(rect_node(Rect::new(0.0, 0.0, 10.0, 10.0)));
        group.push(rect_node(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let group = assign_ids(group);
        let top_id = group.children()[1].id();

        let vp = viewport();
        let hit = pick(&group, &vp, Point::new(5.0, 10.0), 2.0, PickFilter::default());
        assert_eq!(hit, Some(top_id));
    }

    #[test]
    fn filled_path_hits_interior() {
        let mut group = Group::new();
        group.push(Node::path(
            Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1),
            Symbol::default().with_fill(Color::WHITE),
        ));
        let group = assign_ids(group);

        let vp = viewport();
        // Interior, far from any edge: only hits because of the fill.
        let hit = pick(&group, &vp, Point::new(5.0, 5.0), 1.0, PickFilter::default());
        assert!(hit.is_some());
    }

    #[test]
    fn unfilled_path_misses_interior() {
        let mut group = Group::new();
        group.push(rect_node(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let group = assign_ids(group);

        let vp = viewport();
        let hit = pick(&group, &vp, Point::new(5.0, 5.0), 1.0, PickFilter::default());
        assert!(hit.is_none());
    }

    #[test]
    fn filters_skip_invisible_and_unselectable() {
        let mut hidden = rect_node(Rect::new(0.0, 0.0, 10.0, 10.0));
        hidden.set_visible(false);
        let mut locked = rect_node(Rect::new(0.0, 0.0, 10.0, 10.0));
        locked.set_selectable(false);

        let mut group = Group::new();
        group.push(hidden);
        group.push(locked);
        let group = assign_ids(group);

        let vp = viewport();
        let pt = Point::new(5.0, 0.0);
        assert!(pick(&group, &vp, pt, 2.0, PickFilter::default()).is_none());

        // Relaxing the filters finds the same nodes.
        let any = PickFilter {
            only_selectable: false,
            only_visible: false,
        };
        assert!(pick(&group, &vp, pt, 2.0, any).is_some());
    }

    #[test]
    fn group_is_hit_through_descendants() {
        let inner = rect_node(Rect::new(0.0, 0.0, 5.0, 5.0));
        let mut group = Group::new();
        group.push(Node::group(vec![inner]));
        let group = assign_ids(group);
        let group_id = group.children()[0].id();

        let vp = viewport();
        let hit = pick(&group, &vp, Point::new(2.5, 0.0), 2.0, PickFilter::default());
        assert_eq!(hit, Some(group_id));
    }

    #[test]
    fn text_hits_by_bounds() {
        let mut group = Group::new();
        group.push(Node::text(
            Point::new(0.0, 0.0),
            "hello".to_string(),
            10.0,
            Symbol::default(),
        ));
        let group = assign_ids(group);

        let vp = viewport();
        let hit = pick(&group, &vp, Point::new(5.0, 5.0), 1.0, PickFilter::default());
        assert!(hit.is_some());
    }

    #[test]
    fn scale_invariant_stroke_width_converts_to_world() {
        // A 20 px wide scale-invariant stroke at scale 2 is 10 world units
        // wide, so a point 4 world units off the centerline still hits.
        let mut group = Group::new();
        group.push(Node::path(
            line_path(0.0, 0.0, 10.0, 0.0),
            Symbol::stroked(Color::BLACK, 20.0).with_scale_invariant(),
        ));
        let group = assign_ids(group);

        let mut vp = viewport();
        let _ = vp.set_scale(2.0);
        let hit = pick(&group, &vp, Point::new(5.0, 4.0), 0.0, PickFilter::default());
        assert!(hit.is_some());
    }

    // Give nodes real ids the way SceneRoot::insert would.
    fn assign_ids(group: Group) -> Group {
        use glade_scene::{Layer, SceneRoot};
        let mut scene = SceneRoot::new();
        for node in group.children() {
            scene.insert(Layer::Main, node.clone());
        }
        scene.main().clone()
    }
}
