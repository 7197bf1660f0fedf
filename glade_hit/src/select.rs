// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection gestures: point and rectangle selection over the main layer.

use kurbo::{Point, Rect};

use glade_scene::{Group, NodeId, SceneRoot};
use glade_viewport::Viewport;

use crate::pick::{pick, PickFilter};

/// Outcome of a selection gesture.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SelectionChange {
    /// The node the gesture resolved to, if any.
    pub hit: Option<NodeId>,
    /// Whether any selection flag actually changed.
    pub changed: bool,
}

/// Selects main-layer nodes whose bounds intersect `rect`.
///
/// Only selectable, visible direct children participate; a group child is
/// selected wholesale when its (visible-children) bounds intersect.
/// Degenerate bounds (a horizontal or vertical line has zero area) still
/// count as intersecting. When `extend` is false the existing selection is
/// cleared first. Returns whether the selection changed.
pub fn select_by_rect(scene: &mut SceneRoot, rect: Rect, extend: bool) -> bool {
    let rect = rect.abs();
    let changed = scene.edit_main(|main| {
        let mut changed = 0;
        if !extend {
            changed += clear_except(main, None);
        }
        for node in main.children_mut() {
            if !node.is_visible() || !node.is_selectable() {
                continue;
            }
            let intersects = node.bounds().is_some_and(|b| overlaps(b, rect));
            if intersects {
                changed += usize::from(node.set_selected(true));
            }
        }
        changed
    });
    changed > 0
}

/// Inclusive overlap test over normalized rects.
///
/// An area check on the intersection would reject zero-width or zero-height
/// bounds; edge and corner touches count as overlapping here.
fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

/// Resolves a click at `world_pt` into a selection change.
///
/// - With a hit and `extend == false`, the selection collapses to exactly
///   the hit node.
/// - With a hit and `extend == true`, the hit node's selection is toggled
///   and the rest of the selection is kept.
/// - With no hit and `extend == false`, the selection is cleared.
/// - With no hit and `extend == true`, nothing changes.
pub fn select_by_point(
    scene: &mut SceneRoot,
    viewport: &Viewport,
    world_pt: Point,
    extend: bool,
    pixel_tolerance: f64,
) -> SelectionChange {
    let hit = pick(
        scene.main(),
        viewport,
        world_pt,
        pixel_tolerance,
        PickFilter::default(),
    );

    let changed = match (hit, extend) {
        (Some(id), false) => scene.edit_main(|main| {
            let mut changed = clear_except(main, Some(id));
            if let Some(node) = main.find_mut(id) {
                changed += usize::from(node.set_selected(true));
            }
            changed
        }),
        (Some(id), true) => scene.edit_main(|main| match main.find_mut(id) {
            Some(node) => {
                let was = node.is_selected();
                usize::from(node.set_selected(!was))
            }
            None => 0,
        }),
        (None, false) => scene.edit_main(|main| clear_except(main, None)),
        (None, true) => 0,
    };

    SelectionChange {
        hit,
        changed: changed > 0,
    }
}

/// Clears selection flags everywhere in `group` except on `keep` itself.
/// Returns the number of flags changed.
fn clear_except(group: &mut Group, keep: Option<NodeId>) -> usize {
    let mut changed = 0;
    for node in group.children_mut() {
        if Some(node.id()) == keep {
            continue;
        }
        changed += usize::from(node.set_selected(false));
        if let Some(inner) = node.as_group_mut() {
            changed += clear_selection(inner);
        }
    }
    changed
}

fn clear_selection(group: &mut Group) -> usize {
    let mut changed = 0;
    for node in group.children_mut() {
        changed += usize::from(node.set_selected(false));
        if let Some(inner) = node.as_group_mut() {
            changed += clear_selection(inner);
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;
    use kurbo::Shape;

    use glade_scene::{Layer, Node, Symbol};

    use super::*;

    fn scene_with_squares() -> (SceneRoot, NodeId, NodeId) {
        let mut scene = SceneRoot::new();
        let a = scene.insert(
            Layer::Main,
            Node::path(
                Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1),
                Symbol::default(),
            ),
        );
        let b = scene.insert(
            Layer::Main,
            Node::path(
                Rect::new(20.0, 0.0, 30.0, 10.0).to_path(0.1),
                Symbol::default(),
            ),
        );
        (scene, a, b)
    }

    fn selected_ids(scene: &SceneRoot) -> Vec<NodeId> {
        scene
            .main()
            .children()
            .iter()
            .filter(|n| n.is_selected())
            .map(Node::id)
            .collect()
    }

    #[test]
    fn non_extending_point_select_collapses_to_hit() {
        let (mut scene, a, b) = scene_with_squares();
        let vp = Viewport::new(100.0, 100.0);

        // Pre-select both, then click on the edge of `a`.
        scene.select_all();
        let outcome = select_by_point(&mut scene, &vp, Point::new(5.0, 0.0), false, 2.0);

        assert_eq!(outcome.hit, Some(a));
        assert!(outcome.changed);
        assert_eq!(selected_ids(&scene), vec![a]);
        let _ = b;
    }

    #[test]
    fn non_extending_reselect_of_sole_selection_reports_no_change() {
        let (mut scene, a, _) = scene_with_squares();
        let vp = Viewport::new(100.0, 100.0);

        let first = select_by_point(&mut scene, &vp, Point::new(5.0, 0.0), false, 2.0);
        assert!(first.changed);

        let second = select_by_point(&mut scene, &vp, Point::new(5.0, 0.0), false, 2.0);
        assert_eq!(second.hit, Some(a));
        assert!(!second.changed);
    }

    #[test]
    fn extending_point_select_toggles_hit() {
        let (mut scene, a, b) = scene_with_squares();
        let vp = Viewport::new(100.0, 100.0);

        let _ = select_by_point(&mut scene, &vp, Point::new(5.0, 0.0), false, 2.0);
        let added = select_by_point(&mut scene, &vp, Point::new(25.0, 0.0), true, 2.0);
        assert!(added.changed);
        assert_eq!(selected_ids(&scene), vec![a, b]);

        // Toggling the same node off keeps the rest.
        let removed = select_by_point(&mut scene, &vp, Point::new(25.0, 0.0), true, 2.0);
        assert!(removed.changed);
        assert_eq!(selected_ids(&scene), vec![a]);
    }

    #[test]
    fn miss_without_extend_clears_selection() {
        let (mut scene, _, _) = scene_with_squares();
        let vp = Viewport::new(100.0, 100.0);
        scene.select_all();

        let outcome = select_by_point(&mut scene, &vp, Point::new(50.0, 50.0), false, 2.0);
        assert_eq!(outcome.hit, None);
        assert!(outcome.changed);
        assert!(selected_ids(&scene).is_empty());
    }

    #[test]
    fn miss_with_extend_changes_nothing() {
        let (mut scene, _, _) = scene_with_squares();
        let vp = Viewport::new(100.0, 100.0);
        scene.select_all();

        let outcome = select_by_point(&mut scene, &vp, Point::new(50.0, 50.0), true, 2.0);
        assert!(!outcome.changed);
        assert_eq!(selected_ids(&scene).len(), 2);
    }

    #[test]
    fn rect_select_picks_intersecting_nodes() {
        let (mut scene, a, b) = scene_with_squares();

        let changed = select_by_rect(&mut scene, Rect::new(-1.0, -1.0, 11.0, 11.0), false);
        assert!(changed);
        assert_eq!(selected_ids(&scene), vec![a]);

        // Extending with a rect over the second square keeps the first.
        let changed = select_by_rect(&mut scene, Rect::new(19.0, -1.0, 31.0, 11.0), true);
        assert!(changed);
        assert_eq!(selected_ids(&scene), vec![a, b]);
    }

    #[test]
    fn rect_select_without_extend_replaces_selection() {
        let (mut scene, _, b) = scene_with_squares();
        scene.select_all();

        let changed = select_by_rect(&mut scene, Rect::new(19.0, -1.0, 31.0, 11.0), false);
        assert!(changed);
        assert_eq!(selected_ids(&scene), vec![b]);
    }

    #[test]
    fn rect_select_includes_zero_area_bounds() {
        let mut scene = SceneRoot::new();
        let mut line = kurbo::BezPath::new();
        line.move_to((2.0, 5.0));
        line.line_to((8.0, 5.0));
        let id = scene.insert(Layer::Main, Node::path(line, Symbol::default()));

        let changed = select_by_rect(&mut scene, Rect::new(0.0, 0.0, 10.0, 10.0), false);
        assert!(changed);
        assert_eq!(selected_ids(&scene), vec![id]);
    }

    #[test]
    fn noop_selection_leaves_revision_untouched() {
        let (mut scene, _, _) = scene_with_squares();
        let vp = Viewport::new(100.0, 100.0);
        let before = scene.revision();

        // Missed clicks with nothing selected, and a marquee over empty space.
        let outcome = select_by_point(&mut scene, &vp, Point::new(50.0, 50.0), false, 2.0);
        assert!(!outcome.changed);
        let outcome = select_by_point(&mut scene, &vp, Point::new(50.0, 50.0), true, 2.0);
        assert!(!outcome.changed);
        let changed = select_by_rect(&mut scene, Rect::new(60.0, 60.0, 70.0, 70.0), false);
        assert!(!changed);

        assert_eq!(scene.revision(), before);
    }

    #[test]
    fn rect_select_skips_invisible_and_unselectable() {
        let (mut scene, a, b) = scene_with_squares();
        scene.main_mut().find_mut(a).unwrap().set_visible(false);
        scene.main_mut().find_mut(b).unwrap().set_selectable(false);

        let changed = select_by_rect(&mut scene, Rect::new(-10.0, -10.0, 100.0, 100.0), false);
        assert!(!changed);
        assert!(selected_ids(&scene).is_empty());
    }
}
