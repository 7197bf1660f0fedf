// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The three-layer scene root.

use kurbo::Rect;

use crate::node::{Group, Node};
use crate::types::NodeId;

/// The three fixed layers of a scene, in draw order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Rendered first; not user-editable.
    Background,
    /// The user-editable content layer; the only layer covered by undo/redo.
    Main,
    /// Ephemeral tool overlays; may be cleared freely.
    Foreground,
}

/// Root of the scene graph: exactly three ordered groups, never more or
/// fewer.
///
/// The root allocates [`NodeId`]s, owns the layer groups, and tracks a
/// monotonically increasing revision counter that bumps on every mutation.
/// Observers (render caches, dirty flags) compare revisions instead of
/// diffing content.
#[derive(Clone, Debug)]
pub struct SceneRoot {
    background: Group,
    main: Group,
    foreground: Group,
    next_id: u64,
    revision: u64,
}

impl SceneRoot {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            background: Group::new(),
            main: Group::new(),
            foreground: Group::new(),
            // Id 0 is the unassigned placeholder.
            next_id: 1,
            revision: 0,
        }
    }

    /// Returns the current revision counter.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the group for a layer.
    #[must_use]
    pub fn layer(&self, layer: Layer) -> &Group {
        match layer {
            Layer::Background => &self.background,
            Layer::Main => &self.main,
            Layer::Foreground => &self.foreground,
        }
    }

    /// Returns the main (user-editable) layer.
    #[must_use]
    pub fn main(&self) -> &Group {
        &self.main
    }

    /// Returns the main layer mutably, bumping the revision.
    ///
    /// Any mutable access is treated as a change; callers that only want to
    /// read should use [`SceneRoot::main`].
    pub fn main_mut(&mut self) -> &mut Group {
        self.bump_revision();
        &mut self.main
    }

    /// Runs an edit against the main layer, bumping the revision only if
    /// the closure reports at least one change.
    ///
    /// The closure returns the number of nodes it changed. Zero leaves the
    /// revision untouched, so observers and render caches see a true no-op;
    /// flag sweeps like selection resolution use this instead of
    /// [`SceneRoot::main_mut`].
    pub fn edit_main(&mut self, f: impl FnOnce(&mut Group) -> usize) -> usize {
        let changed = f(&mut self.main);
        if changed > 0 {
            self.bump_revision();
        }
        changed
    }

    /// Inserts a node into a layer, assigning fresh ids to the node and any
    /// descendants. Returns the id of the inserted node.
    pub fn insert(&mut self, layer: Layer, mut node: Node) -> NodeId {
        node.assign_ids(&mut self.next_id);
        let id = node.id();
        match layer {
            Layer::Background => self.background.push(node),
            Layer::Main => self.main.push(node),
            Layer::Foreground => self.foreground.push(node),
        }
        self.bump_revision();
        id
    }

    /// Removes every selected node from the main layer. Returns the number
    /// of removed nodes.
    pub fn remove_selected(&mut self) -> usize {
        let removed = self.main.remove_selected();
        if removed > 0 {
            self.bump_revision();
        }
        removed
    }

    /// Removes all nodes from the main layer.
    pub fn clear_main(&mut self) {
        if !self.main.is_empty() {
            self.main.clear();
            self.bump_revision();
        }
    }

    /// Removes all nodes from the foreground layer.
    pub fn clear_foreground(&mut self) {
        if !self.foreground.is_empty() {
            self.foreground.clear();
            self.bump_revision();
        }
    }

    /// Selects every selectable node in the main layer. Returns `true` if
    /// the selection changed.
    pub fn select_all(&mut self) -> bool {
        let changed = self.main.set_selected_all(true) > 0;
        if changed {
            self.bump_revision();
        }
        changed
    }

    /// Deselects every node in the main layer. Returns `true` if the
    /// selection changed.
    pub fn deselect_all(&mut self) -> bool {
        let changed = self.main.set_selected_all(false) > 0;
        if changed {
            self.bump_revision();
        }
        changed
    }

    /// Returns the union of the selected main-layer nodes' bounds.
    #[must_use]
    pub fn selected_bounds(&self) -> Option<Rect> {
        self.main.selected_bounds()
    }

    /// Returns the union of the visible bounds across all three layers.
    ///
    /// Nodes without bounds contribute nothing; an entirely empty scene
    /// yields `None`, which consumers must treat as "nothing to show" rather
    /// than an error.
    #[must_use]
    pub fn visible_bounds(&self) -> Option<Rect> {
        [&self.background, &self.main, &self.foreground]
            .into_iter()
            .filter_map(Group::bounds)
            .reduce(|acc, r| acc.union(r))
    }

    /// Replaces the main layer's content wholesale.
    ///
    /// This is the restore path for undo/redo: the incoming group carries the
    /// node ids it was encoded with, and the id allocator is advanced past
    /// them so later inserts never collide.
    pub fn replace_main(&mut self, main: Group) {
        self.next_id = self.next_id.max(main.max_id() + 1);
        self.main = main;
        self.bump_revision();
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl Default for SceneRoot {
    fn default() -> Self {
        Self::new()
    }
}
