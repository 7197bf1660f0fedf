// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The editor controller: one façade over scene, viewport, history, and
//! rendering.

use alloc::boxed::Box;
use core::fmt;
use core::mem;
use core::ops::{Deref, DerefMut};

use kurbo::{Affine, Insets, Point, Rect};
use peniko::Color;
use smallvec::SmallVec;

use glade_history::UndoHistory;
use glade_hit::{pick, select_by_point, select_by_rect, PickFilter, SelectionChange};
use glade_render::{FrameReport, RenderPipeline, RenderSurface, Tool};
use glade_scene::{Group, Layer, Node, NodeId, SceneRoot};
use glade_viewport::{ScaleChange, Viewport};

use crate::error::EditorError;

type ScaleObserver = Box<dyn FnMut(ScaleChange)>;
type SceneObserver = Box<dyn FnMut(u64)>;

/// Handle for a registered observer, used to unregister it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

struct GestureState {
    saved_main: Group,
    revision_at_start: u64,
}

/// The editor façade.
///
/// Owns the scene, the viewport, the undo history, and the render pipeline,
/// and keeps them consistent: every state-changing operation goes through
/// here, and registered observers are notified *after* the state has been
/// updated, so a callback reading back through the façade never sees a
/// stale value.
///
/// Observers are plain callbacks with no way back into the editor; the
/// notification flow is strictly one-directional.
pub struct Editor {
    scene: SceneRoot,
    viewport: Viewport,
    history: UndoHistory,
    pipeline: RenderPipeline,
    scale_observers: SmallVec<[(ObserverId, ScaleObserver); 2]>,
    scene_observers: SmallVec<[(ObserverId, SceneObserver); 2]>,
    next_observer: u64,
    suppress_depth: u32,
    pending_scale: Option<ScaleChange>,
    pending_scene: bool,
    gesture: Option<GestureState>,
}

impl Editor {
    /// Creates an editor for a display of the given pixel size, with an
    /// empty scene and a baseline history entry.
    #[must_use]
    pub fn new(display_width: f64, display_height: f64) -> Self {
        let scene = SceneRoot::new();
        let history = UndoHistory::new(scene.main());
        Self {
            scene,
            viewport: Viewport::new(display_width, display_height),
            history,
            pipeline: RenderPipeline::new(),
            scale_observers: SmallVec::new(),
            scene_observers: SmallVec::new(),
            next_observer: 0,
            suppress_depth: 0,
            pending_scale: None,
            pending_scene: false,
            gesture: None,
        }
    }

    /// Returns the scene.
    #[must_use]
    pub fn scene(&self) -> &SceneRoot {
        &self.scene
    }

    /// Returns the viewport.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Returns the undo history.
    #[must_use]
    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    // --- Scene operations ---

    /// Inserts a node into a layer, optionally clearing the existing
    /// selection first. Returns the assigned id.
    pub fn add_node(&mut self, layer: Layer, node: Node, deselect_existing: bool) -> NodeId {
        self.with_scene(|scene| {
            if deselect_existing {
                scene.deselect_all();
            }
            scene.insert(layer, node)
        })
    }

    /// Removes every selected node from the main layer. Returns the number
    /// removed.
    pub fn remove_selected(&mut self) -> usize {
        self.with_scene(SceneRoot::remove_selected)
    }

    /// Removes all nodes from the main layer.
    pub fn remove_all(&mut self) {
        self.with_scene(SceneRoot::clear_main);
    }

    /// Selects every selectable main-layer node. Returns `true` if the
    /// selection changed.
    pub fn select_all(&mut self) -> bool {
        self.with_scene(SceneRoot::select_all)
    }

    /// Deselects every main-layer node. Returns `true` if the selection
    /// changed.
    pub fn deselect_all(&mut self) -> bool {
        self.with_scene(SceneRoot::deselect_all)
    }

    /// Returns the union of the selected main-layer nodes' bounds.
    #[must_use]
    pub fn selected_bounds(&self) -> Option<Rect> {
        self.scene.selected_bounds()
    }

    /// Runs an arbitrary scene edit, notifying scene observers afterwards if
    /// the scene revision changed.
    pub fn edit_scene<R>(&mut self, f: impl FnOnce(&mut SceneRoot) -> R) -> R {
        self.with_scene(f)
    }

    fn with_scene<R>(&mut self, f: impl FnOnce(&mut SceneRoot) -> R) -> R {
        let before = self.scene.revision();
        let result = f(&mut self.scene);
        if self.scene.revision() != before {
            self.after_scene_change();
        }
        result
    }

    // --- Hit testing and selection ---

    /// Resolves a click at a screen point into a selection change.
    pub fn click_select(
        &mut self,
        screen_pt: Point,
        extend: bool,
        pixel_tolerance: f64,
    ) -> SelectionChange {
        let world = self.viewport.screen_to_world(screen_pt);
        let viewport = self.viewport.clone();
        self.with_scene(|scene| {
            select_by_point(scene, &viewport, world, extend, pixel_tolerance)
        })
    }

    /// Selects main-layer nodes intersecting the rectangle spanned by two
    /// screen points. Returns `true` if the selection changed.
    pub fn drag_select(&mut self, screen_a: Point, screen_b: Point, extend: bool) -> bool {
        let rect = Rect::from_points(
            self.viewport.screen_to_world(screen_a),
            self.viewport.screen_to_world(screen_b),
        );
        self.with_scene(|scene| select_by_rect(scene, rect, extend))
    }

    /// Returns the top-most pickable node under a screen point, without
    /// changing the selection.
    #[must_use]
    pub fn pick_at(&self, screen_pt: Point, pixel_tolerance: f64) -> Option<NodeId> {
        let world = self.viewport.screen_to_world(screen_pt);
        pick(
            self.scene.main(),
            &self.viewport,
            world,
            pixel_tolerance,
            PickFilter::default(),
        )
    }

    // --- Viewport operations ---

    /// Pans by a world-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.pan(dx, dy);
    }

    /// Pans by a screen-pixel delta: positive `dx_px` scrolls the view
    /// right, positive `dy_px` scrolls it down.
    pub fn pan_pixels(&mut self, dx_px: f64, dy_px: f64) {
        let scale = self.viewport.scale();
        self.viewport.pan(dx_px / scale, -dy_px / scale);
    }

    /// Multiplies the scale, keeping the display center fixed.
    pub fn zoom(&mut self, factor: f64) -> Option<ScaleChange> {
        let change = self.viewport.zoom(factor);
        self.relay_scale(change)
    }

    /// Multiplies the scale, keeping the world point under `screen_pt` fixed
    /// on screen.
    pub fn zoom_at(&mut self, screen_pt: Point, factor: f64) -> Option<ScaleChange> {
        let world = self.viewport.screen_to_world(screen_pt);
        let change = self.viewport.zoom_at_point(factor, world);
        self.relay_scale(change)
    }

    /// Sets the scale directly, keeping the display center fixed.
    pub fn set_scale(&mut self, scale: f64) -> Option<ScaleChange> {
        let change = self.viewport.set_scale(scale);
        self.relay_scale(change)
    }

    /// Centers on a world rectangle and scales so it fills the view.
    pub fn zoom_to_rect(&mut self, rect: Rect) -> Option<ScaleChange> {
        let change = self.viewport.zoom_to_rect(rect);
        self.relay_scale(change)
    }

    /// Fits the visible scene content into the view with a fractional
    /// border.
    ///
    /// An empty scene leaves the viewport unchanged and reports
    /// [`EditorError::NothingToShow`].
    pub fn fit_to_content(&mut self, border_frac: f64) -> Result<(), EditorError> {
        let bounds = self
            .scene
            .visible_bounds()
            .ok_or(EditorError::NothingToShow)?;
        let change = self.viewport.fit_to_content(bounds, border_frac);
        self.relay_scale(change);
        Ok(())
    }

    /// Centers the view on a world point.
    pub fn center_on(&mut self, world_pt: Point) {
        self.viewport.center_on(world_pt);
    }

    /// Sets the display size in pixels.
    pub fn set_display_size(&mut self, width: f64, height: f64) {
        self.viewport.set_display_size(width, height);
    }

    /// Sets the edge insets in pixels.
    pub fn set_insets(&mut self, insets: Insets) {
        self.viewport.set_insets(insets);
    }

    /// Sets the display density in pixels per inch.
    pub fn set_ppi(&mut self, ppi: f64) {
        self.viewport.set_ppi(ppi);
    }

    /// Sets the scale limits, re-clamping the current scale if needed.
    pub fn set_scale_limits(&mut self, min_scale: f64, max_scale: f64) -> Option<ScaleChange> {
        let change = self.viewport.set_scale_limits(min_scale, max_scale);
        self.relay_scale(change)
    }

    /// Returns the current scale in pixels per world unit.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.viewport.scale()
    }

    /// Returns world units per physical display inch.
    #[must_use]
    pub fn units_per_inch(&self) -> f64 {
        self.viewport.units_per_inch()
    }

    /// Returns the currently visible world rectangle.
    #[must_use]
    pub fn visible_world_rect(&self) -> Rect {
        self.viewport.visible_world_rect()
    }

    /// Converts a screen-pixel point into world space.
    #[must_use]
    pub fn screen_to_world(&self, p: Point) -> Point {
        self.viewport.screen_to_world(p)
    }

    /// Converts a world-space point into screen pixels.
    #[must_use]
    pub fn world_to_screen(&self, p: Point) -> Point {
        self.viewport.world_to_screen(p)
    }

    // --- Observers ---

    /// Registers a callback invoked after every effective scale change.
    pub fn on_scale_changed(&mut self, callback: impl FnMut(ScaleChange) + 'static) -> ObserverId {
        let id = self.next_observer_id();
        self.scale_observers.push((id, Box::new(callback)));
        id
    }

    /// Registers a callback invoked with the new revision after every scene
    /// change.
    pub fn on_scene_changed(&mut self, callback: impl FnMut(u64) + 'static) -> ObserverId {
        let id = self.next_observer_id();
        self.scene_observers.push((id, Box::new(callback)));
        id
    }

    /// Unregisters an observer. Returns `true` if it was registered.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.scale_observers.len() + self.scene_observers.len();
        self.scale_observers.retain(|(oid, _)| *oid != id);
        self.scene_observers.retain(|(oid, _)| *oid != id);
        self.scale_observers.len() + self.scene_observers.len() != before
    }

    /// Suspends observer notification for the lifetime of the returned
    /// guard.
    ///
    /// Operations performed through the guard behave normally, but
    /// notifications are coalesced: when the last guard drops, at most one
    /// scale notification (the latest) and one scene notification are
    /// delivered.
    pub fn suppress_notifications(&mut self) -> NotifyGuard<'_> {
        self.suppress_depth += 1;
        NotifyGuard { editor: self }
    }

    fn next_observer_id(&mut self) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        id
    }

    fn relay_scale(&mut self, change: Option<ScaleChange>) -> Option<ScaleChange> {
        if let Some(change) = change {
            if self.suppress_depth > 0 {
                self.pending_scale = Some(change);
            } else {
                self.dispatch_scale(change);
            }
        }
        change
    }

    fn after_scene_change(&mut self) {
        if self.suppress_depth > 0 {
            self.pending_scene = true;
        } else {
            let revision = self.scene.revision();
            self.dispatch_scene(revision);
        }
    }

    fn dispatch_scale(&mut self, change: ScaleChange) {
        // Callbacks have no way back into the editor, so the observer list
        // cannot change while it is detached.
        let mut observers = mem::take(&mut self.scale_observers);
        for (_, callback) in &mut observers {
            callback(change);
        }
        self.scale_observers = observers;
    }

    fn dispatch_scene(&mut self, revision: u64) {
        let mut observers = mem::take(&mut self.scene_observers);
        for (_, callback) in &mut observers {
            callback(revision);
        }
        self.scene_observers = observers;
    }

    fn end_suppression(&mut self) {
        self.suppress_depth -= 1;
        if self.suppress_depth > 0 {
            return;
        }
        if let Some(change) = self.pending_scale.take() {
            self.dispatch_scale(change);
        }
        if self.pending_scene {
            self.pending_scene = false;
            let revision = self.scene.revision();
            self.dispatch_scene(revision);
        }
    }

    // --- History ---

    /// Captures the current main layer as an undo entry.
    pub fn push_undo(&mut self, label: &str) {
        self.history.push(label, self.scene.main());
    }

    /// Collapses the history to a single baseline capture of the current
    /// state.
    pub fn reset_undo(&mut self) {
        self.history.reset(self.scene.main());
    }

    /// Restores the previous history entry into the main layer.
    pub fn undo(&mut self) -> Result<(), EditorError> {
        let group = self.history.undo()?;
        self.scene.replace_main(group);
        self.after_scene_change();
        Ok(())
    }

    /// Restores the next history entry into the main layer.
    pub fn redo(&mut self) -> Result<(), EditorError> {
        let group = self.history.redo()?;
        self.scene.replace_main(group);
        self.after_scene_change();
        Ok(())
    }

    /// Returns `true` if an undo step is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns `true` if a redo step is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Gestures ---

    /// Starts a continuous gesture.
    ///
    /// The current main layer is saved; intermediate edits do not create
    /// history entries. Exactly one entry is pushed at
    /// [`Editor::end_gesture`], or none if the gesture is cancelled or made
    /// no change.
    pub fn begin_gesture(&mut self) -> Result<(), EditorError> {
        if self.gesture.is_some() {
            return Err(EditorError::GestureInProgress);
        }
        self.gesture = Some(GestureState {
            saved_main: self.scene.main().clone(),
            revision_at_start: self.scene.revision(),
        });
        Ok(())
    }

    /// Ends the active gesture, pushing one undo entry under `label` if the
    /// scene changed. Returns whether an entry was pushed.
    pub fn end_gesture(&mut self, label: &str) -> Result<bool, EditorError> {
        let gesture = self.gesture.take().ok_or(EditorError::NoGesture)?;
        let changed = self.scene.revision() != gesture.revision_at_start;
        if changed {
            self.push_undo(label);
        }
        Ok(changed)
    }

    /// Cancels the active gesture, restoring the main layer to its state at
    /// [`Editor::begin_gesture`]. No history entry is created.
    pub fn cancel_gesture(&mut self) -> Result<(), EditorError> {
        let gesture = self.gesture.take().ok_or(EditorError::NoGesture)?;
        if self.scene.revision() != gesture.revision_at_start {
            self.scene.replace_main(gesture.saved_main);
            self.after_scene_change();
        }
        Ok(())
    }

    /// Returns `true` while a gesture is active.
    #[must_use]
    pub fn gesture_active(&self) -> bool {
        self.gesture.is_some()
    }

    // --- Rendering ---

    /// Renders one frame to a surface. See
    /// [`RenderPipeline::render`](glade_render::RenderPipeline::render) for
    /// the frame structure.
    pub fn render(
        &mut self,
        surface: &mut dyn RenderSurface,
        tool: Option<&mut dyn Tool>,
        preview: Option<Affine>,
    ) -> FrameReport {
        self.pipeline
            .render(surface, &self.scene, &self.viewport, tool, preview)
    }

    /// Sets the placeholder text shown when the main layer is empty.
    pub fn set_placeholder_text(&mut self, text: &str) {
        self.pipeline.set_placeholder_text(text);
    }

    /// Sets the highlight color for the selected pass.
    pub fn set_highlight_color(&mut self, color: Color) {
        self.pipeline.set_highlight_color(color);
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("scene", &self.scene)
            .field("viewport", &self.viewport)
            .field("history", &self.history)
            .field("scale_observers", &self.scale_observers.len())
            .field("scene_observers", &self.scene_observers.len())
            .field("gesture_active", &self.gesture.is_some())
            .finish_non_exhaustive()
    }
}

/// Scoped suppression token returned by [`Editor::suppress_notifications`].
///
/// Dereferences to the editor so suppressed operations read naturally;
/// dropping the guard re-enables delivery and flushes the coalesced
/// notifications.
pub struct NotifyGuard<'a> {
    editor: &'a mut Editor,
}

impl Deref for NotifyGuard<'_> {
    type Target = Editor;

    fn deref(&self) -> &Editor {
        self.editor
    }
}

impl DerefMut for NotifyGuard<'_> {
    fn deref_mut(&mut self) -> &mut Editor {
        self.editor
    }
}

impl Drop for NotifyGuard<'_> {
    fn drop(&mut self) {
        self.editor.end_suppression();
    }
}

impl fmt::Debug for NotifyGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyGuard").finish_non_exhaustive()
    }
}
