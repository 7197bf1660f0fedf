// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glade History: linear snapshot-based undo/redo.
//!
//! [`UndoHistory`] owns an ordered sequence of [`Snapshot`]s plus a cursor.
//! Every entry is a full-state capture of the main layer; undo and redo are
//! wholesale restores, not diffs. The semantics are the classic linear
//! history:
//!
//! - [`UndoHistory::push`] captures the state *after* a completed logical
//!   edit, truncates any redo tail, and moves the cursor to the new end.
//! - [`UndoHistory::undo`] / [`UndoHistory::redo`] move the cursor and
//!   return the group decoded from the snapshot at the new position.
//! - [`UndoHistory::reset`] replaces the entire history with a single clean
//!   baseline (used after a document load, so the loaded state is the
//!   unreachable-by-undo floor).
//!
//! Continuous gestures must push exactly one snapshot at gesture end, not
//! one per intermediate frame; the editor façade enforces this with its
//! begin/end-gesture API rather than leaving the timing to callers.
//!
//! ## Failure behavior
//!
//! A corrupt snapshot surfaces as [`HistoryError::Corrupt`]. The cursor does
//! **not** move in that case and the caller's scene is untouched, so a
//! failed undo can simply be reported and retried or abandoned.
//!
//! ## Invariants
//!
//! - `0 <= cursor < len` always (the history is never empty).
//! - `can_undo() == cursor > 0`; `can_redo() == cursor + 1 < len`.
//! - Both checks are O(1).
//!
//! ## Example
//!
//! ```rust
//! use glade_history::UndoHistory;
//! use glade_scene::{Group, Node, Symbol};
//! use kurbo::{Rect, Shape};
//!
//! let mut main = Group::new();
//! let mut history = UndoHistory::new(&main);
//!
//! main.push(Node::path(
//!     Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1),
//!     Symbol::default(),
//! ));
//! history.push("add square", &main);
//!
//! assert!(history.can_undo());
//! let restored = history.undo().unwrap();
//! assert!(restored.is_empty());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use glade_scene::Group;
use glade_snapshot::{DecodeError, Snapshot};

/// Errors surfaced by undo/redo operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryError {
    /// The cursor is already at the oldest entry.
    NothingToUndo,
    /// The cursor is already at the newest entry.
    NothingToRedo,
    /// The target snapshot could not be decoded. The cursor has not moved.
    Corrupt(DecodeError),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToUndo => write!(f, "nothing to undo"),
            Self::NothingToRedo => write!(f, "nothing to redo"),
            Self::Corrupt(err) => write!(f, "snapshot is unreadable: {err}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Corrupt(err) => Some(err),
            _ => None,
        }
    }
}

/// Label recorded for the baseline entry created by `new` and `reset`.
const BASELINE_LABEL: &str = "initial";

/// A linear undo/redo history of scene snapshots.
#[derive(Clone, Debug)]
pub struct UndoHistory {
    entries: Vec<Snapshot>,
    cursor: usize,
    next_stamp: u64,
    capacity: Option<usize>,
}

impl UndoHistory {
    /// Creates a history whose single entry is a baseline capture of
    /// `current`.
    #[must_use]
    pub fn new(current: &Group) -> Self {
        let mut history = Self {
            entries: Vec::new(),
            cursor: 0,
            next_stamp: 0,
            capacity: None,
        };
        history.reset(current);
        history
    }

    /// Limits the number of retained snapshots, evicting the oldest entries
    /// when exceeded.
    ///
    /// The entry at the cursor is never evicted, so [`UndoHistory::current`]
    /// keeps matching the live scene; when the cursor sits at the front (all
    /// edits undone), the redo tail is trimmed instead. The capacity is
    /// clamped to at least 2 so that one undo step is always available after
    /// a push. `None` removes the limit.
    pub fn set_capacity(&mut self, capacity: Option<usize>) {
        self.capacity = capacity.map(|c| c.max(2));
        self.evict_over_capacity();
    }

    /// Returns the number of retained snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: a history retains at least its baseline entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the cursor position (index of the entry matching the live
    /// scene).
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns `true` if an undo step is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns `true` if a redo step is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Returns the label of the entry at `index`, oldest first.
    #[must_use]
    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(Snapshot::label)
    }

    /// Returns the label of the edit that an [`UndoHistory::undo`] call
    /// would revert, for UI affordances like "Undo add node".
    #[must_use]
    pub fn undo_label(&self) -> Option<&str> {
        self.can_undo().then(|| self.entries[self.cursor].label())
    }

    /// Returns the label of the edit that an [`UndoHistory::redo`] call
    /// would reapply.
    #[must_use]
    pub fn redo_label(&self) -> Option<&str> {
        self.can_redo()
            .then(|| self.entries[self.cursor + 1].label())
    }

    /// Captures `current` under `label` after a completed logical edit.
    ///
    /// Any redo tail beyond the cursor is discarded: a new edit invalidates
    /// redo.
    pub fn push(&mut self, label: impl Into<String>, current: &Group) {
        self.entries.truncate(self.cursor + 1);
        let stamp = self.bump_stamp();
        self.entries.push(Snapshot::capture(current, label.into(), stamp));
        self.cursor = self.entries.len() - 1;
        self.evict_over_capacity();
    }

    /// Replaces the entire history with a single baseline capture of
    /// `current`.
    pub fn reset(&mut self, current: &Group) {
        let stamp = self.bump_stamp();
        self.entries.clear();
        self.entries
            .push(Snapshot::capture(current, String::from(BASELINE_LABEL), stamp));
        self.cursor = 0;
    }

    /// Moves one step back and returns the group restored from the snapshot
    /// there.
    ///
    /// On failure the cursor stays put; the caller's scene must only be
    /// replaced when this returns `Ok`.
    pub fn undo(&mut self) -> Result<Group, HistoryError> {
        if !self.can_undo() {
            return Err(HistoryError::NothingToUndo);
        }
        let target = self.cursor - 1;
        let group = self.entries[target]
            .restore()
            .map_err(HistoryError::Corrupt)?;
        self.cursor = target;
        Ok(group)
    }

    /// Moves one step forward and returns the group restored from the
    /// snapshot there.
    pub fn redo(&mut self) -> Result<Group, HistoryError> {
        if !self.can_redo() {
            return Err(HistoryError::NothingToRedo);
        }
        let target = self.cursor + 1;
        let group = self.entries[target]
            .restore()
            .map_err(HistoryError::Corrupt)?;
        self.cursor = target;
        Ok(group)
    }

    /// Returns the snapshot at the cursor (the entry matching the live
    /// scene).
    #[must_use]
    pub fn current(&self) -> &Snapshot {
        &self.entries[self.cursor]
    }

    fn bump_stamp(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }

    fn evict_over_capacity(&mut self) {
        let Some(cap) = self.capacity else {
            return;
        };
        // The entry at the cursor mirrors the live scene and must survive
        // eviction. Drop from the front while the cursor is past it; if the
        // cursor sits at the front, drop the redo tail instead.
        while self.entries.len() > cap && self.cursor > 0 {
            self.entries.remove(0);
            self.cursor -= 1;
        }
        while self.entries.len() > cap {
            self.entries.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use kurbo::{Rect, Shape};

    use glade_scene::{Node, Symbol};

    use super::*;

    fn square(i: f64) -> Node {
        Node::path(Rect::new(i, i, i + 1.0, i + 1.0).to_path(0.1), Symbol::default())
    }

    #[test]
    fn new_history_has_baseline_only() {
        let history = UndoHistory::new(&Group::new());
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.label_at(0), Some("initial"));
    }

    #[test]
    fn undo_redo_inverse_law() {
        let mut main = Group::new();
        let mut history = UndoHistory::new(&main);

        // Record the exact bytes after each push.
        let mut expected = Vec::new();
        expected.push(glade_snapshot::encode_group(&main));
        for i in 0..3 {
            main.push(square(i as f64));
            history.push("edit", &main);
            expected.push(glade_snapshot::encode_group(&main));
        }

        // Undo three times: states 2, 1, 0.
        for i in (0..3).rev() {
            let restored = history.undo().unwrap();
            assert_eq!(glade_snapshot::encode_group(&restored), expected[i]);
        }
        assert!(!history.can_undo());

        // Redo three times: states 1, 2, 3.
        for expected_bytes in expected.iter().skip(1) {
            let restored = history.redo().unwrap();
            assert_eq!(&glade_snapshot::encode_group(&restored), expected_bytes);
        }
        assert!(!history.can_redo());
    }

    #[test]
    fn push_after_undo_truncates_redo_tail() {
        let mut main = Group::new();
        let mut history = UndoHistory::new(&main);

        for label in ["A", "B", "C"] {
            main.push(square(main.len() as f64));
            history.push(label, &main);
        }

        let _ = history.undo().unwrap();
        let _ = history.undo().unwrap();
        assert!(history.can_redo());

        main.push(square(10.0));
        history.push("D", &main);

        // History is now [initial, A, D].
        assert_eq!(history.len(), 3);
        assert_eq!(history.label_at(0), Some("initial"));
        assert_eq!(history.label_at(1), Some("A"));
        assert_eq!(history.label_at(2), Some("D"));
        assert!(!history.can_redo());
        assert_eq!(history.cursor(), 2);
    }

    #[test]
    fn undo_at_floor_and_redo_at_tip_fail_cleanly() {
        let mut history = UndoHistory::new(&Group::new());
        assert_eq!(history.undo(), Err(HistoryError::NothingToUndo));
        assert_eq!(history.redo(), Err(HistoryError::NothingToRedo));
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn reset_collapses_history_to_baseline() {
        let mut main = Group::new();
        let mut history = UndoHistory::new(&main);
        main.push(square(0.0));
        history.push("edit", &main);

        history.reset(&main);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn capacity_evicts_oldest_entries() {
        let mut main = Group::new();
        let mut history = UndoHistory::new(&main);
        history.set_capacity(Some(3));

        for label in ["A", "B", "C", "D"] {
            main.push(square(main.len() as f64));
            history.push(label, &main);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.label_at(0), Some("B"));
        assert_eq!(history.label_at(2), Some("D"));
        // The cursor still points at the newest entry.
        assert_eq!(history.cursor(), 2);
        assert!(history.can_undo());
    }

    #[test]
    fn capacity_after_undos_keeps_cursor_entry() {
        let mut main = Group::new();
        let mut history = UndoHistory::new(&main);

        for label in ["A", "B", "C"] {
            main.push(square(main.len() as f64));
            history.push(label, &main);
        }

        // Undo everything; the live scene is back at the empty baseline.
        for _ in 0..3 {
            main = history.undo().unwrap();
        }
        assert!(main.is_empty());

        history.set_capacity(Some(2));

        // The baseline at the cursor survives; the redo tail is trimmed.
        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 0);
        let restored = history.current().restore().unwrap();
        assert_eq!(
            glade_snapshot::encode_group(&restored),
            glade_snapshot::encode_group(&main)
        );

        // The surviving redo step still restores the right state.
        assert_eq!(history.redo_label(), Some("A"));
        let redone = history.redo().unwrap();
        assert_eq!(redone.len(), 1);
    }

    #[test]
    fn undo_labels_track_cursor() {
        let mut main = Group::new();
        let mut history = UndoHistory::new(&main);
        main.push(square(0.0));
        history.push("add node", &main);

        assert_eq!(history.undo_label(), Some("add node"));
        assert_eq!(history.redo_label(), None);

        let _ = history.undo().unwrap();
        assert_eq!(history.undo_label(), None);
        assert_eq!(history.redo_label(), Some("add node"));
    }

    #[test]
    fn stamps_are_monotonic() {
        let mut main = Group::new();
        let mut history = UndoHistory::new(&main);
        let s0 = history.current().stamp();
        main.push(square(0.0));
        history.push("edit", &main);
        assert!(history.current().stamp() > s0);
    }
}
