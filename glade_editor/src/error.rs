// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use glade_history::HistoryError;

/// Errors surfaced by the editor façade.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorError {
    /// An undo/redo operation failed.
    History(HistoryError),
    /// The scene has no visible content to fit the view to.
    NothingToShow,
    /// A gesture was started while another one was active.
    GestureInProgress,
    /// A gesture was ended or cancelled without one being active.
    NoGesture,
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::History(err) => write!(f, "{err}"),
            Self::NothingToShow => write!(f, "the scene has nothing to show"),
            Self::GestureInProgress => write!(f, "a gesture is already in progress"),
            Self::NoGesture => write!(f, "no gesture is in progress"),
        }
    }
}

impl From<HistoryError> for EditorError {
    fn from(err: HistoryError) -> Self {
        Self::History(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::History(err) => Some(err),
            _ => None,
        }
    }
}
