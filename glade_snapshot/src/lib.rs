// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glade Snapshot: an explicit, versioned binary codec for the scene graph.
//!
//! This crate serializes a [`Group`] (in practice, the main layer of a
//! [`SceneRoot`](glade_scene::SceneRoot)) to an opaque byte blob and back.
//! It exists for one consumer: the undo/redo history, which stores full-state
//! snapshots and restores them wholesale.
//!
//! The format is deliberately *not* a general document format:
//! - It is stable within a running session; cross-version compatibility is
//!   out of scope (the version field exists so decoders can refuse blobs
//!   they do not understand rather than misread them).
//! - Encoding is canonical: decoding a valid blob and re-encoding it yields
//!   byte-identical output. Undo/redo tests rely on this to compare states
//!   by comparing blobs.
//! - Decoding is total: any malformed input yields a [`DecodeError`], never
//!   a panic.
//!
//! ## Layout
//!
//! All scalars are little-endian; `f64` values are stored as raw bit
//! patterns so non-finite values round-trip losslessly.
//!
//! ```text
//! blob   := magic "GLSN" | version u16 | group
//! group  := count u32 | node*
//! node   := id u64 | flags u8 | name option<string> | tag u8 | payload
//! ```
//!
//! ## Example
//!
//! ```rust
//! use glade_scene::{Group, Node, Symbol};
//! use glade_snapshot::{decode_group, encode_group};
//! use kurbo::{Rect, Shape};
//!
//! let group = Group::from_nodes(vec![Node::path(
//!     Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1),
//!     Symbol::default(),
//! )]);
//!
//! let bytes = encode_group(&group);
//! let restored = decode_group(&bytes).unwrap();
//! assert_eq!(restored, group);
//! assert_eq!(encode_group(&restored), bytes);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod codec;

use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

use glade_scene::Group;

pub use codec::{decode_group, encode_group};

/// Current snapshot format version.
pub const FORMAT_VERSION: u16 = 1;

/// Errors produced while decoding a snapshot blob.
///
/// Decoding never panics; every malformed input maps to one of these
/// variants. The history treats all of them as "this snapshot is corrupt":
/// the cursor stays put and the live scene is left unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// Input ended before the expected data.
    UnexpectedEof,
    /// The blob does not start with the snapshot magic.
    BadMagic,
    /// The blob's format version is not supported by this decoder.
    UnsupportedVersion(u16),
    /// An enum tag byte had no defined meaning.
    InvalidTag(u8),
    /// A string field was not valid UTF-8.
    InvalidUtf8,
    /// A field value was structurally invalid (unknown flag bits, image
    /// byte-length mismatch, oversized count).
    InvalidValue,
    /// Valid data was followed by unconsumed trailing bytes.
    TrailingBytes,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "snapshot ended unexpectedly"),
            Self::BadMagic => write!(f, "not a scene snapshot (bad magic)"),
            Self::UnsupportedVersion(v) => {
                write!(f, "unsupported snapshot format version {v}")
            }
            Self::InvalidTag(t) => write!(f, "invalid snapshot tag byte {t:#04x}"),
            Self::InvalidUtf8 => write!(f, "snapshot string is not valid UTF-8"),
            Self::InvalidValue => write!(f, "snapshot field value is invalid"),
            Self::TrailingBytes => write!(f, "snapshot has trailing bytes"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

#[cfg(feature = "std")]
extern crate std;

/// An opaque, immutable snapshot of the main layer, paired with a
/// human-readable action label.
///
/// Snapshots are created after an undoable mutation completes, never
/// mutated, and discarded when evicted from history. The blob is shared via
/// `Arc`, so cloning a snapshot (or keeping one alive on another thread for
/// reading) is cheap.
#[derive(Clone, Debug)]
pub struct Snapshot {
    bytes: Arc<[u8]>,
    label: String,
    stamp: u64,
}

impl Snapshot {
    /// Captures the current state of `group` under `label`.
    ///
    /// `stamp` is a caller-supplied monotonic sequence number ordering this
    /// snapshot relative to its history.
    #[must_use]
    pub fn capture(group: &Group, label: String, stamp: u64) -> Self {
        Self {
            bytes: encode_group(group).into(),
            label,
            stamp,
        }
    }

    /// Returns the encoded bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the action label this snapshot was recorded under.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the monotonic sequence stamp.
    #[must_use]
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    /// Decodes the snapshot back into a group.
    pub fn restore(&self) -> Result<Group, DecodeError> {
        decode_group(&self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn snapshot_of_empty_group_restores_empty() {
        let snap = Snapshot::capture(&Group::new(), "clean".to_string(), 0);
        assert_eq!(snap.label(), "clean");
        assert_eq!(snap.stamp(), 0);
        let restored = snap.restore().unwrap();
        assert!(restored.is_empty());
    }

    #[test]
    fn identical_groups_capture_identical_bytes() {
        let group = Group::new();
        let a = Snapshot::capture(&group, "a".to_string(), 1);
        let b = Snapshot::capture(&group, "b".to_string(), 2);
        assert_eq!(a.bytes(), b.bytes());
    }
}
