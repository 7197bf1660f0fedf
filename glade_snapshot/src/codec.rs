// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Encoder and decoder for the snapshot byte format.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use kurbo::{BezPath, PathEl, Point, Rect};
use peniko::Color;

use glade_scene::{Geometry, Group, ImageRef, Node, NodeFlags, NodeId, NodeKind, Symbol};

use crate::{DecodeError, FORMAT_VERSION};

const MAGIC: &[u8; 4] = b"GLSN";

// Node payload tags.
const TAG_PATH: u8 = 0;
const TAG_TEXT: u8 = 1;
const TAG_IMAGE: u8 = 2;
const TAG_GROUP: u8 = 3;

// Path element tags.
const EL_MOVE: u8 = 0;
const EL_LINE: u8 = 1;
const EL_QUAD: u8 = 2;
const EL_CURVE: u8 = 3;
const EL_CLOSE: u8 = 4;

/// Upper bound on any encoded count, guarding against allocation bombs from
/// corrupt length prefixes.
const MAX_COUNT: u32 = 1 << 24;

/// Encodes a group to the canonical snapshot byte form.
#[must_use]
pub fn encode_group(group: &Group) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    write_u16(&mut out, FORMAT_VERSION);
    write_group(&mut out, group);
    out
}

/// Decodes a snapshot blob back into a group.
///
/// The entire input must be consumed; trailing bytes are an error.
pub fn decode_group(bytes: &[u8]) -> Result<Group, DecodeError> {
    let mut r = Reader { bytes, pos: 0 };
    let magic = r.take(4)?;
    if magic != MAGIC {
        return Err(DecodeError::BadMagic);
    }
    let version = r.u16()?;
    if version != FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }
    let group = read_group(&mut r)?;
    if r.pos != r.bytes.len() {
        return Err(DecodeError::TrailingBytes);
    }
    Ok(group)
}

fn write_group(out: &mut Vec<u8>, group: &Group) {
    write_u32(out, group.len() as u32);
    for node in group.children() {
        write_node(out, node);
    }
}

fn write_node(out: &mut Vec<u8>, node: &Node) {
    write_u64(out, node.id().to_raw());
    out.push(node.flags().bits());
    match node.name() {
        Some(name) => {
            out.push(1);
            write_str(out, name);
        }
        None => out.push(0),
    }
    match node.kind() {
        NodeKind::Leaf { geometry, symbol } => {
            match geometry {
                Geometry::Path(path) => {
                    out.push(TAG_PATH);
                    write_path(out, path);
                }
                Geometry::Text { anchor, text, size } => {
                    out.push(TAG_TEXT);
                    write_point(out, *anchor);
                    write_str(out, text);
                    write_f64(out, *size);
                }
                Geometry::Image { rect, image } => {
                    out.push(TAG_IMAGE);
                    write_rect(out, *rect);
                    write_u32(out, image.width);
                    write_u32(out, image.height);
                    write_u32(out, image.data.len() as u32);
                    out.extend_from_slice(&image.data);
                }
            }
            write_symbol(out, symbol);
        }
        NodeKind::Group(group) => {
            out.push(TAG_GROUP);
            write_group(out, group);
        }
    }
}

fn write_path(out: &mut Vec<u8>, path: &BezPath) {
    write_u32(out, path.elements().len() as u32);
    for el in path.elements() {
        match el {
            PathEl::MoveTo(p) => {
                out.push(EL_MOVE);
                write_point(out, *p);
            }
            PathEl::LineTo(p) => {
                out.push(EL_LINE);
                write_point(out, *p);
            }
            PathEl::QuadTo(p1, p2) => {
                out.push(EL_QUAD);
                write_point(out, *p1);
                write_point(out, *p2);
            }
            PathEl::CurveTo(p1, p2, p3) => {
                out.push(EL_CURVE);
                write_point(out, *p1);
                write_point(out, *p2);
                write_point(out, *p3);
            }
            PathEl::ClosePath => out.push(EL_CLOSE),
        }
    }
}

fn write_symbol(out: &mut Vec<u8>, symbol: &Symbol) {
    write_f64(out, symbol.stroke_width);
    write_color(out, symbol.stroke);
    match symbol.fill {
        Some(fill) => {
            out.push(1);
            write_color(out, fill);
        }
        None => out.push(0),
    }
    write_u32(out, symbol.dash.len() as u32);
    for &d in &symbol.dash {
        write_f64(out, d);
    }
    write_f64(out, symbol.dash_phase);
    out.push(u8::from(symbol.scale_invariant));
}

fn write_color(out: &mut Vec<u8>, color: Color) {
    for c in color.components {
        out.extend_from_slice(&c.to_bits().to_le_bytes());
    }
}

fn write_point(out: &mut Vec<u8>, p: Point) {
    write_f64(out, p.x);
    write_f64(out, p.y);
}

fn write_rect(out: &mut Vec<u8>, r: Rect) {
    write_f64(out, r.x0);
    write_f64(out, r.y0);
    write_f64(out, r.x1);
    write_f64(out, r.y1);
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    write_u32(out, s.len() as u32);
    out.extend_from_slice(s.as_bytes());
}

fn write_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_u64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_f64(out: &mut Vec<u8>, v: f64) {
    out.extend_from_slice(&v.to_bits().to_le_bytes());
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.checked_add(n).ok_or(DecodeError::UnexpectedEof)?;
        if end > self.bytes.len() {
            return Err(DecodeError::UnexpectedEof);
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64, DecodeError> {
        let b = self.take(8)?;
        let mut buf = [0_u8; 8];
        buf.copy_from_slice(b);
        Ok(u64::from_le_bytes(buf))
    }

    fn f64(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_bits(self.u64()?))
    }

    fn f32(&mut self) -> Result<f32, DecodeError> {
        let b = self.take(4)?;
        Ok(f32::from_bits(u32::from_le_bytes([b[0], b[1], b[2], b[3]])))
    }

    fn count(&mut self) -> Result<u32, DecodeError> {
        let n = self.u32()?;
        if n > MAX_COUNT {
            return Err(DecodeError::InvalidValue);
        }
        Ok(n)
    }

    fn string(&mut self) -> Result<String, DecodeError> {
        let len = self.count()? as usize;
        let bytes = self.take(len)?;
        core::str::from_utf8(bytes)
            .map(String::from)
            .map_err(|_| DecodeError::InvalidUtf8)
    }

    fn point(&mut self) -> Result<Point, DecodeError> {
        Ok(Point::new(self.f64()?, self.f64()?))
    }

    fn rect(&mut self) -> Result<Rect, DecodeError> {
        Ok(Rect::new(self.f64()?, self.f64()?, self.f64()?, self.f64()?))
    }

    fn color(&mut self) -> Result<Color, DecodeError> {
        Ok(Color::new([self.f32()?, self.f32()?, self.f32()?, self.f32()?]))
    }
}

fn read_group(r: &mut Reader<'_>) -> Result<Group, DecodeError> {
    let count = r.count()? as usize;
    let mut children = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        children.push(read_node(r)?);
    }
    Ok(Group::from_nodes(children))
}

fn read_node(r: &mut Reader<'_>) -> Result<Node, DecodeError> {
    let id = NodeId::from_raw(r.u64()?);
    let flags = NodeFlags::from_bits(r.u8()?).ok_or(DecodeError::InvalidValue)?;
    let name = match r.u8()? {
        0 => None,
        1 => Some(r.string()?),
        _ => return Err(DecodeError::InvalidValue),
    };

    let tag = r.u8()?;
    let node = match tag {
        TAG_PATH => {
            let path = read_path(r)?;
            let symbol = read_symbol(r)?;
            Node::path(path, symbol)
        }
        TAG_TEXT => {
            let anchor = r.point()?;
            let text = r.string()?;
            let size = r.f64()?;
            let symbol = read_symbol(r)?;
            Node::text(anchor, text, size, symbol)
        }
        TAG_IMAGE => {
            let rect = r.rect()?;
            let width = r.u32()?;
            let height = r.u32()?;
            let len = r.count()? as usize;
            let data: Arc<[u8]> = r.take(len)?.into();
            let image = ImageRef::new(width, height, data).ok_or(DecodeError::InvalidValue)?;
            let symbol = read_symbol(r)?;
            Node::image(rect, image, symbol)
        }
        TAG_GROUP => {
            let group = read_group(r)?;
            Node::group(group.children().to_vec())
        }
        other => return Err(DecodeError::InvalidTag(other)),
    };

    let mut node = node.with_flags(flags).with_id(id);
    if let Some(name) = name {
        node = node.with_name(name);
    }
    Ok(node)
}

fn read_path(r: &mut Reader<'_>) -> Result<BezPath, DecodeError> {
    let count = r.count()? as usize;
    let mut els = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        let el = match r.u8()? {
            EL_MOVE => PathEl::MoveTo(r.point()?),
            EL_LINE => PathEl::LineTo(r.point()?),
            EL_QUAD => PathEl::QuadTo(r.point()?, r.point()?),
            EL_CURVE => PathEl::CurveTo(r.point()?, r.point()?, r.point()?),
            EL_CLOSE => PathEl::ClosePath,
            other => return Err(DecodeError::InvalidTag(other)),
        };
        els.push(el);
    }
    Ok(BezPath::from_vec(els))
}

fn read_symbol(r: &mut Reader<'_>) -> Result<Symbol, DecodeError> {
    let stroke_width = r.f64()?;
    let stroke = r.color()?;
    let fill = match r.u8()? {
        0 => None,
        1 => Some(r.color()?),
        _ => return Err(DecodeError::InvalidValue),
    };
    let dash_len = r.count()? as usize;
    let mut dash = Vec::with_capacity(dash_len.min(1024));
    for _ in 0..dash_len {
        dash.push(r.f64()?);
    }
    let dash_phase = r.f64()?;
    let scale_invariant = match r.u8()? {
        0 => false,
        1 => true,
        _ => return Err(DecodeError::InvalidValue),
    };

    let mut symbol = Symbol::stroked(stroke, stroke_width).with_dash(dash, dash_phase);
    if let Some(fill) = fill {
        symbol = symbol.with_fill(fill);
    }
    if scale_invariant {
        symbol = symbol.with_scale_invariant();
    }
    Ok(symbol)
}
