//! Common test utilities and assertion helpers.
//!
//! Helpers for inspecting bound layouts, recorded sink calls and the parts
//! of generated XLSX packages.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use sheetbox::layout::{Layout, NodeId};
use sheetbox::sink::SinkOp;
use sheetbox::RecordingSink;

// ============================================================================
// Layout Helpers
// ============================================================================

/// `(row, col)` of a bound node.
pub fn coords(layout: &Layout, id: NodeId) -> (u32, u32) {
    (layout.row(id).unwrap(), layout.col(id).unwrap())
}

/// The `n`th child of `id`.
pub fn child(layout: &Layout, id: NodeId, n: usize) -> NodeId {
    layout[id].children()[n]
}

/// Follow a path of child indices from the root.
pub fn descend(layout: &Layout, path: &[usize]) -> NodeId {
    path.iter()
        .fold(layout.root(), |id, &n| child(layout, id, n))
}

// ============================================================================
// Sink Helpers
// ============================================================================

/// Coordinates of every plain write, in call order.
pub fn write_coords(sink: &RecordingSink) -> Vec<(u32, u32)> {
    sink.writes().map(|(row, col, _, _)| (row, col)).collect()
}

pub fn count_ops(sink: &RecordingSink, pred: impl Fn(&SinkOp) -> bool) -> usize {
    sink.ops.iter().filter(|op| pred(op)).count()
}

// ============================================================================
// XLSX Helpers
// ============================================================================

/// Read one part of an XLSX package as text.
pub fn read_part(xlsx: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(xlsx)).expect("Failed to open ZIP archive");
    let mut file = archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("missing part {name}"));
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
}

pub fn part_names(xlsx: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(xlsx)).unwrap();
    archive.file_names().map(str::to_string).collect()
}

/// One `<c>` element as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellXml {
    pub style: Option<u32>,
    pub kind: Option<String>,
    pub text: String,
}

/// Every cell of a worksheet part, keyed by A1 reference.
pub fn sheet_cells(xml: &str) -> BTreeMap<String, CellXml> {
    let mut reader = Reader::from_str(xml);
    let mut cells = BTreeMap::new();
    let mut current: Option<(String, CellXml)> = None;

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) if e.name().as_ref() == b"c" => {
                current = Some(parse_cell_attrs(&e));
            }
            Event::Empty(e) if e.name().as_ref() == b"c" => {
                let (reference, cell) = parse_cell_attrs(&e);
                cells.insert(reference, cell);
            }
            Event::Text(t) => {
                if let Some((_, cell)) = current.as_mut() {
                    cell.text.push_str(&t.unescape().unwrap());
                }
            }
            Event::End(e) if e.name().as_ref() == b"c" => {
                if let Some((reference, cell)) = current.take() {
                    cells.insert(reference, cell);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    cells
}

fn parse_cell_attrs(e: &quick_xml::events::BytesStart<'_>) -> (String, CellXml) {
    let mut reference = String::new();
    let mut cell = CellXml::default();
    for attr in e.attributes() {
        let attr = attr.unwrap();
        let value = attr.unescape_value().unwrap().into_owned();
        match attr.key.as_ref() {
            b"r" => reference = value,
            b"s" => cell.style = value.parse().ok(),
            b"t" => cell.kind = Some(value),
            _ => {}
        }
    }
    (reference, cell)
}

/// Values of `attr` on every `element` in document order.
pub fn attr_values(xml: &str, element: &str, attr: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = Vec::new();
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == element.as_bytes() => {
                for a in e.attributes() {
                    let a = a.unwrap();
                    if a.key.as_ref() == attr.as_bytes() {
                        out.push(a.unescape_value().unwrap().into_owned());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    out
}

/// A small PNG, `width` x `height` pixels.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::new(width, height);
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}
