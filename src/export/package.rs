//! Assemble the XLSX ZIP package from in-memory worksheets.

use quick_xml::escape::escape;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::FileOptions;
use zip::ZipWriter;

use super::drawing::{write_comments_xml, write_drawing_xml, write_vml, PlacedImage};
use super::sheet_writer::{write_sheet_xml, SheetRels};
use super::styles::StyleTable;
use super::worksheet::Worksheet;
use crate::error::Result;

const REL_OFFICE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_PACKAGE: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

struct Relationship {
    id: String,
    kind: &'static str,
    target: String,
    external: bool,
}

impl Relationship {
    fn internal(id: String, kind: &'static str, target: String) -> Self {
        Self {
            id,
            kind,
            target,
            external: false,
        }
    }
}

fn write_rels(rels: &[Relationship]) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    let _ = write!(out, "<Relationships xmlns=\"{REL_PACKAGE}\">");
    for rel in rels {
        let _ = write!(
            out,
            "<Relationship Id=\"{}\" Type=\"{REL_OFFICE}/{}\" Target=\"{}\"",
            rel.id,
            rel.kind,
            escape(rel.target.as_str())
        );
        if rel.external {
            out.push_str(" TargetMode=\"External\"");
        }
        out.push_str("/>");
    }
    out.push_str("</Relationships>");
    out
}

/// Parts discovered while laying out the package, needed for
/// `[Content_Types].xml`.
#[derive(Default)]
struct Manifest {
    sheets: usize,
    drawings: Vec<usize>,
    comments: Vec<usize>,
    has_png: bool,
    has_jpeg: bool,
}

impl Manifest {
    fn content_types(&self) -> String {
        let mut out = String::with_capacity(1024);
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        out.push('\n');
        out.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        out.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
        out.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        if self.has_png {
            out.push_str(r#"<Default Extension="png" ContentType="image/png"/>"#);
        }
        if self.has_jpeg {
            out.push_str(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#);
        }
        if !self.comments.is_empty() {
            out.push_str(r#"<Default Extension="vml" ContentType="application/vnd.openxmlformats-officedocument.vmlDrawing"/>"#);
        }
        out.push_str(r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
        out.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
        for n in 1..=self.sheets {
            let _ = write!(
                out,
                "<Override PartName=\"/xl/worksheets/sheet{n}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>"
            );
        }
        for n in &self.drawings {
            let _ = write!(
                out,
                "<Override PartName=\"/xl/drawings/drawing{n}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.drawing+xml\"/>"
            );
        }
        for n in &self.comments {
            let _ = write!(
                out,
                "<Override PartName=\"/xl/comments{n}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.comments+xml\"/>"
            );
        }
        out.push_str("</Types>");
        out
    }
}

fn workbook_xml(sheets: &[Worksheet]) -> String {
    let mut out = String::with_capacity(512);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    let _ = write!(
        out,
        "<workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" xmlns:r=\"{REL_OFFICE}\"><sheets>"
    );
    for (idx, sheet) in sheets.iter().enumerate() {
        let n = idx + 1;
        let _ = write!(
            out,
            "<sheet name=\"{}\" sheetId=\"{n}\" r:id=\"rId{n}\"/>",
            escape(sheet.name())
        );
    }
    out.push_str("</sheets></workbook>");
    out
}

struct Package {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
}

impl Package {
    fn add(&mut self, name: &str, contents: &[u8]) -> Result<()> {
        self.writer.start_file(name, self.options)?;
        self.writer.write_all(contents)?;
        Ok(())
    }
}

/// Serialize `sheets` into a complete XLSX file.
pub(crate) fn write_package(sheets: &[Worksheet]) -> Result<Vec<u8>> {
    let mut package = Package {
        writer: ZipWriter::new(Cursor::new(Vec::with_capacity(16 * 1024))),
        options: FileOptions::default().compression_method(zip::CompressionMethod::Deflated),
    };
    let mut styles = StyleTable::new();
    let mut manifest = Manifest {
        sheets: sheets.len(),
        ..Manifest::default()
    };
    let mut media_count = 0usize;
    let mut drawing_count = 0usize;

    for (idx, sheet) in sheets.iter().enumerate() {
        let n = idx + 1;
        let xf_ids: Vec<u32> = sheet.formats.iter().map(|s| styles.register(s)).collect();
        let mut sheet_rels = Vec::new();
        let mut rel_ids = SheetRels::default();

        if !sheet.images.is_empty() {
            drawing_count += 1;
            let mut drawing_rels = Vec::new();
            let mut placed = Vec::with_capacity(sheet.images.len());
            for image in &sheet.images {
                media_count += 1;
                let media = format!("image{media_count}.{}", image.extension);
                match image.extension {
                    "png" => manifest.has_png = true,
                    _ => manifest.has_jpeg = true,
                }
                package.add(&format!("xl/media/{media}"), &image.data)?;

                let image_rel = format!("rId{}", drawing_rels.len() + 1);
                drawing_rels.push(Relationship::internal(
                    image_rel.clone(),
                    "image",
                    format!("../media/{media}"),
                ));
                let link_rel = image.options.url.as_ref().map(|url| {
                    let id = format!("rId{}", drawing_rels.len() + 1);
                    drawing_rels.push(Relationship {
                        id: id.clone(),
                        kind: "hyperlink",
                        target: url.clone(),
                        external: true,
                    });
                    id
                });
                placed.push(PlacedImage {
                    anchor: image,
                    image_rel,
                    link_rel,
                });
            }
            package.add(
                &format!("xl/drawings/drawing{drawing_count}.xml"),
                write_drawing_xml(&placed).as_bytes(),
            )?;
            package.add(
                &format!("xl/drawings/_rels/drawing{drawing_count}.xml.rels"),
                write_rels(&drawing_rels).as_bytes(),
            )?;
            manifest.drawings.push(drawing_count);

            let id = format!("rId{}", sheet_rels.len() + 1);
            sheet_rels.push(Relationship::internal(
                id.clone(),
                "drawing",
                format!("../drawings/drawing{drawing_count}.xml"),
            ));
            rel_ids.drawing = Some(id);
        }

        if !sheet.notes.is_empty() {
            package.add(
                &format!("xl/comments{n}.xml"),
                write_comments_xml(&sheet.notes).as_bytes(),
            )?;
            package.add(
                &format!("xl/drawings/vmlDrawing{n}.vml"),
                write_vml(&sheet.notes, n).as_bytes(),
            )?;
            manifest.comments.push(n);

            sheet_rels.push(Relationship::internal(
                format!("rId{}", sheet_rels.len() + 1),
                "comments",
                format!("../comments{n}.xml"),
            ));
            let id = format!("rId{}", sheet_rels.len() + 1);
            sheet_rels.push(Relationship::internal(
                id.clone(),
                "vmlDrawing",
                format!("../drawings/vmlDrawing{n}.vml"),
            ));
            rel_ids.legacy_drawing = Some(id);
        }

        package.add(
            &format!("xl/worksheets/sheet{n}.xml"),
            write_sheet_xml(sheet, &xf_ids, &rel_ids).as_bytes(),
        )?;
        if !sheet_rels.is_empty() {
            package.add(
                &format!("xl/worksheets/_rels/sheet{n}.xml.rels"),
                write_rels(&sheet_rels).as_bytes(),
            )?;
        }
        debug!(
            sheet = sheet.name(),
            cells = sheet.cells.len(),
            merges = sheet.merges.len(),
            images = sheet.images.len(),
            notes = sheet.notes.len(),
            "worksheet serialized"
        );
    }

    let mut workbook_rels: Vec<Relationship> = (1..=sheets.len())
        .map(|n| {
            Relationship::internal(
                format!("rId{n}"),
                "worksheet",
                format!("worksheets/sheet{n}.xml"),
            )
        })
        .collect();
    workbook_rels.push(Relationship::internal(
        format!("rId{}", sheets.len() + 1),
        "styles",
        "styles.xml".to_string(),
    ));

    package.add("xl/styles.xml", styles.to_xml().as_bytes())?;
    package.add("xl/workbook.xml", workbook_xml(sheets).as_bytes())?;
    package.add(
        "xl/_rels/workbook.xml.rels",
        write_rels(&workbook_rels).as_bytes(),
    )?;
    package.add(
        "_rels/.rels",
        write_rels(&[Relationship::internal(
            "rId1".to_string(),
            "officeDocument",
            "xl/workbook.xml".to_string(),
        )])
        .as_bytes(),
    )?;
    package.add("[Content_Types].xml", manifest.content_types().as_bytes())?;

    let cursor = package.writer.finish()?;
    Ok(cursor.into_inner())
}
