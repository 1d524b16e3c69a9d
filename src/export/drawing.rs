//! Drawing parts: picture anchors, cell comments and the legacy VML shapes
//! Excel needs to display those comments.

use quick_xml::escape::escape;
use std::fmt::Write as _;

use super::worksheet::{ImageAnchor, Note};
use crate::cell_ref::cell_ref;
use crate::color::resolve_color_str;

/// EMUs per pixel at 96 DPI.
const EMU_PER_PX: f64 = 9525.0;

/// One picture as placed in a drawing part.
pub(crate) struct PlacedImage<'a> {
    pub anchor: &'a ImageAnchor,
    pub image_rel: String,
    pub link_rel: Option<String>,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn emu(px: f64) -> u64 {
    (px.max(0.0) * EMU_PER_PX).round() as u64
}

pub(crate) fn write_drawing_xml(images: &[PlacedImage<'_>]) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(concat!(
        r#"<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" "#,
        r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#
    ));

    for (idx, placed) in images.iter().enumerate() {
        let image = placed.anchor;
        let options = &image.options;
        let cx = emu(f64::from(image.width) * options.x_scale.unwrap_or(1.0));
        let cy = emu(f64::from(image.height) * options.y_scale.unwrap_or(1.0));
        let col_off = emu(f64::from(options.x_offset.unwrap_or(0)));
        let row_off = emu(f64::from(options.y_offset.unwrap_or(0)));
        let id = idx + 2;

        out.push_str("<xdr:oneCellAnchor>");
        let _ = write!(
            out,
            "<xdr:from><xdr:col>{}</xdr:col><xdr:colOff>{col_off}</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>{row_off}</xdr:rowOff></xdr:from>",
            image.col, image.row
        );
        let _ = write!(out, "<xdr:ext cx=\"{cx}\" cy=\"{cy}\"/>");
        out.push_str("<xdr:pic><xdr:nvPicPr>");
        let _ = write!(out, "<xdr:cNvPr id=\"{id}\" name=\"Picture {}\"", idx + 1);
        if let Some(descr) = &options.description {
            let _ = write!(out, " descr=\"{}\"", escape(descr.as_str()));
        }
        match &placed.link_rel {
            Some(rel) => {
                out.push('>');
                let _ = write!(out, "<a:hlinkClick r:id=\"{rel}\"");
                if let Some(tip) = &options.tip {
                    let _ = write!(out, " tooltip=\"{}\"", escape(tip.as_str()));
                }
                out.push_str("/></xdr:cNvPr>");
            }
            None => out.push_str("/>"),
        }
        out.push_str(r#"<xdr:cNvPicPr><a:picLocks noChangeAspect="1"/></xdr:cNvPicPr></xdr:nvPicPr>"#);
        let _ = write!(
            out,
            "<xdr:blipFill><a:blip r:embed=\"{}\"/><a:stretch><a:fillRect/></a:stretch></xdr:blipFill>",
            placed.image_rel
        );
        let _ = write!(
            out,
            "<xdr:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm><a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></xdr:spPr>"
        );
        out.push_str("</xdr:pic><xdr:clientData/></xdr:oneCellAnchor>");
    }

    out.push_str("</xdr:wsDr>");
    out
}

pub(crate) fn write_comments_xml(notes: &[Note]) -> String {
    let mut authors: Vec<&str> = Vec::new();
    for note in notes {
        let author = note.options.author.as_deref().unwrap_or("");
        if !authors.contains(&author) {
            authors.push(author);
        }
    }

    let mut out = String::with_capacity(512);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(r#"<comments xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);
    out.push_str("<authors>");
    for author in &authors {
        let _ = write!(out, "<author>{}</author>", escape(*author));
    }
    out.push_str("</authors><commentList>");
    for note in notes {
        let author = note.options.author.as_deref().unwrap_or("");
        let author_id = authors.iter().position(|a| *a == author).unwrap_or(0);
        let _ = write!(
            out,
            "<comment ref=\"{}\" authorId=\"{author_id}\"><text><r><t xml:space=\"preserve\">{}</t></r></text></comment>",
            cell_ref(note.row, note.col),
            escape(note.text.as_str())
        );
    }
    out.push_str("</commentList></comments>");
    out
}

/// Legacy VML shapes for the comment boxes of one sheet.
///
/// `sheet_number` is 1-based and keeps shape ids unique across sheets.
pub(crate) fn write_vml(notes: &[Note], sheet_number: usize) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(concat!(
        r#"<xml xmlns:v="urn:schemas-microsoft-com:vml" "#,
        r#"xmlns:o="urn:schemas-microsoft-com:office:office" "#,
        r#"xmlns:x="urn:schemas-microsoft-com:office:excel">"#
    ));
    let _ = write!(
        out,
        "<o:shapelayout v:ext=\"edit\"><o:idmap v:ext=\"edit\" data=\"{sheet_number}\"/></o:shapelayout>"
    );
    out.push_str(concat!(
        r#"<v:shapetype id="_x0000_t202" coordsize="21600,21600" o:spt="202" path="m,l,21600r21600,l21600,xe">"#,
        r#"<v:stroke joinstyle="miter"/><v:path gradientshapeok="t" o:connecttype="rect"/></v:shapetype>"#
    ));

    for (idx, note) in notes.iter().enumerate() {
        let options = &note.options;
        let shape_id = sheet_number * 1024 + idx + 1;
        let width = 108.0 * options.x_scale.unwrap_or(1.0);
        let height = 59.25 * options.y_scale.unwrap_or(1.0);
        let visible = options.visible.unwrap_or(false);
        let fill = options
            .color
            .as_deref()
            .and_then(resolve_color_str)
            .and_then(|argb| argb.get(2..).map(|rgb| format!("#{}", rgb.to_ascii_lowercase())))
            .unwrap_or_else(|| "#ffffe1".to_string());

        let _ = write!(
            out,
            "<v:shape id=\"_x0000_s{shape_id}\" type=\"#_x0000_t202\" style=\"position:absolute;margin-left:59.25pt;margin-top:1.5pt;width:{width:.2}pt;height:{height:.2}pt;z-index:{};visibility:{}\" fillcolor=\"{fill}\" o:insetmode=\"auto\">",
            idx + 1,
            if visible { "visible" } else { "hidden" }
        );
        let _ = write!(
            out,
            "<v:fill color2=\"{fill}\"/><v:shadow on=\"t\" color=\"black\" obscured=\"t\"/><v:path o:connecttype=\"none\"/>"
        );
        out.push_str(r#"<v:textbox style="mso-direction-alt:auto"><div style="text-align:left"></div></v:textbox>"#);
        let _ = write!(
            out,
            "<x:ClientData ObjectType=\"Note\"><x:MoveWithCells/><x:SizeWithCells/><x:Anchor>{}, 15, {}, 10, {}, 15, {}, 4</x:Anchor><x:AutoFill>False</x:AutoFill><x:Row>{}</x:Row><x:Column>{}</x:Column>",
            u64::from(note.col) + 1,
            note.row,
            u64::from(note.col) + 3,
            u64::from(note.row) + 4,
            note.row,
            note.col
        );
        if visible {
            out.push_str("<x:Visible/>");
        }
        out.push_str("</x:ClientData></v:shape>");
    }

    out.push_str("</xml>");
    out
}
