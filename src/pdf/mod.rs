//! # PDF Serializer
//!
//! Takes the laid-out report from the layout engine and writes a valid PDF
//! file.
//!
//! This is a from-scratch PDF 1.7 writer. The subset a tabular report needs
//! is small: two standard Type1 fonts, filled and stroked rectangles, lines,
//! text, one or more image XObjects, and URI link annotations.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, images, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! No timestamps or IDs are written, so the same layout always produces the
//! same bytes.

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use crate::font::StandardFont;
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::{DrawCommand, LayoutElement, LayoutPage, LinkArea, ReportLayout};
use crate::model::Metadata;
use crate::style::TextAlign;
use miniz_oxide::deflate::compress_to_vec_zlib;

const PRODUCER: &str = "pdf-reporter";

pub struct PdfWriter;

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// (font, object id), in resource-name order.
    font_objects: Vec<(StandardFont, usize)>,
    /// XObject ids, indexed as /Im0, /Im1, ...
    image_objects: Vec<usize>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }

    /// Push a stream object with its dictionary entries (without /Length).
    fn push_stream(&mut self, dict: &str, data: &[u8]) -> usize {
        let mut obj: Vec<u8> = Vec::new();
        let _ = write!(obj, "<< {} /Length {} >>\nstream\n", dict, data.len());
        obj.extend_from_slice(data);
        obj.extend_from_slice(b"\nendstream");
        self.push(obj)
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write a laid-out report to a PDF byte vector.
    pub fn write(&self, layout: &ReportLayout, metadata: &Metadata) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            image_objects: Vec::new(),
        };

        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog,
        // 2 = Pages, 3+ = fonts, images, then per-page objects.
        builder.push(Vec::new());
        builder.push(Vec::new());
        builder.push(Vec::new());

        self.register_fonts(&mut builder);
        for image in &layout.images {
            let id = Self::write_image_xobject(&mut builder, image);
            builder.image_objects.push(id);
        }

        let font_resources = self.build_font_resource_dict(&builder);
        let xobject_resources = self.build_xobject_resource_dict(&builder);

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in &layout.pages {
            let content = self.build_content_stream(page);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
            let content_obj_id = builder.push_stream("/Filter /FlateDecode", &compressed);

            let annot_ids: Vec<usize> = page
                .links
                .iter()
                .map(|link| builder.push(Self::link_annotation(link, page.height).into_bytes()))
                .collect();

            let mut page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >>",
                page.width, page.height, content_obj_id, font_resources
            );
            if !xobject_resources.is_empty() {
                let _ = write!(page_dict, " /XObject << {} >>", xobject_resources);
            }
            page_dict.push_str(" >>");
            if !annot_ids.is_empty() {
                let refs: Vec<String> = annot_ids.iter().map(|id| format!("{} 0 R", id)).collect();
                let _ = write!(page_dict, " /Annots [{}]", refs.join(" "));
            }
            page_dict.push_str(" >>");
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", Self::encode_text(title));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject ({}) ", Self::encode_text(subject));
        }
        let _ = write!(info, "/Producer ({}) /Creator ({}) >>", PRODUCER, PRODUCER);
        let info_obj_id = builder.push(info.into_bytes());

        self.serialize(&builder, info_obj_id)
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(&self, page: &LayoutPage) -> String {
        let mut stream = String::new();
        for element in &page.elements {
            self.write_element(&mut stream, element, page.height);
        }
        stream
    }

    /// Write a single layout element as PDF operators. Layout y grows
    /// downward; PDF y grows upward from the bottom edge.
    fn write_element(&self, stream: &mut String, element: &LayoutElement, page_height: f64) {
        match &element.draw {
            DrawCommand::Rect { fill, stroke } => {
                let x = element.x;
                let y = page_height - element.y - element.height;
                let (w, h) = (element.width, element.height);

                if let Some(bg) = fill {
                    let (r, g, b) = bg.unit();
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        r, g, b, x, y, w, h
                    );
                }
                if let Some((color, width)) = stroke {
                    let (r, g, b) = color.unit();
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                        r, g, b, width, x, y, w, h
                    );
                }
            }

            DrawCommand::Line { color, line_width } => {
                let (r, g, b) = color.unit();
                let x1 = element.x;
                let y1 = page_height - element.y;
                let x2 = element.x + element.width;
                let y2 = page_height - element.y - element.height;
                let _ = write!(
                    stream,
                    "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    r, g, b, line_width, x1, y1, x2, y2
                );
            }

            DrawCommand::Text {
                text,
                font,
                size,
                color,
                align,
            } => {
                let width = font.metrics().measure_string(text, *size);
                let x = match align {
                    TextAlign::Left => element.x,
                    TextAlign::Center => element.x - width / 2.0,
                    TextAlign::Right => element.x - width,
                };
                let (r, g, b) = color.unit();
                let _ = write!(
                    stream,
                    "BT\n{:.3} {:.3} {:.3} rg\n/{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                    r,
                    g,
                    b,
                    font.resource_name(),
                    size,
                    x,
                    page_height - element.y,
                    Self::encode_text(text)
                );
            }

            DrawCommand::Image { index } => {
                let x = element.x;
                let y = page_height - element.y - element.height;
                let _ = write!(
                    stream,
                    "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                    element.width, element.height, x, y, index
                );
            }
        }
    }

    /// A /Link annotation with a /URI action over the area.
    fn link_annotation(link: &LinkArea, page_height: f64) -> String {
        let x1 = link.x;
        let y1 = page_height - link.y - link.height;
        format!(
            "<< /Type /Annot /Subtype /Link /Rect [{:.2} {:.2} {:.2} {:.2}] /Border [0 0 0] \
             /A << /Type /Action /S /URI /URI ({}) >> >>",
            x1,
            y1,
            x1 + link.width,
            y1 + link.height,
            Self::escape_pdf_string(&link.url)
        )
    }

    /// Both faces are registered up front so resource names stay fixed.
    fn register_fonts(&self, builder: &mut PdfBuilder) {
        for font in StandardFont::ALL {
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            let id = builder.push(font_dict.into_bytes());
            builder.font_objects.push((font, id));
        }
    }

    fn build_font_resource_dict(&self, builder: &PdfBuilder) -> String {
        builder
            .font_objects
            .iter()
            .map(|(font, obj_id)| format!("/{} {} 0 R", font.resource_name(), obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn build_xobject_resource_dict(&self, builder: &PdfBuilder) -> String {
        builder
            .image_objects
            .iter()
            .enumerate()
            .map(|(idx, obj_id)| format!("/Im{} {} 0 R", idx, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space_str = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} \
                     /BitsPerComponent 8 /Filter /DCTDecode",
                    image.width_px, image.height_px, color_space_str
                );
                builder.push_stream(&dict, data)
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                // SMask first so the image can reference it.
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let dict = format!(
                        "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceGray \
                         /BitsPerComponent 8 /Filter /FlateDecode",
                        image.width_px, image.height_px
                    );
                    builder.push_stream(&dict, &compress_to_vec_zlib(alpha_data, 6))
                });

                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB \
                     /BitsPerComponent 8 /Filter /FlateDecode{}",
                    image.width_px, image.height_px, smask_ref
                );
                builder.push_stream(&dict, &compress_to_vec_zlib(rgb, 6))
            }
        }
    }

    /// Escape special characters in a PDF string.
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
    }

    /// Encode text as a WinAnsi literal string body. Bytes outside printable
    /// ASCII are octal-escaped; unmappable characters become `?`.
    fn encode_text(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for ch in s.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252. Most codepoints in
    /// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
    /// holds smart quotes, bullets, dashes and the euro sign.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80),
            0x201A => Some(0x82),
            0x0192 => Some(0x83),
            0x201E => Some(0x84),
            0x2026 => Some(0x85),
            0x2020 => Some(0x86),
            0x2021 => Some(0x87),
            0x02C6 => Some(0x88),
            0x2030 => Some(0x89),
            0x0160 => Some(0x8A),
            0x2039 => Some(0x8B),
            0x0152 => Some(0x8C),
            0x017D => Some(0x8E),
            0x2018 => Some(0x91),
            0x2019 => Some(0x92),
            0x201C => Some(0x93),
            0x201D => Some(0x94),
            0x2022 => Some(0x95),
            0x2013 => Some(0x96),
            0x2014 => Some(0x97),
            0x02DC => Some(0x98),
            0x2122 => Some(0x99),
            0x0161 => Some(0x9A),
            0x203A => Some(0x9B),
            0x0153 => Some(0x9C),
            0x017E => Some(0x9E),
            0x0178 => Some(0x9F),
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}
