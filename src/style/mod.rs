//! # Style System
//!
//! The handful of visual properties a report table needs: colors, font
//! weight, size and alignment. Everything else about the page is fixed by
//! the report template.

use serde::{Deserialize, Serialize};

use crate::classify::RowKind;

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb8(0, 0, 0);
    pub const WHITE: Color = Color::rgb8(255, 255, 255);

    /// Brand fill used for header rows unless the caller overrides it.
    pub const BRAND: Color = Color::rgb8(113, 45, 61);

    pub const EVEN_ROW: Color = Color::rgb8(255, 255, 255);
    pub const ODD_ROW: Color = Color::rgb8(249, 249, 249);
    pub const GROUP_ROW: Color = Color::rgb8(242, 242, 242);
    pub const TOTAL_ROW: Color = Color::rgb8(230, 230, 230);

    pub const GRID_LINE: Color = Color::rgb8(200, 200, 200);
    pub const FOOTER_TEXT: Color = Color::rgb8(100, 100, 100);
    pub const LINK: Color = Color::rgb8(0, 102, 204);

    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to 0.0 - 1.0, as PDF color operators expect.
    pub fn unit(&self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }

    /// Parse `#rgb` or `#rrggbb` (the leading `#` is optional).
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => Some(Self::rgb8(
                channel(&hex[0..1].repeat(2))?,
                channel(&hex[1..2].repeat(2))?,
                channel(&hex[2..3].repeat(2))?,
            )),
            6 => Some(Self::rgb8(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
}

/// Fill and text color shared by every header row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderColors {
    pub fill: Color,
    pub text: Color,
}

impl Default for HeaderColors {
    fn default() -> Self {
        Self {
            fill: Color::BRAND,
            text: Color::WHITE,
        }
    }
}

/// Background and weight of one body row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowStyle {
    pub fill: Color,
    pub bold: bool,
}

impl RowStyle {
    /// Plain rows alternate by zero-based position; group headers and totals
    /// override the stripe.
    pub fn for_row(index: usize, kind: RowKind) -> Self {
        match kind {
            RowKind::GroupHeader => RowStyle {
                fill: Color::GROUP_ROW,
                bold: true,
            },
            RowKind::Subtotal | RowKind::Total => RowStyle {
                fill: Color::TOTAL_ROW,
                bold: true,
            },
            RowKind::Data => RowStyle {
                fill: if index % 2 == 0 {
                    Color::EVEN_ROW
                } else {
                    Color::ODD_ROW
                },
                bold: false,
            },
        }
    }
}
