//! # Font Management
//!
//! The report draws only with the standard Helvetica faces, which every PDF
//! viewer carries, so nothing is embedded. Measurement uses the AFM widths
//! in [`metrics`].

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// The standard PDF fonts the report uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    pub fn for_weight(bold: bool) -> Self {
        if bold {
            Self::HelveticaBold
        } else {
            Self::Helvetica
        }
    }

    /// The PDF base font name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Resource name used in page content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "F1",
            Self::HelveticaBold => "F2",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
        }
    }

    pub const ALL: [StandardFont; 2] = [StandardFont::Helvetica, StandardFont::HelveticaBold];
}

/// Shared font context used by layout and PDF serialization.
#[derive(Debug, Default, Clone, Copy)]
pub struct FontContext;

impl FontContext {
    pub fn new() -> Self {
        Self
    }

    /// Advance width of a single character in points.
    pub fn char_width(&self, ch: char, font: StandardFont, font_size: f64) -> f64 {
        font.metrics().char_width(ch, font_size)
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font: StandardFont, font_size: f64) -> f64 {
        font.metrics().measure_string(text, font_size)
    }
}
