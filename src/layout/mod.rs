//! # Layout Orchestrator
//!
//! Turns the resolved columns, header rows and table body into positioned
//! pages. This is where pagination happens.
//!
//! Coordinates are in points with the origin at the top-left of the page;
//! the PDF writer flips them. Text elements are positioned by their
//! baseline, and `x` is the anchor implied by their alignment (left edge,
//! center, or right edge).
//!
//! Layout runs in two passes: the table and the per-page template are laid
//! out page by page, then [`resolve_total_pages`] rewrites the page-count
//! placeholder once the final page count is known.

pub mod table;
pub mod template;

use crate::body::TableBody;
use crate::columns::groups::HeaderRows;
use crate::columns::PrintableColumn;
use crate::error::ExportError;
use crate::font::{FontContext, StandardFont};
use crate::image_loader::LoadedImage;
use crate::model::{ColumnType, ExportOptions, PageConfig};
use crate::style::{Color, HeaderColors, TextAlign};
use crate::text::TextLayout;

pub use template::{PageTemplate, TOTAL_PAGES_PLACEHOLDER};

/// Narrowest width a column without a percentage is given.
pub const MIN_AUTO_COLUMN_WIDTH: f64 = 24.0;

/// Base font size when none is configured.
pub const DEFAULT_FONT_SIZE: f64 = 10.0;

/// A fully laid-out page ready for PDF serialization.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
    /// Clickable regions, written as URI link annotations.
    pub links: Vec<LinkArea>,
}

impl LayoutPage {
    fn blank(config: &PageConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            elements: Vec::new(),
            links: Vec::new(),
        }
    }

    /// All text drawn on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match &e.draw {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A positioned element on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
}

/// What to actually draw for this element.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Filled and/or stroked rectangle covering the element box.
    Rect {
        fill: Option<Color>,
        stroke: Option<(Color, f64)>,
    },
    /// Straight line from the element origin to `(x + width, y + height)`.
    Line { color: Color, line_width: f64 },
    /// One line of text.
    Text {
        text: String,
        font: StandardFont,
        size: f64,
        color: Color,
        align: TextAlign,
    },
    /// An image from [`ReportLayout::images`], stretched over the box.
    Image { index: usize },
}

/// A rectangle that opens `url` when clicked.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub url: String,
}

/// The laid-out report: pages plus the images they reference by index.
#[derive(Debug, Clone, Default)]
pub struct ReportLayout {
    pub pages: Vec<LayoutPage>,
    pub images: Vec<LoadedImage>,
}

/// Table-wide style settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub header_colors: HeaderColors,
    pub header_font_size: f64,
    pub body_font_size: f64,
    pub padding: f64,
    pub header_min_height: f64,
    pub body_min_height: f64,
    pub line_width: f64,
    pub line_color: Color,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_colors: HeaderColors::default(),
            header_font_size: DEFAULT_FONT_SIZE,
            body_font_size: DEFAULT_FONT_SIZE - 2.0,
            padding: 4.0,
            header_min_height: 20.0,
            body_min_height: 15.0,
            line_width: 0.1,
            line_color: Color::GRID_LINE,
        }
    }
}

fn parse_color(raw: Option<&str>, default: Color) -> Result<Color, ExportError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(hex) => Color::parse_hex(hex).ok_or_else(|| ExportError::InvalidColor(hex.to_string())),
    }
}

impl TableStyle {
    /// Apply the caller's header colors and base font size. Headers use the
    /// base size, body cells two points less.
    pub fn from_options(options: &ExportOptions) -> Result<Self, ExportError> {
        let defaults = HeaderColors::default();
        let header_colors = HeaderColors {
            fill: parse_color(options.header_fill.as_deref(), defaults.fill)?,
            text: parse_color(options.header_color.as_deref(), defaults.text)?,
        };
        let base = match options.font_size {
            None => DEFAULT_FONT_SIZE,
            Some(size) if size.is_finite() && size > 2.0 => size,
            Some(size) => return Err(ExportError::InvalidFontSize(size)),
        };
        Ok(Self {
            header_colors,
            header_font_size: base,
            body_font_size: base - 2.0,
            ..Self::default()
        })
    }
}

/// Body alignment by column type; headers are always centered.
pub fn column_alignment(column_type: ColumnType) -> TextAlign {
    match column_type {
        ColumnType::Number => TextAlign::Right,
        ColumnType::Date => TextAlign::Center,
        ColumnType::Text | ColumnType::Boolean => TextAlign::Left,
    }
}

/// Column widths from the columns' width percentages of `available_width`.
/// Columns without a usable percentage share what is left equally, never
/// narrower than [`MIN_AUTO_COLUMN_WIDTH`].
pub fn resolve_column_widths(percentages: &[Option<f64>], available_width: f64) -> Vec<f64> {
    let mut widths = Vec::with_capacity(percentages.len());
    let mut remaining = available_width;
    let mut auto_count = 0;
    let mut total_pct = 0.0;

    for pct in percentages {
        match pct.filter(|p| p.is_finite() && *p > 0.0) {
            Some(p) => {
                let w = p / 100.0 * available_width;
                widths.push(w);
                remaining -= w;
                total_pct += p;
            }
            None => {
                widths.push(0.0);
                auto_count += 1;
            }
        }
    }

    if total_pct > 100.0 {
        log::warn!(
            "column width percentages add up to {:.2}%; the table will overflow the page",
            total_pct
        );
    }

    if auto_count > 0 {
        let auto_width = (remaining / auto_count as f64).max(MIN_AUTO_COLUMN_WIDTH);
        for (w, pct) in widths.iter_mut().zip(percentages) {
            if !pct.is_some_and(|p| p.is_finite() && p > 0.0) {
                *w = auto_width;
            }
        }
    }

    widths
}

/// Everything the table renderer needs, precomputed.
pub struct TableInput<'t> {
    pub widths: Vec<f64>,
    pub alignments: Vec<TextAlign>,
    pub header: &'t HeaderRows,
    pub body: &'t TableBody,
    pub style: &'t TableStyle,
}

impl<'t> TableInput<'t> {
    pub fn new(
        columns: &[PrintableColumn<'_>],
        header: &'t HeaderRows,
        body: &'t TableBody,
        style: &'t TableStyle,
        page: &PageConfig,
    ) -> Self {
        let percentages: Vec<Option<f64>> = columns.iter().map(|c| c.width_percentage()).collect();
        Self {
            widths: resolve_column_widths(&percentages, page.content_width()),
            alignments: columns.iter().map(|c| column_alignment(c.column_type())).collect(),
            header,
            body,
            style,
        }
    }
}

/// Tracks where we are on the current page during layout.
#[derive(Debug, Clone)]
struct PageCursor {
    config: PageConfig,
    content_x: f64,
    content_y: f64,
    content_height: f64,
    /// Offset below `content_y`.
    y: f64,
    elements: Vec<LayoutElement>,
    links: Vec<LinkArea>,
}

impl PageCursor {
    fn new(config: &PageConfig) -> Self {
        Self {
            config: *config,
            content_x: config.margin.left,
            content_y: config.margin.top,
            content_height: config.height - config.margin.vertical(),
            y: 0.0,
            elements: Vec::new(),
            links: Vec::new(),
        }
    }

    fn remaining_height(&self) -> f64 {
        (self.content_height - self.y).max(0.0)
    }

    /// Absolute y of the cursor.
    fn top(&self) -> f64 {
        self.content_y + self.y
    }

    fn finalize(self) -> LayoutPage {
        let mut page = LayoutPage::blank(&self.config);
        page.elements = self.elements;
        page.links = self.links;
        page
    }

    fn new_page(&self) -> Self {
        PageCursor::new(&self.config)
    }
}

/// The main layout engine.
pub struct LayoutEngine {
    text_layout: TextLayout,
    font_context: FontContext,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            text_layout: TextLayout::new(),
            font_context: FontContext::new(),
        }
    }

    /// Lay out the whole report: table pages, then the template on every
    /// page, then the total-pages pass.
    pub fn layout(
        &self,
        config: &PageConfig,
        template: &PageTemplate,
        table: &TableInput<'_>,
        logo: Option<LoadedImage>,
    ) -> ReportLayout {
        let mut pages = self.layout_table(config, table);

        let mut images = Vec::new();
        let logo_slot = logo.map(|image| {
            let slot = template::LogoSlot::for_image(&image, config);
            images.push(image);
            (0, slot)
        });

        for (index, page) in pages.iter_mut().enumerate() {
            let mut chrome = template.paint(config, index + 1, logo_slot.as_ref());
            // The template draws behind the table.
            chrome.append(&mut page.elements);
            page.elements = chrome;
        }

        resolve_total_pages(&mut pages);
        log::debug!("laid out {} page(s)", pages.len());

        ReportLayout { pages, images }
    }
}

/// Replace the total-pages placeholder on every page with the page count.
pub fn resolve_total_pages(pages: &mut [LayoutPage]) {
    let total = pages.len().to_string();
    for page in pages.iter_mut() {
        for element in &mut page.elements {
            if let DrawCommand::Text { text, .. } = &mut element.draw {
                if text.contains(TOTAL_PAGES_PLACEHOLDER) {
                    *text = text.replace(TOTAL_PAGES_PLACEHOLDER, &total);
                }
            }
        }
    }
}
