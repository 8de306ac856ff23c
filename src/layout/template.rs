//! The chrome drawn on every page: white header band, logo, title block,
//! footer rule and page counter.

use super::{DrawCommand, LayoutElement};
use crate::font::StandardFont;
use crate::format::date::short_date;
use crate::image_loader::LoadedImage;
use crate::model::{ExportOptions, PageConfig};
use crate::style::{Color, TextAlign};

/// Rewritten with the final page count once every page is laid out.
pub const TOTAL_PAGES_PLACEHOLDER: &str = "{total_pages_count_string}";

pub const DEFAULT_TITLE: &str = "Grid Export";

const LOGO_WIDTH: f64 = 120.0;
const LOGO_TOP: f64 = 20.0;
const TITLE_SIZE: f64 = 16.0;
const SUBTITLE_SIZE: f64 = 11.0;
const SMALL_SIZE: f64 = 9.0;
const FOOTER_LINE_WIDTH: f64 = 0.5;

/// Where the logo goes on each page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoSlot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LogoSlot {
    /// Right-aligned against the right margin, height from the image aspect.
    pub fn for_image(image: &LoadedImage, config: &PageConfig) -> Self {
        Self {
            x: config.width - LOGO_WIDTH - config.margin.right,
            y: LOGO_TOP,
            width: LOGO_WIDTH,
            height: LOGO_WIDTH * image.aspect_ratio(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageTemplate {
    pub title: String,
    pub subtitle: Option<String>,
    /// e.g. `Fecha: 5/3/2024`
    pub date_label: String,
}

impl PageTemplate {
    pub fn from_options(options: &ExportOptions) -> Self {
        let title = options
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE)
            .to_string();
        let subtitle = options
            .subtitle
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let date = options
            .generated_on
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        Self {
            title,
            subtitle,
            date_label: format!("Fecha: {}", short_date(date)),
        }
    }

    /// Elements for page `page_number` (1-based). The footer counter keeps
    /// the total-pages placeholder until the layout resolves it.
    pub fn paint(
        &self,
        config: &PageConfig,
        page_number: usize,
        logo: Option<&(usize, LogoSlot)>,
    ) -> Vec<LayoutElement> {
        let left = config.margin.left;
        let mut elements = vec![LayoutElement {
            x: 0.0,
            y: 0.0,
            width: config.width,
            height: (config.margin.top - 10.0).max(0.0),
            draw: DrawCommand::Rect {
                fill: Some(Color::WHITE),
                stroke: None,
            },
        }];

        if let Some((index, slot)) = logo {
            elements.push(LayoutElement {
                x: slot.x,
                y: slot.y,
                width: slot.width,
                height: slot.height,
                draw: DrawCommand::Image { index: *index },
            });
        }

        elements.push(text(&self.title, left, 32.0, StandardFont::HelveticaBold, TITLE_SIZE, Color::BLACK, TextAlign::Left));

        let date_y = match &self.subtitle {
            Some(subtitle) => {
                elements.push(text(subtitle, left, 50.0, StandardFont::Helvetica, SUBTITLE_SIZE, Color::BLACK, TextAlign::Left));
                68.0
            }
            None => 50.0,
        };
        elements.push(text(&self.date_label, left, date_y, StandardFont::Helvetica, SMALL_SIZE, Color::BLACK, TextAlign::Left));

        let footer_y = config.height - config.margin.bottom;
        elements.push(LayoutElement {
            x: left,
            y: footer_y + 15.0,
            width: config.width - config.margin.right - left,
            height: 0.0,
            draw: DrawCommand::Line {
                color: Color::GRID_LINE,
                line_width: FOOTER_LINE_WIDTH,
            },
        });

        let counter = format!("Página {} de {}", page_number, TOTAL_PAGES_PLACEHOLDER);
        elements.push(text(
            &counter,
            config.width / 2.0,
            footer_y + 32.0,
            StandardFont::Helvetica,
            SMALL_SIZE,
            Color::FOOTER_TEXT,
            TextAlign::Center,
        ));

        elements
    }
}

fn text(content: &str, x: f64, y: f64, font: StandardFont, size: f64, color: Color, align: TextAlign) -> LayoutElement {
    LayoutElement {
        x,
        y,
        width: font.metrics().measure_string(content, size),
        height: size,
        draw: DrawCommand::Text {
            text: content.to_string(),
            font,
            size,
            color,
            align,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn options(subtitle: Option<&str>) -> ExportOptions {
        ExportOptions {
            title: Some("Ventas".to_string()),
            subtitle: subtitle.map(str::to_string),
            generated_on: NaiveDate::from_ymd_opt(2024, 3, 5),
            ..Default::default()
        }
    }

    fn text_at(elements: &[LayoutElement], wanted: &str) -> Option<(f64, f64)> {
        elements.iter().find_map(|e| match &e.draw {
            DrawCommand::Text { text, .. } if text == wanted => Some((e.x, e.y)),
            _ => None,
        })
    }

    #[test]
    fn title_defaults_when_blank() {
        let template = PageTemplate::from_options(&ExportOptions {
            title: Some("  ".to_string()),
            ..Default::default()
        });
        assert_eq!(template.title, DEFAULT_TITLE);
    }

    #[test]
    fn date_moves_up_without_subtitle() {
        let config = PageConfig::default();
        let with = PageTemplate::from_options(&options(Some("Marzo"))).paint(&config, 1, None);
        assert_eq!(text_at(&with, "Marzo"), Some((30.0, 50.0)));
        assert_eq!(text_at(&with, "Fecha: 5/3/2024"), Some((30.0, 68.0)));

        let without = PageTemplate::from_options(&options(None)).paint(&config, 1, None);
        assert_eq!(text_at(&without, "Fecha: 5/3/2024"), Some((30.0, 50.0)));
    }

    #[test]
    fn footer_counter_is_centered_with_placeholder() {
        let config = PageConfig::default();
        let elements = PageTemplate::from_options(&options(None)).paint(&config, 2, None);
        let counter = format!("Página 2 de {}", TOTAL_PAGES_PLACEHOLDER);
        assert_eq!(text_at(&elements, &counter), Some((396.0, 612.0 - 50.0 + 32.0)));
    }

    #[test]
    fn logo_is_right_aligned() {
        let config = PageConfig::default();
        let image = LoadedImage {
            pixel_data: crate::image_loader::ImagePixelData::Decoded {
                rgb: vec![0; 12],
                alpha: None,
            },
            width_px: 4,
            height_px: 1,
        };
        let slot = LogoSlot::for_image(&image, &config);
        assert_eq!(slot, LogoSlot { x: 642.0, y: 20.0, width: 120.0, height: 30.0 });

        let elements = PageTemplate::from_options(&options(None)).paint(&config, 1, Some(&(0, slot)));
        assert!(elements.iter().any(|e| matches!(e.draw, DrawCommand::Image { index: 0 })));
    }
}
