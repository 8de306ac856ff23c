//! Paginated table rendering.
//!
//! Header rows open every page. A body row that does not fit in what is
//! left of the page moves whole to the next one. Only a row taller than an
//! empty page is split, line by line, across as many pages as it needs.

use super::{DrawCommand, LayoutElement, LayoutEngine, LayoutPage, LinkArea, PageCursor, TableInput};
use crate::classify::RowKind;
use crate::font::StandardFont;
use crate::model::PageConfig;
use crate::style::{Color, RowStyle, TextAlign, VerticalAlign};
use crate::text::BrokenLine;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.15;

/// Helvetica ascender, as a fraction of the font size.
const ASCENT: f64 = 0.718;

/// A cell ready to be measured and drawn.
struct CellSpec<'c> {
    text: &'c str,
    x: f64,
    width: f64,
    align: TextAlign,
    url: Option<&'c str>,
}

/// Shared appearance of one row.
#[derive(Clone, Copy)]
struct RowLook {
    fill: Color,
    text: Color,
    font: StandardFont,
    size: f64,
    min_height: f64,
    valign: VerticalAlign,
}

impl LayoutEngine {
    /// Lay out header and body rows into as many pages as needed. Always
    /// yields at least one page.
    pub(super) fn layout_table(&self, config: &PageConfig, table: &TableInput<'_>) -> Vec<LayoutPage> {
        let mut pages = Vec::new();
        let mut cursor = PageCursor::new(config);
        let start_x = cursor.content_x;

        let header_look = RowLook {
            fill: table.style.header_colors.fill,
            text: table.style.header_colors.text,
            font: StandardFont::HelveticaBold,
            size: table.style.header_font_size,
            min_height: table.style.header_min_height,
            valign: VerticalAlign::Middle,
        };

        let header_rows: Vec<Vec<CellSpec<'_>>> = table
            .header
            .rows
            .iter()
            .map(|row| {
                let mut x = start_x;
                let mut column = 0;
                row.iter()
                    .map(|cell| {
                        let end = (column + cell.col_span).min(table.widths.len());
                        let width: f64 = table.widths[column.min(end)..end].iter().sum();
                        let spec = CellSpec {
                            text: &cell.content,
                            x,
                            width,
                            align: TextAlign::Center,
                            url: None,
                        };
                        x += width;
                        column = end;
                        spec
                    })
                    .collect()
            })
            .collect();

        self.draw_header(&mut cursor, &header_rows, header_look, table);
        let mut body_rows_on_page = 0;

        for (index, cells) in table.body.rows.iter().enumerate() {
            let kind = table.body.kinds.get(index).copied().unwrap_or(RowKind::Data);
            let row_style = RowStyle::for_row(index, kind);
            let look = RowLook {
                fill: row_style.fill,
                text: Color::BLACK,
                font: StandardFont::for_weight(row_style.bold),
                size: table.style.body_font_size,
                min_height: table.style.body_min_height,
                valign: VerticalAlign::Top,
            };

            let mut x = start_x;
            let specs: Vec<CellSpec<'_>> = cells
                .iter()
                .enumerate()
                .map(|(column, text)| {
                    let width = table.widths.get(column).copied().unwrap_or(0.0);
                    let spec = CellSpec {
                        text,
                        x,
                        width,
                        align: table.alignments.get(column).copied().unwrap_or_default(),
                        url: table.body.link_at(index, column),
                    };
                    x += width;
                    spec
                })
                .collect();

            let row_height = self.measure_row_height(&specs, look, table);

            if row_height > cursor.remaining_height() && body_rows_on_page > 0 {
                self.break_page(&mut pages, &mut cursor, &header_rows, header_look, table);
                body_rows_on_page = 0;
            }

            if row_height > cursor.remaining_height() {
                log::warn!(
                    "row {} is {:.1}pt tall and does not fit on a page; splitting it across pages",
                    index + 1,
                    row_height
                );
                self.draw_split_row(&mut pages, &mut cursor, &specs, look, table, &header_rows, header_look);
            } else {
                self.draw_row(&mut cursor, &specs, row_height, look, table);
            }
            body_rows_on_page += 1;
        }

        pages.push(cursor.finalize());
        pages
    }

    /// Close the current page and open the next one with its header rows.
    fn break_page(
        &self,
        pages: &mut Vec<LayoutPage>,
        cursor: &mut PageCursor,
        header_rows: &[Vec<CellSpec<'_>>],
        header_look: RowLook,
        table: &TableInput<'_>,
    ) {
        let next = cursor.new_page();
        pages.push(std::mem::replace(cursor, next).finalize());
        self.draw_header(cursor, header_rows, header_look, table);
    }

    /// Draw a row taller than a page as a run of segments, each holding as
    /// many wrapped lines as the page has room for. Every segment after the
    /// first starts a new page under the repeated header.
    #[allow(clippy::too_many_arguments)]
    fn draw_split_row(
        &self,
        pages: &mut Vec<LayoutPage>,
        cursor: &mut PageCursor,
        cells: &[CellSpec<'_>],
        look: RowLook,
        table: &TableInput<'_>,
        header_rows: &[Vec<CellSpec<'_>>],
        header_look: RowLook,
    ) {
        let padding = table.style.padding;
        let line_height = LINE_HEIGHT * look.size;
        let wrapped: Vec<Vec<BrokenLine>> = cells.iter().map(|c| self.wrap(c, look, table)).collect();
        let total = wrapped.iter().map(Vec::len).max().unwrap_or(0);
        let mut offset = 0;

        loop {
            let room = ((cursor.remaining_height() - 2.0 * padding) / line_height).floor();
            let end = (offset + room.max(1.0) as usize).min(total);
            let segment: Vec<&[BrokenLine]> = wrapped
                .iter()
                .map(|lines| &lines[offset.min(lines.len())..end.min(lines.len())])
                .collect();
            let height = (end - offset) as f64 * line_height + 2.0 * padding;
            self.draw_lines(cursor, cells, &segment, height.max(look.min_height), look, table);

            offset = end;
            if offset >= total {
                break;
            }
            self.break_page(pages, cursor, header_rows, header_look, table);
        }
    }

    fn draw_header(
        &self,
        cursor: &mut PageCursor,
        rows: &[Vec<CellSpec<'_>>],
        look: RowLook,
        table: &TableInput<'_>,
    ) {
        for row in rows {
            let height = self.measure_row_height(row, look, table);
            self.draw_row(cursor, row, height, look, table);
        }
    }

    fn wrap(&self, cell: &CellSpec<'_>, look: RowLook, table: &TableInput<'_>) -> Vec<BrokenLine> {
        let inner = (cell.width - 2.0 * table.style.padding).max(0.0);
        self.text_layout
            .break_into_lines(&self.font_context, cell.text, inner, look.font, look.size)
    }

    fn measure_row_height(&self, cells: &[CellSpec<'_>], look: RowLook, table: &TableInput<'_>) -> f64 {
        let line_height = LINE_HEIGHT * look.size;
        cells
            .iter()
            .map(|cell| {
                let lines = self.wrap(cell, look, table).len() as f64;
                lines * line_height + 2.0 * table.style.padding
            })
            .fold(look.min_height, f64::max)
    }

    fn draw_row(
        &self,
        cursor: &mut PageCursor,
        cells: &[CellSpec<'_>],
        row_height: f64,
        look: RowLook,
        table: &TableInput<'_>,
    ) {
        let wrapped: Vec<Vec<BrokenLine>> = cells.iter().map(|c| self.wrap(c, look, table)).collect();
        let lines: Vec<&[BrokenLine]> = wrapped.iter().map(Vec::as_slice).collect();
        self.draw_lines(cursor, cells, &lines, row_height, look, table);
    }

    /// Draw one row of already wrapped cells, `lines[i]` belonging to `cells[i]`.
    fn draw_lines(
        &self,
        cursor: &mut PageCursor,
        cells: &[CellSpec<'_>],
        lines: &[&[BrokenLine]],
        row_height: f64,
        look: RowLook,
        table: &TableInput<'_>,
    ) {
        let row_y = cursor.top();
        let padding = table.style.padding;
        let line_height = LINE_HEIGHT * look.size;
        let baseline_offset = (line_height - look.size) / 2.0 + ASCENT * look.size;

        for (cell, cell_lines) in cells.iter().zip(lines) {
            cursor.elements.push(LayoutElement {
                x: cell.x,
                y: row_y,
                width: cell.width,
                height: row_height,
                draw: DrawCommand::Rect {
                    fill: Some(look.fill),
                    stroke: Some((table.style.line_color, table.style.line_width)),
                },
            });

            if cell.text.is_empty() || cell_lines.is_empty() {
                continue;
            }

            let block_height = cell_lines.len() as f64 * line_height;
            let text_top = match look.valign {
                VerticalAlign::Top => row_y + padding,
                VerticalAlign::Middle => row_y + (row_height - block_height) / 2.0,
            };
            let anchor_x = match cell.align {
                TextAlign::Left => cell.x + padding,
                TextAlign::Center => cell.x + cell.width / 2.0,
                TextAlign::Right => cell.x + cell.width - padding,
            };
            let color = if cell.url.is_some() { Color::LINK } else { look.text };

            for (i, line) in cell_lines.iter().enumerate() {
                if line.text.is_empty() {
                    continue;
                }
                cursor.elements.push(LayoutElement {
                    x: anchor_x,
                    y: text_top + i as f64 * line_height + baseline_offset,
                    width: line.width,
                    height: line_height,
                    draw: DrawCommand::Text {
                        text: line.text.clone(),
                        font: look.font,
                        size: look.size,
                        color,
                        align: cell.align,
                    },
                });
            }

            if let Some(url) = cell.url {
                cursor.links.push(LinkArea {
                    x: cell.x,
                    y: row_y,
                    width: cell.width,
                    height: row_height,
                    url: url.to_string(),
                });
            }
        }

        cursor.y += row_height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::TableBody;
    use crate::columns::groups::{HeaderCell, HeaderRows};
    use crate::layout::TableStyle;

    fn header(labels: &[&str]) -> HeaderRows {
        HeaderRows {
            rows: vec![labels
                .iter()
                .map(|l| HeaderCell {
                    content: l.to_string(),
                    col_span: 1,
                })
                .collect()],
            has_group_row: false,
        }
    }

    fn body(n: usize) -> TableBody {
        TableBody {
            rows: (0..n).map(|i| vec![format!("fila {}", i), "x".to_string()]).collect(),
            kinds: vec![RowKind::Data; n],
            links: Default::default(),
        }
    }

    fn input<'t>(header: &'t HeaderRows, body: &'t TableBody, style: &'t TableStyle) -> TableInput<'t> {
        TableInput {
            widths: vec![300.0, 432.0],
            alignments: vec![TextAlign::Left, TextAlign::Right],
            header,
            body,
            style,
        }
    }

    fn texts(page: &LayoutPage) -> Vec<&str> {
        page.texts().collect()
    }

    #[test]
    fn short_table_fits_one_page() {
        let (h, b, s) = (header(&["A", "B"]), body(3), TableStyle::default());
        let pages = LayoutEngine::new().layout_table(&PageConfig::default(), &input(&h, &b, &s));
        assert_eq!(pages.len(), 1);
        assert_eq!(texts(&pages[0])[..3], ["A", "B", "fila 0"]);
    }

    #[test]
    fn headers_repeat_on_every_page() {
        let (h, b, s) = (header(&["A", "B"]), body(80), TableStyle::default());
        let pages = LayoutEngine::new().layout_table(&PageConfig::default(), &input(&h, &b, &s));
        assert!(pages.len() > 1);
        for page in &pages {
            assert_eq!(texts(page)[..2], ["A", "B"]);
        }
        let body_rows: usize = pages
            .iter()
            .map(|p| p.texts().filter(|t| t.starts_with("fila")).count())
            .sum();
        assert_eq!(body_rows, 80);
    }

    #[test]
    fn rows_stay_inside_the_bottom_margin() {
        let (h, b, s) = (header(&["A", "B"]), body(80), TableStyle::default());
        let config = PageConfig::default();
        let pages = LayoutEngine::new().layout_table(&config, &input(&h, &b, &s));
        for page in &pages {
            for el in page.elements.iter().filter(|e| matches!(e.draw, DrawCommand::Rect { .. })) {
                assert!(el.y + el.height <= config.content_bottom() + 1e-6);
            }
        }
    }

    #[test]
    fn wrapped_cells_grow_the_row() {
        let h = header(&["A", "B"]);
        let b = TableBody {
            rows: vec![vec!["palabra ".repeat(60), "x".to_string()]],
            kinds: vec![RowKind::Data],
            links: Default::default(),
        };
        let s = TableStyle::default();
        let pages = LayoutEngine::new().layout_table(&PageConfig::default(), &input(&h, &b, &s));
        let tallest = pages[0]
            .elements
            .iter()
            .filter(|e| matches!(e.draw, DrawCommand::Rect { .. }))
            .map(|e| e.height)
            .fold(0.0, f64::max);
        assert!(tallest > s.body_min_height);
    }

    #[test]
    fn summary_rows_are_bold_and_shaded() {
        let h = header(&["A", "B"]);
        let mut b = body(2);
        b.kinds[1] = RowKind::Total;
        let s = TableStyle::default();
        let pages = LayoutEngine::new().layout_table(&PageConfig::default(), &input(&h, &b, &s));
        let total_font = pages[0].elements.iter().find_map(|e| match &e.draw {
            DrawCommand::Text { text, font, .. } if text == "fila 1" => Some(*font),
            _ => None,
        });
        assert_eq!(total_font, Some(StandardFont::HelveticaBold));
        assert!(pages[0].elements.iter().any(|e| matches!(
            e.draw,
            DrawCommand::Rect { fill: Some(c), .. } if c == Color::TOTAL_ROW
        )));
    }

    #[test]
    fn linked_cells_get_an_area_and_link_color() {
        let h = header(&["A", "B"]);
        let mut b = body(1);
        b.links.insert((0, 0), "https://example.com".to_string());
        let s = TableStyle::default();
        let pages = LayoutEngine::new().layout_table(&PageConfig::default(), &input(&h, &b, &s));
        assert_eq!(pages[0].links.len(), 1);
        assert_eq!(pages[0].links[0].width, 300.0);
        let color = pages[0].elements.iter().find_map(|e| match &e.draw {
            DrawCommand::Text { text, color, .. } if text == "fila 0" => Some(*color),
            _ => None,
        });
        assert_eq!(color, Some(Color::LINK));
    }

    #[test]
    fn spanned_header_cells_cover_their_columns() {
        let h = HeaderRows {
            rows: vec![
                vec![HeaderCell {
                    content: "Grupo".to_string(),
                    col_span: 2,
                }],
                header(&["A", "B"]).rows.remove(0),
            ],
            has_group_row: true,
        };
        let b = body(1);
        let s = TableStyle::default();
        let pages = LayoutEngine::new().layout_table(&PageConfig::default(), &input(&h, &b, &s));
        let first = &pages[0].elements[0];
        assert_eq!(first.width, 732.0);
    }

    #[test]
    fn rows_taller_than_a_page_are_split_across_pages() {
        let h = header(&["A", "B"]);
        let long = "palabra ".repeat(4000);
        let b = TableBody {
            rows: vec![vec![long.clone(), "x".to_string()], vec!["fila 1".to_string(), "y".to_string()]],
            kinds: vec![RowKind::Data; 2],
            links: Default::default(),
        };
        let s = TableStyle::default();
        let config = PageConfig::default();
        let pages = LayoutEngine::new().layout_table(&config, &input(&h, &b, &s));

        let expected = crate::text::TextLayout::new()
            .break_into_lines(
                &crate::font::FontContext::new(),
                &long,
                300.0 - 2.0 * s.padding,
                StandardFont::Helvetica,
                s.body_font_size,
            )
            .len();
        assert!(pages.len() > 2);

        let mut drawn = 0;
        for page in &pages {
            assert_eq!(texts(page)[..2], ["A", "B"]);
            for el in &page.elements {
                match &el.draw {
                    DrawCommand::Rect { .. } => {
                        assert!(el.y + el.height <= config.content_bottom() + 1e-6)
                    }
                    DrawCommand::Text { text, .. } => {
                        assert!(el.y <= config.content_bottom());
                        if text.starts_with("palabra") {
                            drawn += 1;
                        }
                    }
                    _ => {}
                }
            }
        }
        assert_eq!(drawn, expected);
        assert!(texts(pages.last().unwrap()).contains(&"fila 1"));
    }
}
