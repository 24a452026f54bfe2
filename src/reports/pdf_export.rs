// src/reports/pdf_export.rs
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference,
    Point, Rect, Rgb,
};
use printpdf::path::PaintMode;

use crate::errors::ServerError;
use crate::reports::rows::{ReportRow, HEADERS};

const TITLE: &str = "Complaints Report";

// US letter, landscape.
const PAGE_W: f32 = 279.4;
const PAGE_H: f32 = 215.9;
const MARGIN: f32 = 12.7;

const TITLE_SIZE: f32 = 18.0;
const TITLE_BLOCK: f32 = 14.0;
const FONT_SIZE: f32 = 8.0;
const LINE_H: f32 = 3.6;
const PAD: f32 = 1.5;
// Average Helvetica glyph width at FONT_SIZE, in mm.
const CHAR_W: f32 = 1.55;

// Sums to PAGE_W - 2 * MARGIN.
const COL_WIDTHS: [f32; 8] = [12.0, 30.0, 28.0, 38.0, 38.0, 22.0, 22.0, 64.0];

/// A table row (or the part of one that fits on a page) after word
/// wrapping: one `Vec<String>` of lines per column.
#[derive(Debug, Clone, Default)]
pub(crate) struct LaidRow {
    pub cells: Vec<Vec<String>>,
    pub height: f32,
    /// Index of the report row this came from.
    pub source: usize,
    /// True for the second and later pieces of a split row.
    pub continued: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct PageLayout {
    pub with_title: bool,
    pub header: LaidRow,
    pub rows: Vec<LaidRow>,
}

fn max_chars(width: f32) -> usize {
    (((width - 2.0 * PAD) / CHAR_W).floor() as usize).max(1)
}

/// Greedy word wrap. Words longer than a line are split.
pub(crate) fn wrap(text: &str, width_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                lines.push(word.drain(..width_chars).collect());
            }
            let word: String = word.into_iter().collect();
            if word.is_empty() {
                continue;
            }
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Wrap every cell of a row to its column width. Nothing is dropped.
pub(crate) fn wrap_cells(cells: &[String]) -> Vec<Vec<String>> {
    cells
        .iter()
        .zip(COL_WIDTHS)
        .map(|(text, width)| wrap(text, max_chars(width)))
        .collect()
}

fn row_height(lines: usize) -> f32 {
    lines as f32 * LINE_H + 2.0 * PAD
}

/// How many text lines fit into `space` millimetres of table.
fn lines_fitting(space: f32) -> usize {
    ((space - 2.0 * PAD) / LINE_H).floor().max(0.0) as usize
}

/// Lines `start..start + take` of every cell.
fn slice_row(cells: &[Vec<String>], start: usize, take: usize) -> LaidRow {
    let cells: Vec<Vec<String>> = cells
        .iter()
        .map(|lines| lines.iter().skip(start).take(take).cloned().collect())
        .collect();
    let lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
    LaidRow {
        cells,
        height: row_height(lines),
        ..Default::default()
    }
}

/// Split rows into pages. The title sits on the first page only; the header
/// row is repeated at the top of every page. A row that fits on a fresh page
/// is never split; a taller one continues on the following pages.
pub(crate) fn layout_pages(rows: &[ReportRow]) -> Vec<PageLayout> {
    let headers: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    let body_h = PAGE_H - 2.0 * MARGIN;
    let header_cells = wrap_cells(&headers);
    let header = slice_row(&header_cells, 0, usize::MAX);
    let fresh_page_lines = lines_fitting(body_h - header.height).max(1);

    let mut pages = vec![PageLayout {
        with_title: true,
        header: header.clone(),
        rows: Vec::new(),
    }];
    let mut remaining = body_h - TITLE_BLOCK - header.height;

    for (index, row) in rows.iter().enumerate() {
        let cells = wrap_cells(&row.cells());
        let total = cells.iter().map(Vec::len).max().unwrap_or(1);
        let mut start = 0;

        while start < total {
            let left = total - start;
            let fit = lines_fitting(remaining);
            let page_empty = pages.last().map(|p| p.rows.is_empty()).unwrap_or(true);

            if left > fit && !page_empty && (fit == 0 || left <= fresh_page_lines) {
                pages.push(PageLayout {
                    with_title: false,
                    header: header.clone(),
                    rows: Vec::new(),
                });
                remaining = body_h - header.height;
                continue;
            }

            let take = left.min(fit.max(1));
            let mut laid = slice_row(&cells, start, take);
            laid.source = index;
            laid.continued = start > 0;
            remaining -= laid.height;
            start += take;
            if let Some(page) = pages.last_mut() {
                page.rows.push(laid);
            }
        }
    }

    pages
}

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn draw_row(
    layer: &PdfLayerReference,
    row: &LaidRow,
    top: f32,
    font: &IndirectFontRef,
    is_header: bool,
) {
    let left = MARGIN;
    let right = PAGE_W - MARGIN;
    let bottom = top - row.height;

    if is_header {
        // darkblue
        layer.set_fill_color(rgb(0.0, 0.0, 0.545));
        layer.add_rect(
            Rect::new(Mm(left), Mm(bottom), Mm(right), Mm(top)).with_mode(PaintMode::Fill),
        );
        // whitesmoke
        layer.set_fill_color(rgb(0.961, 0.961, 0.961));
    } else {
        layer.set_fill_color(rgb(0.0, 0.0, 0.0));
    }

    let mut x = left;
    for (lines, width) in row.cells.iter().zip(COL_WIDTHS) {
        for (i, line) in lines.iter().enumerate() {
            let baseline = top - PAD - (i as f32 + 1.0) * LINE_H + 0.9;
            layer.use_text(line.clone(), FONT_SIZE, Mm(x + PAD), Mm(baseline), font);
        }
        x += width;
    }

    // grid
    layer.set_outline_color(rgb(0.502, 0.502, 0.502));
    layer.set_outline_thickness(0.5);
    let segment = |x1: f32, y1: f32, x2: f32, y2: f32| Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y1)), false),
            (Point::new(Mm(x2), Mm(y2)), false),
        ],
        is_closed: false,
    };
    layer.add_line(segment(left, top, right, top));
    layer.add_line(segment(left, bottom, right, bottom));
    let mut x = left;
    layer.add_line(segment(x, top, x, bottom));
    for width in COL_WIDTHS {
        x += width;
        layer.add_line(segment(x, top, x, bottom));
    }
}

pub fn render_pdf(rows: &[ReportRow]) -> Result<Vec<u8>, ServerError> {
    let export_err = |e: printpdf::Error| ServerError::ExportError(format!("PDF export failed: {e}"));

    let (doc, first_page, first_layer) =
        PdfDocument::new(TITLE, Mm(PAGE_W), Mm(PAGE_H), "Table");
    // Built-in fonts use WinAnsi encoding; text outside Latin-1 does not
    // render correctly. CSV and Word exports are unaffected.
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(export_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(export_err)?;

    for (n, page) in layout_pages(rows).iter().enumerate() {
        let layer = if n == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Table");
            doc.get_page(p).get_layer(l)
        };

        let mut top = PAGE_H - MARGIN;
        if page.with_title {
            layer.set_fill_color(rgb(0.0, 0.0, 0.0));
            layer.use_text(TITLE, TITLE_SIZE, Mm(MARGIN), Mm(top - 7.0), &bold);
            top -= TITLE_BLOCK;
        }

        draw_row(&layer, &page.header, top, &bold, true);
        top -= page.header.height;
        for row in &page.rows {
            draw_row(&layer, row, top, &regular, false);
            top -= row.height;
        }
    }

    doc.save_to_bytes().map_err(export_err)
}

/// Every line laid out for one cell of report row `source`, across pages.
#[cfg(test)]
pub(crate) fn cell_text(pages: &[PageLayout], source: usize, column: usize) -> Vec<String> {
    pages
        .iter()
        .flat_map(|p| p.rows.iter())
        .filter(|r| r.source == source)
        .flat_map(|r| r.cells[column].iter().cloned())
        .collect()
}
