use pdf_writer::Rect;

use crate::fonts::FontSet;
use crate::layout::plan_rows;
use crate::model::{Alignment, Border, Cell, CellContent, Fill, Illustration, Table};

use super::images::image_size;
use super::text::wrap_text;
use super::{DrawOp, Painter};

/// Cell boxes of one row: (x offset, width) per cell, in points.
fn cell_spans(row_cells: &[Cell], col_widths: &[f32]) -> Vec<(f32, f32)> {
    let mut grid_col = 0usize;
    row_cells
        .iter()
        .map(|cell| {
            let span = cell.span.max(1);
            let end = col_widths.len().min(grid_col + span);
            let start = grid_col.min(col_widths.len());
            let x: f32 = col_widths[..start].iter().sum();
            let w: f32 = col_widths[start..end].iter().sum();
            grid_col += span;
            (x, w)
        })
        .collect()
}

fn cell_height(fonts: &FontSet, table: &Table, cell: &Cell, cell_w: f32) -> f32 {
    let pad = table.padding;
    let face = fonts.face(cell.bold);
    let line_h = face.line_height(table.font_size);
    let inner_w = (cell_w - 2.0 * pad).max(0.0);
    match &cell.content {
        CellContent::Empty => line_h + 2.0 * pad,
        CellContent::Text(text) => {
            let lines = wrap_text(text, face, table.font_size, inner_w);
            lines.len() as f32 * line_h + 2.0 * pad
        }
        CellContent::Illustration(ill) => ill.height + 2.0 * pad,
        CellContent::Table(inner) => measure_table(fonts, inner, inner_w) + 2.0 * pad,
    }
}

/// Height of every row of `table` laid out at `width`.
pub(super) fn row_heights(fonts: &FontSet, table: &Table, width: f32) -> Vec<f32> {
    let col_widths = table.scaled_columns(width);
    table
        .rows
        .iter()
        .map(|row| {
            cell_spans(&row.cells, &col_widths)
                .into_iter()
                .zip(row.cells.iter())
                .map(|((_, w), cell)| cell_height(fonts, table, cell, w))
                .fold(row.min_height, f32::max)
        })
        .collect()
}

pub(super) fn measure_table(fonts: &FontSet, table: &Table, width: f32) -> f32 {
    row_heights(fonts, table, width).iter().sum()
}

/// Draws `rows` (indices into `table.rows`, in order) from `top` downwards
/// and returns the bottom of the last row.
pub(super) fn draw_rows(
    painter: &mut Painter<'_>,
    table: &Table,
    heights: &[f32],
    rows: &[usize],
    left: f32,
    width: f32,
    top: f32,
) -> f32 {
    let col_widths = table.scaled_columns(width);
    let mut row_top = top;

    for &ri in rows {
        let Some(row) = table.rows.get(ri) else {
            continue;
        };
        let row_h = heights.get(ri).copied().unwrap_or(0.0);
        let row_bottom = row_top - row_h;
        let spans = cell_spans(&row.cells, &col_widths);

        let row_fill = match table.fill {
            Fill::Alternate(gray) if ri >= table.header_rows && (ri - table.header_rows) % 2 == 1 => {
                Some(gray)
            }
            _ => None,
        };
        if let Some(gray) = row_fill {
            painter.ops.push(DrawOp::Fill {
                rect: Rect::new(left, row_bottom, left + width, row_top),
                gray,
            });
        }

        for (cell, &(x, w)) in row.cells.iter().zip(spans.iter()) {
            let cell_x = left + x;
            if let Some(gray) = cell.shading {
                painter.ops.push(DrawOp::Fill {
                    rect: Rect::new(cell_x, row_bottom, cell_x + w, row_top),
                    gray,
                });
            }
            draw_cell(painter, table, cell, cell_x, w, row_top);
        }

        if let Border::Grid(line_w) = table.border {
            for &(x, w) in &spans {
                let (x1, x2) = (left + x, left + x + w);
                for (from, to) in [
                    ((x1, row_top), (x2, row_top)),
                    ((x1, row_bottom), (x2, row_bottom)),
                    ((x1, row_top), (x1, row_bottom)),
                    ((x2, row_top), (x2, row_bottom)),
                ] {
                    painter.ops.push(DrawOp::Line {
                        from,
                        to,
                        width: line_w,
                    });
                }
            }
        }

        row_top = row_bottom;
    }
    row_top
}

fn draw_cell(painter: &mut Painter<'_>, table: &Table, cell: &Cell, x: f32, w: f32, top: f32) {
    let pad = table.padding;
    let inner_x = x + pad;
    let inner_w = (w - 2.0 * pad).max(0.0);
    match &cell.content {
        CellContent::Empty => {}
        CellContent::Text(text) => {
            let fonts = painter.fonts;
            let face = fonts.face(cell.bold);
            let line_h = face.line_height(table.font_size);
            let mut baseline = top - pad - face.ascent(table.font_size);
            for line in wrap_text(text, face, table.font_size, inner_w) {
                let line_x = match cell.align {
                    Alignment::Left => inner_x,
                    Alignment::Center => inner_x + (inner_w - line.width).max(0.0) / 2.0,
                    Alignment::Right => inner_x + (inner_w - line.width).max(0.0),
                };
                painter.text(line_x, baseline, table.font_size, cell.bold, &line.text);
                baseline -= line_h;
            }
        }
        CellContent::Illustration(ill) => draw_illustration(painter, ill, inner_x, inner_w, top - pad),
        CellContent::Table(inner) => {
            let heights = row_heights(painter.fonts, inner, inner_w);
            let plan = plan_rows(&heights, inner.header_rows, 0, f32::INFINITY);
            draw_rows(painter, inner, &heights, &plan.rows, inner_x, inner_w, top - pad);
        }
    }
}

/// Draws the picture centred in its box, scaled to fit while keeping its
/// aspect ratio. A box without a decodable picture is drawn as an outline.
fn draw_illustration(painter: &mut Painter<'_>, ill: &Illustration, x: f32, avail_w: f32, top: f32) {
    let box_w = ill.width.min(avail_w);
    let box_x = x + (avail_w - box_w) / 2.0;
    let box_rect = Rect::new(box_x, top - ill.height, box_x + box_w, top);

    let Some(image) = &ill.image else {
        painter.ops.push(DrawOp::Placeholder { rect: box_rect });
        return;
    };
    let Some((px_w, px_h)) = image_size(image).filter(|(w, h)| *w > 0 && *h > 0) else {
        log::warn!("illustration could not be decoded, drawing placeholder");
        painter.ops.push(DrawOp::Placeholder { rect: box_rect });
        return;
    };

    let scale = (box_w / px_w as f32).min(ill.height / px_h as f32);
    let (img_w, img_h) = (px_w as f32 * scale, px_h as f32 * scale);
    let img_x = box_x + (box_w - img_w) / 2.0;
    let img_y = top - ill.height + (ill.height - img_h) / 2.0;
    let index = painter.image_index(image);
    painter.ops.push(DrawOp::Image {
        index,
        rect: Rect::new(img_x, img_y, img_x + img_w, img_y + img_h),
    });
}
