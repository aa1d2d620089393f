mod columns;
mod cursor;
mod orientation;
mod sheet;

use crate::error::SkipReason;
use crate::model::{Orientation, Role, Table};

pub use columns::{ColumnBalancer, LEFT_COLUMN_SHARE, PendingColumn, SPACER_HEIGHT, Side};
pub use cursor::PageCursor;
pub use orientation::{NARROW_GROUP_WIDTH, OrientationSwitcher, WidthClass};
pub use sheet::{PageHeader, SheetStart, SummaryBuilder};

/// Where a table is drawn and how much room it has.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub left: f32,
    pub width: f32,
    pub top: f32,
    pub bottom_margin: f32,
    /// First body row still to draw; header rows are repeated before it
    /// when it is not 0.
    pub first_row: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rendered {
    pub bottom: f32,
    /// First row that did not fit, if any.
    pub next_row: Option<usize>,
}

/// Table drawing and page handling the layout core relies on.
///
/// `render` draws the rows chosen by [`plan_rows`] for the frame and reports
/// the new bottom offset; it never draws below `frame.bottom_margin`.
/// `measure_height` must agree with what `render` would consume for the
/// whole table at the same width.
pub trait Surface {
    fn add_page(&mut self, orientation: Orientation);
    fn page_count(&self) -> usize;
    fn current_orientation(&self) -> Option<Orientation>;
    /// Outline entry pointing at the current page.
    fn add_bookmark(&mut self, title: &str);
    fn measure_height(&self, table: &Table, width: f32) -> f32;
    fn render(&mut self, table: &Table, frame: &Frame) -> Rendered;
}

#[derive(Clone, Debug, PartialEq)]
pub struct RowPlan {
    pub rows: Vec<usize>,
    pub next_row: Option<usize>,
    pub height: f32,
}

/// Picks the rows of a table that fit into `available` points, starting at
/// `first_row`. Continuations repeat the header rows first. A plan that
/// would hold header rows only is returned empty so headers never dangle at
/// a page bottom. A row that does not fit is never planned, however empty
/// the page.
pub fn plan_rows(heights: &[f32], header_rows: usize, first_row: usize, available: f32) -> RowPlan {
    let n = heights.len();
    let header_rows = header_rows.min(n);
    let order: Vec<usize> = if first_row > 0 {
        (0..header_rows).chain(first_row.max(header_rows)..n).collect()
    } else {
        (0..n).collect()
    };

    let mut rows = Vec::with_capacity(order.len());
    let mut used = 0.0f32;
    for i in order {
        let h = heights[i];
        let drawn_body = rows.iter().any(|&r| r >= header_rows);
        if used + h > available + 0.01 {
            if !drawn_body {
                return RowPlan {
                    rows: Vec::new(),
                    next_row: Some(first_row),
                    height: 0.0,
                };
            }
            return RowPlan {
                rows,
                next_row: Some(i),
                height: used,
            };
        }
        rows.push(i);
        used += h;
    }
    RowPlan {
        rows,
        next_row: None,
        height: used,
    }
}

/// Page sizes and margins, in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: f32,  // portrait
    pub height: f32, // portrait
    pub margin: f32,
}

impl PageGeometry {
    pub fn a4() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: 28.35,
        }
    }

    pub fn page_size(&self, orientation: Orientation) -> (f32, f32) {
        match orientation {
            Orientation::Portrait => (self.width, self.height),
            Orientation::Landscape => (self.height, self.width),
        }
    }

    pub fn usable_width(&self, orientation: Orientation) -> f32 {
        self.page_size(orientation).0 - 2.0 * self.margin
    }

    pub fn usable_height(&self, orientation: Orientation) -> f32 {
        self.page_size(orientation).1 - 2.0 * self.margin
    }

    /// Cursor top for a new page.
    pub fn content_top(&self, orientation: Orientation) -> f32 {
        self.page_size(orientation).1 - self.margin
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SkippedSection {
    pub sheet: String,
    pub section: String,
    pub reason: SkipReason,
}

/// What a build did besides drawing: skipped sections and layout decisions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildReport {
    pub skipped: Vec<SkippedSection>,
    pub pages: Vec<Orientation>,
    pub bookmarks: Vec<(String, usize)>, // title, 0-based page index
    pub column_flushes: usize,
    pub orientation_switches: usize,
}

/// Gap left between consecutive flowed blocks.
pub const BLOCK_GAP: f32 = 6.0;

/// All mutable layout state of one document build: the surface, the cursor
/// of the page being filled and the callbacks of the sheet in progress.
pub struct LayoutContext<'h, S: Surface> {
    surface: S,
    geometry: PageGeometry,
    cursor: Option<PageCursor>,
    body_top: Option<f32>, // cursor bottom right below the page header
    header: Option<&'h dyn PageHeader>,
    sheet_title: String,
    summary: Option<SummaryBuilder<'h>>,
    columns: ColumnBalancer,
    report: BuildReport,
}

impl<'h, S: Surface> LayoutContext<'h, S> {
    pub fn new(surface: S, geometry: PageGeometry) -> Self {
        Self {
            surface,
            geometry,
            cursor: None,
            body_top: None,
            header: None,
            sheet_title: String::new(),
            summary: None,
            columns: ColumnBalancer::default(),
            report: BuildReport::default(),
        }
    }

    pub fn with_header(mut self, header: &'h dyn PageHeader) -> Self {
        self.header = Some(header);
        self
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn cursor(&self) -> Option<PageCursor> {
        self.cursor
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.surface.current_orientation()
    }

    pub fn usable_width(&self) -> f32 {
        self.geometry
            .usable_width(self.orientation().unwrap_or(Orientation::Portrait))
    }

    pub fn remaining_height(&self) -> f32 {
        self.cursor
            .map(|c| c.remaining(self.geometry.margin))
            .unwrap_or(0.0)
    }

    /// Height a block can use on a page that holds nothing but its header.
    /// Anything taller has to be split by rows to be drawn at all.
    pub fn page_capacity(&self) -> f32 {
        let orientation = self.orientation().unwrap_or(Orientation::Portrait);
        let top = self
            .body_top
            .unwrap_or_else(|| self.geometry.content_top(orientation));
        (top - self.geometry.margin).max(0.0)
    }

    /// True while nothing but the page header is on the current page.
    fn page_is_empty(&self) -> bool {
        match (self.cursor, self.body_top) {
            (Some(c), Some(top)) => c.bottom() >= top - 0.01,
            _ => true,
        }
    }

    pub fn measure(&self, table: &Table, width: f32) -> f32 {
        self.surface.measure_height(table, width)
    }

    pub fn record_skip(&mut self, sheet: &str, section: &str, reason: SkipReason) {
        log::warn!("skipping {sheet}/{section}: {reason}");
        self.report.skipped.push(SkippedSection {
            sheet: sheet.to_string(),
            section: section.to_string(),
            reason,
        });
    }

    /// Appends a page, resets the cursor to `top` and paints the page header.
    fn open_page(&mut self, orientation: Orientation, top: f32) {
        self.surface.add_page(orientation);
        self.report.pages.push(orientation);
        self.cursor = Some(PageCursor::fresh(top));
        self.body_top = None;
        log::debug!(
            "page {} opened ({orientation:?}) for '{}'",
            self.surface.page_count(),
            self.sheet_title
        );
        self.paint_header();
        self.body_top = self.cursor.map(|c| c.bottom());
    }

    fn paint_header(&mut self) {
        let Some(header) = self.header else {
            return;
        };
        let width = self.usable_width();
        let table = header
            .page_header(&self.sheet_title, width)
            .and_then(|t| t.validate().map(|_| t));
        let painted = table.and_then(|table| match self.draw(&table, 0).next_row {
            None => Ok(()),
            Some(_) => Err(SkipReason::InvalidTable("header is taller than the page".into())),
        });
        match painted {
            Ok(()) => self.gap(BLOCK_GAP),
            Err(reason) => {
                let sheet = self.sheet_title.clone();
                self.record_skip(&sheet, "page header", SkipReason::HeaderFailed(reason.to_string()));
            }
        }
    }

    /// Renders the summary strip of the sheet in progress, built for the
    /// current page width.
    pub(crate) fn paint_summary(&mut self) {
        let width = self.usable_width();
        let Some(table) = self.summary.as_ref().and_then(|build| build(width)) else {
            return;
        };
        if let Err(reason) = self.place(&table) {
            let sheet = self.sheet_title.clone();
            self.record_skip(&sheet, "summary", reason);
        }
        self.gap(BLOCK_GAP);
    }

    fn draw(&mut self, table: &Table, first_row: usize) -> Rendered {
        let orientation = self.orientation().unwrap_or(Orientation::Portrait);
        let cursor = self.cursor.unwrap_or_else(|| {
            PageCursor::fresh(self.geometry.content_top(orientation))
        });
        let frame = Frame {
            left: self.geometry.margin,
            width: self.geometry.usable_width(orientation),
            top: cursor.bottom(),
            bottom_margin: self.geometry.margin,
            first_row,
        };
        let rendered = self.surface.render(table, &frame);
        if let Some(c) = self.cursor.as_mut() {
            c.advance(rendered.bottom);
        }
        rendered
    }

    /// Renders a full-width table into the flow, continuing on new pages of
    /// the same orientation while rows remain. Returns the new bottom offset.
    pub fn place(&mut self, table: &Table) -> Result<f32, SkipReason> {
        table.validate()?;
        if self.cursor.is_none() {
            let orientation = self.orientation().unwrap_or(Orientation::Portrait);
            let top = self.geometry.content_top(orientation);
            self.open_page(orientation, top);
        }

        let mut first_row = 0;
        loop {
            let fresh = self.page_is_empty();
            let rendered = self.draw(table, first_row);
            match rendered.next_row {
                None => return Ok(rendered.bottom),
                Some(next) => {
                    if fresh && next == first_row {
                        // Nothing fits below the header of an empty page.
                        return Err(SkipReason::InvalidTable(format!(
                            "row {next} is taller than a page"
                        )));
                    }
                    let orientation = self.orientation().unwrap_or(Orientation::Portrait);
                    let top = self.geometry.content_top(orientation);
                    self.open_page(orientation, top);
                    first_row = next;
                }
            }
        }
    }

    /// Renders a content group: one table full width, several tables side by
    /// side with widths proportional to their natural widths. Pending small
    /// blocks are flushed first so the flow keeps its order.
    pub fn place_group(&mut self, mut tables: Vec<Table>) -> Result<f32, SkipReason> {
        self.flush_columns()?;
        let table = match tables.len() {
            0 => return Ok(self.cursor.map(|c| c.bottom()).unwrap_or_default()),
            1 => tables.remove(0),
            _ => {
                let widths: Vec<f32> = tables.iter().map(|t| t.min_width.max(1.0)).collect();
                let total: f32 = widths.iter().sum();
                let usable = self.usable_width();
                let tallest = tables
                    .iter()
                    .zip(&widths)
                    .map(|(t, w)| self.measure(t, usable * w / total))
                    .fold(0.0f32, f32::max);
                if tallest > self.page_capacity() + 0.01 {
                    log::debug!(
                        "group of {} tables is {tallest:.1}pt tall, placing them one below the other",
                        tables.len()
                    );
                    let mut bottom = self.cursor.map(|c| c.bottom()).unwrap_or_default();
                    for table in &tables {
                        bottom = self.place(table)?;
                        self.gap(BLOCK_GAP);
                    }
                    return Ok(bottom);
                }
                Table::side_by_side(&widths, tables)
            }
        };
        let bottom = self.place(&table)?;
        self.gap(BLOCK_GAP);
        Ok(bottom)
    }

    /// Queues a small block for two-column packing.
    pub fn add_block(&mut self, role: Role, block: Table) -> Result<(), SkipReason> {
        let mut columns = std::mem::take(&mut self.columns);
        let result = columns.add_block(self, role, block);
        self.columns = columns;
        result
    }

    pub fn flush_columns(&mut self) -> Result<(), SkipReason> {
        let mut columns = std::mem::take(&mut self.columns);
        let result = columns.flush(self);
        self.columns = columns;
        result
    }

    pub fn pending_columns(&self) -> &ColumnBalancer {
        &self.columns
    }

    /// Moves the cursor down by up to `space` points, never past the margin.
    pub fn gap(&mut self, space: f32) {
        let margin = self.geometry.margin;
        if let Some(c) = self.cursor.as_mut() {
            let step = space.min(c.remaining(margin));
            if step > 0.0 {
                c.advance(c.bottom() - step);
            }
        }
    }

    pub(crate) fn note_flush(&mut self) {
        self.report.column_flushes += 1;
    }

    pub fn into_parts(self) -> (S, BuildReport) {
        (self.surface, self.report)
    }
}
