use std::sync::Arc;

use crate::error::SkipReason;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Column a small block asks for when it is packed side by side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Left,
    Right,
    Either,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fill {
    None,
    Alternate(f32), // gray level of every second body row
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Border {
    None,
    Grid(f32), // line width in points
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

#[derive(Clone, Debug)]
pub struct ImageData {
    pub bytes: Arc<[u8]>,
    pub format: ImageFormat,
}

/// A fixed-size picture box. `image` is `None` for a blank placeholder
/// (missing or unreadable file); the box keeps its size either way.
#[derive(Clone, Debug)]
pub struct Illustration {
    pub image: Option<ImageData>,
    pub width: f32,  // points
    pub height: f32, // points
}

impl Illustration {
    pub fn placeholder(width: f32, height: f32) -> Self {
        Self {
            image: None,
            width,
            height,
        }
    }
}

#[derive(Clone, Debug)]
pub enum CellContent {
    Empty,
    Text(String),
    Illustration(Illustration),
    Table(Box<Table>),
}

#[derive(Clone, Debug)]
pub struct Cell {
    pub content: CellContent,
    pub span: usize,
    pub align: Alignment,
    pub bold: bool,
    pub shading: Option<f32>, // gray level
}

impl Cell {
    fn with(content: CellContent) -> Self {
        Self {
            content,
            span: 1,
            align: Alignment::Left,
            bold: false,
            shading: None,
        }
    }

    pub fn empty() -> Self {
        Self::with(CellContent::Empty)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::with(CellContent::Text(text.into()))
    }

    pub fn number(value: i32) -> Self {
        Self::text(value.to_string()).align(Alignment::Center)
    }

    pub fn table(table: Table) -> Self {
        Self::with(CellContent::Table(Box::new(table)))
    }

    pub fn illustration(illustration: Illustration) -> Self {
        Self::with(CellContent::Illustration(illustration)).align(Alignment::Center)
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn span(mut self, span: usize) -> Self {
        self.span = span.max(1);
        self
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    pub fn shaded(mut self, gray: f32) -> Self {
        self.shading = Some(gray);
        self
    }
}

#[derive(Clone, Debug)]
pub struct TableRow {
    pub cells: Vec<Cell>,
    pub min_height: f32,
}

impl TableRow {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            min_height: 0.0,
        }
    }

    fn span_total(&self) -> usize {
        self.cells.iter().map(|c| c.span.max(1)).sum()
    }
}

/// Gray level used for header rows.
pub const HEADER_SHADING: f32 = 0.8;

/// A content block: fixed-width columns stacked in rows. Column widths are
/// natural widths in points; renderers scale them to the width they are given.
#[derive(Clone, Debug)]
pub struct Table {
    pub columns: Vec<f32>,
    pub rows: Vec<TableRow>,
    pub header_rows: usize,
    pub fill: Fill,
    pub border: Border,
    pub font_size: f32,
    pub padding: f32,
    pub min_width: f32, // natural width, drives orientation decisions
}

impl Table {
    pub fn new(columns: &[f32]) -> Self {
        Self {
            columns: columns.to_vec(),
            rows: Vec::new(),
            header_rows: 0,
            fill: Fill::Alternate(0.93),
            border: Border::Grid(0.5),
            font_size: 8.0,
            padding: 2.0,
            min_width: columns.iter().sum(),
        }
    }

    /// Borderless single-column table used to wrap other tables.
    fn frame(columns: &[f32]) -> Self {
        Self {
            fill: Fill::None,
            border: Border::None,
            padding: 0.0,
            ..Self::new(columns)
        }
    }

    /// Stacks blocks vertically into one column; height is the sum of the
    /// block heights.
    pub fn stack(blocks: Vec<Table>) -> Self {
        let width = blocks.iter().map(|b| b.min_width).fold(0.0f32, f32::max);
        let mut stacked = Self::frame(&[width.max(1.0)]);
        stacked.min_width = width;
        for block in blocks {
            stacked.rows.push(TableRow::new(vec![Cell::table(block)]));
        }
        stacked
    }

    /// Places tables next to each other in a single row. `widths` are the
    /// relative column widths; the row is as tall as the tallest table.
    pub fn side_by_side(widths: &[f32], tables: Vec<Table>) -> Self {
        let natural: f32 = tables.iter().map(|t| t.min_width).sum();
        let mut row = Self::frame(widths);
        row.min_width = natural;
        row.rows.push(TableRow::new(tables.into_iter().map(Cell::table).collect()));
        row
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    pub fn with_min_width(mut self, width: f32) -> Self {
        self.min_width = width;
        self
    }

    /// Appends a header row. Header rows must precede body rows; they are
    /// repeated when the table continues on a new page.
    pub fn header(&mut self, cells: Vec<Cell>) -> &mut Self {
        let cells = cells
            .into_iter()
            .map(|c| {
                let shade = c.shading.unwrap_or(HEADER_SHADING);
                c.bold().shaded(shade)
            })
            .collect();
        self.rows.insert(self.header_rows, TableRow::new(cells));
        self.header_rows += 1;
        self
    }

    pub fn row(&mut self, cells: Vec<Cell>) -> &mut Self {
        self.rows.push(TableRow::new(cells));
        self
    }

    /// Blank rows for handwritten additions.
    pub fn filler_rows(&mut self, count: u32) -> &mut Self {
        let height = self.filler_row_height();
        for _ in 0..count {
            let cells = self.columns.iter().map(|_| Cell::empty()).collect();
            self.rows.push(TableRow {
                cells,
                min_height: height,
            });
        }
        self
    }

    pub fn filler_row_height(&self) -> f32 {
        self.font_size * 1.6 + 2.0 * self.padding
    }

    pub fn body_rows(&self) -> usize {
        self.rows.len().saturating_sub(self.header_rows)
    }

    pub fn validate(&self) -> Result<(), SkipReason> {
        if self.columns.is_empty() || self.columns.iter().any(|w| *w <= 0.0) {
            return Err(SkipReason::InvalidTable(format!(
                "column widths must be positive, got {:?}",
                self.columns
            )));
        }
        if self.header_rows > self.rows.len() {
            return Err(SkipReason::InvalidTable(format!(
                "{} header rows but only {} rows",
                self.header_rows,
                self.rows.len()
            )));
        }
        for (ri, row) in self.rows.iter().enumerate() {
            let spans = row.span_total();
            if spans != self.columns.len() {
                return Err(SkipReason::InvalidTable(format!(
                    "row {ri} spans {spans} columns, table has {}",
                    self.columns.len()
                )));
            }
            for cell in &row.cells {
                if let CellContent::Table(inner) = &cell.content {
                    inner.validate()?;
                }
            }
        }
        Ok(())
    }

    pub fn has_illustration(&self) -> bool {
        self.rows.iter().flat_map(|r| r.cells.iter()).any(|c| match &c.content {
            CellContent::Illustration(_) => true,
            CellContent::Table(inner) => inner.has_illustration(),
            _ => false,
        })
    }

    /// Grows the first illustration's box by `extra` points of height.
    /// Returns false when the table holds no illustration.
    pub fn stretch_illustration(&mut self, extra: f32) -> bool {
        for row in &mut self.rows {
            for cell in &mut row.cells {
                match &mut cell.content {
                    CellContent::Illustration(ill) => {
                        ill.height += extra;
                        return true;
                    }
                    CellContent::Table(inner) => {
                        if inner.stretch_illustration(extra) {
                            return true;
                        }
                    }
                    _ => {}
                }
            }
        }
        false
    }

    /// Column widths scaled to `width`.
    pub fn scaled_columns(&self, width: f32) -> Vec<f32> {
        let total: f32 = self.columns.iter().sum();
        if total <= 0.0 {
            return self.columns.clone();
        }
        self.columns.iter().map(|w| w * width / total).collect()
    }
}
