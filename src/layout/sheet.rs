use crate::error::SkipReason;
use crate::model::{Orientation, Table};

use super::{LayoutContext, PageCursor, Surface};

/// Painted once at the top of every page when the page is created.
pub trait PageHeader {
    fn page_header(&self, sheet_title: &str, width: f32) -> Result<Table, SkipReason>;
}

/// Builds a sheet's summary strip for a given page width. Returning `None`
/// leaves the strip out.
pub type SummaryBuilder<'h> = Box<dyn Fn(f32) -> Option<Table> + 'h>;

pub struct SheetStart<'h> {
    pub title: String,
    pub required_height: f32,
    pub orientation: Orientation,
    pub force_separate_page: bool,
    pub summary: Option<SummaryBuilder<'h>>,
}

impl<'h> SheetStart<'h> {
    /// Sheet starting at the content top of a page of `orientation`.
    pub fn new<S: Surface>(
        ctx: &LayoutContext<'h, S>,
        title: impl Into<String>,
        orientation: Orientation,
    ) -> Self {
        Self {
            title: title.into(),
            required_height: ctx.geometry().content_top(orientation),
            orientation,
            force_separate_page: true,
            summary: None,
        }
    }

    pub fn force_separate_page(mut self, force: bool) -> Self {
        self.force_separate_page = force;
        self
    }

    pub fn summary(mut self, summary: SummaryBuilder<'h>) -> Self {
        self.summary = Some(summary);
        self
    }
}

impl<'h, S: Surface> LayoutContext<'h, S> {
    /// Opens a sheet. A new page is started when the sheet asks for one,
    /// when no page is open, or when the open page has the wrong
    /// orientation; otherwise the sheet continues below the previous one.
    /// The bookmark always points at the page the sheet starts on.
    pub fn start_sheet(&mut self, start: SheetStart<'h>) -> PageCursor {
        self.sheet_title = start.title;
        self.summary = start.summary;

        let reusable = match self.cursor {
            Some(prior) => {
                !start.force_separate_page
                    && self.surface.current_orientation() == Some(start.orientation)
                    && prior.bottom() > self.geometry.margin
            }
            None => false,
        };

        if reusable {
            let prior = self.cursor.map(|c| c.bottom()).unwrap_or(start.required_height);
            self.cursor = Some(PageCursor::continuing(start.required_height, prior));
            log::debug!(
                "sheet '{}' continues on page {}",
                self.sheet_title,
                self.surface.page_count()
            );
        } else {
            self.open_page(start.orientation, start.required_height);
        }

        self.surface.add_bookmark(&self.sheet_title);
        let page_index = self.surface.page_count().saturating_sub(1);
        self.report
            .bookmarks
            .push((self.sheet_title.clone(), page_index));

        self.paint_summary();
        self.cursor
            .unwrap_or_else(|| PageCursor::fresh(start.required_height))
    }

    /// Closes the sheet: flushes pending columns and optionally appends a
    /// blank page of the same size. Nothing is ever drawn on that page, so
    /// the next sheet always starts on a new one.
    pub fn end_sheet(&mut self, insert_blank_page: bool) -> Result<(), SkipReason> {
        let flushed = self.flush_columns();
        if insert_blank_page {
            let orientation = self.orientation().unwrap_or(Orientation::Portrait);
            self.surface.add_page(orientation);
            self.report.pages.push(orientation);
            self.cursor = None;
            self.body_top = None;
            log::debug!("blank page inserted after '{}'", self.sheet_title);
        }
        self.summary = None;
        self.sheet_title.clear();
        flushed
    }

    pub fn sheet_title(&self) -> &str {
        &self.sheet_title
    }
}
