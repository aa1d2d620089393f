use crate::model::{Orientation, Table};

use super::{LayoutContext, PageGeometry, Surface};

/// Groups narrower than this always go on portrait pages, even when a
/// sibling group of the same sheet needed landscape. Tuned by eye against
/// A4 sheets; keep the value unless the sheets are redesigned.
pub const NARROW_GROUP_WIDTH: f32 = 400.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidthClass {
    /// Below [`NARROW_GROUP_WIDTH`]: needs portrait.
    Narrow,
    /// Fits portrait, happy on whatever page is open.
    Flexible,
    /// Wider than the portrait usable width: needs landscape.
    Wide,
}

impl WidthClass {
    pub fn required(self, current: Option<Orientation>) -> Orientation {
        match self {
            WidthClass::Narrow => Orientation::Portrait,
            WidthClass::Wide => Orientation::Landscape,
            WidthClass::Flexible => current.unwrap_or(Orientation::Portrait),
        }
    }
}

/// Decides page orientation per content group.
#[derive(Clone, Copy, Debug)]
pub struct OrientationSwitcher {
    geometry: PageGeometry,
}

impl OrientationSwitcher {
    pub fn new(geometry: PageGeometry) -> Self {
        Self { geometry }
    }

    /// Natural width of a group: its blocks' minimum widths added up.
    pub fn group_width(tables: &[Table]) -> f32 {
        tables.iter().map(|t| t.min_width).sum()
    }

    pub fn classify(&self, width: f32) -> WidthClass {
        if width > self.geometry.usable_width(Orientation::Portrait) {
            WidthClass::Wide
        } else if width < NARROW_GROUP_WIDTH {
            WidthClass::Narrow
        } else {
            WidthClass::Flexible
        }
    }

    /// Orientation a sheet starts in. Only the first group counts; a sheet
    /// without groups (or with a flexible first group) starts portrait.
    pub fn initial(&self, first_group_width: Option<f32>) -> Orientation {
        match first_group_width {
            Some(width) => self.classify(width).required(None),
            None => Orientation::Portrait,
        }
    }

    /// Makes sure the open page suits a group of `width`, starting a page of
    /// the other orientation when it does not. Returns true on a switch.
    pub fn prepare<S: Surface>(&self, ctx: &mut LayoutContext<'_, S>, width: f32) -> bool {
        let current = ctx.orientation();
        let required = self.classify(width).required(current);
        if current == Some(required) {
            return false;
        }
        log::debug!(
            "group width {width:.1} needs {required:?}, page is {current:?}; switching"
        );
        ctx.switch_orientation(required);
        true
    }
}

impl<S: Surface> LayoutContext<'_, S> {
    /// Starts a page of `orientation` within the current sheet. The page
    /// header is painted by the new page and the summary strip is rebuilt
    /// for its width.
    pub fn switch_orientation(&mut self, orientation: Orientation) {
        if let Err(reason) = self.flush_columns() {
            let sheet = self.sheet_title.clone();
            self.record_skip(&sheet, "columns", reason);
        }
        let top = self.geometry.content_top(orientation);
        self.open_page(orientation, top);
        self.report.orientation_switches += 1;
        self.paint_summary();
    }
}
