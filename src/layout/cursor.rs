/// Vertical position on the page being filled, in PDF coordinates
/// (y grows upwards, so `bottom` only ever decreases while a page fills).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageCursor {
    top: f32,
    bottom: f32,
}

impl PageCursor {
    /// Cursor for a page nothing has been drawn on yet.
    pub fn fresh(top: f32) -> Self {
        Self { top, bottom: top }
    }

    /// Cursor for a page that already holds content down to `bottom`.
    pub fn continuing(top: f32, bottom: f32) -> Self {
        Self {
            top,
            bottom: bottom.min(top),
        }
    }

    pub fn top(&self) -> f32 {
        self.top
    }

    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    pub fn used(&self) -> f32 {
        self.top - self.bottom
    }

    pub fn is_fresh(&self) -> bool {
        self.bottom >= self.top
    }

    /// Space left above the bottom margin.
    pub fn remaining(&self, bottom_margin: f32) -> f32 {
        (self.bottom - bottom_margin).max(0.0)
    }

    /// Moves the cursor down to `new_bottom`. Upward moves are ignored.
    pub fn advance(&mut self, new_bottom: f32) {
        if new_bottom > self.bottom {
            log::warn!(
                "cursor asked to move up from {:.2} to {:.2}; ignored",
                self.bottom,
                new_bottom
            );
            return;
        }
        self.bottom = new_bottom;
    }
}
