use crate::error::SkipReason;
use crate::model::{Role, Table};

use super::{LayoutContext, Surface};

/// Share of the usable width given to the left column. The left column holds
/// label/value blocks and is the narrower one.
pub const LEFT_COLUMN_SHARE: f32 = 0.42;

/// Space left below a flushed column pair.
pub const SPACER_HEIGHT: f32 = 6.0;

const EPSILON: f32 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct PendingColumn {
    pub side: Side,
    pub accumulated_height: f32,
    pub blocks: Vec<Table>,
}

impl PendingColumn {
    fn new(side: Side) -> Self {
        Self {
            side,
            accumulated_height: 0.0,
            blocks: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn push(&mut self, block: Table, height: f32) {
        self.accumulated_height += height;
        self.blocks.push(block);
    }

    /// Grows the first illustration in this column so the column reaches
    /// `target` height.
    fn stretch_to(&mut self, target: f32) {
        let extra = target - self.accumulated_height;
        if extra <= EPSILON {
            return;
        }
        if let Some(block) = self.blocks.iter_mut().find(|b| b.has_illustration())
            && block.stretch_illustration(extra)
        {
            log::debug!(
                "{:?} column illustration stretched by {extra:.1}pt",
                self.side
            );
            self.accumulated_height = target;
        }
    }
}

#[derive(Clone, Debug)]
struct PendingPair {
    left: PendingColumn,
    right: PendingColumn,
}

impl PendingPair {
    fn new() -> Self {
        Self {
            left: PendingColumn::new(Side::Left),
            right: PendingColumn::new(Side::Right),
        }
    }

    fn sides(&self, side: Side) -> (&PendingColumn, &PendingColumn) {
        match side {
            Side::Left => (&self.left, &self.right),
            Side::Right => (&self.right, &self.left),
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut PendingColumn {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Packs small blocks into a left and a right column and emits each pair as
/// one two-column row of the main flow.
///
/// A block joins its column while that column is empty or its partner is.
/// A block that lands on an occupied column while the partner also holds
/// content closes the pair, which is flushed right after it. A block that
/// would grow the pair past the space left on the page flushes the pair
/// first and starts the next one. Blocks taller than a whole page never
/// enter a column; they go straight into the flow, where they are split by
/// rows.
#[derive(Clone, Debug, Default)]
pub struct ColumnBalancer {
    pending: Option<PendingPair>,
}

impl ColumnBalancer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn left(&self) -> Option<&PendingColumn> {
        self.pending.as_ref().map(|p| &p.left)
    }

    pub fn right(&self) -> Option<&PendingColumn> {
        self.pending.as_ref().map(|p| &p.right)
    }

    /// Left and right column widths for a row of `total` width.
    pub fn side_widths(total: f32) -> (f32, f32) {
        let left = total * LEFT_COLUMN_SHARE;
        (left, total - left)
    }

    fn choose_side(&self, role: Role) -> Side {
        match role {
            Role::Left => Side::Left,
            Role::Right => Side::Right,
            Role::Either => match &self.pending {
                Some(pair) if pair.right.accumulated_height < pair.left.accumulated_height => {
                    Side::Right
                }
                Some(pair) if pair.left.is_empty() => Side::Left,
                Some(pair) if pair.right.is_empty() => Side::Right,
                _ => Side::Left,
            },
        }
    }

    pub fn add_block<S: Surface>(
        &mut self,
        ctx: &mut LayoutContext<'_, S>,
        role: Role,
        block: Table,
    ) -> Result<(), SkipReason> {
        block.validate()?;
        let side = self.choose_side(role);
        let (left_w, right_w) = Self::side_widths(ctx.usable_width());
        let width = match side {
            Side::Left => left_w,
            Side::Right => right_w,
        };
        let height = ctx.measure(&block, width);

        if height > ctx.page_capacity() + EPSILON {
            log::debug!("{side:?} block of {height:.1}pt is taller than a page, placing it in the flow");
            self.flush(ctx)?;
            ctx.place(&block)?;
            ctx.gap(SPACER_HEIGHT);
            return Ok(());
        }

        let mut closes_pair = false;
        if let Some(pair) = &self.pending {
            let (this, other) = pair.sides(side);
            let grown = this.accumulated_height + height;
            if grown.max(other.accumulated_height) > ctx.remaining_height() + EPSILON {
                log::debug!("{side:?} block of {height:.1}pt does not fit the page below the open pair");
                self.flush(ctx)?;
            } else {
                closes_pair = !this.is_empty() && !other.is_empty();
            }
        }

        self.pending
            .get_or_insert_with(PendingPair::new)
            .side_mut(side)
            .push(block, height);
        if closes_pair {
            self.flush(ctx)?;
        }
        Ok(())
    }

    /// Emits the pending pair (if any) as one row of the flow, followed by a
    /// spacer. An illustration in the shorter column is stretched to the
    /// height of the taller one first.
    pub fn flush<S: Surface>(&mut self, ctx: &mut LayoutContext<'_, S>) -> Result<(), SkipReason> {
        let Some(mut pair) = self.pending.take() else {
            return Ok(());
        };

        let (left_h, right_h) = (pair.left.accumulated_height, pair.right.accumulated_height);
        if left_h < right_h {
            pair.left.stretch_to(right_h);
        } else if right_h < left_h {
            pair.right.stretch_to(left_h);
        }

        log::debug!(
            "flushing column pair: left {} blocks / {:.1}pt, right {} blocks / {:.1}pt",
            pair.left.blocks.len(),
            pair.left.accumulated_height,
            pair.right.blocks.len(),
            pair.right.accumulated_height
        );

        let row = Table::side_by_side(
            &[LEFT_COLUMN_SHARE, 1.0 - LEFT_COLUMN_SHARE],
            vec![Table::stack(pair.left.blocks), Table::stack(pair.right.blocks)],
        );
        ctx.note_flush();
        ctx.place(&row)?;
        ctx.gap(SPACER_HEIGHT);
        Ok(())
    }
}
