mod common;

use common::{block, context, illustrated_block, illustration_height, labelled_block};
use herosheet_pdf::layout::{ColumnBalancer, PageGeometry, SPACER_HEIGHT, SheetStart};
use herosheet_pdf::{Cell, CellContent, Orientation, Role, Table};

#[test]
fn side_widths_split_at_left_share() {
    let (left, right) = ColumnBalancer::side_widths(500.0);
    assert!((left - 210.0).abs() < 0.01);
    assert!((right - 290.0).abs() < 0.01);
}

#[test]
fn second_block_on_an_occupied_side_closes_the_pair() {
    let mut ctx = context();
    let start = SheetStart::new(&ctx, "Front", Orientation::Portrait);
    ctx.start_sheet(start);

    ctx.add_block(Role::Left, labelled_block("a", 10.0)).unwrap();
    ctx.add_block(Role::Right, labelled_block("b", 40.0)).unwrap();
    assert!(ctx.surface().drawn.is_empty(), "nothing flushed yet");
    ctx.add_block(Role::Left, labelled_block("c", 15.0)).unwrap();

    assert_eq!(ctx.report().column_flushes, 1);
    assert!(!ctx.pending_columns().is_pending());
    let drawn = &ctx.surface().drawn;
    assert_eq!(drawn.len(), 1);
    assert_eq!(drawn[0].label.as_deref(), Some("a"));
    assert!((drawn[0].height() - 40.0).abs() < 0.001);
    let pair = &drawn[0].table.rows[0].cells;
    let CellContent::Table(left) = &pair[0].content else {
        panic!("left column is not a table");
    };
    let CellContent::Table(right) = &pair[1].content else {
        panic!("right column is not a table");
    };
    assert_eq!(left.rows.len(), 2);
    assert_eq!(right.rows.len(), 1);

    // The next block starts a fresh pair.
    ctx.add_block(Role::Left, labelled_block("d", 10.0)).unwrap();
    let left = ctx.pending_columns().left().unwrap();
    assert_eq!(left.blocks.len(), 1);
    assert_eq!(left.accumulated_height, 10.0);
    assert!(ctx.pending_columns().right().unwrap().is_empty());

    ctx.end_sheet(false).unwrap();
    assert_eq!(ctx.report().column_flushes, 2);
    let drawn = &ctx.surface().drawn;
    assert_eq!(drawn[1].label.as_deref(), Some("d"));
    assert!((drawn[0].bottom - drawn[1].top - SPACER_HEIGHT).abs() < 0.001);
}

#[test]
fn blocks_on_one_side_collect_until_the_partner_is_used() {
    let mut ctx = context();
    let start = SheetStart::new(&ctx, "Front", Orientation::Portrait);
    ctx.start_sheet(start);

    for _ in 0..3 {
        ctx.add_block(Role::Right, block(10.0)).unwrap();
    }
    assert_eq!(ctx.report().column_flushes, 0);
    assert_eq!(ctx.pending_columns().right().unwrap().accumulated_height, 30.0);

    ctx.add_block(Role::Left, labelled_block("l30", 30.0)).unwrap();
    assert_eq!(ctx.report().column_flushes, 0);
    ctx.add_block(Role::Right, block(5.0)).unwrap();
    assert_eq!(ctx.report().column_flushes, 1);
    assert!((ctx.surface().drawn[0].height() - 35.0).abs() < 0.001);
}

#[test]
fn pair_that_would_overflow_the_page_is_flushed_first() {
    let mut ctx = context();
    let start = SheetStart::new(&ctx, "Equipment", Orientation::Portrait);
    ctx.start_sheet(start);
    ctx.place(&block(700.0)).unwrap();
    let room = ctx.remaining_height();
    assert!(room > 80.0 && room < 90.0, "room {room}");

    ctx.add_block(Role::Left, labelled_block("small", 50.0)).unwrap();
    ctx.add_block(Role::Right, labelled_block("big", 90.0)).unwrap();
    assert_eq!(ctx.report().column_flushes, 1);
    assert!(ctx.pending_columns().left().unwrap().is_empty());

    ctx.end_sheet(false).unwrap();
    assert_eq!(ctx.report().column_flushes, 2);
    assert_eq!(ctx.report().pages.len(), 2);
    let small = ctx.surface().labelled("small");
    let first_pair = small[0];
    assert_eq!(first_pair.page, 0);
    assert!((first_pair.height() - 50.0).abs() < 0.001);
    // The second pair has an empty left column, so it carries no label.
    let on_second = ctx.surface().drawn_on(1);
    assert_eq!(on_second.len(), 1);
    assert!((on_second[0].height() - 90.0).abs() < 0.001);
}

#[test]
fn illustration_in_shorter_column_is_stretched() {
    let mut ctx = context();
    let start = SheetStart::new(&ctx, "Front", Orientation::Portrait);
    ctx.start_sheet(start);

    ctx.add_block(Role::Left, illustrated_block(40.0)).unwrap();
    ctx.add_block(Role::Right, block(60.0)).unwrap();
    ctx.end_sheet(false).unwrap();

    let drawn = &ctx.surface().drawn[0];
    assert_eq!(illustration_height(&drawn.table), Some(60.0));
    assert!((drawn.height() - 60.0).abs() < 0.001);
}

#[test]
fn stretch_reaches_illustration_below_the_top_block() {
    let mut ctx = context();
    let start = SheetStart::new(&ctx, "Front", Orientation::Portrait);
    ctx.start_sheet(start);

    ctx.add_block(Role::Left, block(40.0)).unwrap();
    ctx.add_block(Role::Right, illustrated_block(20.0)).unwrap();
    ctx.add_block(Role::Right, block(10.0)).unwrap();
    ctx.end_sheet(false).unwrap();

    let drawn = &ctx.surface().drawn[0];
    assert_eq!(illustration_height(&drawn.table), Some(30.0));
}

#[test]
fn either_goes_to_the_shorter_side() {
    let mut ctx = context();
    let start = SheetStart::new(&ctx, "Equipment", Orientation::Portrait);
    ctx.start_sheet(start);

    ctx.add_block(Role::Either, labelled_block("first", 30.0)).unwrap();
    ctx.add_block(Role::Either, block(10.0)).unwrap();
    let balancer = ctx.pending_columns();
    assert_eq!(balancer.left().unwrap().blocks.len(), 1);
    assert_eq!(balancer.right().unwrap().blocks.len(), 1);

    // Right is still shorter, so the third block stacks there and closes the pair.
    ctx.add_block(Role::Either, block(10.0)).unwrap();
    assert_eq!(ctx.report().column_flushes, 1);
    let pair = &ctx.surface().drawn[0].table.rows[0].cells;
    let CellContent::Table(right) = &pair[1].content else {
        panic!("right column is not a table");
    };
    assert_eq!(right.rows.len(), 2);
}

#[test]
fn either_on_equal_columns_goes_left() {
    let mut ctx = context();
    let start = SheetStart::new(&ctx, "Equipment", Orientation::Portrait);
    ctx.start_sheet(start);

    ctx.add_block(Role::Either, labelled_block("left", 20.0)).unwrap();
    ctx.add_block(Role::Right, block(20.0)).unwrap();
    ctx.add_block(Role::Either, block(5.0)).unwrap();

    assert_eq!(ctx.report().column_flushes, 1);
    let pair = &ctx.surface().drawn[0].table.rows[0].cells;
    let CellContent::Table(left) = &pair[0].content else {
        panic!("left column is not a table");
    };
    assert_eq!(left.rows.len(), 2);
    assert!((ctx.surface().drawn[0].height() - 25.0).abs() < 0.001);
}

#[test]
fn block_taller_than_a_page_goes_into_the_flow() {
    let mut ctx = context();
    let start = SheetStart::new(&ctx, "Equipment", Orientation::Portrait);
    ctx.start_sheet(start);
    ctx.add_block(Role::Left, labelled_block("money", 20.0)).unwrap();

    let mut long = Table::new(&[100.0]);
    long.header(vec![Cell::text("Inventory: Backpack")]);
    for _ in 0..300 {
        long.row(vec![Cell::text("Torch")]);
    }
    ctx.add_block(Role::Either, long).unwrap();
    assert!(!ctx.pending_columns().is_pending());
    assert_eq!(ctx.report().column_flushes, 1);

    let surface = ctx.surface();
    assert_eq!(surface.drawn[0].label.as_deref(), Some("money"));
    let parts = surface.labelled("Inventory: Backpack");
    assert!(parts.len() >= 2, "split over {} pages", parts.len());
    assert!(parts.iter().skip(1).all(|d| d.rows[0] == 0), "header repeated");
    let margin = PageGeometry::a4().margin;
    assert!(surface.drawn.iter().all(|d| d.bottom >= margin - 0.001));
}

#[test]
fn tall_group_is_placed_one_table_below_the_other() {
    let mut ctx = context();
    let start = SheetStart::new(&ctx, "Combat", Orientation::Portrait);
    ctx.start_sheet(start);

    let mut armor = Table::new(&[100.0]);
    armor.header(vec![Cell::text("Armor")]);
    for _ in 0..200 {
        armor.row(vec![Cell::empty()]);
    }
    ctx.place_group(vec![armor, labelled_block("Shields", 25.0)]).unwrap();

    let surface = ctx.surface();
    assert!(surface.labelled("Armor").len() >= 2);
    assert_eq!(surface.labelled("Shields").len(), 1);
    let margin = PageGeometry::a4().margin;
    assert!(surface.drawn.iter().all(|d| d.bottom >= margin - 0.001));
}

#[test]
fn group_flushes_pending_blocks_first() {
    let mut ctx = context();
    let start = SheetStart::new(&ctx, "Front", Orientation::Portrait);
    ctx.start_sheet(start);

    ctx.add_block(Role::Left, labelled_block("pending", 10.0)).unwrap();
    ctx.place_group(vec![labelled_block("group", 20.0)]).unwrap();

    let drawn = &ctx.surface().drawn;
    assert_eq!(drawn.len(), 2);
    assert_eq!(drawn[0].label.as_deref(), Some("pending"));
    assert_eq!(drawn[1].label.as_deref(), Some("group"));
    assert!(drawn[1].top < drawn[0].bottom);
    assert_eq!(ctx.report().column_flushes, 1);
    assert!(!ctx.pending_columns().is_pending());
}

#[test]
fn several_tables_in_a_group_share_one_row() {
    let mut ctx = context();
    let start = SheetStart::new(&ctx, "Combat", Orientation::Portrait);
    ctx.start_sheet(start);

    ctx.place_group(vec![labelled_block("armor", 15.0), block(25.0)]).unwrap();
    let drawn = &ctx.surface().drawn;
    assert_eq!(drawn.len(), 1);
    assert_eq!(drawn[0].label.as_deref(), Some("armor"));
    assert!((drawn[0].height() - 25.0).abs() < 0.001);
}
