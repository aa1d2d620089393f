mod common;

use std::cell::RefCell;

use common::{block, context, group_of_width, labelled_block};
use herosheet_pdf::layout::{OrientationSwitcher, PageGeometry, SheetStart, WidthClass};
use herosheet_pdf::{Orientation, Role, Table};

fn switcher() -> OrientationSwitcher {
    OrientationSwitcher::new(PageGeometry::a4())
}

#[test]
fn widths_are_classified_against_portrait_page() {
    let s = switcher();
    assert_eq!(s.classify(300.0), WidthClass::Narrow);
    assert_eq!(s.classify(400.0), WidthClass::Flexible);
    assert_eq!(s.classify(450.0), WidthClass::Flexible);
    assert_eq!(s.classify(538.0), WidthClass::Flexible);
    assert_eq!(s.classify(600.0), WidthClass::Wide);
}

#[test]
fn initial_orientation_follows_first_group() {
    let s = switcher();
    assert_eq!(s.initial(Some(600.0)), Orientation::Landscape);
    assert_eq!(s.initial(Some(300.0)), Orientation::Portrait);
    assert_eq!(s.initial(Some(450.0)), Orientation::Portrait);
    assert_eq!(s.initial(None), Orientation::Portrait);
}

#[test]
fn group_width_adds_up_natural_widths() {
    let tables = vec![group_of_width(120.0), group_of_width(200.0)];
    assert_eq!(OrientationSwitcher::group_width(&tables), 320.0);
}

#[test]
fn prepare_switches_only_when_needed() {
    let s = switcher();
    let mut ctx = context();
    let start = SheetStart::new(&ctx, "Combat", Orientation::Portrait);
    ctx.start_sheet(start);

    assert!(s.prepare(&mut ctx, 600.0));
    assert_eq!(ctx.orientation(), Some(Orientation::Landscape));
    assert!(!s.prepare(&mut ctx, 600.0), "second call is a no-op");
    assert!(!s.prepare(&mut ctx, 450.0), "flexible group stays landscape");
    assert!(s.prepare(&mut ctx, 300.0));

    let report = ctx.report();
    assert_eq!(
        report.pages,
        vec![Orientation::Portrait, Orientation::Landscape, Orientation::Portrait]
    );
    assert_eq!(report.orientation_switches, 2);
}

#[test]
fn alternating_groups_alternate_pages() {
    let s = switcher();
    let mut ctx = context();
    let widths = [600.0, 300.0, 600.0];
    let start = SheetStart::new(&ctx, "Combat", s.initial(Some(widths[0])));
    ctx.start_sheet(start);

    for w in widths {
        s.prepare(&mut ctx, w);
        ctx.place_group(vec![group_of_width(w)]).unwrap();
    }
    ctx.end_sheet(false).unwrap();

    assert_eq!(
        ctx.report().pages,
        vec![Orientation::Landscape, Orientation::Portrait, Orientation::Landscape]
    );
    assert_eq!(ctx.report().orientation_switches, 2);
    for page in 0..3 {
        assert_eq!(ctx.surface().drawn_on(page).len(), 1);
    }
}

#[test]
fn switch_flushes_pending_columns_on_the_old_page() {
    let s = switcher();
    let mut ctx = context();
    let start = SheetStart::new(&ctx, "Combat", Orientation::Portrait);
    ctx.start_sheet(start);

    ctx.add_block(Role::Left, labelled_block("armor", 20.0)).unwrap();
    s.prepare(&mut ctx, 600.0);
    assert!(!ctx.pending_columns().is_pending());
    let armor = ctx.surface().labelled("armor");
    assert_eq!(armor.len(), 1);
    assert_eq!(armor[0].page, 0);
}

#[test]
fn summary_is_rebuilt_for_the_new_width() {
    let widths = RefCell::new(Vec::new());
    let s = switcher();
    let mut ctx = context();
    let summary = Box::new(|w: f32| {
        widths.borrow_mut().push(w);
        Some(labelled_block("summary", 12.0))
    });
    let start = SheetStart::new(&ctx, "Magic", Orientation::Portrait).summary(summary);
    ctx.start_sheet(start);
    ctx.place(&block(20.0)).unwrap();
    s.prepare(&mut ctx, 700.0);

    let geometry = PageGeometry::a4();
    let seen = widths.borrow().clone();
    assert_eq!(seen.len(), 2);
    assert!((seen[0] - geometry.usable_width(Orientation::Portrait)).abs() < 0.001);
    assert!((seen[1] - geometry.usable_width(Orientation::Landscape)).abs() < 0.001);

    let strips = ctx.surface().labelled("summary");
    assert_eq!(strips.len(), 2);
    assert_eq!((strips[0].page, strips[1].page), (0, 1));
}

#[test]
fn summary_returning_nothing_leaves_page_empty() {
    let mut ctx = context();
    let nothing = |_: f32| -> Option<Table> { None };
    let start = SheetStart::new(&ctx, "Combat", Orientation::Portrait).summary(Box::new(nothing));
    let cursor = ctx.start_sheet(start);
    assert!(cursor.is_fresh());
    assert!(ctx.surface().drawn.is_empty());
}

#[test]
fn same_groups_give_same_pages() {
    let run = || {
        let s = switcher();
        let mut ctx = context();
        let widths = [450.0, 600.0, 300.0, 300.0, 560.0];
        let start = SheetStart::new(&ctx, "Combat", s.initial(Some(widths[0])));
        ctx.start_sheet(start);
        for w in widths {
            s.prepare(&mut ctx, w);
            ctx.place_group(vec![group_of_width(w)]).unwrap();
        }
        ctx.end_sheet(false).unwrap();
        ctx.into_parts().1.pages
    };
    let first = run();
    assert_eq!(
        first,
        vec![Orientation::Portrait, Orientation::Landscape, Orientation::Portrait, Orientation::Landscape]
    );
    assert_eq!(run(), first);
}
