mod common;

use common::{FakeSurface, SAMPLE_HERO, init_logging, sample_hero};
use herosheet_pdf::layout::PageGeometry;
use herosheet_pdf::settings::{DocumentSettings, SheetKind};
use herosheet_pdf::sheets::render_document;
use herosheet_pdf::{
    Error, FontConfig, Hero, Item, Orientation, SkipReason, build_document, convert_hero_to_pdf,
};
use serde_json::json;

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn titles(bookmarks: &[(String, usize)]) -> Vec<&str> {
    bookmarks.iter().map(|(t, _)| t.as_str()).collect()
}

#[test]
fn full_hero_lays_out_every_sheet() {
    init_logging();
    let hero = sample_hero();
    let mut settings = DocumentSettings::default();
    let (surface, report) =
        render_document(FakeSurface::new(), PageGeometry::a4(), &hero, &mut settings);

    assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
    assert_eq!(
        titles(&report.bookmarks),
        ["Character", "Talents", "Combat", "Magic", "Equipment"]
    );
    assert_eq!(surface.bookmarks, report.bookmarks);
    assert_eq!(surface.pages, report.pages);

    // Bookmarks point at pages in order, and separate sheets start fresh.
    let pages: Vec<usize> = report.bookmarks.iter().map(|(_, p)| *p).collect();
    assert!(pages.windows(2).all(|w| w[0] <= w[1]));
    assert!(pages[..4].windows(2).all(|w| w[0] < w[1]));

    // Weapons need landscape, combat abilities go back to portrait.
    let combat_page = pages[2];
    assert_eq!(report.pages[combat_page], Orientation::Landscape);
    assert!(report.orientation_switches >= 1);
    assert_eq!(report.pages[0], Orientation::Portrait);

    // Every page has the hero header.
    for page in 0..report.pages.len() {
        assert!(
            !surface.drawn_on(page).is_empty(),
            "page {page} has nothing on it"
        );
    }
}

#[test]
fn large_inventory_stays_inside_the_margins() {
    let mut hero = sample_hero();
    hero.containers[0].items = (0..250)
        .map(|i| Item {
            name: format!("Arrow bundle {i}"),
            count: 1,
            weight: 0.2,
        })
        .collect();
    let mut settings = DocumentSettings::default();
    let (surface, report) =
        render_document(FakeSurface::new(), PageGeometry::a4(), &hero, &mut settings);

    assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
    let margin = PageGeometry::a4().margin;
    for drawn in &surface.drawn {
        assert!(
            drawn.bottom >= margin - 0.001,
            "page {} drawn down to {}",
            drawn.page,
            drawn.bottom
        );
    }
    let backpack = surface.labelled("Inventory: Backpack");
    assert!(backpack.len() >= 2, "backpack drawn {} times", backpack.len());
}

#[test]
fn discovered_sections_are_written_back() {
    let hero = sample_hero();
    let mut settings = DocumentSettings::default();
    render_document(FakeSurface::new(), PageGeometry::a4(), &hero, &mut settings);

    let equipment = settings.sheet(SheetKind::Equipment);
    assert!(equipment.section("Inventory: Backpack").is_some());
    assert!(equipment.section("Inventory: Belt pouch").is_some());
    let tree = settings.to_tree();
    let magic = &tree["sheets"]["magic"]["sections"];
    assert!(magic["Spells"].is_object());
    // Not blessed, so liturgies are never offered.
    assert!(magic.get("Liturgies").is_none());
}

#[test]
fn mundane_hero_gets_no_magic_sheet() {
    let mut hero = sample_hero();
    hero.magical = false;
    let mut settings = DocumentSettings::default();
    let (_, report) =
        render_document(FakeSurface::new(), PageGeometry::a4(), &hero, &mut settings);
    assert_eq!(
        titles(&report.bookmarks),
        ["Character", "Talents", "Combat", "Equipment"]
    );
    assert!(settings.sheet(SheetKind::Magic).sections.is_empty());
}

#[test]
fn hero_without_attributes_keeps_rendering() {
    let mut hero = sample_hero();
    hero.attributes.clear();
    let mut settings = DocumentSettings::default();
    let (_, report) =
        render_document(FakeSurface::new(), PageGeometry::a4(), &hero, &mut settings);

    let header_failures = report
        .skipped
        .iter()
        .filter(|s| matches!(s.reason, SkipReason::HeaderFailed(_)))
        .count();
    assert_eq!(header_failures, report.pages.len());
    assert!(report.skipped.iter().any(|s| s.sheet == "Character"
        && s.section == "Attributes"
        && matches!(s.reason, SkipReason::MissingData(_))));
    assert_eq!(report.bookmarks.len(), 5);
}

#[test]
fn hidden_attribute_strip_needs_no_attributes() {
    let mut hero = sample_hero();
    hero.attributes.clear();
    let tree = json!({ "header": { "showAttributes": false } });
    let mut settings = DocumentSettings::from_tree(&tree).unwrap();
    let (_, report) =
        render_document(FakeSurface::new(), PageGeometry::a4(), &hero, &mut settings);
    assert!(
        !report
            .skipped
            .iter()
            .any(|s| matches!(s.reason, SkipReason::HeaderFailed(_)))
    );
}

#[test]
fn blank_page_setting_adds_a_page() {
    let hero = sample_hero();
    let mut plain = DocumentSettings::default();
    let (_, plain_report) =
        render_document(FakeSurface::new(), PageGeometry::a4(), &hero, &mut plain);

    let tree = json!({ "sheets": { "front": { "insertBlankPage": true } } });
    let mut settings = DocumentSettings::from_tree(&tree).unwrap();
    let (surface, report) =
        render_document(FakeSurface::new(), PageGeometry::a4(), &hero, &mut settings);

    assert_eq!(report.pages.len(), plain_report.pages.len() + 1);
    let blank = report.bookmarks[1].1 - 1;
    assert!(surface.drawn_on(blank).is_empty());
}

#[test]
fn pdf_is_written_with_builtin_fonts() {
    init_logging();
    let hero = sample_hero();
    let built = build_document(&hero, &DocumentSettings::default(), &FontConfig::Builtin).unwrap();

    assert!(built.pdf.starts_with(b"%PDF-"));
    assert!(contains(&built.pdf, b"Helvetica-Bold"));
    assert!(contains(&built.pdf, b"/Outlines"));
    assert!(contains(&built.pdf, b"Equipment"));
    assert!(built.report.pages.contains(&Orientation::Landscape));
    assert!(built.report.skipped.is_empty());
    assert!(
        built
            .settings
            .sheet(SheetKind::Equipment)
            .section("Inventory: Backpack")
            .is_some()
    );
}

#[test]
fn portrait_image_is_embedded() {
    let dir = tempfile::tempdir().unwrap();
    let picture = dir.path().join("alrik.png");
    image::RgbImage::from_pixel(4, 6, image::Rgb([180, 40, 40]))
        .save(&picture)
        .unwrap();

    let mut hero = sample_hero();
    hero.portrait = Some(picture);
    let built = build_document(&hero, &DocumentSettings::default(), &FontConfig::Builtin).unwrap();
    assert!(contains(&built.pdf, b"/Image"));
    assert!(built.report.skipped.is_empty());
}

#[test]
fn missing_portrait_falls_back_to_placeholder() {
    let mut hero = sample_hero();
    hero.portrait = Some("/nonexistent/alrik.png".into());
    let built = build_document(&hero, &DocumentSettings::default(), &FontConfig::Builtin).unwrap();
    assert!(!contains(&built.pdf, b"/Image"));
    assert!(built.report.skipped.is_empty());
}

#[test]
fn missing_font_file_aborts_before_layout() {
    let fonts = FontConfig::TrueType {
        regular: "/nonexistent/regular.ttf".into(),
        bold: "/nonexistent/bold.ttf".into(),
    };
    let result = build_document(&Hero::default(), &DocumentSettings::default(), &fonts);
    assert!(matches!(result, Err(Error::Font(_))));
}

#[test]
fn hero_file_is_converted_to_a_pdf_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("alrik.xml");
    let settings_path = dir.path().join("settings.json");
    let output = dir.path().join("alrik.pdf");
    std::fs::write(&input, SAMPLE_HERO).unwrap();
    std::fs::write(
        &settings_path,
        json!({ "sheets": { "talents": { "sections": { "Gifts": { "visible": true } } } } })
            .to_string(),
    )
    .unwrap();

    let built = convert_hero_to_pdf(&input, Some(&settings_path), &output, &FontConfig::Builtin)
        .unwrap();
    let written = std::fs::read(&output).unwrap();
    assert_eq!(written, built.pdf);
    assert!(written.starts_with(b"%PDF-"));
    let talents = built.settings.sheet(SheetKind::Talents);
    assert_eq!(talents.names()[0], "Gifts");
    assert!(talents.section("Gifts").unwrap().visible);
}
