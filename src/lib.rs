mod error;
mod fonts;
mod hero;
mod model;
mod pdf;

pub mod layout;
pub mod settings;
pub mod sheets;

pub use error::{Error, SkipReason};
pub use fonts::FontConfig;
pub use hero::{
    Animal, Armor, Attribute, Container, Energy, Hero, Item, MeleeWeapon, Money, RangedWeapon,
    Shield, Spell, Talent, Trait,
};
pub use layout::{BuildReport, PageGeometry};
pub use model::{
    Alignment, Border, Cell, CellContent, Fill, HEADER_SHADING, Illustration, ImageData,
    ImageFormat, Orientation, Role, Table, TableRow,
};
pub use pdf::{PdfSurface, load_illustration};
pub use settings::DocumentSettings;

use std::path::Path;
use std::time::Instant;

/// A finished document with what the build did and the settings it used,
/// including sections discovered on the hero.
pub struct BuiltDocument {
    pub pdf: Vec<u8>,
    pub report: BuildReport,
    pub settings: DocumentSettings,
}

/// Lays out every sheet for `hero` on A4 pages and writes the PDF. Fails
/// only when the fonts cannot be loaded or the file cannot be written;
/// broken sections are left out and listed in the report.
pub fn build_document(
    hero: &Hero,
    settings: &DocumentSettings,
    fonts: &FontConfig,
) -> Result<BuiltDocument, Error> {
    let t0 = Instant::now();
    let geometry = PageGeometry::a4();
    let surface = PdfSurface::new(fonts, geometry)?;
    let t_fonts = t0.elapsed();

    let mut settings = settings.clone();
    let (surface, report) = sheets::render_document(surface, geometry, hero, &mut settings);
    let t_layout = t0.elapsed();

    let pdf = surface.finish()?;
    let t_write = t0.elapsed();

    log::info!(
        "Build: fonts={:.1}ms, layout={:.1}ms, write={:.1}ms ({} pages, {} skipped)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_layout - t_fonts).as_secs_f64() * 1000.0,
        (t_write - t_layout).as_secs_f64() * 1000.0,
        report.pages.len(),
        report.skipped.len(),
    );

    Ok(BuiltDocument {
        pdf,
        report,
        settings,
    })
}

/// Reads a hero file (and optionally a settings file), builds the document
/// and writes it to `output`.
pub fn convert_hero_to_pdf(
    input: &Path,
    settings: Option<&Path>,
    output: &Path,
    fonts: &FontConfig,
) -> Result<BuiltDocument, Error> {
    let t0 = Instant::now();

    let hero = Hero::load(input)?;
    let settings = match settings {
        Some(path) => DocumentSettings::load(path)?,
        None => DocumentSettings::default(),
    };
    let t_load = t0.elapsed();

    let built = build_document(&hero, &settings, fonts)?;
    let t_build = t0.elapsed();

    std::fs::write(output, &built.pdf).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: load={:.1}ms, layout+render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_load.as_secs_f64() * 1000.0,
        (t_build - t_load).as_secs_f64() * 1000.0,
        (t_total - t_build).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        built.pdf.len(),
    );

    Ok(built)
}
