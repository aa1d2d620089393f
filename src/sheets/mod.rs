mod combat;
mod equipment;
mod front;
mod magic;
mod talents;

use crate::error::SkipReason;
use crate::hero::Hero;
use crate::layout::{
    BuildReport, LayoutContext, OrientationSwitcher, PageGeometry, PageHeader, SheetStart,
    Surface, SummaryBuilder,
};
use crate::model::{Alignment, Border, Cell, Fill, Role, Table};
use crate::settings::{
    DocumentSettings, HeaderSettings, SectionEntry, SectionVisibilityResolver, SheetKind,
    SheetSettings,
};

/// How a formatted section enters the page.
pub enum Placement {
    /// Small block packed into the two-column balancer.
    Block(Role, Table),
    /// Full-width group; its width decides the page orientation.
    Group(Vec<Table>),
    /// Joins adjacent `Side` placements into one side-by-side group.
    Side(Table),
}

/// Title row painted at the top of every page, with the hero's name, date
/// and attribute strip as configured.
pub struct HeroHeader<'a> {
    hero: &'a Hero,
    settings: HeaderSettings,
}

impl<'a> HeroHeader<'a> {
    pub fn new(hero: &'a Hero, settings: HeaderSettings) -> Self {
        Self { hero, settings }
    }

    fn attribute_strip(&self) -> Result<Table, SkipReason> {
        if self.hero.attributes.is_empty() {
            return Err(SkipReason::MissingData(
                "attribute strip requested but the hero has no attributes".into(),
            ));
        }
        let columns = vec![30.0; self.hero.attributes.len()];
        let mut strip = Table::new(&columns).with_fill(Fill::None);
        strip.header(
            self.hero
                .attributes
                .iter()
                .map(|a| Cell::text(&a.short).align(Alignment::Center))
                .collect(),
        );
        strip.row(self.hero.attributes.iter().map(|a| Cell::number(a.value)).collect());
        Ok(strip)
    }
}

impl PageHeader for HeroHeader<'_> {
    fn page_header(&self, sheet_title: &str, width: f32) -> Result<Table, SkipReason> {
        let name = if self.settings.show_name { self.hero.name.as_str() } else { "" };
        let date = if self.settings.show_date { self.hero.date.as_str() } else { "" };

        let mut header = Table::new(&[width * 0.45, width * 0.35, width * 0.2])
            .with_fill(Fill::None)
            .with_border(Border::None)
            .with_font_size(11.0)
            .with_min_width(width);
        header.row(vec![
            Cell::text(sheet_title).bold(),
            Cell::text(name),
            Cell::text(date).align(Alignment::Right),
        ]);
        if self.settings.show_attributes {
            header.row(vec![Cell::table(self.attribute_strip()?).span(3)]);
        }
        Ok(header)
    }
}

/// A list table: one header row, the given rows, then `filler` blank rows.
pub(crate) fn list_table(columns: &[f32], headers: &[&str], rows: Vec<Vec<Cell>>, filler: u32) -> Table {
    let mut table = Table::new(columns);
    table.header(headers.iter().map(|h| Cell::text(*h)).collect());
    for row in rows {
        table.row(row);
    }
    table.filler_rows(filler);
    table
}

fn format_section(sheet: SheetKind, hero: &Hero, entry: &SectionEntry) -> Result<Placement, SkipReason> {
    match sheet {
        SheetKind::Front => front::section(hero, entry),
        SheetKind::Talents => talents::section(hero, entry),
        SheetKind::Combat => combat::section(hero, entry),
        SheetKind::Magic => magic::section(hero, entry),
        SheetKind::Equipment => equipment::section(hero, entry),
    }
}

fn summary<'h>(sheet: SheetKind, hero: &'h Hero) -> Option<SummaryBuilder<'h>> {
    match sheet {
        SheetKind::Combat => Some(Box::new(move |width| combat::summary(hero, width))),
        SheetKind::Magic => Some(Box::new(move |width| magic::summary(hero, width))),
        _ => None,
    }
}

/// Formatted sections of a sheet with adjacent `Side` placements merged
/// into groups. Sections that fail to format are recorded and left out.
fn formatted_sections<S: Surface>(
    ctx: &mut LayoutContext<'_, S>,
    hero: &Hero,
    sheet: SheetKind,
    entries: &[SectionEntry],
) -> Vec<(String, Placement)> {
    let mut out: Vec<(String, Placement)> = Vec::new();
    let mut side: Option<(String, Vec<Table>)> = None;

    for entry in entries {
        match format_section(sheet, hero, entry) {
            Ok(Placement::Side(table)) => match side.as_mut() {
                Some((name, tables)) => {
                    name.push_str(" + ");
                    name.push_str(&entry.name);
                    tables.push(table);
                }
                None => side = Some((entry.name.clone(), vec![table])),
            },
            Ok(placement) => {
                if let Some((name, tables)) = side.take() {
                    out.push((name, Placement::Group(tables)));
                }
                out.push((entry.name.clone(), placement));
            }
            Err(reason) => ctx.record_skip(sheet.title(), &entry.name, reason),
        }
    }
    if let Some((name, tables)) = side {
        out.push((name, Placement::Group(tables)));
    }
    out
}

fn place_group<S: Surface>(
    ctx: &mut LayoutContext<'_, S>,
    switcher: &OrientationSwitcher,
    tables: Vec<Table>,
) -> Result<(), SkipReason> {
    switcher.prepare(ctx, OrientationSwitcher::group_width(&tables));
    ctx.place_group(tables).map(|_| ())
}

fn render_sheet<'h, S: Surface>(
    ctx: &mut LayoutContext<'h, S>,
    switcher: &OrientationSwitcher,
    resolver: &SectionVisibilityResolver<'_>,
    hero: &'h Hero,
    settings: &mut SheetSettings,
) {
    let kind = settings.kind;
    let entries = resolver.resolve(settings);
    if kind == SheetKind::Magic && entries.is_empty() {
        log::debug!("no magic sections for {}, sheet left out", hero.name);
        return;
    }

    let sections = formatted_sections(ctx, hero, kind, &entries);
    let first_group = sections.iter().find_map(|(_, p)| match p {
        Placement::Group(tables) => Some(OrientationSwitcher::group_width(tables)),
        _ => None,
    });
    let orientation = switcher.initial(first_group);

    let mut start = SheetStart::new(ctx, kind.title(), orientation)
        .force_separate_page(settings.force_separate_page);
    if let Some(builder) = summary(kind, hero) {
        start = start.summary(builder);
    }
    ctx.start_sheet(start);

    for (name, placement) in sections {
        let placed = match placement {
            Placement::Block(role, table) => ctx.add_block(role, table),
            Placement::Group(tables) => place_group(ctx, switcher, tables),
            Placement::Side(table) => place_group(ctx, switcher, vec![table]),
        };
        if let Err(reason) = placed {
            ctx.record_skip(kind.title(), &name, reason);
        }
    }

    if let Err(reason) = ctx.end_sheet(settings.insert_blank_page) {
        ctx.record_skip(kind.title(), "columns", reason);
    }
}

/// Lays out every sheet of the document for `hero`. Sections discovered on
/// the hero are merged into `settings`.
pub fn render_document<S: Surface>(
    surface: S,
    geometry: PageGeometry,
    hero: &Hero,
    settings: &mut DocumentSettings,
) -> (S, BuildReport) {
    let header = HeroHeader::new(hero, settings.header.clone());
    let switcher = OrientationSwitcher::new(geometry);
    let resolver = SectionVisibilityResolver::new(Some(hero));
    let mut ctx = LayoutContext::new(surface, geometry).with_header(&header);

    for kind in SheetKind::ALL {
        render_sheet(&mut ctx, &switcher, &resolver, hero, settings.sheet_mut(kind));
    }
    ctx.into_parts()
}
