use crate::error::SkipReason;
use crate::hero::{Hero, Spell};
use crate::model::{Alignment, Cell, Fill, Table};
use crate::settings::{SectionEntry, SectionKind, SectionOptions};

use super::{Placement, list_table};

pub(super) fn summary(hero: &Hero, width: f32) -> Option<Table> {
    let mut values = Vec::new();
    if hero.magical {
        values.push(("AE", hero.energy("AE")));
    }
    if hero.blessed {
        values.push(("KE", hero.energy("KE")));
    }
    values.push(("MR", hero.magic_resistance()));

    let column = width / values.len() as f32;
    let mut strip = Table::new(&vec![column; values.len()])
        .with_fill(Fill::None)
        .with_min_width(width);
    strip.header(
        values
            .iter()
            .map(|(label, _)| Cell::text(*label).align(Alignment::Center))
            .collect(),
    );
    strip.row(
        values
            .iter()
            .map(|(_, v)| v.map_or_else(Cell::empty, Cell::number))
            .collect(),
    );
    Some(strip)
}

fn spell_table(title: &str, spells: &[Spell], show_representation: bool, filler: u32) -> Table {
    let mut columns = vec![140.0, 80.0, 30.0, 60.0];
    let mut headers = vec![title, "Check", "ZfW", "Cost"];
    if show_representation {
        columns.push(60.0);
        headers.push("Repr.");
    }
    columns.push(150.0);
    headers.push("Notes");

    let rows = spells
        .iter()
        .map(|s| {
            let mut cells = vec![
                Cell::text(&s.name),
                Cell::text(&s.probe),
                Cell::number(s.value),
                Cell::text(&s.cost),
            ];
            if show_representation {
                cells.push(Cell::text(&s.representation).align(Alignment::Center));
            }
            cells.push(Cell::empty());
            cells
        })
        .collect();
    list_table(&columns, &headers, rows, filler)
}

pub(super) fn section(hero: &Hero, entry: &SectionEntry) -> Result<Placement, SkipReason> {
    let show_representation = match entry.options {
        SectionOptions::Spells {
            show_representation,
        } => show_representation,
        _ => true,
    };
    let spells = match entry.kind {
        SectionKind::Spells => &hero.spells,
        SectionKind::Rituals => &hero.rituals,
        SectionKind::Liturgies => &hero.liturgies,
        other => {
            return Err(SkipReason::MissingData(format!(
                "{} is not a section of this sheet",
                other.name()
            )));
        }
    };
    Ok(Placement::Group(vec![spell_table(
        &entry.name,
        spells,
        show_representation,
        entry.filler_rows,
    )]))
}
