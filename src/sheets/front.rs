use crate::error::SkipReason;
use crate::hero::{Hero, Trait};
use crate::model::{Alignment, Cell, Fill, Illustration, Role, Table};
use crate::pdf::load_illustration;
use crate::settings::{SectionEntry, SectionKind};

use super::{Placement, list_table};

const PORTRAIT_WIDTH: f32 = 110.0;
const PORTRAIT_HEIGHT: f32 = 140.0;

fn portrait(hero: &Hero) -> Table {
    let illustration = match &hero.portrait {
        Some(path) => load_illustration(path, PORTRAIT_WIDTH, PORTRAIT_HEIGHT),
        None => Illustration::placeholder(PORTRAIT_WIDTH, PORTRAIT_HEIGHT),
    };
    let mut table = Table::new(&[PORTRAIT_WIDTH + 10.0]).with_fill(Fill::None);
    table.row(vec![Cell::illustration(illustration)]);
    table
}

fn traits(title: &str, items: &[Trait], filler: u32) -> Table {
    let rows = items
        .iter()
        .map(|t| {
            vec![
                Cell::text(&t.name),
                Cell::text(t.value.clone().unwrap_or_default()).align(Alignment::Center),
            ]
        })
        .collect();
    list_table(&[140.0, 60.0], &[title, "Value"], rows, filler)
}

pub(super) fn section(hero: &Hero, entry: &SectionEntry) -> Result<Placement, SkipReason> {
    let filler = entry.filler_rows;
    let placement = match entry.kind {
        SectionKind::Portrait => Placement::Block(Role::Left, portrait(hero)),
        SectionKind::Basics => {
            if hero.basics.is_empty() {
                return Err(SkipReason::MissingData("no basic data".into()));
            }
            let rows = hero
                .basics
                .iter()
                .map(|(label, value)| vec![Cell::text(label).bold(), Cell::text(value)])
                .collect();
            let mut table = list_table(&[90.0, 150.0], &["Basics", ""], rows, filler);
            table.fill = Fill::None;
            Placement::Block(Role::Right, table)
        }
        SectionKind::Attributes => {
            if hero.attributes.is_empty() {
                return Err(SkipReason::MissingData("no attributes".into()));
            }
            let rows = hero
                .attributes
                .iter()
                .map(|a| vec![Cell::text(&a.name), Cell::text(&a.short), Cell::number(a.value)])
                .collect();
            Placement::Block(
                Role::Left,
                list_table(&[80.0, 30.0, 30.0], &["Attribute", "", "Value"], rows, filler),
            )
        }
        SectionKind::Energies => {
            if hero.energies.is_empty() {
                return Err(SkipReason::MissingData("no energies".into()));
            }
            let rows = hero
                .energies
                .iter()
                .map(|e| {
                    vec![
                        Cell::text(&e.name),
                        Cell::text(&e.short),
                        Cell::number(e.value),
                        Cell::empty(),
                    ]
                })
                .collect();
            Placement::Block(
                Role::Right,
                list_table(
                    &[100.0, 30.0, 40.0, 60.0],
                    &["Energy", "", "Max", "Current"],
                    rows,
                    filler,
                ),
            )
        }
        SectionKind::Advantages => {
            Placement::Block(Role::Either, traits("Advantages", &hero.advantages, filler))
        }
        SectionKind::Disadvantages => {
            Placement::Block(Role::Either, traits("Disadvantages", &hero.disadvantages, filler))
        }
        SectionKind::SpecialAbilities => {
            let rows = hero
                .special_abilities
                .iter()
                .map(|t| vec![Cell::text(&t.name), Cell::text(t.value.clone().unwrap_or_default())])
                .collect();
            Placement::Group(vec![list_table(
                &[260.0, 200.0],
                &["Special ability", "Notes"],
                rows,
                filler,
            )])
        }
        other => {
            return Err(SkipReason::MissingData(format!(
                "{} is not a section of this sheet",
                other.name()
            )));
        }
    };
    Ok(placement)
}
