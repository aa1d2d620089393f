use crate::error::SkipReason;
use crate::hero::Hero;
use crate::model::{Alignment, Cell, Role};
use crate::settings::{SectionEntry, SectionKind, SectionOptions};

use super::{Placement, list_table};

pub(super) fn section(hero: &Hero, entry: &SectionEntry) -> Result<Placement, SkipReason> {
    let filler = entry.filler_rows;
    let table = match (&entry.kind, &entry.options) {
        (SectionKind::Inventory, SectionOptions::Inventory { container }) => {
            let Some(found) = hero.containers.iter().find(|c| &c.name == container) else {
                return Err(SkipReason::MissingData(format!("no container named {container}")));
            };
            let rows = found
                .items
                .iter()
                .map(|item| {
                    vec![
                        Cell::text(&item.name),
                        Cell::text(item.count.to_string()).align(Alignment::Center),
                        Cell::text(format!("{:.1}", item.weight)).align(Alignment::Right),
                    ]
                })
                .collect();
            list_table(&[150.0, 35.0, 45.0], &[entry.name.as_str(), "Count", "Weight"], rows, filler)
        }
        (SectionKind::Money, _) => {
            let m = &hero.money;
            let rows = [
                ("Ducats", m.ducats),
                ("Silver", m.silver),
                ("Heller", m.heller),
                ("Kreuzer", m.kreuzer),
            ]
            .into_iter()
            .map(|(label, v)| vec![Cell::text(label), Cell::number(v)])
            .collect();
            list_table(&[80.0, 60.0], &["Money", ""], rows, filler)
        }
        (SectionKind::Animals, _) => {
            let rows = hero
                .animals
                .iter()
                .map(|a| vec![Cell::text(&a.name), Cell::text(&a.species), Cell::text(&a.notes)])
                .collect();
            list_table(&[90.0, 90.0, 140.0], &["Animal", "Species", "Notes"], rows, filler)
        }
        (other, _) => {
            return Err(SkipReason::MissingData(format!(
                "{} is not a section of this sheet",
                other.name()
            )));
        }
    };
    Ok(Placement::Block(Role::Either, table))
}
