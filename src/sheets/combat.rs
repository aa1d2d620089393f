use crate::error::SkipReason;
use crate::hero::Hero;
use crate::model::{Alignment, Cell, Fill, Table};
use crate::settings::{SectionEntry, SectionKind, SectionOptions};

use super::{Placement, list_table};

/// Base values strip painted below the page header of every combat page.
pub(super) fn summary(hero: &Hero, width: f32) -> Option<Table> {
    let values = [
        ("AT base", hero.at_base()),
        ("PA base", hero.pa_base()),
        ("FK base", hero.fk_base()),
        ("LE", hero.energy("LE")),
        ("AU", hero.energy("AU")),
    ];
    if values.iter().all(|(_, v)| v.is_none()) {
        return None;
    }
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
            .map(|(_, v)| match v {
                Some(v) => Cell::number(*v),
                None => Cell::empty(),
            })
            .collect(),
    );
    Some(strip)
}

pub(super) fn section(hero: &Hero, entry: &SectionEntry) -> Result<Placement, SkipReason> {
    let filler = entry.filler_rows;
    let placement = match entry.kind {
        SectionKind::Melee => {
            let rows = hero
                .melee
                .iter()
                .map(|w| {
                    vec![
                        Cell::text(&w.name),
                        Cell::text(&w.talent),
                        Cell::text(&w.damage).align(Alignment::Center),
                        Cell::number(w.at),
                        Cell::number(w.pa),
                        Cell::text(&w.reach).align(Alignment::Center),
                        Cell::empty(),
                    ]
                })
                .collect();
            Placement::Group(vec![list_table(
                &[130.0, 110.0, 60.0, 30.0, 30.0, 50.0, 160.0],
                &["Melee weapon", "Talent", "TP", "AT", "PA", "Reach", "Notes"],
                rows,
                filler,
            )])
        }
        SectionKind::Ranged => {
            let show_ammunition = match entry.options {
                SectionOptions::Ranged { show_ammunition } => show_ammunition,
                _ => true,
            };
            let mut columns = vec![130.0, 110.0, 60.0, 30.0, 70.0];
            let mut headers = vec!["Ranged weapon", "Talent", "TP", "FK", "Range"];
            if show_ammunition {
                columns.push(60.0);
                headers.push("Ammunition");
            }
            columns.push(100.0);
            headers.push("Notes");
            let rows = hero
                .ranged
                .iter()
                .map(|w| {
                    let mut cells = vec![
                        Cell::text(&w.name),
                        Cell::text(&w.talent),
                        Cell::text(&w.damage).align(Alignment::Center),
                        Cell::number(w.fk),
                        Cell::text(&w.range).align(Alignment::Center),
                    ];
                    if show_ammunition {
                        cells.push(match w.ammunition {
                            Some(n) => Cell::text(n.to_string()).align(Alignment::Center),
                            None => Cell::empty(),
                        });
                    }
                    cells.push(Cell::empty());
                    cells
                })
                .collect();
            Placement::Group(vec![list_table(&columns, &headers, rows, filler)])
        }
        SectionKind::Armor => {
            let rows = hero
                .armor
                .iter()
                .map(|a| vec![Cell::text(&a.name), Cell::number(a.protection), Cell::number(a.encumbrance)])
                .collect();
            Placement::Side(list_table(&[120.0, 40.0, 40.0], &["Armor", "RS", "BE"], rows, filler))
        }
        SectionKind::Shields => {
            let rows = hero
                .shields
                .iter()
                .map(|s| vec![Cell::text(&s.name), Cell::number(s.at_mod), Cell::number(s.pa_mod)])
                .collect();
            Placement::Side(list_table(
                &[120.0, 40.0, 40.0],
                &["Shield / parry weapon", "AT", "PA"],
                rows,
                filler,
            ))
        }
        SectionKind::CombatAbilities => {
            let rows = hero
                .combat_abilities
                .iter()
                .map(|t| vec![Cell::text(&t.name), Cell::text(t.value.clone().unwrap_or_default())])
                .collect();
            Placement::Group(vec![list_table(
                &[200.0, 80.0],
                &["Combat ability", "Notes"],
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
