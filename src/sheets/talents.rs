use crate::error::SkipReason;
use crate::hero::Hero;
use crate::model::Cell;
use crate::settings::{SectionEntry, SectionOptions};

use super::{Placement, list_table};

pub(super) fn section(hero: &Hero, entry: &SectionEntry) -> Result<Placement, SkipReason> {
    if !entry.kind.is_talent_group() {
        return Err(SkipReason::MissingData(format!(
            "{} is not a talent group",
            entry.name
        )));
    }
    let (show_checks, show_specializations) = match entry.options {
        SectionOptions::Talents {
            show_checks,
            show_specializations,
        } => (show_checks, show_specializations),
        _ => (true, true),
    };

    let mut columns = vec![110.0];
    let mut headers = vec![entry.name.as_str()];
    if show_checks {
        columns.push(65.0);
        headers.push("Check");
    }
    columns.push(25.0);
    headers.push("TaW");
    if show_specializations {
        columns.push(120.0);
        headers.push("Specializations");
    }

    let rows = hero
        .talents_in(entry.kind.name())
        .map(|t| {
            let mut cells = vec![Cell::text(&t.name)];
            if show_checks {
                cells.push(Cell::text(&t.probe));
            }
            cells.push(Cell::number(t.value));
            if show_specializations {
                cells.push(Cell::text(t.specializations.join(", ")));
            }
            cells
        })
        .collect();

    Ok(Placement::Group(vec![list_table(
        &columns,
        &headers,
        rows,
        entry.filler_rows,
    )]))
}
