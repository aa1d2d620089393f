#![allow(dead_code)]

use herosheet_pdf::layout::{
    Frame, LayoutContext, PageGeometry, PageHeader, Rendered, Surface, plan_rows,
};
use herosheet_pdf::{Cell, CellContent, Hero, Illustration, Orientation, SkipReason, Table, TableRow};

/// Height of a row holding only text or empty cells.
pub const LINE: f32 = 5.0;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn row_height(row: &TableRow) -> f32 {
    row.cells
        .iter()
        .map(|c| match &c.content {
            CellContent::Table(inner) => measure(inner),
            CellContent::Illustration(ill) => ill.height,
            _ => LINE,
        })
        .fold(row.min_height, f32::max)
}

fn measure(table: &Table) -> f32 {
    table.rows.iter().map(row_height).sum()
}

fn label(table: &Table) -> Option<String> {
    let cell = table.rows.first()?.cells.first()?;
    match &cell.content {
        CellContent::Text(text) => Some(text.clone()),
        CellContent::Table(inner) => label(inner),
        _ => None,
    }
}

/// One `render` call as the fake surface saw it.
#[derive(Clone, Debug)]
pub struct Drawn {
    pub page: usize,
    pub label: Option<String>,
    pub top: f32,
    pub bottom: f32,
    pub rows: Vec<usize>,
    pub table: Table,
}

impl Drawn {
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }
}

/// Surface with fixed row heights: a row is as tall as its `min_height`,
/// its tallest nested table or illustration, and at least [`LINE`].
/// Width never matters.
#[derive(Default)]
pub struct FakeSurface {
    pub pages: Vec<Orientation>,
    pub bookmarks: Vec<(String, usize)>,
    pub drawn: Vec<Drawn>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drawn_on(&self, page: usize) -> Vec<&Drawn> {
        self.drawn.iter().filter(|d| d.page == page).collect()
    }

    pub fn labelled(&self, text: &str) -> Vec<&Drawn> {
        self.drawn
            .iter()
            .filter(|d| d.label.as_deref() == Some(text))
            .collect()
    }
}

impl Surface for FakeSurface {
    fn add_page(&mut self, orientation: Orientation) {
        self.pages.push(orientation);
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_orientation(&self) -> Option<Orientation> {
        self.pages.last().copied()
    }

    fn add_bookmark(&mut self, title: &str) {
        self.bookmarks
            .push((title.to_string(), self.pages.len().saturating_sub(1)));
    }

    fn measure_height(&self, table: &Table, _width: f32) -> f32 {
        measure(table)
    }

    fn render(&mut self, table: &Table, frame: &Frame) -> Rendered {
        let heights: Vec<f32> = table.rows.iter().map(row_height).collect();
        let plan = plan_rows(
            &heights,
            table.header_rows,
            frame.first_row,
            frame.top - frame.bottom_margin,
        );
        let bottom = frame.top - plan.height;
        if !plan.rows.is_empty() {
            self.drawn.push(Drawn {
                page: self.pages.len().saturating_sub(1),
                label: label(table),
                top: frame.top,
                bottom,
                rows: plan.rows,
                table: table.clone(),
            });
        }
        Rendered {
            bottom,
            next_row: plan.next_row,
        }
    }
}

pub fn context<'h>() -> LayoutContext<'h, FakeSurface> {
    init_logging();
    LayoutContext::new(FakeSurface::new(), PageGeometry::a4())
}

/// A block exactly `height` points tall on the fake surface.
pub fn block(height: f32) -> Table {
    let mut table = Table::new(&[100.0]);
    table.rows.push(TableRow {
        cells: vec![Cell::empty()],
        min_height: height,
    });
    table
}

pub fn labelled_block(text: &str, height: f32) -> Table {
    let mut table = Table::new(&[100.0]);
    table.rows.push(TableRow {
        cells: vec![Cell::text(text)],
        min_height: height,
    });
    table
}

/// A block whose natural width is `width`.
pub fn group_of_width(width: f32) -> Table {
    block(20.0).with_min_width(width)
}

pub fn illustrated_block(height: f32) -> Table {
    let mut table = Table::new(&[100.0]);
    table.row(vec![Cell::illustration(Illustration::placeholder(50.0, height))]);
    table
}

/// Height of the first illustration found in `table`.
pub fn illustration_height(table: &Table) -> Option<f32> {
    table.rows.iter().flat_map(|r| r.cells.iter()).find_map(|c| match &c.content {
        CellContent::Illustration(ill) => Some(ill.height),
        CellContent::Table(inner) => illustration_height(inner),
        _ => None,
    })
}

/// Page header drawing one row of `height` labelled "header".
pub struct FixedHeader(pub f32);

impl PageHeader for FixedHeader {
    fn page_header(&self, _sheet_title: &str, _width: f32) -> Result<Table, SkipReason> {
        Ok(labelled_block("header", self.0))
    }
}

pub struct FailingHeader;

impl PageHeader for FailingHeader {
    fn page_header(&self, _sheet_title: &str, _width: f32) -> Result<Table, SkipReason> {
        Err(SkipReason::MissingData("no title".into()))
    }
}

pub const SAMPLE_HERO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<hero name="Alrik Sturmfels" date="2026-03-14" magical="true" blessed="false">
  <basics>
    <entry label="Race" value="Human"/>
    <entry label="Culture" value="Middenrealm"/>
    <entry label="Profession" value="Mercenary mage"/>
  </basics>
  <attributes>
    <attribute short="MU" name="Courage" value="14"/>
    <attribute short="KL" name="Cleverness" value="13"/>
    <attribute short="IN" name="Intuition" value="12"/>
    <attribute short="CH" name="Charisma" value="11"/>
    <attribute short="FF" name="Dexterity" value="12"/>
    <attribute short="GE" name="Agility" value="13"/>
    <attribute short="KO" name="Constitution" value="13"/>
    <attribute short="KK" name="Strength" value="14"/>
  </attributes>
  <energies>
    <energy short="LE" name="Life" value="32"/>
    <energy short="AU" name="Endurance" value="30"/>
    <energy short="AE" name="Astral energy" value="28"/>
  </energies>
  <advantages>
    <trait name="Astral power" value="3"/>
    <trait name="Good memory"/>
  </advantages>
  <disadvantages>
    <trait name="Curiosity" value="6"/>
  </disadvantages>
  <specialabilities>
    <trait name="Tradition (Guild mage)"/>
  </specialabilities>
  <combatabilities>
    <trait name="Shield fighting I"/>
  </combatabilities>
  <talents>
    <talent group="Combat" name="Swords" probe="MU/GE/KK" value="7">
      <specialization name="Longsword"/>
    </talent>
    <talent group="Body" name="Climbing" probe="MU/GE/KK" value="3"/>
    <talent group="Knowledge" name="Magical lore" probe="KL/KL/IN" value="9"/>
    <talent group="Languages" name="Garethi" probe="KL/IN/CH" value="12"/>
  </talents>
  <melee>
    <weapon name="Longsword" talent="Swords" damage="1W+4" at="14" pa="12" reach="N"/>
  </melee>
  <ranged>
    <weapon name="Light crossbow" talent="Crossbows" damage="1W+6" fk="13" range="10/50/100" ammunition="20"/>
  </ranged>
  <armor>
    <piece name="Leather armor" protection="3" encumbrance="3"/>
  </armor>
  <shields>
    <shield name="Wooden shield" at="-1" pa="3"/>
  </shields>
  <spells>
    <spell name="Ignifaxius" probe="MU/KL/KO" value="8" representation="Mag" cost="2W6"/>
    <spell name="Balsam" probe="KL/IN/CH" value="6" representation="Mag" cost="7"/>
  </spells>
  <inventory>
    <container name="Backpack">
      <item name="Rope" count="1" weight="1.5"/>
      <item name="Torch" count="3" weight="0.5"/>
    </container>
    <container name="Belt pouch">
      <item name="Flint" weight="0.1"/>
    </container>
  </inventory>
  <money ducats="2" silver="15" heller="7" kreuzer="0"/>
  <animals>
    <animal name="Brandir" species="Horse" notes="Shy of fire"/>
  </animals>
</hero>
"#;

pub fn sample_hero() -> Hero {
    Hero::from_xml(SAMPLE_HERO).expect("sample hero parses")
}
