mod resolver;

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;

pub use resolver::SectionVisibilityResolver;

/// The sheets of a document, in rendering order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SheetKind {
    Front,
    Talents,
    Combat,
    Magic,
    Equipment,
}

impl SheetKind {
    pub const ALL: [SheetKind; 5] = [
        SheetKind::Front,
        SheetKind::Talents,
        SheetKind::Combat,
        SheetKind::Magic,
        SheetKind::Equipment,
    ];

    /// Key of the sheet in the settings file.
    pub fn key(self) -> &'static str {
        match self {
            SheetKind::Front => "front",
            SheetKind::Talents => "talents",
            SheetKind::Combat => "combat",
            SheetKind::Magic => "magic",
            SheetKind::Equipment => "equipment",
        }
    }

    /// Display name, used for page headers and bookmarks.
    pub fn title(self) -> &'static str {
        match self {
            SheetKind::Front => "Character",
            SheetKind::Talents => "Talents",
            SheetKind::Combat => "Combat",
            SheetKind::Magic => "Magic",
            SheetKind::Equipment => "Equipment",
        }
    }

    pub fn default_force_separate_page(self) -> bool {
        !matches!(self, SheetKind::Equipment)
    }

    /// Sections every hero has, in their natural order.
    pub fn fixed_sections(self) -> &'static [SectionKind] {
        use SectionKind::*;
        match self {
            SheetKind::Front => &[
                Portrait,
                Basics,
                Attributes,
                Energies,
                Advantages,
                Disadvantages,
                SpecialAbilities,
            ],
            SheetKind::Talents => &[
                CombatTalents,
                BodyTalents,
                SocialTalents,
                NatureTalents,
                KnowledgeTalents,
                Languages,
                Crafts,
                Gifts,
            ],
            SheetKind::Combat => &[Melee, Ranged, Armor, Shields, CombatAbilities],
            SheetKind::Magic => &[Spells, Rituals, Liturgies],
            SheetKind::Equipment => &[Money, Animals],
        }
    }
}

/// Capability a hero needs before a section is offered at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    Magical,
    Blessed,
}

pub const INVENTORY_PREFIX: &str = "Inventory: ";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Portrait,
    Basics,
    Attributes,
    Energies,
    Advantages,
    Disadvantages,
    SpecialAbilities,
    CombatTalents,
    BodyTalents,
    SocialTalents,
    NatureTalents,
    KnowledgeTalents,
    Languages,
    Crafts,
    Gifts,
    Melee,
    Ranged,
    Armor,
    Shields,
    CombatAbilities,
    Spells,
    Rituals,
    Liturgies,
    /// One per named container of the hero; the section name carries the
    /// container name after [`INVENTORY_PREFIX`].
    Inventory,
    Money,
    Animals,
}

impl SectionKind {
    /// Section name of the fixed kinds. Inventories are named per container.
    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Portrait => "Portrait",
            SectionKind::Basics => "Basics",
            SectionKind::Attributes => "Attributes",
            SectionKind::Energies => "Energies",
            SectionKind::Advantages => "Advantages",
            SectionKind::Disadvantages => "Disadvantages",
            SectionKind::SpecialAbilities => "Special abilities",
            SectionKind::CombatTalents => "Combat",
            SectionKind::BodyTalents => "Body",
            SectionKind::SocialTalents => "Social",
            SectionKind::NatureTalents => "Nature",
            SectionKind::KnowledgeTalents => "Knowledge",
            SectionKind::Languages => "Languages",
            SectionKind::Crafts => "Crafts",
            SectionKind::Gifts => "Gifts",
            SectionKind::Melee => "Melee",
            SectionKind::Ranged => "Ranged",
            SectionKind::Armor => "Armor",
            SectionKind::Shields => "Shields",
            SectionKind::CombatAbilities => "Combat abilities",
            SectionKind::Spells => "Spells",
            SectionKind::Rituals => "Rituals",
            SectionKind::Liturgies => "Liturgies",
            SectionKind::Inventory => "Inventory",
            SectionKind::Money => "Money",
            SectionKind::Animals => "Animals",
        }
    }

    /// Kind of the section called `name` on `sheet`, if it is one.
    pub fn from_name(sheet: SheetKind, name: &str) -> Option<SectionKind> {
        if sheet == SheetKind::Equipment && name.starts_with(INVENTORY_PREFIX) {
            return Some(SectionKind::Inventory);
        }
        sheet
            .fixed_sections()
            .iter()
            .copied()
            .find(|k| k.name() == name)
    }

    // Hidden-by-default kinds were chosen by hand; keep the list as is.
    pub fn default_visible(self) -> bool {
        !matches!(self, SectionKind::Gifts | SectionKind::Animals)
    }

    pub fn default_filler_rows(self) -> u32 {
        match self {
            SectionKind::Portrait
            | SectionKind::Basics
            | SectionKind::Attributes
            | SectionKind::Energies
            | SectionKind::Money => 0,
            SectionKind::Armor | SectionKind::Shields => 1,
            SectionKind::SpecialAbilities | SectionKind::Rituals | SectionKind::Liturgies => 3,
            SectionKind::Spells | SectionKind::Inventory => 5,
            _ => 2,
        }
    }

    pub fn capability(self) -> Option<Capability> {
        match self {
            SectionKind::Spells | SectionKind::Rituals => Some(Capability::Magical),
            SectionKind::Liturgies => Some(Capability::Blessed),
            _ => None,
        }
    }

    pub fn is_talent_group(self) -> bool {
        matches!(
            self,
            SectionKind::CombatTalents
                | SectionKind::BodyTalents
                | SectionKind::SocialTalents
                | SectionKind::NatureTalents
                | SectionKind::KnowledgeTalents
                | SectionKind::Languages
                | SectionKind::Crafts
                | SectionKind::Gifts
        )
    }
}

/// Kind-specific options of a section.
#[derive(Clone, Debug, PartialEq)]
pub enum SectionOptions {
    None,
    Talents {
        show_checks: bool,
        show_specializations: bool,
    },
    Ranged {
        show_ammunition: bool,
    },
    Spells {
        show_representation: bool,
    },
    Inventory {
        container: String,
    },
}

impl SectionOptions {
    pub fn defaults(kind: SectionKind, name: &str) -> SectionOptions {
        match kind {
            k if k.is_talent_group() => SectionOptions::Talents {
                show_checks: true,
                show_specializations: true,
            },
            SectionKind::Ranged => SectionOptions::Ranged {
                show_ammunition: true,
            },
            SectionKind::Spells | SectionKind::Rituals | SectionKind::Liturgies => {
                SectionOptions::Spells {
                    show_representation: true,
                }
            }
            SectionKind::Inventory => SectionOptions::Inventory {
                container: name
                    .strip_prefix(INVENTORY_PREFIX)
                    .unwrap_or(name)
                    .to_string(),
            },
            _ => SectionOptions::None,
        }
    }

    /// Option keys this variant reads and writes.
    fn keys(&self) -> &'static [&'static str] {
        match self {
            SectionOptions::None => &[],
            SectionOptions::Talents { .. } => &["showChecks", "showSpecializations"],
            SectionOptions::Ranged { .. } => &["showAmmunition"],
            SectionOptions::Spells { .. } => &["showRepresentation"],
            SectionOptions::Inventory { .. } => &["container"],
        }
    }

    fn read(&mut self, section: &str, obj: &Map<String, Value>) {
        match self {
            SectionOptions::None => {}
            SectionOptions::Talents {
                show_checks,
                show_specializations,
            } => {
                read_bool(section, obj, "showChecks", show_checks);
                read_bool(section, obj, "showSpecializations", show_specializations);
            }
            SectionOptions::Ranged { show_ammunition } => {
                read_bool(section, obj, "showAmmunition", show_ammunition);
            }
            SectionOptions::Spells {
                show_representation,
            } => {
                read_bool(section, obj, "showRepresentation", show_representation);
            }
            SectionOptions::Inventory { container } => match obj.get("container") {
                None => {}
                Some(Value::String(s)) if !s.is_empty() => *container = s.clone(),
                Some(other) => {
                    log::debug!("{section}: container {other} is not a name, using \"{container}\"")
                }
            },
        }
    }

    fn write(&self, obj: &mut Map<String, Value>) {
        match self {
            SectionOptions::None => {}
            SectionOptions::Talents {
                show_checks,
                show_specializations,
            } => {
                obj.insert("showChecks".into(), Value::Bool(*show_checks));
                obj.insert("showSpecializations".into(), Value::Bool(*show_specializations));
            }
            SectionOptions::Ranged { show_ammunition } => {
                obj.insert("showAmmunition".into(), Value::Bool(*show_ammunition));
            }
            SectionOptions::Spells {
                show_representation,
            } => {
                obj.insert("showRepresentation".into(), Value::Bool(*show_representation));
            }
            SectionOptions::Inventory { container } => {
                obj.insert("container".into(), Value::String(container.clone()));
            }
        }
    }
}

fn read_bool(section: &str, obj: &Map<String, Value>, key: &str, target: &mut bool) {
    match obj.get(key) {
        None => {}
        Some(Value::Bool(b)) => *target = *b,
        Some(other) => log::debug!("{section}: {key}={other} is not a boolean, using {target}"),
    }
}

fn read_count(section: &str, obj: &Map<String, Value>, key: &str, target: &mut u32) {
    match obj.get(key) {
        None => {}
        Some(v) => match v.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(n) => *target = n,
            None => log::debug!("{section}: {key}={v} is not a row count, using {target}"),
        },
    }
}

/// One configurable block of a sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionEntry {
    pub name: String,
    pub kind: SectionKind,
    pub visible: bool,
    pub order: usize,
    pub filler_rows: u32,
    pub options: SectionOptions,
    /// Keys this version does not know, written back unchanged.
    pub extra: Map<String, Value>,
}

impl SectionEntry {
    pub fn new(name: impl Into<String>, kind: SectionKind) -> Self {
        let name = name.into();
        Self {
            options: SectionOptions::defaults(kind, &name),
            visible: kind.default_visible(),
            order: 0,
            filler_rows: kind.default_filler_rows(),
            kind,
            name,
            extra: Map::new(),
        }
    }

    pub fn inventory(container: &str) -> Self {
        Self::new(format!("{INVENTORY_PREFIX}{container}"), SectionKind::Inventory)
    }

    /// Reads a persisted entry. Anything missing or malformed keeps its
    /// default.
    fn from_value(name: &str, kind: SectionKind, value: &Value) -> Self {
        let mut entry = Self::new(name, kind);
        let Some(obj) = value.as_object() else {
            log::debug!("section {name}: {value} is not an object, using defaults");
            return entry;
        };
        read_bool(name, obj, "visible", &mut entry.visible);
        read_count(name, obj, "fillerRows", &mut entry.filler_rows);
        entry.options.read(name, obj);
        let known = entry.options.keys();
        entry.extra = obj
            .iter()
            .filter(|(k, _)| k.as_str() != "visible" && k.as_str() != "fillerRows")
            .filter(|(k, _)| !known.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entry
    }

    fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("visible".into(), Value::Bool(self.visible));
        obj.insert("fillerRows".into(), Value::from(self.filler_rows));
        self.options.write(&mut obj);
        for (k, v) in &self.extra {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }
}

/// A persisted section this version does not recognise, written back
/// unchanged right after the section it followed when loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct UnknownSection {
    pub name: String,
    pub value: Value,
    pub after: Option<String>, // None: ahead of every known section
}

/// Settings of one sheet: page flags and the ordered section list.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetSettings {
    pub kind: SheetKind,
    pub force_separate_page: bool,
    pub insert_blank_page: bool,
    pub sections: Vec<SectionEntry>,
    pub unknown_sections: Vec<UnknownSection>,
    pub extra: Map<String, Value>,
}

impl SheetSettings {
    /// Settings with no persisted sections; the resolver fills in defaults.
    pub fn new(kind: SheetKind) -> Self {
        Self {
            kind,
            force_separate_page: kind.default_force_separate_page(),
            insert_blank_page: false,
            sections: Vec::new(),
            unknown_sections: Vec::new(),
            extra: Map::new(),
        }
    }

    fn from_value(kind: SheetKind, value: &Value) -> Self {
        let mut sheet = Self::new(kind);
        let Some(obj) = value.as_object() else {
            log::debug!("sheet {}: {value} is not an object, using defaults", kind.key());
            return sheet;
        };
        read_bool(kind.key(), obj, "forceSeparatePage", &mut sheet.force_separate_page);
        read_bool(kind.key(), obj, "insertBlankPage", &mut sheet.insert_blank_page);

        match obj.get("sections") {
            None => {}
            Some(Value::Object(sections)) => {
                let mut last_known: Option<&str> = None;
                for (name, v) in sections {
                    match SectionKind::from_name(kind, name) {
                        Some(section_kind) => {
                            sheet
                                .sections
                                .push(SectionEntry::from_value(name, section_kind, v));
                            last_known = Some(name.as_str());
                        }
                        None => {
                            log::debug!("sheet {}: unknown section {name} kept as is", kind.key());
                            sheet.unknown_sections.push(UnknownSection {
                                name: name.clone(),
                                value: v.clone(),
                                after: last_known.map(str::to_string),
                            });
                        }
                    }
                }
            }
            Some(other) => log::debug!("sheet {}: sections {other} is not an object", kind.key()),
        }

        sheet.extra = obj
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "forceSeparatePage" | "insertBlankPage" | "sections"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        sheet.renumber();
        sheet
    }

    fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("forceSeparatePage".into(), Value::Bool(self.force_separate_page));
        obj.insert("insertBlankPage".into(), Value::Bool(self.insert_blank_page));
        let mut sections = Map::new();
        self.write_unknown_after(&mut sections, None);
        for entry in &self.sections {
            sections.insert(entry.name.clone(), entry.to_value());
            self.write_unknown_after(&mut sections, Some(&entry.name));
        }
        // Anchored to a section that has since gone away.
        for unknown in &self.unknown_sections {
            if let Some(anchor) = &unknown.after
                && self.section(anchor).is_none()
            {
                sections.insert(unknown.name.clone(), unknown.value.clone());
            }
        }
        obj.insert("sections".into(), Value::Object(sections));
        for (k, v) in &self.extra {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }

    pub fn section(&self, name: &str) -> Option<&SectionEntry> {
        self.sections.iter().find(|s| s.name == name)
    }

    fn write_unknown_after(&self, sections: &mut Map<String, Value>, anchor: Option<&str>) {
        for unknown in self.unknown_sections.iter().filter(|u| u.after.as_deref() == anchor) {
            sections.insert(unknown.name.clone(), unknown.value.clone());
        }
    }

    pub fn unknown_section(&self, name: &str) -> Option<&Value> {
        self.unknown_sections
            .iter()
            .find(|u| u.name == name)
            .map(|u| &u.value)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut SectionEntry> {
        self.sections.iter_mut().find(|s| s.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    /// Moves the named sections to the front, in the given order. Unknown
    /// names are ignored; the other sections keep their relative order.
    pub fn reorder(&mut self, names: &[&str]) {
        let mut front = Vec::with_capacity(names.len());
        for name in names {
            if let Some(pos) = self.sections.iter().position(|s| s.name == *name) {
                front.push(self.sections.remove(pos));
            }
        }
        front.append(&mut self.sections);
        self.sections = front;
        self.renumber();
    }

    /// Moves one section to `index` (clamped). Returns false if there is no
    /// such section.
    pub fn move_section(&mut self, name: &str, index: usize) -> bool {
        let Some(pos) = self.sections.iter().position(|s| s.name == name) else {
            return false;
        };
        let entry = self.sections.remove(pos);
        let index = index.min(self.sections.len());
        self.sections.insert(index, entry);
        self.renumber();
        true
    }

    pub(crate) fn renumber(&mut self) {
        for (i, entry) in self.sections.iter_mut().enumerate() {
            entry.order = i;
        }
    }
}

/// What the page header shows besides the sheet title.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderSettings {
    pub show_name: bool,
    pub show_date: bool,
    pub show_attributes: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for HeaderSettings {
    fn default() -> Self {
        Self {
            show_name: true,
            show_date: true,
            show_attributes: true,
            extra: Map::new(),
        }
    }
}

impl HeaderSettings {
    const KEYS: [&'static str; 3] = ["showName", "showDate", "showAttributes"];

    /// Reads each flag on its own; a malformed one keeps its default and
    /// leaves the others alone.
    fn from_value(value: &Value) -> Self {
        let mut header = Self::default();
        let Some(obj) = value.as_object() else {
            log::debug!("header {value} is not an object, using defaults");
            return header;
        };
        read_bool("header", obj, "showName", &mut header.show_name);
        read_bool("header", obj, "showDate", &mut header.show_date);
        read_bool("header", obj, "showAttributes", &mut header.show_attributes);
        header.extra = obj
            .iter()
            .filter(|(k, _)| !Self::KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        header
    }
}

/// All settings of a document, typed once at load time.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSettings {
    pub header: HeaderSettings,
    sheets: Vec<SheetSettings>, // one per kind, in `SheetKind::ALL` order
    unknown_sheets: Map<String, Value>,
    extra: Map<String, Value>,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            header: HeaderSettings::default(),
            sheets: SheetKind::ALL.iter().map(|k| SheetSettings::new(*k)).collect(),
            unknown_sheets: Map::new(),
            extra: Map::new(),
        }
    }
}

impl DocumentSettings {
    /// Types a settings tree. Only a tree that is not an object at all is
    /// rejected; malformed parts fall back to defaults.
    pub fn from_tree(tree: &Value) -> Result<Self, Error> {
        let Some(obj) = tree.as_object() else {
            return Err(Error::Settings(format!(
                "settings must be a JSON object, got {tree}"
            )));
        };
        let mut settings = Self::default();

        if let Some(header) = obj.get("header") {
            settings.header = HeaderSettings::from_value(header);
        }

        if let Some(sheets) = obj.get("sheets") {
            match sheets.as_object() {
                Some(sheets) => {
                    for (key, value) in sheets {
                        match SheetKind::ALL.iter().find(|k| k.key() == key) {
                            Some(kind) => {
                                let sheet = SheetSettings::from_value(*kind, value);
                                *settings.sheet_mut(*kind) = sheet;
                            }
                            None => {
                                settings.unknown_sheets.insert(key.clone(), value.clone());
                            }
                        }
                    }
                }
                None => log::debug!("sheets {sheets} is not an object, using defaults"),
            }
        }

        settings.extra = obj
            .iter()
            .filter(|(k, _)| k.as_str() != "header" && k.as_str() != "sheets")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(settings)
    }

    /// The settings as a tree, including sections discovered since loading.
    pub fn to_tree(&self) -> Value {
        let mut obj = Map::new();
        let header = serde_json::to_value(&self.header).unwrap_or(Value::Null);
        obj.insert("header".into(), header);
        let mut sheets = Map::new();
        for sheet in &self.sheets {
            sheets.insert(sheet.kind.key().into(), sheet.to_value());
        }
        for (k, v) in &self.unknown_sheets {
            sheets.insert(k.clone(), v.clone());
        }
        obj.insert("sheets".into(), Value::Object(sheets));
        for (k, v) in &self.extra {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        let tree: Value = serde_json::from_str(&text)?;
        Self::from_tree(&tree)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let text = serde_json::to_string_pretty(&self.to_tree())?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn sheets(&self) -> &[SheetSettings] {
        &self.sheets
    }

    pub fn sheet(&self, kind: SheetKind) -> &SheetSettings {
        &self.sheets[kind as usize]
    }

    pub fn sheet_mut(&mut self, kind: SheetKind) -> &mut SheetSettings {
        &mut self.sheets[kind as usize]
    }
}
