use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;

/// An attribute such as courage (`MU`) with its current value.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub short: String,
    pub name: String,
    pub value: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Energy {
    pub short: String,
    pub name: String,
    pub value: i32,
}

/// Advantages, disadvantages and special abilities: a name and an optional
/// level or note.
#[derive(Clone, Debug, PartialEq)]
pub struct Trait {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Talent {
    pub group: String,
    pub name: String,
    pub probe: String,
    pub value: i32,
    pub specializations: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeleeWeapon {
    pub name: String,
    pub talent: String,
    pub damage: String,
    pub at: i32,
    pub pa: i32,
    pub reach: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RangedWeapon {
    pub name: String,
    pub talent: String,
    pub damage: String,
    pub fk: i32,
    pub range: String,
    pub ammunition: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Armor {
    pub name: String,
    pub protection: i32,
    pub encumbrance: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shield {
    pub name: String,
    pub at_mod: i32,
    pub pa_mod: i32,
}

/// Spells, rituals and liturgies share one shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Spell {
    pub name: String,
    pub probe: String,
    pub value: i32,
    pub representation: String,
    pub cost: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub name: String,
    pub count: u32,
    pub weight: f32,
}

/// A named sub-inventory (backpack, saddlebag, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct Container {
    pub name: String,
    pub items: Vec<Item>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Money {
    pub ducats: i32,
    pub silver: i32,
    pub heller: i32,
    pub kreuzer: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Animal {
    pub name: String,
    pub species: String,
    pub notes: String,
}

/// The character a document is built for.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hero {
    pub name: String,
    pub date: String,
    pub magical: bool,
    pub blessed: bool,
    pub basics: Vec<(String, String)>,
    pub attributes: Vec<Attribute>,
    pub energies: Vec<Energy>,
    pub advantages: Vec<Trait>,
    pub disadvantages: Vec<Trait>,
    pub special_abilities: Vec<Trait>,
    pub combat_abilities: Vec<Trait>,
    pub talents: Vec<Talent>,
    pub melee: Vec<MeleeWeapon>,
    pub ranged: Vec<RangedWeapon>,
    pub armor: Vec<Armor>,
    pub shields: Vec<Shield>,
    pub spells: Vec<Spell>,
    pub rituals: Vec<Spell>,
    pub liturgies: Vec<Spell>,
    pub containers: Vec<Container>,
    pub money: Money,
    pub animals: Vec<Animal>,
    pub portrait: Option<PathBuf>,
}

impl Hero {
    pub fn attribute(&self, short: &str) -> Option<i32> {
        self.attributes
            .iter()
            .find(|a| a.short.eq_ignore_ascii_case(short))
            .map(|a| a.value)
    }

    pub fn energy(&self, short: &str) -> Option<i32> {
        self.energies
            .iter()
            .find(|e| e.short.eq_ignore_ascii_case(short))
            .map(|e| e.value)
    }

    /// Sum of the given attributes divided by five, rounded; `None` when any
    /// of them is missing.
    fn derived(&self, shorts: [&str; 3]) -> Option<i32> {
        let mut sum = 0;
        for short in shorts {
            sum += self.attribute(short)?;
        }
        Some((sum as f32 / 5.0).round() as i32)
    }

    pub fn at_base(&self) -> Option<i32> {
        self.derived(["MU", "GE", "KK"])
    }

    pub fn pa_base(&self) -> Option<i32> {
        self.derived(["IN", "GE", "KK"])
    }

    pub fn fk_base(&self) -> Option<i32> {
        self.derived(["IN", "FF", "KK"])
    }

    pub fn magic_resistance(&self) -> Option<i32> {
        self.derived(["MU", "KL", "KO"])
    }

    pub fn talents_in<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Talent> + 'a {
        self.talents
            .iter()
            .filter(move |t| t.group.eq_ignore_ascii_case(group))
    }

    /// Reads a hero file. A relative portrait path is resolved against the
    /// file's directory.
    pub fn load(path: &Path) -> Result<Hero, Error> {
        let xml = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
                std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
            ),
            _ => Error::Io(e),
        })?;
        let mut hero = Hero::from_xml(&xml)?;
        if let Some(portrait) = &hero.portrait
            && portrait.is_relative()
            && let Some(dir) = path.parent()
        {
            hero.portrait = Some(dir.join(portrait));
        }
        Ok(hero)
    }

    pub fn from_xml(xml: &str) -> Result<Hero, Error> {
        let doc = roxmltree::Document::parse(xml)?;
        let root = doc.root_element();
        if root.tag_name().name() != "hero" {
            return Err(Error::InvalidHero(format!(
                "root element is <{}>, expected <hero>",
                root.tag_name().name()
            )));
        }

        let mut hero = Hero {
            name: text_attr(root, "name"),
            date: text_attr(root, "date"),
            magical: bool_attr(root, "magical")?,
            blessed: bool_attr(root, "blessed")?,
            ..Hero::default()
        };

        for section in root.children().filter(|n| n.is_element()) {
            let entries = || section.children().filter(|n| n.is_element());
            match section.tag_name().name() {
                "basics" => {
                    hero.basics = entries()
                        .map(|n| (text_attr(n, "label"), text_attr(n, "value")))
                        .collect();
                }
                "attributes" => {
                    hero.attributes = entries()
                        .map(|n| {
                            Ok(Attribute {
                                short: text_attr(n, "short"),
                                name: text_attr(n, "name"),
                                value: num_attr(n, "value")?,
                            })
                        })
                        .collect::<Result<_, Error>>()?;
                }
                "energies" => {
                    hero.energies = entries()
                        .map(|n| {
                            Ok(Energy {
                                short: text_attr(n, "short"),
                                name: text_attr(n, "name"),
                                value: num_attr(n, "value")?,
                            })
                        })
                        .collect::<Result<_, Error>>()?;
                }
                "advantages" => hero.advantages = entries().map(parse_trait).collect(),
                "disadvantages" => hero.disadvantages = entries().map(parse_trait).collect(),
                "specialabilities" => hero.special_abilities = entries().map(parse_trait).collect(),
                "combatabilities" => hero.combat_abilities = entries().map(parse_trait).collect(),
                "talents" => {
                    hero.talents = entries()
                        .map(|n| {
                            Ok(Talent {
                                group: text_attr(n, "group"),
                                name: text_attr(n, "name"),
                                probe: text_attr(n, "probe"),
                                value: num_attr(n, "value")?,
                                specializations: n
                                    .children()
                                    .filter(|c| c.has_tag_name("specialization"))
                                    .map(|c| text_attr(c, "name"))
                                    .collect(),
                            })
                        })
                        .collect::<Result<_, Error>>()?;
                }
                "melee" => {
                    hero.melee = entries()
                        .map(|n| {
                            Ok(MeleeWeapon {
                                name: text_attr(n, "name"),
                                talent: text_attr(n, "talent"),
                                damage: text_attr(n, "damage"),
                                at: num_attr(n, "at")?,
                                pa: num_attr(n, "pa")?,
                                reach: text_attr(n, "reach"),
                            })
                        })
                        .collect::<Result<_, Error>>()?;
                }
                "ranged" => {
                    hero.ranged = entries()
                        .map(|n| {
                            Ok(RangedWeapon {
                                name: text_attr(n, "name"),
                                talent: text_attr(n, "talent"),
                                damage: text_attr(n, "damage"),
                                fk: num_attr(n, "fk")?,
                                range: text_attr(n, "range"),
                                ammunition: opt_num_attr(n, "ammunition")?,
                            })
                        })
                        .collect::<Result<_, Error>>()?;
                }
                "armor" => {
                    hero.armor = entries()
                        .map(|n| {
                            Ok(Armor {
                                name: text_attr(n, "name"),
                                protection: num_attr(n, "protection")?,
                                encumbrance: num_attr(n, "encumbrance")?,
                            })
                        })
                        .collect::<Result<_, Error>>()?;
                }
                "shields" => {
                    hero.shields = entries()
                        .map(|n| {
                            Ok(Shield {
                                name: text_attr(n, "name"),
                                at_mod: num_attr(n, "at")?,
                                pa_mod: num_attr(n, "pa")?,
                            })
                        })
                        .collect::<Result<_, Error>>()?;
                }
                "spells" => hero.spells = entries().map(parse_spell).collect::<Result<_, _>>()?,
                "rituals" => hero.rituals = entries().map(parse_spell).collect::<Result<_, _>>()?,
                "liturgies" => {
                    hero.liturgies = entries().map(parse_spell).collect::<Result<_, _>>()?
                }
                "inventory" => {
                    hero.containers = entries()
                        .filter(|n| n.has_tag_name("container"))
                        .map(parse_container)
                        .collect::<Result<_, Error>>()?;
                }
                "money" => {
                    hero.money = Money {
                        ducats: num_attr(section, "ducats")?,
                        silver: num_attr(section, "silver")?,
                        heller: num_attr(section, "heller")?,
                        kreuzer: num_attr(section, "kreuzer")?,
                    };
                }
                "animals" => {
                    hero.animals = entries()
                        .map(|n| Animal {
                            name: text_attr(n, "name"),
                            species: text_attr(n, "species"),
                            notes: text_attr(n, "notes"),
                        })
                        .collect();
                }
                "portrait" => {
                    hero.portrait = section
                        .attribute("path")
                        .filter(|p| !p.is_empty())
                        .map(PathBuf::from);
                }
                other => log::debug!("ignoring unknown hero element <{other}>"),
            }
        }

        Ok(hero)
    }
}

fn text_attr(node: roxmltree::Node, name: &str) -> String {
    node.attribute(name).unwrap_or_default().trim().to_string()
}

fn malformed(node: roxmltree::Node, name: &str, value: &str) -> Error {
    Error::InvalidHero(format!(
        "<{}> attribute {name}=\"{value}\" is not a number",
        node.tag_name().name()
    ))
}

/// Optional number: absent or empty is `None`, anything else must parse.
fn opt_num_attr<T: FromStr>(node: roxmltree::Node, name: &str) -> Result<Option<T>, Error> {
    match node.attribute(name).map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| malformed(node, name, v)),
    }
}

fn num_attr<T: FromStr + Default>(node: roxmltree::Node, name: &str) -> Result<T, Error> {
    Ok(opt_num_attr(node, name)?.unwrap_or_default())
}

fn bool_attr(node: roxmltree::Node, name: &str) -> Result<bool, Error> {
    match node.attribute(name).map(str::trim) {
        None | Some("") | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(v) => Err(Error::InvalidHero(format!(
            "<{}> attribute {name}=\"{v}\" is not a boolean",
            node.tag_name().name()
        ))),
    }
}

fn parse_trait(node: roxmltree::Node) -> Trait {
    Trait {
        name: text_attr(node, "name"),
        value: node
            .attribute("value")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
    }
}

fn parse_spell(node: roxmltree::Node) -> Result<Spell, Error> {
    Ok(Spell {
        name: text_attr(node, "name"),
        probe: text_attr(node, "probe"),
        value: num_attr(node, "value")?,
        representation: text_attr(node, "representation"),
        cost: text_attr(node, "cost"),
    })
}

fn parse_container(node: roxmltree::Node) -> Result<Container, Error> {
    let items = node
        .children()
        .filter(|n| n.has_tag_name("item"))
        .map(|n| {
            Ok(Item {
                name: text_attr(n, "name"),
                count: opt_num_attr(n, "count")?.unwrap_or(1),
                weight: num_attr(n, "weight")?,
            })
        })
        .collect::<Result<_, Error>>()?;
    Ok(Container {
        name: text_attr(node, "name"),
        items,
    })
}
