use crate::hero::Hero;

use super::{Capability, SectionEntry, SectionKind, SectionOptions, SheetKind, SheetSettings};

/// Decides which sections of a sheet take part in layout, and in which
/// order, from the persisted settings and the current hero.
///
/// Persisted sections keep their persisted order. Sections the hero offers
/// that the settings do not know yet are appended in the hero's own order
/// with default visibility and filler rows. Capability-gated sections are
/// only offered to a hero that has the capability, and persisted ones are
/// dropped here for a hero without it, so the layout never sees them.
#[derive(Clone, Copy, Debug)]
pub struct SectionVisibilityResolver<'a> {
    hero: Option<&'a Hero>,
}

impl<'a> SectionVisibilityResolver<'a> {
    pub fn new(hero: Option<&'a Hero>) -> Self {
        Self { hero }
    }

    /// Sections the hero offers on `sheet`, in their natural order. Each
    /// inventory container becomes its own section ahead of the fixed ones.
    /// Sections the hero lacks the capability for are not offered.
    pub fn available(&self, sheet: SheetKind) -> Vec<SectionEntry> {
        let mut entries = Vec::new();
        if sheet == SheetKind::Equipment
            && let Some(hero) = self.hero
        {
            entries.extend(hero.containers.iter().map(|c| SectionEntry::inventory(&c.name)));
        }
        entries.extend(
            sheet
                .fixed_sections()
                .iter()
                .filter(|kind| self.allows(**kind))
                .map(|kind| SectionEntry::new(kind.name(), *kind)),
        );
        entries
    }

    /// True when the hero has what `kind` requires. Without a hero gated
    /// sections are never offered.
    pub fn allows(&self, kind: SectionKind) -> bool {
        match kind.capability() {
            None => true,
            Some(Capability::Magical) => self.hero.is_some_and(|h| h.magical),
            Some(Capability::Blessed) => self.hero.is_some_and(|h| h.blessed),
        }
    }

    /// Appends sections the settings do not know yet. Returns how many were
    /// added.
    pub fn merge(&self, settings: &mut SheetSettings) -> usize {
        let mut added = 0;
        for entry in self.available(settings.kind) {
            if settings.section(&entry.name).is_none() {
                log::debug!(
                    "sheet {}: new section {} appended with defaults",
                    settings.kind.key(),
                    entry.name
                );
                settings.sections.push(entry);
                added += 1;
            }
        }
        settings.renumber();
        added
    }

    /// Merges new sections into `settings` and returns the entries that
    /// take part in layout, in order.
    pub fn resolve(&self, settings: &mut SheetSettings) -> Vec<SectionEntry> {
        self.merge(settings);
        settings
            .sections
            .iter()
            .filter(|entry| entry.visible)
            .filter(|entry| {
                let allowed = self.allows(entry.kind);
                if !allowed {
                    log::debug!("section {} needs {:?}, hidden", entry.name, entry.kind.capability());
                }
                allowed
            })
            .filter(|entry| self.has_container(entry))
            .cloned()
            .collect()
    }

    /// Inventories persisted for a container the hero no longer carries stay
    /// in the settings but are not laid out.
    fn has_container(&self, entry: &SectionEntry) -> bool {
        if entry.kind != SectionKind::Inventory {
            return true;
        }
        let Some(hero) = self.hero else {
            return false;
        };
        let SectionOptions::Inventory { container } = &entry.options else {
            return false;
        };
        hero.containers.iter().any(|c| &c.name == container)
    }
}
