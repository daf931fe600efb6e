//! Section registry: named groups of navigable elements.
//!
//! Element lists are never cached: every query goes back to the document,
//! and remembered elements are re-validated on every read.

use crate::config::{EnterTo, GlobalConfig, Restrict, SectionConfig, clamp_threshold};
use crate::dom::Document;
use crate::geometry::is_on_screen_with_margin;
use crate::ranker::Direction;
use crate::selector::ElementSelector;
use anyhow::{Result, anyhow, bail};
use log::debug;

/// Prefix of generated section ids.
pub const ID_POOL_PREFIX: &str = "section-";

/// The last directional move made out of a section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move<E> {
    pub from: E,
    pub to: E,
    pub direction: Direction,
}

/// A registered section with its settings resolved against the global
/// config at registration time.
#[derive(Clone, Debug)]
pub struct Section<E> {
    id: String,
    /// Elements that belong to the section.
    pub selector: ElementSelector<E>,
    /// Preferred entry element when the section has no enter policy.
    pub default_element: ElementSelector<E>,
    /// Never fall back to diagonal candidates.
    pub straight_only: bool,
    /// Share in `[0, 1]` of a diagonal candidate that must reach into the
    /// straight zone for it to count as straight.
    pub straight_overlap_threshold: f64,
    /// Disabled sections are skipped by every query.
    pub disabled: bool,
    pub enter_to: Option<EnterTo>,
    pub restrict: Restrict,
    /// Elements `make_focusable` leaves without a tabindex.
    pub tab_index_ignore_list: ElementSelector<E>,
    last_focused: Option<E>,
    previous: Option<Move<E>>,
}

impl<E: Copy> Section<E> {
    fn resolve(id: String, config: SectionConfig<E>, global: &GlobalConfig<E>) -> Self {
        Self {
            id,
            selector: config.selector.unwrap_or_else(|| global.selector.clone()),
            default_element: config
                .default_element
                .unwrap_or_else(|| global.default_element.clone()),
            straight_only: config.straight_only.unwrap_or(global.straight_only),
            straight_overlap_threshold: config
                .straight_overlap_threshold
                .map_or(global.straight_overlap_threshold, clamp_threshold),
            disabled: config.disabled.unwrap_or(global.disabled),
            enter_to: config.enter_to.or(global.enter_to),
            restrict: config.restrict.unwrap_or(global.restrict),
            tab_index_ignore_list: config
                .tab_index_ignore_list
                .unwrap_or_else(|| global.tab_index_ignore_list.clone()),
            last_focused: None,
            previous: None,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last focused element as recorded, without validation.
    #[inline]
    pub const fn raw_last_focused(&self) -> Option<E> {
        self.last_focused
    }

    /// The last directional move that started in this section.
    #[inline]
    pub const fn previous(&self) -> Option<Move<E>> {
        self.previous
    }
}

/// All sections, in registration order.
#[derive(Clone, Debug)]
pub struct SectionRegistry<E> {
    sections: Vec<Section<E>>,
    id_pool: u64,
    on_screen_margin: f64,
}

impl<E: Copy + Eq> SectionRegistry<E> {
    #[must_use]
    pub const fn new(on_screen_margin: f64) -> Self {
        Self {
            sections: Vec::new(),
            id_pool: 0,
            on_screen_margin,
        }
    }

    /// Register a section, generating an id when the config has none.
    ///
    /// # Errors
    /// An explicit id that is already registered.
    pub fn register(&mut self, config: SectionConfig<E>, global: &GlobalConfig<E>) -> Result<String> {
        let id = match config.id.clone() {
            Some(id) if self.contains(&id) => bail!("section {id:?} already exists"),
            Some(id) => id,
            None => self.generate_id(),
        };
        debug!("registering section {id}");
        self.sections
            .push(Section::resolve(id.clone(), config, global));
        Ok(id)
    }

    /// Next free `section-<n>` id.
    fn generate_id(&mut self) -> String {
        loop {
            self.id_pool = self.id_pool.saturating_add(1);
            let id = format!("{ID_POOL_PREFIX}{}", self.id_pool);
            if !self.contains(&id) {
                return id;
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Section<E>> {
        let index = self.sections.iter().position(|section| section.id == id)?;
        Some(self.sections.remove(index))
    }

    /// # Errors
    /// Unknown section id.
    pub fn set_disabled(&mut self, id: &str, disabled: bool) -> Result<()> {
        let section = self
            .get_mut(id)
            .ok_or_else(|| anyhow!("section {id:?} doesn't exist"))?;
        section.disabled = disabled;
        Ok(())
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Section<E>> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Section<E>> {
        self.sections.iter_mut().find(|section| section.id == id)
    }

    /// Sections in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Section<E>> {
        self.sections.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.sections.iter().map(|section| section.id.clone()).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Enabled section, if registered.
    fn enabled(&self, id: &str) -> Option<&Section<E>> {
        self.get(id).filter(|section| !section.disabled)
    }

    /// Whether `element` may receive focus as part of section `id`.
    pub fn is_navigable<D: Document<Element = E>>(
        &self,
        doc: &D,
        element: E,
        id: &str,
        verify_selector: bool,
    ) -> bool {
        let Some(section) = self.enabled(id) else {
            return false;
        };
        if verify_selector && !section.selector.matches(doc, element) {
            return false;
        }
        is_on_screen_with_margin(doc, element, self.on_screen_margin)
    }

    /// Navigable elements of a section, in selector order.
    pub fn navigable<D: Document<Element = E>>(&self, doc: &D, id: &str) -> Vec<E> {
        let Some(section) = self.enabled(id) else {
            return Vec::new();
        };
        section
            .selector
            .resolve(doc)
            .into_iter()
            .filter(|element| self.is_navigable(doc, *element, id, false))
            .collect()
    }

    /// First navigable element designated by the section's default selector.
    pub fn default_element<D: Document<Element = E>>(&self, doc: &D, id: &str) -> Option<E> {
        let section = self.enabled(id)?;
        section
            .default_element
            .resolve(doc)
            .into_iter()
            .find(|element| self.is_navigable(doc, *element, id, true))
    }

    /// Remembered element, if it is still navigable in this section.
    pub fn last_focused<D: Document<Element = E>>(&self, doc: &D, id: &str) -> Option<E> {
        let element = self.get(id)?.last_focused?;
        self.is_navigable(doc, element, id, true)
            .then_some(element)
    }

    /// First enabled section whose selector designates `element`.
    pub fn section_of<D: Document<Element = E>>(&self, doc: &D, element: E) -> Option<String> {
        self.sections
            .iter()
            .find(|section| !section.disabled && section.selector.matches(doc, element))
            .map(|section| section.id.clone())
    }

    /// Remember `element` as the section's last focused element.
    pub fn record_focus(&mut self, id: &str, element: E) {
        if let Some(section) = self.get_mut(id) {
            section.last_focused = Some(element);
        }
    }

    /// Remember a directional move out of section `id`.
    pub fn record_move(&mut self, id: &str, from: E, to: E, direction: Direction) {
        if let Some(section) = self.get_mut(id) {
            section.previous = Some(Move {
                from,
                to,
                direction,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, NodeId};
    use crate::geometry::BoundingBox;

    fn registry() -> SectionRegistry<NodeId> {
        SectionRegistry::new(-10.0)
    }

    #[test]
    fn generated_ids_skip_taken_ones() -> Result<()> {
        let global = GlobalConfig::default();
        let mut sections = registry();
        sections.register(SectionConfig::new().id("section-2"), &global)?;
        assert_eq!(sections.register(SectionConfig::new(), &global)?, "section-1");
        assert_eq!(sections.register(SectionConfig::new(), &global)?, "section-3");
        assert_eq!(sections.register(SectionConfig::new().id("section-3"), &global).ok(), None);
        assert_eq!(sections.ids(), vec!["section-2", "section-1", "section-3"]);
        Ok(())
    }

    #[test]
    fn unset_options_inherit_global_values() -> Result<()> {
        let mut global = GlobalConfig::default();
        global.restrict = Restrict::Unrestricted;
        global.straight_only = true;
        let mut sections = registry();
        let id = sections.register(
            SectionConfig::new().selector("a").restrict(Restrict::SelfOnly),
            &global,
        )?;
        let section = sections.get(&id).ok_or_else(|| anyhow!("missing"))?;
        assert_eq!(section.restrict, Restrict::SelfOnly);
        assert!(section.straight_only);
        assert_eq!(section.enter_to, None);
        Ok(())
    }

    #[test]
    fn stale_last_focused_self_heals() -> Result<()> {
        let mut doc = MemoryDocument::new(BoundingBox::new(0.0, 0.0, 200.0, 200.0));
        let link = doc.append_element(None, "a", BoundingBox::new(20.0, 20.0, 40.0, 20.0));
        let mut sections = registry();
        let id = sections.register(SectionConfig::new().selector("a"), &GlobalConfig::default())?;
        sections.record_focus(&id, link);
        assert_eq!(sections.last_focused(&doc, &id), Some(link));
        doc.set_rect(link, BoundingBox::new(20.0, 500.0, 40.0, 20.0));
        assert_eq!(sections.last_focused(&doc, &id), None);
        doc.set_rect(link, BoundingBox::new(20.0, 20.0, 40.0, 20.0));
        doc.detach(link);
        assert_eq!(sections.last_focused(&doc, &id), None);
        Ok(())
    }

    #[test]
    fn disabled_sections_are_invisible() -> Result<()> {
        let mut doc = MemoryDocument::new(BoundingBox::new(0.0, 0.0, 200.0, 200.0));
        let link = doc.append_element(None, "a", BoundingBox::new(20.0, 20.0, 40.0, 20.0));
        let global = GlobalConfig::default();
        let mut sections = registry();
        let first = sections.register(SectionConfig::new().selector("a"), &global)?;
        let second = sections.register(SectionConfig::new().selector("a"), &global)?;
        assert_eq!(sections.section_of(&doc, link), Some(first.clone()));
        sections.set_disabled(&first, true)?;
        assert_eq!(sections.section_of(&doc, link), Some(second));
        assert!(sections.navigable(&doc, &first).is_empty());
        assert_eq!(sections.set_disabled("nope", true).ok(), None);
        Ok(())
    }
}
