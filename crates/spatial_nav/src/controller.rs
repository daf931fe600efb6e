//! The engine instance: section management, focus transitions and
//! directional navigation.

use crate::config::{EngineSettings, EnterTo, GlobalConfig, Restrict, SectionConfig};
use crate::dom::Document;
use crate::events::{
    Cause, Handler, HandlerOutcome, HandlerTable, NavEvent, NotificationKind,
};
use crate::geometry::{Rect, rect_of};
use crate::input::Deferred;
use crate::ranker::{Direction, navigate};
use crate::section::SectionRegistry;
use anyhow::{Result, anyhow, bail};
use log::{debug, info};
use std::rc::Rc;

/// Whether a focus transition is in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    Idle,
    /// A transition is running; nested requests are applied silently.
    Focusing,
}

/// A spatial navigation engine bound to one document.
pub struct SpatialNavigation<D: Document> {
    pub(crate) document: D,
    pub(crate) global: GlobalConfig<D::Element>,
    pub(crate) sections: SectionRegistry<D::Element>,
    pub(crate) handlers: HandlerTable<D>,
    pub(crate) state: FocusState,
    pub(crate) paused: bool,
    pub(crate) mounted: bool,
    pub(crate) last_section_id: Option<String>,
    pub(crate) deferred: Vec<Deferred<D::Element>>,
}

impl<D: Document> SpatialNavigation<D> {
    /// Engine with default settings. Nothing is registered until `mount`.
    pub fn new(document: D) -> Self {
        Self::with_settings(document, EngineSettings::default())
    }

    pub fn with_settings(document: D, settings: EngineSettings) -> Self {
        Self {
            document,
            global: GlobalConfig::default(),
            sections: SectionRegistry::new(settings.on_screen_margin),
            handlers: HandlerTable::default(),
            state: FocusState::Idle,
            paused: false,
            mounted: false,
            last_section_id: None,
            deferred: Vec::new(),
        }
    }

    /// Apply `config` to the global defaults, register a section from it,
    /// make the section elements focusable and start handling input.
    ///
    /// # Errors
    /// The config names a section id that is already registered.
    pub fn mount(&mut self, config: SectionConfig<D::Element>) -> Result<String> {
        self.global.apply(&config);
        let id = self.sections.register(config, &self.global)?;
        self.make_focusable(None)?;
        self.mounted = true;
        info!("spatial navigation mounted with section {id}");
        Ok(id)
    }

    /// Stop handling input. Registered sections are kept.
    pub fn unmount(&mut self) {
        self.mounted = false;
        info!("spatial navigation unmounted");
    }

    #[inline]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Keep focusing elements but stop firing notifications and handling keys.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    #[inline]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub const fn state(&self) -> FocusState {
        self.state
    }

    pub fn last_section_id(&self) -> Option<&str> {
        self.last_section_id.as_deref()
    }

    #[inline]
    pub const fn sections(&self) -> &SectionRegistry<D::Element> {
        &self.sections
    }

    #[inline]
    pub const fn global_config(&self) -> &GlobalConfig<D::Element> {
        &self.global
    }

    #[inline]
    pub const fn document(&self) -> &D {
        &self.document
    }

    #[inline]
    pub const fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    /// Register a handler for `kind`. Handlers run in registration order;
    /// the first one that does not return `Continue` decides.
    pub fn on<F>(&mut self, kind: NotificationKind, handler: F)
    where
        F: Fn(&mut Self, &NavEvent<D::Element>) -> HandlerOutcome<D::Element> + 'static,
    {
        let handler: Handler<D> = Rc::new(handler);
        self.handlers.insert(kind, handler);
    }

    pub fn clear_handlers(&mut self, kind: NotificationKind) {
        self.handlers.clear(kind);
    }

    /// Register an additional section.
    ///
    /// # Errors
    /// Duplicate explicit id.
    pub fn add_section(&mut self, config: SectionConfig<D::Element>) -> Result<String> {
        self.sections.register(config, &self.global)
    }

    /// # Errors
    /// Unknown section id.
    pub fn remove_section(&mut self, id: &str) -> Result<()> {
        self.sections
            .remove(id)
            .ok_or_else(|| anyhow!("section {id:?} doesn't exist"))?;
        if self.last_section_id.as_deref() == Some(id) {
            self.last_section_id = None;
        }
        Ok(())
    }

    /// # Errors
    /// Unknown section id.
    pub fn enable_section(&mut self, id: &str) -> Result<()> {
        self.sections.set_disabled(id, false)
    }

    /// # Errors
    /// Unknown section id.
    pub fn disable_section(&mut self, id: &str) -> Result<()> {
        self.sections.set_disabled(id, true)
    }

    /// Give `tabindex="-1"` to the elements of one section (or all sections)
    /// that have no tabindex yet and are not on the ignore list.
    ///
    /// # Errors
    /// `section_id` names no registered section.
    pub fn make_focusable(&mut self, section_id: Option<&str>) -> Result<()> {
        let ids = match section_id {
            Some(id) if self.sections.contains(id) => vec![id.to_owned()],
            Some(id) => bail!("section {id:?} doesn't exist"),
            None => self.sections.ids(),
        };
        for id in ids {
            let pending: Vec<D::Element> = {
                let Some(section) = self.sections.get(&id) else {
                    continue;
                };
                let doc = &self.document;
                section
                    .selector
                    .resolve(doc)
                    .into_iter()
                    .filter(|element| {
                        !section.tab_index_ignore_list.matches(doc, *element)
                            && doc
                                .attribute(*element, "tabindex")
                                .is_none_or(str::is_empty)
                    })
                    .collect()
            };
            for element in pending {
                self.document.set_attribute(element, "tabindex", "-1");
            }
        }
        Ok(())
    }

    /// Deliver a notification to the document, then to the handlers.
    /// A document veto only counts for cancelable notifications.
    pub(crate) fn fire(&mut self, event: &NavEvent<D::Element>) -> HandlerOutcome<D::Element> {
        let delivered = self.document.dispatch(event.target, event);
        let mut outcome = HandlerOutcome::Continue;
        for handler in self.handlers.snapshot(event.kind) {
            outcome = handler(self, event);
            if !matches!(outcome, HandlerOutcome::Continue) {
                break;
            }
        }
        if matches!(outcome, HandlerOutcome::Continue) && event.cancelable && !delivered {
            outcome = HandlerOutcome::Cancel;
        }
        debug!(
            "{} on {:?} -> {outcome:?}",
            event.kind.event_type(),
            event.target
        );
        outcome
    }

    /// Record `element` as focused in its section and make that section the
    /// last active one.
    pub(crate) fn focus_changed(&mut self, element: D::Element, section_id: Option<&str>) {
        let section = section_id
            .filter(|id| {
                self.sections
                    .get(id)
                    .is_some_and(|section| !section.disabled)
            })
            .map(str::to_owned)
            .or_else(|| self.sections.section_of(&self.document, element));
        if let Some(id) = section {
            self.sections.record_focus(&id, element);
            self.last_section_id = Some(id);
        }
    }

    /// Blur, focus and record without any notification.
    fn silent_focus(
        &mut self,
        current: Option<D::Element>,
        element: D::Element,
        section_id: Option<&str>,
    ) {
        if let Some(previous) = current {
            self.document.blur(previous);
        }
        self.document.focus(element);
        self.focus_changed(element, section_id);
    }

    /// Move focus to `element` through the full notification protocol.
    ///
    /// Returns `false` when a `WillUnfocus` or `WillFocus` handler canceled.
    /// A canceled `WillFocus` leaves the previous element blurred.
    pub fn focus_element(
        &mut self,
        element: D::Element,
        section_id: Option<&str>,
        direction: Option<Direction>,
    ) -> bool {
        let current = self.document.active_element();

        if self.state == FocusState::Focusing {
            debug!("nested focus request for {element:?}, applying silently");
            self.silent_focus(current, element, section_id);
            return true;
        }
        self.state = FocusState::Focusing;

        if self.paused {
            self.silent_focus(current, element, section_id);
            self.state = FocusState::Idle;
            return true;
        }

        if let Some(previous) = current {
            let mut unfocus = NavEvent::new(NotificationKind::WillUnfocus, previous, true);
            unfocus.next_element = Some(element);
            unfocus.next_section_id = section_id.map(str::to_owned);
            unfocus.direction = direction;
            if matches!(self.fire(&unfocus), HandlerOutcome::Cancel) {
                self.state = FocusState::Idle;
                return false;
            }
            self.document.blur(previous);
            unfocus.kind = NotificationKind::Unfocused;
            unfocus.cancelable = false;
            self.fire(&unfocus);
        }

        let mut focus = NavEvent::new(NotificationKind::WillFocus, element, true);
        focus.previous_element = current;
        focus.section_id = section_id.map(str::to_owned);
        focus.direction = direction;
        if matches!(self.fire(&focus), HandlerOutcome::Cancel) {
            self.state = FocusState::Idle;
            return false;
        }
        self.document.focus(element);
        focus.kind = NotificationKind::Focused;
        focus.cancelable = false;
        self.fire(&focus);

        self.state = FocusState::Idle;
        self.focus_changed(element, section_id);
        true
    }

    /// Focus the entry element of a section, or of the first section that
    /// has one (last active section first, then registration order).
    pub fn focus_section(&mut self, section_id: Option<&str>) -> bool {
        self.enter_section(section_id, None)
    }

    pub(crate) fn enter_section(
        &mut self,
        section_id: Option<&str>,
        direction: Option<Direction>,
    ) -> bool {
        let mut range: Vec<String> = Vec::new();
        let candidates = match section_id {
            Some(id) => vec![id.to_owned()],
            None => self
                .last_section_id
                .iter()
                .cloned()
                .chain(self.sections.ids())
                .collect(),
        };
        for id in candidates {
            let enabled = self
                .sections
                .get(&id)
                .is_some_and(|section| !section.disabled);
            if enabled && !range.contains(&id) {
                range.push(id);
            }
        }

        for id in range {
            if let Some(next) = self.entry_element(&id) {
                return self.focus_element(next, Some(&id), direction);
            }
        }
        debug!("no section could take focus");
        false
    }

    /// Element that receives focus when section `id` is entered.
    pub fn entry_element(&self, id: &str) -> Option<D::Element> {
        let doc = &self.document;
        let sections = &self.sections;
        let first_navigable = || sections.navigable(doc, id).first().copied();
        match sections.get(id)?.enter_to {
            Some(EnterTo::LastFocused) => sections
                .last_focused(doc, id)
                .or_else(|| sections.default_element(doc, id))
                .or_else(first_navigable),
            Some(EnterTo::DefaultElement) | None => sections
                .default_element(doc, id)
                .or_else(|| sections.last_focused(doc, id))
                .or_else(first_navigable),
        }
    }

    /// Geometric winner for moving from `current` in `direction`, honoring
    /// the current section's restrict policy. Never commits focus.
    pub fn next_candidate(
        &self,
        direction: Direction,
        current: D::Element,
        section_id: &str,
    ) -> Option<D::Element> {
        let section = self.sections.get(section_id)?;
        let doc = &self.document;
        let target = rect_of(doc, current);
        let rank = |pool: Vec<D::Element>| {
            let rects: Vec<Rect<D::Element>> = pool
                .into_iter()
                .map(|element| rect_of(doc, element))
                .collect();
            navigate(
                &target,
                direction,
                &rects,
                section.straight_overlap_threshold,
                section.straight_only,
            )
        };

        let own = self.sections.navigable(doc, section_id);
        let others = || -> Vec<D::Element> {
            self.sections
                .iter()
                .flat_map(|other| self.sections.navigable(doc, other.id()))
                .filter(|element| *element != current && !own.contains(element))
                .collect()
        };

        match section.restrict {
            Restrict::SelfOnly | Restrict::SelfFirst => {
                let in_section: Vec<D::Element> = own
                    .iter()
                    .copied()
                    .filter(|element| *element != current)
                    .collect();
                rank(in_section).or_else(|| {
                    (section.restrict == Restrict::SelfFirst)
                        .then(others)
                        .and_then(rank)
                })
            }
            Restrict::Unrestricted => {
                let everything: Vec<D::Element> = self
                    .sections
                    .iter()
                    .flat_map(|other| self.sections.navigable(doc, other.id()))
                    .filter(|element| *element != current)
                    .collect();
                rank(everything)
            }
        }
    }

    /// Move focus from `current` in `direction`.
    ///
    /// A candidate in another section enters that section through its enter
    /// policy. Without a candidate a `NavigateFailed` notification fires on
    /// `current` and nothing changes.
    pub fn focus_next(
        &mut self,
        direction: Direction,
        current: D::Element,
        section_id: &str,
    ) -> bool {
        let Some(next) = self.next_candidate(direction, current, section_id) else {
            let mut failed = NavEvent::new(NotificationKind::NavigateFailed, current, false);
            failed.direction = Some(direction);
            failed.section_id = Some(section_id.to_owned());
            self.fire(&failed);
            return false;
        };

        self.sections
            .record_move(section_id, current, next, direction);
        match self.sections.section_of(&self.document, next) {
            Some(next_section) if next_section != section_id => {
                debug!("leaving section {section_id} for {next_section}");
                self.enter_section(Some(&next_section), Some(direction))
            }
            next_section => self.focus_element(next, next_section.as_deref(), Some(direction)),
        }
    }

    /// Initial focus after a route change: keep an existing focus, else
    /// focus the element named by the URL fragment, else enter a section.
    pub fn focus_initial(&mut self, hash: Option<&str>) -> bool {
        if self.document.active_element().is_some() {
            return true;
        }
        let fragment = hash
            .map(|raw| raw.trim_start_matches('#'))
            .filter(|fragment| !fragment.is_empty());
        if let Some(fragment) = fragment {
            let doc = &self.document;
            let named = doc
                .elements()
                .into_iter()
                .find(|element| doc.attribute(*element, "id") == Some(fragment));
            if let Some(element) = named {
                return self.focus_element(element, None, None);
            }
            debug!("fragment #{fragment} names no element");
        }
        self.focus_section(None)
    }

    /// Notification payload for an input-originated event.
    pub(crate) fn keyed_event(
        kind: NotificationKind,
        target: D::Element,
        section_id: &str,
        direction: Option<Direction>,
        cause: Cause,
    ) -> NavEvent<D::Element> {
        let mut event = NavEvent::new(kind, target, kind != NotificationKind::Focused);
        event.section_id = Some(section_id.to_owned());
        event.direction = direction;
        event.cause = cause;
        event
    }
}
