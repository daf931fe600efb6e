//! Host input entry points: key presses and native focus changes.

use crate::SpatialNavigation;
use crate::controller::FocusState;
use crate::dom::Document;
use crate::events::{Cause, HandlerOutcome, NotificationKind};
use crate::ranker::Direction;
use log::{debug, trace};

/// Keyboard modifier flags for key events.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyMods {
    /// Control key held.
    pub ctrl: bool,
    /// Alt (Option) key held.
    pub alt: bool,
    /// Shift key held.
    pub shift: bool,
    /// Meta (Command, Windows) key held.
    pub meta: bool,
}

impl KeyMods {
    /// Whether any modifier is held. Modified keys are left to the host.
    #[inline]
    #[must_use]
    pub const fn any(self) -> bool {
        self.ctrl || self.alt || self.shift || self.meta
    }
}

/// Whether the host should suppress its default handling of a key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyDisposition {
    Consumed,
    PassThrough,
}

impl KeyDisposition {
    #[inline]
    const fn from_consumed(consumed: bool) -> Self {
        if consumed {
            Self::Consumed
        } else {
            Self::PassThrough
        }
    }
}

/// Work postponed until the host's next turn, see
/// [`SpatialNavigation::run_deferred`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Deferred<E> {
    /// Give focus back to an element whose native blur was vetoed.
    Refocus(E),
}

impl<D: Document> SpatialNavigation<D> {
    /// Handle a key press. `key` uses DOM `KeyboardEvent.key` names.
    pub fn on_key_down(&mut self, key: &str, mods: KeyMods) -> KeyDisposition {
        if !self.mounted || self.sections.is_empty() || self.paused || mods.any() {
            return KeyDisposition::PassThrough;
        }
        let Some(direction) = Direction::from_key(key) else {
            if key == "Enter" {
                return self.fire_enter(NotificationKind::EnterDown);
            }
            return KeyDisposition::PassThrough;
        };
        trace!("key down {key}");

        let current = self.document.active_element().or_else(|| {
            let last = self.last_section_id.as_deref()?;
            self.sections.last_focused(&self.document, last)
        });
        let Some(current) = current else {
            return KeyDisposition::from_consumed(self.focus_section(None));
        };
        let Some(section_id) = self.sections.section_of(&self.document, current) else {
            debug!("focused element {current:?} belongs to no section");
            return KeyDisposition::PassThrough;
        };

        let will_move = Self::keyed_event(
            NotificationKind::WillMove,
            current,
            &section_id,
            Some(direction),
            Cause::Keydown,
        );
        let consumed = match self.fire(&will_move) {
            HandlerOutcome::Continue => self.focus_next(direction, current, &section_id),
            HandlerOutcome::Cancel => self
                .next_candidate(direction, current, &section_id)
                .is_some(),
            HandlerOutcome::Redirect(target) => {
                self.focus_element(target, None, Some(direction))
            }
        };
        KeyDisposition::from_consumed(consumed)
    }

    /// Handle a key release. Only Enter is of interest.
    pub fn on_key_up(&mut self, key: &str, mods: KeyMods) -> KeyDisposition {
        if !self.mounted || self.sections.is_empty() || self.paused || mods.any() || key != "Enter"
        {
            return KeyDisposition::PassThrough;
        }
        self.fire_enter(NotificationKind::EnterUp)
    }

    /// `EnterDown` or `EnterUp` on the focused element. A cancel consumes the
    /// key.
    fn fire_enter(&mut self, kind: NotificationKind) -> KeyDisposition {
        let Some(current) = self.document.active_element() else {
            return KeyDisposition::PassThrough;
        };
        let Some(section_id) = self.sections.section_of(&self.document, current) else {
            return KeyDisposition::PassThrough;
        };
        let event = Self::keyed_event(kind, current, &section_id, None, Cause::Keydown);
        KeyDisposition::from_consumed(matches!(self.fire(&event), HandlerOutcome::Cancel))
    }

    /// The host moved focus to `target` on its own (pointer, tab key, script).
    ///
    /// Fires a native `Focused`; a handler cancel blurs the element again.
    pub fn on_focus(&mut self, target: D::Element) {
        if !self.mounted || self.sections.is_empty() || self.state == FocusState::Focusing {
            return;
        }
        let Some(section_id) = self.sections.section_of(&self.document, target) else {
            return;
        };
        if self.paused {
            self.focus_changed(target, Some(&section_id));
            return;
        }
        let event = Self::keyed_event(
            NotificationKind::Focused,
            target,
            &section_id,
            None,
            Cause::Native,
        );
        if matches!(self.fire(&event), HandlerOutcome::Cancel) {
            self.state = FocusState::Focusing;
            self.document.blur(target);
            self.state = FocusState::Idle;
        } else {
            self.focus_changed(target, Some(&section_id));
        }
    }

    /// The host blurred `target` on its own.
    ///
    /// Fires a native `WillUnfocus`. A cancel schedules a refocus, applied by
    /// [`Self::run_deferred`]; until then the engine ignores native events.
    pub fn on_blur(&mut self, target: D::Element) {
        if !self.mounted
            || self.paused
            || self.sections.is_empty()
            || self.state == FocusState::Focusing
        {
            return;
        }
        let Some(section_id) = self.sections.section_of(&self.document, target) else {
            return;
        };
        let mut event = Self::keyed_event(
            NotificationKind::WillUnfocus,
            target,
            &section_id,
            None,
            Cause::Native,
        );
        if matches!(self.fire(&event), HandlerOutcome::Cancel) {
            debug!("native blur of {target:?} vetoed, refocusing");
            self.state = FocusState::Focusing;
            self.deferred.push(Deferred::Refocus(target));
        } else {
            event.kind = NotificationKind::Unfocused;
            event.cancelable = false;
            self.fire(&event);
        }
    }

    /// Run deferred work and return how many tasks ran.
    pub fn run_deferred(&mut self) -> usize {
        let tasks: Vec<Deferred<D::Element>> = self.deferred.drain(..).collect();
        for task in &tasks {
            match *task {
                Deferred::Refocus(element) => {
                    self.document.focus(element);
                    self.state = FocusState::Idle;
                }
            }
        }
        tasks.len()
    }

    /// Whether deferred work is waiting for [`Self::run_deferred`].
    #[inline]
    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }
}
