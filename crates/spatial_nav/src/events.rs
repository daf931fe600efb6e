//! Navigation notifications and the handler table.
//!
//! Handlers run synchronously inside a transition and get mutable access to
//! the engine, so they may trigger further focus changes. Those re-entrant
//! requests are downgraded to silent transitions by the controller.

use crate::dom::Document;
use crate::ranker::Direction;
use crate::SpatialNavigation;
use std::collections::HashMap;
use std::rc::Rc;

/// Notification names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    WillMove,
    WillUnfocus,
    Unfocused,
    WillFocus,
    Focused,
    NavigateFailed,
    EnterDown,
    EnterUp,
}

impl NotificationKind {
    /// DOM event type used by hosts that re-dispatch notifications.
    #[must_use]
    pub const fn event_type(self) -> &'static str {
        match self {
            Self::WillMove => "sn:willmove",
            Self::WillUnfocus => "sn:willunfocus",
            Self::Unfocused => "sn:unfocused",
            Self::WillFocus => "sn:willfocus",
            Self::Focused => "sn:focused",
            Self::NavigateFailed => "sn:navigatefailed",
            Self::EnterDown => "sn:enterDown",
            Self::EnterUp => "sn:enterUp",
        }
    }
}

/// What triggered a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Cause {
    /// A key press handled by the engine.
    Keydown,
    /// A programmatic call.
    #[default]
    Api,
    /// A focus change the engine did not start.
    Native,
}

/// Payload passed to handlers and to [`Document::dispatch`].
#[derive(Clone, Debug, PartialEq)]
pub struct NavEvent<E> {
    pub kind: NotificationKind,
    /// Element the notification is dispatched on.
    pub target: E,
    /// Whether a `Cancel` (or a document veto) can stop the transition.
    pub cancelable: bool,
    pub cause: Cause,
    /// Pressed direction, for key-driven notifications.
    pub direction: Option<Direction>,
    /// Section of `target`, when known.
    pub section_id: Option<String>,
    /// Element losing focus, on `WillFocus` and `Focused`.
    pub previous_element: Option<E>,
    /// Element about to take focus, on `WillUnfocus` and `Unfocused`.
    pub next_element: Option<E>,
    pub next_section_id: Option<String>,
}

impl<E> NavEvent<E> {
    pub fn new(kind: NotificationKind, target: E, cancelable: bool) -> Self {
        Self {
            kind,
            target,
            cancelable,
            cause: Cause::Api,
            direction: None,
            section_id: None,
            previous_element: None,
            next_element: None,
            next_section_id: None,
        }
    }
}

/// A handler's verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HandlerOutcome<E> {
    #[default]
    Continue,
    /// Abort the rest of the transition. Ignored for non-cancelable
    /// notifications, except native `Focused` (see the input module).
    Cancel,
    /// Replace the pending target. Honored by `WillMove`; elsewhere treated
    /// as `Continue`.
    Redirect(E),
}

/// Handler signature.
pub type Handler<D> = Rc<
    dyn Fn(
        &mut SpatialNavigation<D>,
        &NavEvent<<D as Document>::Element>,
    ) -> HandlerOutcome<<D as Document>::Element>,
>;

/// Handlers keyed by notification, called in registration order.
pub struct HandlerTable<D: Document> {
    handlers: HashMap<NotificationKind, Vec<Handler<D>>>,
}

impl<D: Document> Default for HandlerTable<D> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<D: Document> HandlerTable<D> {
    pub fn insert(&mut self, kind: NotificationKind, handler: Handler<D>) {
        self.handlers.entry(kind).or_default().push(handler);
    }

    pub fn clear(&mut self, kind: NotificationKind) {
        self.handlers.remove(&kind);
    }

    /// Snapshot of the handlers for `kind`, so they can be invoked while the
    /// table itself is borrowed mutably by the engine.
    pub fn snapshot(&self, kind: NotificationKind) -> Vec<Handler<D>> {
        self.handlers
            .get(&kind)
            .map(|list| list.iter().map(Rc::clone).collect())
            .unwrap_or_default()
    }
}
