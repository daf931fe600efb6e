//! Ready-made handlers for hosts that lay focusables out in rows.
//!
//! Register them like any other handler:
//! `nav.on(NotificationKind::WillMove, sibling_traversal)`.

use crate::controller::SpatialNavigation;
use crate::dom::Document;
use crate::events::{HandlerOutcome, NavEvent};
use crate::ranker::Direction;
use core::iter;
use log::debug;

/// `WillMove` handler that walks tree siblings when a horizontal move
/// dead-ends.
///
/// For Left and Right the nearest visible previous or next sibling of the
/// focused element is looked up (zero-width siblings are skipped). When the
/// geometric move has a winner and such a sibling exists, the move proceeds
/// unchanged. Otherwise focus is redirected to the sibling, or the move is
/// canceled when there is none. Vertical moves are left alone.
pub fn sibling_traversal<D: Document>(
    nav: &mut SpatialNavigation<D>,
    event: &NavEvent<D::Element>,
) -> HandlerOutcome<D::Element> {
    let Some(direction @ (Direction::Left | Direction::Right)) = event.direction else {
        return HandlerOutcome::Continue;
    };
    let has_next = event
        .section_id
        .as_deref()
        .and_then(|id| nav.next_candidate(direction, event.target, id))
        .is_some();
    let sibling = visible_sibling(nav.document(), event.target, direction);
    debug!("sibling traversal from {:?}: next={has_next} sibling={sibling:?}", event.target);
    match (has_next, sibling) {
        (true, Some(_)) => HandlerOutcome::Continue,
        (false, Some(sibling)) => HandlerOutcome::Redirect(sibling),
        (_, None) => HandlerOutcome::Cancel,
    }
}

/// Closest sibling of `element` on the `direction` side with a non-zero
/// width. Only Left looks backwards.
pub fn visible_sibling<D: Document>(
    doc: &D,
    element: D::Element,
    direction: Direction,
) -> Option<D::Element> {
    let step = |node: D::Element| match direction {
        Direction::Left => doc.previous_sibling_element(node),
        Direction::Up | Direction::Right | Direction::Down => doc.next_sibling_element(node),
    };
    iter::successors(step(element), |node| step(*node))
        .find(|node| doc.bounding_box(*node).width > 0.0)
}

/// `#id` fragment a host writes to its location when `element` takes focus.
pub fn fragment_of<D: Document>(doc: &D, element: D::Element) -> Option<String> {
    doc.attribute(element, "id")
        .filter(|id| !id.is_empty())
        .map(|id| format!("#{id}"))
}
