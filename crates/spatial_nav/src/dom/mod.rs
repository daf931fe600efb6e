//! Document abstraction consumed by the navigation engine.
//!
//! The engine never owns elements. It only holds handles handed out by a
//! [`Document`] and asks the document for tree structure, attributes, layout
//! boxes and focus state every time it needs them, since any of those can
//! change between two key presses.

mod memory;

pub use memory::{MemoryDocument, NodeId};

use crate::events::NavEvent;
use crate::geometry::BoundingBox;
use core::fmt::Debug;
use core::hash::Hash;

/// An adapter over a DOM-like tree. Implement this for your host document.
pub trait Document {
    /// Cheap, stable element handle.
    type Element: Copy + Eq + Hash + Debug;

    /// All attached elements in tree order.
    fn elements(&self) -> Vec<Self::Element>;

    /// Whether the handle still refers to an element in the document.
    fn is_attached(&self, element: Self::Element) -> bool;

    /// Parent element if any. The body sentinel is not reported as a parent.
    fn parent_element(&self, element: Self::Element) -> Option<Self::Element>;

    /// Previous sibling element, skipping non-element nodes.
    fn previous_sibling_element(&self, element: Self::Element) -> Option<Self::Element>;

    /// Next sibling element, skipping non-element nodes.
    fn next_sibling_element(&self, element: Self::Element) -> Option<Self::Element>;

    /// Tag name in ASCII lowercase.
    fn tag_name(&self, element: Self::Element) -> &str;

    /// Attribute value by ASCII-lowercase name.
    fn attribute(&self, element: Self::Element, name: &str) -> Option<&str>;

    /// Set (or replace) an attribute.
    fn set_attribute(&mut self, element: Self::Element, name: &str, value: &str);

    /// Border box in viewport coordinates.
    fn bounding_box(&self, element: Self::Element) -> BoundingBox;

    /// The visible viewport in the same coordinate space as `bounding_box`.
    fn viewport(&self) -> BoundingBox;

    /// Currently focused element. `None` when focus rests on the body.
    fn active_element(&self) -> Option<Self::Element>;

    /// Move document focus to `element`.
    fn focus(&mut self, element: Self::Element);

    /// Remove document focus from `element`.
    fn blur(&mut self, element: Self::Element);

    /// Deliver a notification to host-level listeners on `target`.
    /// Returns `false` when a listener canceled it.
    #[inline]
    fn dispatch(&mut self, target: Self::Element, event: &NavEvent<Self::Element>) -> bool {
        let _ = (target, event);
        true
    }
}
