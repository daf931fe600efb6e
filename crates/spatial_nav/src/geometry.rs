//! Basic geometry types used by the ranker.
//!
//! Rectangles are derived from the document on every navigation request and
//! never cached: layout may change between two key presses.

use crate::dom::Document;
use serde::Deserialize;

/// A box as reported by the document (`left`, `top`, `width`, `height`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct BoundingBox {
    /// Distance from the viewport's left edge.
    pub left: f64,
    /// Distance from the viewport's top edge.
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    #[inline]
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Grow (positive `margin`) or shrink (negative) the box on every side.
    #[inline]
    #[must_use]
    pub fn inflate(&self, margin: f64) -> Self {
        Self {
            left: self.left - margin,
            top: self.top - margin,
            width: margin.mul_add(2.0, self.width),
            height: margin.mul_add(2.0, self.height),
        }
    }

    /// True when the two boxes share an area of positive size.
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

/// Center point of a [`Rect`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate, growing rightwards.
    pub x: f64,
    /// Vertical coordinate, growing downwards.
    pub y: f64,
}

/// A candidate's geometry together with its element handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<E> {
    pub left: f64,
    pub top: f64,
    /// `left + width`.
    pub right: f64,
    /// `top + height`.
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
    /// Floored midpoint, used by the distance functions.
    pub center: Point,
    /// Element the geometry was read from.
    pub element: E,
}

impl<E> Rect<E> {
    /// Build a rect from a bounding box. The center is snapped down to whole
    /// units from the leading edges.
    #[inline]
    pub fn from_box(bounds: BoundingBox, element: E) -> Self {
        Self {
            left: bounds.left,
            top: bounds.top,
            right: bounds.right(),
            bottom: bounds.bottom(),
            width: bounds.width,
            height: bounds.height,
            center: Point {
                x: bounds.left + (bounds.width / 2.0).floor(),
                y: bounds.top + (bounds.height / 2.0).floor(),
            },
            element,
        }
    }
}

impl<E: Copy> Rect<E> {
    /// Zero-sized rect sitting on this rect's center.
    #[inline]
    #[must_use]
    pub fn center_point(&self) -> Self {
        Self {
            left: self.center.x,
            top: self.center.y,
            right: self.center.x,
            bottom: self.center.y,
            width: 0.0,
            height: 0.0,
            center: self.center,
            element: self.element,
        }
    }
}

/// Geometry of `element` from the current layout.
#[inline]
pub fn rect_of<D: Document>(doc: &D, element: D::Element) -> Rect<D::Element> {
    Rect::from_box(doc.bounding_box(element), element)
}

/// Whether `element` can take part in navigation at all, judged from layout
/// and the `disabled` attribute.
pub fn is_on_screen_with_margin<D: Document>(doc: &D, element: D::Element, margin: f64) -> bool {
    if !doc.is_attached(element) || doc.attribute(element, "disabled").is_some() {
        return false;
    }
    let bounds = doc.bounding_box(element);
    if bounds.width <= 0.0 && bounds.height <= 0.0 {
        return false;
    }
    doc.viewport().inflate(margin).intersects(&bounds)
}
