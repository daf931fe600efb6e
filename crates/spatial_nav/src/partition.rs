//! Nine-zone partitioning of candidates around a reference rectangle.
//!
//! ```text
//!  0 | 1 | 2
//! ---+---+---
//!  3 | 4 | 5
//! ---+---+---
//!  6 | 7 | 8
//! ```
//!
//! Each candidate lands in exactly one zone by its center. Corner candidates
//! that overlap the reference enough along one axis are also copied into the
//! adjacent straight zone.

use crate::geometry::Rect;
use log::trace;

/// Zone index in row-major compass order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Zone {
    TopLeft = 0,
    Top = 1,
    TopRight = 2,
    Left = 3,
    Center = 4,
    Right = 5,
    BottomLeft = 6,
    Bottom = 7,
    BottomRight = 8,
}

impl Zone {
    /// All zones in index order.
    pub const ALL: [Self; 9] = [
        Self::TopLeft,
        Self::Top,
        Self::TopRight,
        Self::Left,
        Self::Center,
        Self::Right,
        Self::BottomLeft,
        Self::Bottom,
        Self::BottomRight,
    ];

    /// Zone for a column (0..3) and row (0..3).
    #[inline]
    fn from_cell(column: usize, row: usize) -> Self {
        Self::ALL
            .get(row.saturating_mul(3).saturating_add(column))
            .copied()
            .unwrap_or(Self::Center)
    }

    /// True for the four corner zones.
    #[inline]
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Self::TopLeft | Self::TopRight | Self::BottomLeft | Self::BottomRight
        )
    }
}

/// Candidates grouped per zone. Promoted corner candidates appear twice.
#[derive(Clone, Debug)]
pub struct Zones<E> {
    groups: [Vec<Rect<E>>; 9],
}

impl<E: Copy> Zones<E> {
    /// Candidates in `zone`, in input order.
    #[inline]
    pub fn get(&self, zone: Zone) -> &[Rect<E>] {
        &self.groups[zone as usize]
    }

    /// Concatenate several zones, preserving the order given.
    pub fn union(&self, zones: &[Zone]) -> Vec<Rect<E>> {
        zones
            .iter()
            .flat_map(|zone| self.get(*zone).iter().copied())
            .collect()
    }

    #[inline]
    fn push(&mut self, zone: Zone, rect: Rect<E>) {
        self.groups[zone as usize].push(rect);
    }
}

/// Column or row of a center coordinate against the `[low, high]` span.
#[inline]
fn band(value: f64, low: f64, high: f64) -> usize {
    if value < low {
        0
    } else if value <= high {
        1
    } else {
        2
    }
}

/// Partition `rects` around `target`. `threshold` is the fraction of the
/// target's width/height a corner candidate must reach past for promotion.
pub fn partition<E: Copy>(rects: &[Rect<E>], target: &Rect<E>, threshold: f64) -> Zones<E> {
    let mut zones = Zones {
        groups: Default::default(),
    };

    for rect in rects {
        let column = band(rect.center.x, target.left, target.right);
        let row = band(rect.center.y, target.top, target.bottom);
        let zone = Zone::from_cell(column, row);
        zones.push(zone, *rect);

        if !zone.is_diagonal() {
            continue;
        }

        if rect.left <= target.right - target.width * threshold {
            match zone {
                Zone::TopRight => zones.push(Zone::Top, *rect),
                Zone::BottomRight => zones.push(Zone::Bottom, *rect),
                _ => {}
            }
        }
        if rect.right >= target.left + target.width * threshold {
            match zone {
                Zone::TopLeft => zones.push(Zone::Top, *rect),
                Zone::BottomLeft => zones.push(Zone::Bottom, *rect),
                _ => {}
            }
        }
        if rect.top <= target.bottom - target.height * threshold {
            match zone {
                Zone::BottomLeft => zones.push(Zone::Left, *rect),
                Zone::BottomRight => zones.push(Zone::Right, *rect),
                _ => {}
            }
        }
        if rect.bottom >= target.top + target.height * threshold {
            match zone {
                Zone::TopLeft => zones.push(Zone::Left, *rect),
                Zone::TopRight => zones.push(Zone::Right, *rect),
                _ => {}
            }
        }
    }

    trace!(
        "partition: {} candidates -> {:?}",
        rects.len(),
        zones.groups.each_ref().map(Vec::len)
    );
    zones
}
