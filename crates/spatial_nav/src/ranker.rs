//! Directional ranking: priority tiers and tie-break distance chains.

use crate::geometry::Rect;
use crate::partition::{Zone, partition};
use core::cmp::Ordering;
use core::fmt::Debug;
use log::debug;

/// A movement direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Direction for a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Self::Up),
            "ArrowRight" => Some(Self::Right),
            "ArrowDown" => Some(Self::Down),
            "ArrowLeft" => Some(Self::Left),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::Left => "left",
        }
    }
}

/// Distance measures. Lower is better; ties fall through to the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Distance {
    /// Horizontal gap to the vertical line through the target's center.
    NearPlumbLine,
    /// Vertical gap to the horizontal line through the target's center.
    NearHorizon,
    /// Horizontal gap to the target's left edge.
    NearTargetLeft,
    /// Vertical gap to the target's top edge.
    NearTargetTop,
    TopIsBetter,
    BottomIsBetter,
    LeftIsBetter,
    RightIsBetter,
}

impl Distance {
    /// Measure `rect` relative to `target`.
    pub fn measure<E>(self, target: &Rect<E>, rect: &Rect<E>) -> f64 {
        match self {
            Self::NearPlumbLine => {
                let gap = if rect.center.x < target.center.x {
                    target.center.x - rect.right
                } else {
                    rect.left - target.center.x
                };
                gap.max(0.0)
            }
            Self::NearHorizon => {
                let gap = if rect.center.y < target.center.y {
                    target.center.y - rect.bottom
                } else {
                    rect.top - target.center.y
                };
                gap.max(0.0)
            }
            Self::NearTargetLeft => {
                let gap = if rect.center.x < target.center.x {
                    target.left - rect.right
                } else {
                    rect.left - target.left
                };
                gap.max(0.0)
            }
            Self::NearTargetTop => {
                let gap = if rect.center.y < target.center.y {
                    target.top - rect.bottom
                } else {
                    rect.top - target.top
                };
                gap.max(0.0)
            }
            Self::TopIsBetter => rect.top,
            Self::BottomIsBetter => -rect.bottom,
            Self::LeftIsBetter => rect.left,
            Self::RightIsBetter => -rect.right,
        }
    }
}

/// One priority tier: candidates plus the distance chain that orders them.
#[derive(Clone, Debug)]
pub struct Priority<E> {
    pub group: Vec<Rect<E>>,
    pub distances: &'static [Distance],
}

const PLUMB_THEN_TOP: &[Distance] = &[Distance::NearPlumbLine, Distance::TopIsBetter];
const HORIZON_THEN_LEFT: &[Distance] = &[Distance::NearHorizon, Distance::LeftIsBetter];
const LEFT_DIAGONALS: &[Distance] = &[
    Distance::NearHorizon,
    Distance::RightIsBetter,
    Distance::NearTargetTop,
];
const RIGHT_DIAGONALS: &[Distance] = &[
    Distance::NearHorizon,
    Distance::LeftIsBetter,
    Distance::NearTargetTop,
];
const UP_DIAGONALS: &[Distance] = &[
    Distance::NearPlumbLine,
    Distance::BottomIsBetter,
    Distance::NearTargetLeft,
];
const DOWN_DIAGONALS: &[Distance] = &[
    Distance::NearPlumbLine,
    Distance::TopIsBetter,
    Distance::NearTargetLeft,
];

/// Zone layout of the three tiers for a direction:
/// (internal zones, straight zone, diagonal zones, straight chain, diagonal chain).
type TierLayout = (
    [Zone; 3],
    Zone,
    [Zone; 2],
    &'static [Distance],
    &'static [Distance],
);

const fn tier_layout(direction: Direction) -> TierLayout {
    match direction {
        Direction::Left => (
            [Zone::TopLeft, Zone::Left, Zone::BottomLeft],
            Zone::Left,
            [Zone::TopLeft, Zone::BottomLeft],
            PLUMB_THEN_TOP,
            LEFT_DIAGONALS,
        ),
        Direction::Right => (
            [Zone::TopRight, Zone::Right, Zone::BottomRight],
            Zone::Right,
            [Zone::TopRight, Zone::BottomRight],
            PLUMB_THEN_TOP,
            RIGHT_DIAGONALS,
        ),
        Direction::Up => (
            [Zone::TopLeft, Zone::Top, Zone::TopRight],
            Zone::Top,
            [Zone::TopLeft, Zone::TopRight],
            HORIZON_THEN_LEFT,
            UP_DIAGONALS,
        ),
        Direction::Down => (
            [Zone::BottomLeft, Zone::Bottom, Zone::BottomRight],
            Zone::Bottom,
            [Zone::BottomLeft, Zone::BottomRight],
            HORIZON_THEN_LEFT,
            DOWN_DIAGONALS,
        ),
    }
}

/// Build the ordered tiers for moving from `target` in `direction`.
pub fn priorities<E: Copy>(
    target: &Rect<E>,
    candidates: &[Rect<E>],
    direction: Direction,
    straight_overlap_threshold: f64,
    straight_only: bool,
) -> Vec<Priority<E>> {
    let groups = partition(candidates, target, straight_overlap_threshold);
    // Same-area candidates are split again around the target's center point.
    let internal = partition(
        groups.get(Zone::Center),
        &target.center_point(),
        straight_overlap_threshold,
    );
    let (inner, straight, diagonal, straight_chain, diagonal_chain) = tier_layout(direction);

    let mut tiers = vec![
        Priority {
            group: internal.union(&inner),
            distances: straight_chain,
        },
        Priority {
            group: groups.get(straight).to_vec(),
            distances: straight_chain,
        },
    ];
    if !straight_only {
        tiers.push(Priority {
            group: groups.union(&diagonal),
            distances: diagonal_chain,
        });
    }
    tiers
}

/// Pick the first non-empty tier and sort it by its distance chain.
/// Returns `None` when every tier is empty.
pub fn prioritize<E: Copy>(target: &Rect<E>, tiers: Vec<Priority<E>>) -> Option<Vec<Rect<E>>> {
    let Priority {
        mut group,
        distances,
    } = tiers.into_iter().find(|tier| !tier.group.is_empty())?;

    group.sort_by(|lhs, rhs| {
        for distance in distances {
            let ordering = distance
                .measure(target, lhs)
                .total_cmp(&distance.measure(target, rhs));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    Some(group)
}

/// Best candidate for moving from `target` in `direction`, if any.
pub fn navigate<E: Copy + Debug>(
    target: &Rect<E>,
    direction: Direction,
    candidates: &[Rect<E>],
    straight_overlap_threshold: f64,
    straight_only: bool,
) -> Option<E> {
    if candidates.is_empty() {
        return None;
    }
    let tiers = priorities(
        target,
        candidates,
        direction,
        straight_overlap_threshold,
        straight_only,
    );
    let winner = prioritize(target, tiers)?.first().map(|rect| rect.element);
    debug!(
        "navigate {} from {:?}: {} candidates -> {winner:?}",
        direction.as_str(),
        target.element,
        candidates.len()
    );
    winner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;

    fn rect(id: u32, left: f64, top: f64, width: f64, height: f64) -> Rect<u32> {
        Rect::from_box(BoundingBox::new(left, top, width, height), id)
    }

    #[test]
    fn straight_candidate_beats_diagonal_at_same_distance() {
        let target = rect(0, 100.0, 100.0, 50.0, 50.0);
        let above = rect(1, 100.0, 20.0, 50.0, 50.0);
        let above_left = rect(2, 20.0, 20.0, 50.0, 50.0);
        let winner = navigate(&target, Direction::Up, &[above_left, above], 0.5, false);
        assert_eq!(winner, Some(1));
    }

    #[test]
    fn nearest_in_straight_zone_wins() {
        let target = rect(0, 0.0, 0.0, 50.0, 50.0);
        let far = rect(1, 200.0, 0.0, 50.0, 50.0);
        let near = rect(2, 80.0, 0.0, 50.0, 50.0);
        assert_eq!(navigate(&target, Direction::Right, &[far, near], 0.5, false), Some(2));
    }

    #[test]
    fn diagonal_tier_is_used_only_when_straight_is_empty() {
        let target = rect(0, 100.0, 100.0, 50.0, 50.0);
        let lower_right = rect(1, 200.0, 200.0, 50.0, 50.0);
        assert_eq!(
            navigate(&target, Direction::Right, &[lower_right], 0.5, false),
            Some(1)
        );
        assert_eq!(
            navigate(&target, Direction::Right, &[lower_right], 0.5, true),
            None
        );
    }

    #[test]
    fn internal_group_takes_precedence() {
        // A large container target with a small element inside its area.
        let target = rect(0, 0.0, 0.0, 300.0, 300.0);
        let inside_left = rect(1, 10.0, 100.0, 20.0, 20.0);
        let outside_left = rect(2, -60.0, 140.0, 50.0, 20.0);
        assert_eq!(
            navigate(&target, Direction::Left, &[outside_left, inside_left], 0.5, false),
            Some(1)
        );
    }

    #[test]
    fn ties_keep_input_order() {
        let target = rect(0, 100.0, 100.0, 50.0, 50.0);
        let first = rect(1, 100.0, 200.0, 50.0, 50.0);
        let twin = rect(2, 100.0, 200.0, 50.0, 50.0);
        assert_eq!(navigate(&target, Direction::Down, &[first, twin], 0.5, false), Some(1));
        assert_eq!(navigate(&target, Direction::Down, &[twin, first], 0.5, false), Some(2));
    }

    #[test]
    fn plumb_line_distance_is_clamped() {
        let target = rect(0, 100.0, 100.0, 50.0, 50.0);
        let overlapping = rect(1, 110.0, 0.0, 100.0, 20.0);
        assert_eq!(Distance::NearPlumbLine.measure(&target, &overlapping), 0.0);
        let right = rect(2, 200.0, 0.0, 10.0, 10.0);
        assert_eq!(Distance::NearPlumbLine.measure(&target, &right), 75.0);
    }
}
