// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Directional focus selection over window-space regions.

use alloc::vec::Vec;
use kurbo::Rect;
use smallvec::SmallVec;

/// A direction for geometric focus movement.
///
/// Coordinates are y-down: `Up` means smaller `y`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards smaller `y`.
    Up,
    /// Towards larger `y`.
    Down,
    /// Towards smaller `x`.
    Left,
    /// Towards larger `x`.
    Right,
    /// Towards smaller `x` and smaller `y`.
    UpLeft,
    /// Towards larger `x` and smaller `y`.
    UpRight,
    /// Towards smaller `x` and larger `y`.
    DownLeft,
    /// Towards larger `x` and larger `y`.
    DownRight,
}

/// A candidate region: the visible part of a focusable node's window-space bounds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FocusRegion<K> {
    /// Identifier of the node owning this region.
    pub id: K,
    /// Window-space rectangle.
    pub rect: Rect,
}

/// An ordered collection of candidate regions.
///
/// Regions are collected in tree pre-order, back to front. A node drawn in front of
/// previously collected regions should [`occlude`](Self::occlude) them before pushing its
/// own region, so that only the visible parts of a candidate compete.
#[derive(Clone, Debug, PartialEq)]
pub struct FocusRegions<K> {
    regions: Vec<FocusRegion<K>>,
}

impl<K> Default for FocusRegions<K> {
    fn default() -> Self {
        Self {
            regions: Vec::new(),
        }
    }
}

impl<K: Copy> FocusRegions<K> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate region.
    pub fn push(&mut self, id: K, rect: Rect) {
        self.regions.push(FocusRegion { id, rect });
    }

    /// Cut `rect` out of every region collected so far.
    ///
    /// Regions that become empty are dropped; partially covered regions split into up to
    /// four pieces.
    pub fn occlude(&mut self, rect: Rect) {
        if rect.is_zero_area() {
            return;
        }
        let previous = core::mem::take(&mut self.regions);
        for region in previous {
            for piece in subtract_rect(region.rect, rect) {
                self.regions.push(FocusRegion {
                    id: region.id,
                    rect: piece,
                });
            }
        }
    }

    /// The collected regions, in collection order.
    pub fn regions(&self) -> &[FocusRegion<K>] {
        &self.regions
    }

    /// Returns true if no regions have been collected.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Choose the best region relative to `current` in `direction`.
    ///
    /// A region qualifies when it lies beyond `current` in the requested direction:
    /// - `Right`/`Down` require the region's far edge to exceed the current far edge;
    ///   `Left`/`Up` require its near edge to be before the current near edge.
    /// - Axis-aligned directions additionally require non-zero overlap on the perpendicular
    ///   axis.
    /// - Diagonals require both axis tests to hold strictly and ignore overlap.
    ///
    /// The qualifying region with the smallest rectangle-to-rectangle distance wins. Ties are
    /// broken by larger perpendicular overlap, then by smaller perpendicular coordinate
    /// (`y0` for horizontal moves, `x0` for vertical moves), then by collection order.
    pub fn best_in_direction(&self, current: Rect, direction: Direction) -> Option<K> {
        let mut best: Option<(K, Score)> = None;
        for region in &self.regions {
            let Some(score) = Score::compute(current, region.rect, direction) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some((_, incumbent)) => score.beats(incumbent),
            };
            if better {
                best = Some((region.id, score));
            }
        }
        best.map(|(id, _)| id)
    }
}

#[derive(Copy, Clone, Debug)]
struct Score {
    /// Squared rectangle-to-rectangle distance; ordering matches the true distance.
    distance_sq: f64,
    overlap: f64,
    perpendicular: f64,
}

impl Score {
    fn compute(current: Rect, r: Rect, direction: Direction) -> Option<Self> {
        let x_overlap = (current.x1.min(r.x1) - current.x0.max(r.x0)).max(0.0);
        let y_overlap = (current.y1.min(r.y1) - current.y0.max(r.y0)).max(0.0);

        let beyond_right = r.x1 > current.x1;
        let beyond_left = r.x0 < current.x0;
        let beyond_down = r.y1 > current.y1;
        let beyond_up = r.y0 < current.y0;

        let (qualifies, overlap, perpendicular) = match direction {
            Direction::Right => (y_overlap > 0.0 && beyond_right, y_overlap, r.y0),
            Direction::Left => (y_overlap > 0.0 && beyond_left, y_overlap, r.y0),
            Direction::Down => (x_overlap > 0.0 && beyond_down, x_overlap, r.x0),
            Direction::Up => (x_overlap > 0.0 && beyond_up, x_overlap, r.x0),
            Direction::UpLeft => (beyond_up && beyond_left, 0.0, 0.0),
            Direction::UpRight => (beyond_up && beyond_right, 0.0, 0.0),
            Direction::DownLeft => (beyond_down && beyond_left, 0.0, 0.0),
            Direction::DownRight => (beyond_down && beyond_right, 0.0, 0.0),
        };
        if !qualifies {
            return None;
        }

        let dx = (r.x0 - current.x1).max(current.x0 - r.x1).max(0.0);
        let dy = (r.y0 - current.y1).max(current.y0 - r.y1).max(0.0);
        Some(Self {
            distance_sq: dx * dx + dy * dy,
            overlap,
            perpendicular,
        })
    }

    fn beats(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }
        if self.overlap != other.overlap {
            return self.overlap > other.overlap;
        }
        self.perpendicular < other.perpendicular
    }
}

/// Subtract `cut` from `rect`, returning the remaining pieces.
///
/// The result is empty if `cut` covers `rect`, and `[rect]` if they do not overlap with a
/// positive area.
pub fn subtract_rect(rect: Rect, cut: Rect) -> SmallVec<[Rect; 4]> {
    let mut out = SmallVec::new();
    let hit = rect.intersect(cut);
    if hit.is_zero_area() || hit.width() < 0.0 || hit.height() < 0.0 {
        out.push(rect);
        return out;
    }
    let candidates = [
        // Above the cut, full width.
        Rect::new(rect.x0, rect.y0, rect.x1, hit.y0),
        // Below the cut, full width.
        Rect::new(rect.x0, hit.y1, rect.x1, rect.y1),
        // Left of the cut, cut height.
        Rect::new(rect.x0, hit.y0, hit.x0, hit.y1),
        // Right of the cut, cut height.
        Rect::new(hit.x1, hit.y0, rect.x1, hit.y1),
    ];
    for piece in candidates {
        if piece.width() > 0.0 && piece.height() > 0.0 {
            out.push(piece);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(x, y, x + w, y + h)
    }

    #[test]
    fn right_prefers_overlapping_candidate() {
        let mut regions = FocusRegions::new();
        regions.push(1_u8, rect(50.0, 0.0, 10.0, 10.0));
        regions.push(2_u8, rect(50.0, 50.0, 10.0, 10.0));
        let current = rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(regions.best_in_direction(current, Direction::Right), Some(1));
    }

    #[test]
    fn axis_moves_require_perpendicular_overlap() {
        let mut regions = FocusRegions::new();
        regions.push(1_u8, rect(50.0, 50.0, 10.0, 10.0));
        let current = rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(regions.best_in_direction(current, Direction::Right), None);
        assert_eq!(regions.best_in_direction(current, Direction::Down), None);
        assert_eq!(
            regions.best_in_direction(current, Direction::DownRight),
            Some(1)
        );
    }

    #[test]
    fn candidates_behind_are_ignored() {
        let mut regions = FocusRegions::new();
        regions.push(1_u8, rect(-50.0, 0.0, 10.0, 10.0));
        let current = rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(regions.best_in_direction(current, Direction::Right), None);
        assert_eq!(regions.best_in_direction(current, Direction::Left), Some(1));
        assert_eq!(regions.best_in_direction(current, Direction::Up), None);
    }

    #[test]
    fn diagonals_need_both_axes() {
        let mut regions = FocusRegions::new();
        regions.push(1_u8, rect(50.0, -50.0, 10.0, 10.0));
        regions.push(2_u8, rect(50.0, 0.0, 10.0, 10.0));
        let current = rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(regions.best_in_direction(current, Direction::UpRight), Some(1));
        assert_eq!(regions.best_in_direction(current, Direction::DownRight), None);
        assert_eq!(regions.best_in_direction(current, Direction::UpLeft), None);
    }

    #[test]
    fn nearest_candidate_wins() {
        let mut regions = FocusRegions::new();
        regions.push(1_u8, rect(100.0, 0.0, 10.0, 10.0));
        regions.push(2_u8, rect(30.0, 0.0, 10.0, 10.0));
        let current = rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(regions.best_in_direction(current, Direction::Right), Some(2));
    }

    #[test]
    fn equal_distance_prefers_larger_overlap_then_smaller_perpendicular() {
        let current = rect(0.0, 0.0, 10.0, 10.0);

        let mut regions = FocusRegions::new();
        regions.push(1_u8, rect(30.0, 5.0, 10.0, 10.0));
        regions.push(2_u8, rect(30.0, 0.0, 10.0, 10.0));
        assert_eq!(
            regions.best_in_direction(current, Direction::Right),
            Some(2),
            "full overlap beats partial overlap"
        );

        let mut regions = FocusRegions::new();
        regions.push(1_u8, rect(30.0, 0.0, 10.0, 20.0));
        regions.push(2_u8, rect(30.0, -5.0, 10.0, 20.0));
        assert_eq!(
            regions.best_in_direction(current, Direction::Right),
            Some(2),
            "equal overlap falls back to the smaller top edge"
        );
    }

    #[test]
    fn full_tie_keeps_collection_order() {
        let mut regions = FocusRegions::new();
        regions.push(7_u8, rect(30.0, 0.0, 10.0, 10.0));
        regions.push(3_u8, rect(30.0, 0.0, 10.0, 10.0));
        let current = rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(regions.best_in_direction(current, Direction::Right), Some(7));
    }

    #[test]
    fn occluded_regions_do_not_compete() {
        let mut regions = FocusRegions::new();
        regions.push(1_u8, rect(30.0, 0.0, 10.0, 10.0));
        regions.occlude(rect(25.0, -5.0, 20.0, 20.0));
        assert!(regions.is_empty());

        regions.push(2_u8, rect(30.0, 0.0, 10.0, 10.0));
        regions.occlude(rect(30.0, 0.0, 5.0, 10.0));
        assert_eq!(regions.regions().len(), 1);
        assert_eq!(regions.regions()[0].rect, rect(35.0, 0.0, 5.0, 10.0));
    }

    #[test]
    fn subtract_splits_into_pieces() {
        let pieces = subtract_rect(rect(0.0, 0.0, 30.0, 30.0), rect(10.0, 10.0, 10.0, 10.0));
        assert_eq!(pieces.len(), 4);
        let area: f64 = pieces.iter().map(Rect::area).sum();
        assert_eq!(area, 800.0);

        let untouched = subtract_rect(rect(0.0, 0.0, 10.0, 10.0), rect(20.0, 20.0, 5.0, 5.0));
        assert_eq!(untouched.as_slice(), &[rect(0.0, 0.0, 10.0, 10.0)]);
    }
}
