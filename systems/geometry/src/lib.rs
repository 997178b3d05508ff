#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure geometric predicates over station coordinates.
//!
//! Nothing here knows about lines, owners or station ids. Callers supply
//! coordinates and, for the pass-through walk, a closure reporting which grid
//! cells hold a station.

use metro_core::GridCoord;

/// Reports whether `a` and `b` share a row, a column, or an exact 45° diagonal.
///
/// Identical coordinates count as aligned; rejecting self-connections is the
/// caller's concern.
#[must_use]
pub fn is_aligned(a: GridCoord, b: GridCoord) -> bool {
    let dx = a.x().abs_diff(b.x());
    let dy = a.y().abs_diff(b.y());
    dx == 0 || dy == 0 || dx == dy
}

/// Cells lying strictly between two aligned coordinates, walked from `a` toward `b`.
///
/// Yields nothing when the coordinates are not aligned.
pub fn interior_cells(a: GridCoord, b: GridCoord) -> impl Iterator<Item = GridCoord> {
    let step_x = step(a.x(), b.x());
    let step_y = step(a.y(), b.y());
    let span = a.x().abs_diff(b.x()).max(a.y().abs_diff(b.y()));
    let steps = if is_aligned(a, b) {
        span.saturating_sub(1)
    } else {
        0
    };

    (1..=steps).map(move |offset| {
        let offset = i64::from(offset);
        let x = i64::from(a.x()) + step_x * offset;
        let y = i64::from(a.y()) + step_y * offset;
        GridCoord::new(to_axis(x), to_axis(y))
    })
}

/// Returns the first interior cell between `a` and `b` for which `occupied` holds.
///
/// The `occupied` closure should report whether any station, claimed or not,
/// sits on the provided cell.
pub fn first_blocked_cell<F>(a: GridCoord, b: GridCoord, mut occupied: F) -> Option<GridCoord>
where
    F: FnMut(GridCoord) -> bool,
{
    interior_cells(a, b).find(|cell| occupied(*cell))
}

/// Reports whether segment `p1..p2` crosses segment `q1..q2`.
///
/// Segments that only touch at a shared endpoint do not intersect. Collinear
/// segments that overlap along a stretch do.
#[must_use]
pub fn segments_intersect(p1: GridCoord, p2: GridCoord, q1: GridCoord, q2: GridCoord) -> bool {
    let o1 = orientation(p1, p2, q1);
    let o2 = orientation(p1, p2, q2);
    let o3 = orientation(q1, q2, p1);
    let o4 = orientation(q1, q2, p2);

    if let Some((shared, p_other, q_other)) = shared_endpoint(p1, p2, q1, q2) {
        if o1 != 0 || o2 != 0 {
            return false;
        }
        let (px, py) = delta(shared, p_other);
        let (qx, qy) = delta(shared, q_other);
        return px * qx + py * qy > 0;
    }

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == 0 && on_segment(p1, q1, p2))
        || (o2 == 0 && on_segment(p1, q2, p2))
        || (o3 == 0 && on_segment(q1, p1, q2))
        || (o4 == 0 && on_segment(q1, p2, q2))
}

fn shared_endpoint(
    p1: GridCoord,
    p2: GridCoord,
    q1: GridCoord,
    q2: GridCoord,
) -> Option<(GridCoord, GridCoord, GridCoord)> {
    if p1 == q1 {
        Some((p1, p2, q2))
    } else if p1 == q2 {
        Some((p1, p2, q1))
    } else if p2 == q1 {
        Some((p2, p1, q2))
    } else if p2 == q2 {
        Some((p2, p1, q1))
    } else {
        None
    }
}

/// Sign of the turn `p -> q -> r`: 0 collinear, 1 clockwise, -1 counter-clockwise.
fn orientation(p: GridCoord, q: GridCoord, r: GridCoord) -> i64 {
    let (pq_x, pq_y) = delta(p, q);
    let (qr_x, qr_y) = delta(q, r);
    (pq_y * qr_x - pq_x * qr_y).signum()
}

/// Whether collinear point `q` lies within the bounding box of `p..r`.
fn on_segment(p: GridCoord, q: GridCoord, r: GridCoord) -> bool {
    q.x() >= p.x().min(r.x())
        && q.x() <= p.x().max(r.x())
        && q.y() >= p.y().min(r.y())
        && q.y() <= p.y().max(r.y())
}

fn delta(from: GridCoord, to: GridCoord) -> (i64, i64) {
    (
        i64::from(to.x()) - i64::from(from.x()),
        i64::from(to.y()) - i64::from(from.y()),
    )
}

fn step(from: u32, to: u32) -> i64 {
    (i64::from(to) - i64::from(from)).signum()
}

fn to_axis(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: u32, y: u32) -> GridCoord {
        GridCoord::new(x, y)
    }

    #[test]
    fn alignment_accepts_straight_and_diagonal_pairs() {
        assert!(is_aligned(at(2, 2), at(2, 8)));
        assert!(is_aligned(at(0, 5), at(9, 5)));
        assert!(is_aligned(at(1, 1), at(4, 4)));
        assert!(is_aligned(at(6, 1), at(1, 6)));
    }

    #[test]
    fn alignment_rejects_knight_moves() {
        assert!(!is_aligned(at(0, 0), at(1, 2)));
        assert!(!is_aligned(at(3, 3), at(7, 5)));
    }

    #[test]
    fn interior_walk_visits_each_cell_between_endpoints() {
        let cells: Vec<GridCoord> = interior_cells(at(5, 5), at(2, 2)).collect();
        assert_eq!(cells, vec![at(4, 4), at(3, 3)]);

        let cells: Vec<GridCoord> = interior_cells(at(0, 7), at(0, 4)).collect();
        assert_eq!(cells, vec![at(0, 6), at(0, 5)]);
    }

    #[test]
    fn interior_walk_is_empty_for_neighbours_and_misaligned_pairs() {
        assert_eq!(interior_cells(at(3, 3), at(4, 4)).count(), 0);
        assert_eq!(interior_cells(at(0, 0), at(2, 5)).count(), 0);
    }

    #[test]
    fn blocked_cell_reports_first_occupied_interior() {
        let blocked = first_blocked_cell(at(0, 0), at(0, 6), |cell| cell.y() == 3 || cell.y() == 5);
        assert_eq!(blocked, Some(at(0, 3)));
        assert_eq!(first_blocked_cell(at(0, 0), at(0, 6), |_| false), None);
    }

    #[test]
    fn diagonals_of_a_unit_square_cross() {
        assert!(segments_intersect(at(0, 0), at(1, 1), at(0, 1), at(1, 0)));
        assert!(segments_intersect(at(1, 0), at(0, 1), at(1, 1), at(0, 0)));
    }

    #[test]
    fn shared_endpoint_is_not_a_crossing() {
        assert!(!segments_intersect(at(0, 0), at(2, 2), at(2, 2), at(4, 0)));
        assert!(!segments_intersect(at(0, 0), at(2, 0), at(2, 0), at(5, 0)));
    }

    #[test]
    fn collinear_overlap_counts_as_crossing() {
        assert!(segments_intersect(at(0, 0), at(4, 0), at(2, 0), at(6, 0)));
        assert!(segments_intersect(at(0, 0), at(4, 0), at(0, 0), at(2, 0)));
    }

    #[test]
    fn disjoint_segments_do_not_cross() {
        assert!(!segments_intersect(at(0, 0), at(2, 0), at(3, 0), at(5, 0)));
        assert!(!segments_intersect(at(0, 0), at(3, 3), at(0, 1), at(0, 5)));
        assert!(!segments_intersect(at(0, 0), at(2, 2), at(1, 0), at(3, 2)));
    }

    #[test]
    fn crossing_is_direction_agnostic() {
        let cases = [
            (at(0, 2), at(4, 2), at(2, 0), at(2, 4)),
            (at(0, 0), at(3, 3), at(3, 0), at(0, 3)),
        ];
        for (p1, p2, q1, q2) in cases {
            assert!(segments_intersect(p1, p2, q1, q2));
            assert!(segments_intersect(p2, p1, q1, q2));
            assert!(segments_intersect(q2, q1, p1, p2));
        }
    }
}
