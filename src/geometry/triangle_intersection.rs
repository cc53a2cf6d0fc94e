// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle-triangle and triangle-segment intersection tests
//!
//! Both tests treat triangles and segments as closed point sets, so touching
//! at a single point counts as intersecting. They only evaluate orientation
//! signs, which makes them exact whenever the [`Orientation`] is.
//!
//! The triangle-triangle test follows Guigue and Devillers, "Fast and Robust
//! Triangle-Triangle Overlap Test Using Orientation Predicates" (2003).

use super::robust_predicates::{Orientation, Sign};
use crate::error::KernelError;
use nalgebra::{Point2, Point3};

/// Do two closed triangles share at least one point?
pub fn triangles_intersect<O: Orientation>(
    first: &[Point3<f64>; 3],
    second: &[Point3<f64>; 3],
) -> Result<bool, KernelError> {
    let axis = projection_axis::<O>(first)?;
    projection_axis::<O>(second)?;

    let [p1, q1, r1] = first;
    let [p2, q2, r2] = second;

    let dp1 = O::orient3d(p2, q2, r2, p1);
    let dq1 = O::orient3d(p2, q2, r2, q1);
    let dr1 = O::orient3d(p2, q2, r2, r1);
    if strictly_one_side(dp1, dq1, dr1) {
        return Ok(false);
    }

    let dp2 = O::orient3d(p1, q1, r1, p2);
    let dq2 = O::orient3d(p1, q1, r1, q2);
    let dr2 = O::orient3d(p1, q1, r1, r2);
    if strictly_one_side(dp2, dq2, dr2) {
        return Ok(false);
    }

    if dp1.is_zero() && dq1.is_zero() && dr1.is_zero() {
        return Ok(coplanar_triangles::<O>(first, second, axis));
    }

    // Rotate the first triangle so p1 is alone on its side of the second
    // triangle's plane, swapping the second triangle's orientation to keep
    // p1 on its positive side.
    use Sign::*;
    let verdict = match (dp1, dq1, dr1) {
        (Positive, Positive, _) => split::<O>([r1, p1, q1], [p2, r2, q2], [dp2, dr2, dq2]),
        (Positive, _, Positive) => split::<O>([q1, r1, p1], [p2, r2, q2], [dp2, dr2, dq2]),
        (Positive, _, _) => split::<O>([p1, q1, r1], [p2, q2, r2], [dp2, dq2, dr2]),
        (Negative, Negative, _) => split::<O>([r1, p1, q1], [p2, q2, r2], [dp2, dq2, dr2]),
        (Negative, _, Negative) => split::<O>([q1, r1, p1], [p2, q2, r2], [dp2, dq2, dr2]),
        (Negative, _, _) => split::<O>([p1, q1, r1], [p2, r2, q2], [dp2, dr2, dq2]),
        (Zero, Negative, Negative) => split::<O>([p1, q1, r1], [p2, q2, r2], [dp2, dq2, dr2]),
        (Zero, Negative, _) => split::<O>([q1, r1, p1], [p2, r2, q2], [dp2, dr2, dq2]),
        (Zero, Positive, Positive) => split::<O>([p1, q1, r1], [p2, r2, q2], [dp2, dr2, dq2]),
        (Zero, Positive, _) => split::<O>([q1, r1, p1], [p2, q2, r2], [dp2, dq2, dr2]),
        (Zero, Zero, Positive) => split::<O>([r1, p1, q1], [p2, q2, r2], [dp2, dq2, dr2]),
        (Zero, Zero, Negative) => split::<O>([r1, p1, q1], [p2, r2, q2], [dp2, dr2, dq2]),
        (Zero, Zero, Zero) => None,
    };

    Ok(verdict.unwrap_or_else(|| coplanar_triangles::<O>(first, second, axis)))
}

/// Does a closed triangle share at least one point with a closed segment?
pub fn triangle_segment_intersect<O: Orientation>(
    triangle: &[Point3<f64>; 3],
    segment: &[Point3<f64>; 2],
) -> Result<bool, KernelError> {
    let axis = projection_axis::<O>(triangle)?;
    if !segment.iter().all(all_finite) {
        return Err(KernelError::NonFiniteCoordinate);
    }

    let [a, b, c] = triangle;
    let [p, q] = segment;

    let side_p = O::orient3d(a, b, c, p);
    let side_q = O::orient3d(a, b, c, q);

    let hit = match (side_p, side_q) {
        (Sign::Positive, Sign::Positive) | (Sign::Negative, Sign::Negative) => false,
        (Sign::Zero, Sign::Zero) => coplanar_segment::<O>(triangle, segment, axis),
        (Sign::Zero, _) => point_in_triangle::<O>(&project(p, axis), &project_triangle(triangle, axis)),
        (_, Sign::Zero) => point_in_triangle::<O>(&project(q, axis), &project_triangle(triangle, axis)),
        _ => {
            // The supporting line of pq pierces the plane; it hits the triangle
            // when it passes on the same side of all three edges.
            let sides = [
                O::orient3d(p, q, a, b),
                O::orient3d(p, q, b, c),
                O::orient3d(p, q, c, a),
            ];
            !(sides.contains(&Sign::Positive) && sides.contains(&Sign::Negative))
        }
    };

    Ok(hit)
}

fn all_finite(point: &Point3<f64>) -> bool {
    point.coords.iter().all(|coordinate| coordinate.is_finite())
}

fn strictly_one_side(a: Sign, b: Sign, c: Sign) -> bool {
    !a.is_zero() && a == b && a == c
}

/// Pick the coordinate axis to drop when projecting the triangle to 2-D.
///
/// Prefers the largest normal component and returns the first axis whose
/// projection is exactly non-degenerate.
fn projection_axis<O: Orientation>(triangle: &[Point3<f64>; 3]) -> Result<usize, KernelError> {
    if !triangle.iter().all(all_finite) {
        return Err(KernelError::NonFiniteCoordinate);
    }

    let [a, b, c] = triangle;
    let normal = (b - a).cross(&(c - a));
    let mut axes = [0, 1, 2];
    axes.sort_by(|&i, &j| normal[j].abs().total_cmp(&normal[i].abs()));

    axes.into_iter()
        .find(|&axis| {
            let [pa, pb, pc] = project_triangle(triangle, axis);
            !O::orient2d(&pa, &pb, &pc).is_zero()
        })
        .ok_or(KernelError::DegenerateTriangle)
}

/// Drops `axis`, keeping the remaining coordinates in cyclic order
fn project(point: &Point3<f64>, axis: usize) -> Point2<f64> {
    match axis {
        0 => Point2::new(point.y, point.z),
        1 => Point2::new(point.z, point.x),
        _ => Point2::new(point.x, point.y),
    }
}

fn project_triangle(triangle: &[Point3<f64>; 3], axis: usize) -> [Point2<f64>; 3] {
    [
        project(&triangle[0], axis),
        project(&triangle[1], axis),
        project(&triangle[2], axis),
    ]
}

/// Classifies the second triangle's edges against the first triangle once
/// p1 is known to be strictly above the second triangle's plane. `None`
/// means the configuration is coplanar.
fn split<O: Orientation>(
    first: [&Point3<f64>; 3],
    second: [&Point3<f64>; 3],
    sides: [Sign; 3],
) -> Option<bool> {
    let [p1, q1, r1] = first;
    let [p2, q2, r2] = second;

    use Sign::*;
    let verdict = match sides {
        [Positive, Positive, _] => check_min_max::<O>([p1, r1, q1], [r2, p2, q2]),
        [Positive, _, Positive] => check_min_max::<O>([p1, r1, q1], [q2, r2, p2]),
        [Positive, _, _] => check_min_max::<O>([p1, q1, r1], [p2, q2, r2]),
        [Negative, Negative, _] => check_min_max::<O>([p1, q1, r1], [r2, p2, q2]),
        [Negative, _, Negative] => check_min_max::<O>([p1, q1, r1], [q2, r2, p2]),
        [Negative, _, _] => check_min_max::<O>([p1, r1, q1], [p2, q2, r2]),
        [Zero, Negative, Negative] => check_min_max::<O>([p1, q1, r1], [p2, q2, r2]),
        [Zero, Negative, _] => check_min_max::<O>([p1, r1, q1], [q2, r2, p2]),
        [Zero, Positive, Positive] => check_min_max::<O>([p1, r1, q1], [p2, q2, r2]),
        [Zero, Positive, _] => check_min_max::<O>([p1, q1, r1], [q2, r2, p2]),
        [Zero, Zero, Positive] => check_min_max::<O>([p1, q1, r1], [r2, p2, q2]),
        [Zero, Zero, Negative] => check_min_max::<O>([p1, r1, q1], [r2, p2, q2]),
        [Zero, Zero, Zero] => return None,
    };
    Some(verdict)
}

/// Interval overlap along the line where the two supporting planes meet
fn check_min_max<O: Orientation>(first: [&Point3<f64>; 3], second: [&Point3<f64>; 3]) -> bool {
    let [p1, q1, r1] = first;
    let [p2, q2, r2] = second;

    if O::orient3d(q1, p2, p1, q2) == Sign::Positive {
        return false;
    }
    O::orient3d(p1, p2, r1, r2) != Sign::Positive
}

fn coplanar_triangles<O: Orientation>(
    first: &[Point3<f64>; 3],
    second: &[Point3<f64>; 3],
    axis: usize,
) -> bool {
    let first = counter_clockwise::<O>(project_triangle(first, axis));
    let second = counter_clockwise::<O>(project_triangle(second, axis));
    ccw_triangles_intersect_2d::<O>(&first, &second)
}

fn counter_clockwise<O: Orientation>(triangle: [Point2<f64>; 3]) -> [Point2<f64>; 3] {
    let [a, b, c] = triangle;
    if O::orient2d(&a, &b, &c) == Sign::Negative {
        [a, c, b]
    } else {
        [a, b, c]
    }
}

// Shorthands for the 2-D case analysis below
fn non_negative<O: Orientation>(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    O::orient2d(a, b, c) != Sign::Negative
}

fn non_positive<O: Orientation>(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    O::orient2d(a, b, c) != Sign::Positive
}

fn ccw_triangles_intersect_2d<O: Orientation>(first: &[Point2<f64>; 3], second: &[Point2<f64>; 3]) -> bool {
    let [p1, q1, r1] = first;
    let [p2, q2, r2] = second;

    if non_negative::<O>(p2, q2, p1) {
        if non_negative::<O>(q2, r2, p1) {
            if non_negative::<O>(r2, p2, p1) {
                true
            } else {
                edge_test::<O>([p1, q1, r1], [p2, q2, r2])
            }
        } else if non_negative::<O>(r2, p2, p1) {
            edge_test::<O>([p1, q1, r1], [r2, p2, q2])
        } else {
            vertex_test::<O>([p1, q1, r1], [p2, q2, r2])
        }
    } else if non_negative::<O>(q2, r2, p1) {
        if non_negative::<O>(r2, p2, p1) {
            edge_test::<O>([p1, q1, r1], [q2, r2, p2])
        } else {
            vertex_test::<O>([p1, q1, r1], [q2, r2, p2])
        }
    } else {
        vertex_test::<O>([p1, q1, r1], [r2, p2, q2])
    }
}

/// p1 lies in the region of the second triangle's vertex p2
fn vertex_test<O: Orientation>(first: [&Point2<f64>; 3], second: [&Point2<f64>; 3]) -> bool {
    let [p1, q1, r1] = first;
    let [p2, q2, r2] = second;

    if non_negative::<O>(r2, p2, q1) {
        if non_positive::<O>(r2, q2, q1) {
            if O::orient2d(p1, p2, q1) == Sign::Positive {
                non_positive::<O>(p1, q2, q1)
            } else {
                non_negative::<O>(p1, p2, r1) && non_negative::<O>(q1, r1, p2)
            }
        } else if non_positive::<O>(p1, q2, q1) {
            non_positive::<O>(r2, q2, r1) && non_negative::<O>(q1, r1, q2)
        } else {
            false
        }
    } else if non_negative::<O>(r2, p2, r1) {
        if non_negative::<O>(q1, r1, r2) {
            non_negative::<O>(p1, p2, r1)
        } else {
            non_negative::<O>(q1, r1, q2) && non_negative::<O>(r2, r1, q2)
        }
    } else {
        false
    }
}

/// p1 lies in the region of the second triangle's edge r2 p2
fn edge_test<O: Orientation>(first: [&Point2<f64>; 3], second: [&Point2<f64>; 3]) -> bool {
    let [p1, q1, r1] = first;
    let [p2, _, r2] = second;

    if non_negative::<O>(r2, p2, q1) {
        if non_negative::<O>(p1, p2, q1) {
            non_negative::<O>(p1, q1, r2)
        } else {
            non_negative::<O>(q1, r1, p2) && non_negative::<O>(r1, p1, p2)
        }
    } else if non_negative::<O>(r2, p2, r1) {
        non_negative::<O>(p1, p2, r1) && (non_negative::<O>(p1, r1, r2) || non_negative::<O>(q1, r1, r2))
    } else {
        false
    }
}

/// Closed point-in-triangle test for a non-degenerate 2-D triangle
fn point_in_triangle<O: Orientation>(point: &Point2<f64>, triangle: &[Point2<f64>; 3]) -> bool {
    let [a, b, c] = triangle;
    let outside = O::orient2d(a, b, c).negate();
    [
        O::orient2d(a, b, point),
        O::orient2d(b, c, point),
        O::orient2d(c, a, point),
    ]
    .iter()
    .all(|&side| side != outside)
}

fn coplanar_segment<O: Orientation>(triangle: &[Point3<f64>; 3], segment: &[Point3<f64>; 2], axis: usize) -> bool {
    let projected = project_triangle(triangle, axis);
    let p = project(&segment[0], axis);
    let q = project(&segment[1], axis);

    if point_in_triangle::<O>(&p, &projected) || point_in_triangle::<O>(&q, &projected) {
        return true;
    }

    let [a, b, c] = &projected;
    segments_intersect_2d::<O>(&p, &q, a, b)
        || segments_intersect_2d::<O>(&p, &q, b, c)
        || segments_intersect_2d::<O>(&p, &q, c, a)
}

/// Closed segment-segment test in the plane
fn segments_intersect_2d<O: Orientation>(p: &Point2<f64>, q: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> bool {
    let pq_a = O::orient2d(p, q, a);
    let pq_b = O::orient2d(p, q, b);
    let ab_p = O::orient2d(a, b, p);
    let ab_q = O::orient2d(a, b, q);

    if pq_a.is_zero() && pq_b.is_zero() {
        if !ab_p.is_zero() || !ab_q.is_zero() {
            return false;
        }
        // Collinear: compare extents on both coordinates
        let overlap = |s0: f64, s1: f64, t0: f64, t1: f64| s0.min(s1) <= t0.max(t1) && t0.min(t1) <= s0.max(s1);
        return overlap(p.x, q.x, a.x, b.x) && overlap(p.y, q.y, a.y, b.y);
    }

    !strictly_same(pq_a, pq_b) && !strictly_same(ab_p, ab_q)
}

fn strictly_same(a: Sign, b: Sign) -> bool {
    !a.is_zero() && a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::robust_predicates::{FilteredExact, Floating};

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    fn horizontal() -> [Point3<f64>; 3] {
        [p(-1.0, -1.0, 0.0), p(1.0, -1.0, 0.0), p(0.0, 1.0, 0.0)]
    }

    #[test]
    fn test_crossing_triangles() {
        let vertical = [p(-1.0, 0.0, -1.0), p(1.0, 0.0, -1.0), p(0.0, 0.0, 1.0)];
        assert!(triangles_intersect::<FilteredExact>(&horizontal(), &vertical).unwrap());
        assert!(triangles_intersect::<FilteredExact>(&vertical, &horizontal()).unwrap());
        assert!(triangles_intersect::<Floating>(&horizontal(), &vertical).unwrap());
    }

    #[test]
    fn test_straddling_but_separated() {
        let vertical = [p(5.0, 0.0, -1.0), p(7.0, 0.0, -1.0), p(6.0, 0.0, 1.0)];
        assert!(!triangles_intersect::<FilteredExact>(&horizontal(), &vertical).unwrap());
        assert!(!triangles_intersect::<FilteredExact>(&vertical, &horizontal()).unwrap());
    }

    #[test]
    fn test_parallel_planes() {
        let lifted = [p(-1.0, -1.0, 1.0), p(1.0, -1.0, 1.0), p(0.0, 1.0, 1.0)];
        assert!(!triangles_intersect::<FilteredExact>(&horizontal(), &lifted).unwrap());
    }

    #[test]
    fn test_touching_at_a_vertex() {
        // Apex of the second triangle rests on the first one's interior
        let resting = [p(0.0, 0.0, 0.0), p(1.0, 1.0, 2.0), p(-1.0, 1.0, 2.0)];
        assert!(triangles_intersect::<FilteredExact>(&horizontal(), &resting).unwrap());
    }

    #[test]
    fn test_coplanar_triangles() {
        let big = [p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(0.0, 4.0, 0.0)];
        let inner = [p(1.0, 1.0, 0.0), p(2.0, 1.0, 0.0), p(1.0, 2.0, 0.0)];
        let far = [p(10.0, 10.0, 0.0), p(11.0, 10.0, 0.0), p(10.0, 11.0, 0.0)];

        assert!(triangles_intersect::<FilteredExact>(&big, &inner).unwrap());
        assert!(!triangles_intersect::<FilteredExact>(&big, &far).unwrap());

        // Clockwise input is handled too
        let flipped = [inner[0], inner[2], inner[1]];
        assert!(triangles_intersect::<FilteredExact>(&flipped, &big).unwrap());
    }

    #[test]
    fn test_segment_piercing() {
        let triangle = [p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 2.0, 0.0)];
        let through = [p(0.5, 0.5, 1.0), p(0.5, 0.5, -1.0)];
        let beside = [p(3.0, 3.0, 1.0), p(3.0, 3.0, -1.0)];
        let above = [p(0.5, 0.5, 1.0), p(0.5, 0.5, 2.0)];

        assert!(triangle_segment_intersect::<FilteredExact>(&triangle, &through).unwrap());
        assert!(!triangle_segment_intersect::<FilteredExact>(&triangle, &beside).unwrap());
        assert!(!triangle_segment_intersect::<FilteredExact>(&triangle, &above).unwrap());
    }

    #[test]
    fn test_segment_endpoint_on_plane() {
        let triangle = [p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 2.0, 0.0)];
        let inside = [p(0.5, 0.5, 0.0), p(0.5, 0.5, 3.0)];
        let outside = [p(5.0, 0.5, 0.0), p(0.5, 0.5, 3.0)];

        assert!(triangle_segment_intersect::<FilteredExact>(&triangle, &inside).unwrap());
        assert!(!triangle_segment_intersect::<FilteredExact>(&triangle, &outside).unwrap());
    }

    #[test]
    fn test_coplanar_segment() {
        let triangle = [p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 2.0, 0.0)];
        let crossing = [p(-1.0, 0.5, 0.0), p(3.0, 0.5, 0.0)];
        let missing = [p(-1.0, 3.0, 0.0), p(3.0, 3.0, 0.0)];
        let along_edge = [p(-1.0, 0.0, 0.0), p(0.5, 0.0, 0.0)];

        assert!(triangle_segment_intersect::<FilteredExact>(&triangle, &crossing).unwrap());
        assert!(!triangle_segment_intersect::<FilteredExact>(&triangle, &missing).unwrap());
        assert!(triangle_segment_intersect::<FilteredExact>(&triangle, &along_edge).unwrap());
    }

    #[test]
    fn test_degenerate_and_non_finite_input() {
        let collinear = [p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(2.0, 2.0, 2.0)];
        assert_eq!(
            triangles_intersect::<FilteredExact>(&collinear, &horizontal()),
            Err(KernelError::DegenerateTriangle)
        );

        let broken = [p(f64::NAN, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        assert_eq!(
            triangles_intersect::<FilteredExact>(&horizontal(), &broken),
            Err(KernelError::NonFiniteCoordinate)
        );

        let segment = [p(0.0, 0.0, f64::INFINITY), p(0.0, 0.0, -1.0)];
        assert_eq!(
            triangle_segment_intersect::<FilteredExact>(&horizontal(), &segment),
            Err(KernelError::NonFiniteCoordinate)
        );
    }
}
