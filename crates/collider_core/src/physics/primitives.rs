//! Exact overlap tests between convex outlines, segments and circles
//!
//! Everything here works on clockwise convex point lists. A single point and
//! a two-point segment are valid (degenerate) outlines.

use crate::foundation::math::{utils, Vec2};
use crate::world::Segment;

fn project(points: &[Vec2], axis: &Vec2) -> (f32, f32) {
    points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), p| {
        let d = p.dot(axis);
        (min.min(d), max.max(d))
    })
}

fn separated_on(a: &[Vec2], b: &[Vec2], axis: &Vec2, tolerance: f32) -> bool {
    if axis.norm_squared() <= f32::EPSILON {
        return false;
    }
    let axis = axis.normalize();
    let (min_a, max_a) = project(a, &axis);
    let (min_b, max_b) = project(b, &axis);
    max_a < min_b + tolerance || max_b < min_a + tolerance
}

fn edge_axes(points: &[Vec2]) -> impl Iterator<Item = Vec2> + '_ {
    let next = points.iter().cycle().skip(1);
    points
        .iter()
        .zip(next)
        .take(if points.len() == 2 { 1 } else { points.len() })
        .map(|(a, b)| utils::left_perp(&(b - a)))
}

/// Separating-axis overlap test for two convex outlines
///
/// With `tolerance == 0` touching outlines overlap. A positive tolerance
/// requires at least that much penetration along every axis, so resting
/// contacts do not count.
pub fn outlines_overlap(a: &[Vec2], b: &[Vec2], tolerance: f32) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    !edge_axes(a)
        .chain(edge_axes(b))
        .any(|axis| separated_on(a, b, &axis, tolerance))
}

/// Whether `point` lies inside (or on) a convex outline
pub fn point_in_outline(point: Vec2, outline: &[Vec2]) -> bool {
    outlines_overlap(&[point], outline, 0.0)
}

/// Whether a segment crosses or lies inside a convex outline
pub fn segment_overlaps_outline(segment: &Segment, outline: &[Vec2], tolerance: f32) -> bool {
    outlines_overlap(&[segment.start, segment.end], outline, tolerance)
}

/// Distance from `point` to the closest point of `segment`
pub fn distance_to_segment(point: Vec2, segment: &Segment) -> f32 {
    let dir = segment.direction();
    let length_squared = dir.norm_squared();
    if length_squared <= f32::EPSILON {
        return (point - segment.start).norm();
    }
    let s = ((point - segment.start).dot(&dir) / length_squared).clamp(0.0, 1.0);
    (point - segment.point_at(s)).norm()
}

/// Whether a circle touches a convex outline
pub fn circle_overlaps_outline(center: Vec2, radius: f32, outline: &[Vec2]) -> bool {
    if point_in_outline(center, outline) {
        return true;
    }
    let next = outline.iter().cycle().skip(1);
    outline
        .iter()
        .zip(next)
        .any(|(a, b)| distance_to_segment(center, &Segment::new(*a, *b)) <= radius)
}
