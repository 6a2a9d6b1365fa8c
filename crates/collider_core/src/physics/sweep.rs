//! Continuous sweeps of convex outlines against directed segments
//!
//! World geometry and the edges of other bodies go through the same two
//! routines. A blocking contact between two convex outlines starts either at
//! a vertex of the mover touching the obstacle or at an obstacle endpoint
//! touching a mover edge, so every test runs two passes:
//!
//! 1. mover vertices swept forward against the segment, and
//! 2. segment endpoints swept backward (the inverse motion) against the
//!    mover's edges.
//!
//! Segments that do not face the motion never block.

use crate::foundation::math::{constants, utils, Vec2};
use crate::world::Segment;

/// Parallel/degenerate cutoff for the intersection denominators
const DEGENERATE_EPSILON: f32 = 1.0e-12;

/// Clockwise edges of a convex outline
pub fn outline_edges(outline: &[Vec2]) -> impl Iterator<Item = Segment> + '_ {
    let next = outline.iter().cycle().skip(1);
    outline.iter().zip(next).map(|(a, b)| Segment::new(*a, *b))
}

/// Parameter along `ray` at which `origin + t * ray` crosses `segment`
///
/// Both the ray parameter and the segment parameter may fall outside
/// `[0, 1]` by up to `tolerance` so grazing contacts survive rounding; the
/// returned value is clamped to `[0, 1]`.
pub fn ray_segment_intersection(origin: Vec2, ray: Vec2, segment: &Segment, tolerance: f32) -> Option<f32> {
    let dir = segment.direction();
    let denom = utils::cross(&ray, &dir);
    if denom.abs() <= DEGENERATE_EPSILON * ray.norm_squared().max(dir.norm_squared()) || denom == 0.0 {
        return None;
    }

    let diff = segment.start - origin;
    let t = utils::cross(&diff, &dir) / denom;
    let s = utils::cross(&diff, &ray) / denom;

    let range = -tolerance..=1.0 + tolerance;
    if range.contains(&t) && range.contains(&s) {
        Some(t.clamp(0.0, 1.0))
    } else {
        None
    }
}

/// Whether edge `i` of the outline moves into the motion
fn edge_leads(outline: &[Vec2], i: usize, motion: &Vec2) -> bool {
    let start = outline[i];
    let end = outline[(i + 1) % outline.len()];
    utils::left_perp(&(end - start)).dot(motion) > 0.0
}

/// A vertex leads when either edge meeting at it leads
fn vertex_leads(outline: &[Vec2], i: usize, motion: &Vec2) -> bool {
    let count = outline.len();
    edge_leads(outline, i, motion) || edge_leads(outline, (i + count - 1) % count, motion)
}

/// Fraction of `motion` the outline can travel before crossing `segment`
///
/// Returns `None` when the segment never blocks the motion.
pub fn translate_against_segment(outline: &[Vec2], motion: Vec2, segment: &Segment, tolerance: f32) -> Option<f32> {
    if outline.is_empty() || segment.is_degenerate() || !segment.faces(&motion) {
        return None;
    }

    let mut best: Option<f32> = None;
    let mut keep = |t: f32| best = Some(best.map_or(t, |b| b.min(t)));

    for (i, vertex) in outline.iter().enumerate() {
        if !vertex_leads(outline, i, &motion) {
            continue;
        }
        if let Some(t) = ray_segment_intersection(*vertex, motion, segment, tolerance) {
            keep(t);
        }
    }

    let reverse = -motion;
    for edge in outline_edges(outline).filter(|e| e.outward_normal().dot(&motion) > 0.0) {
        for endpoint in [segment.start, segment.end] {
            if let Some(t) = ray_segment_intersection(endpoint, reverse, &edge, tolerance) {
                keep(t);
            }
        }
    }

    best
}

/// Smallest blocking fraction over `segments`, `1.0` when nothing blocks
pub fn translate_against_all<'a>(
    outline: &[Vec2],
    motion: Vec2,
    segments: impl IntoIterator<Item = &'a Segment>,
    tolerance: f32,
) -> f32 {
    segments
        .into_iter()
        .filter_map(|segment| translate_against_segment(outline, motion, segment, tolerance))
        .fold(1.0, f32::min)
}

/// Segment parameters where `segment`'s supporting line meets a circle
///
/// Solves `|start + s * dir - center|^2 = radius^2`, keeping roots within
/// `[-tolerance, 1 + tolerance]`.
pub fn segment_circle_intersections(segment: &Segment, center: Vec2, radius: f32, tolerance: f32) -> Vec<f32> {
    let dir = segment.direction();
    let f = segment.start - center;

    let a = dir.dot(&dir);
    if a <= DEGENERATE_EPSILON {
        return Vec::new();
    }
    let b = 2.0 * f.dot(&dir);
    let c = f.dot(&f) - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }

    let sqrt_discriminant = discriminant.sqrt();
    let s1 = (-b - sqrt_discriminant) / (2.0 * a);
    let s2 = (-b + sqrt_discriminant) / (2.0 * a);

    let range = -tolerance..=1.0 + tolerance;
    let mut roots = Vec::with_capacity(2);
    for s in [s1, s2] {
        if range.contains(&s) {
            roots.push(s);
        }
    }
    roots
}

/// Tolerances for rotational sweeps
#[derive(Debug, Clone, Copy)]
pub struct ArcTolerance {
    /// Slack on segment parameters
    pub linear: f32,
    /// Offsets this close to a full turn count as contact at the start
    pub angular: f32,
}

/// Angle travelled from `from` to `to` going around `pivot` in `direction`
fn angular_offset(pivot: Vec2, from: Vec2, to: Vec2, direction: f32, tolerance: f32) -> f32 {
    let a0 = (from.y - pivot.y).atan2(from.x - pivot.x);
    let a1 = (to.y - pivot.y).atan2(to.x - pivot.x);
    let offset = utils::wrap_angle(direction * (a1 - a0));
    if offset > constants::TAU - tolerance {
        0.0
    } else {
        offset
    }
}

/// Velocity direction of a point rotating around `pivot`
fn arc_tangent(pivot: Vec2, point: Vec2, direction: f32) -> Vec2 {
    utils::left_perp(&(point - pivot)) * direction
}

/// Angle (non-negative, in the direction of `angle`) the outline can rotate
/// around `pivot` before crossing `segment`
///
/// Returns `None` when the segment never blocks within `|angle|`.
pub fn rotate_against_segment(
    outline: &[Vec2],
    pivot: Vec2,
    angle: f32,
    segment: &Segment,
    tolerance: ArcTolerance,
) -> Option<f32> {
    if outline.is_empty() || segment.is_degenerate() || angle == 0.0 {
        return None;
    }

    let direction = angle.signum();
    let limit = angle.abs();
    let normal = segment.outward_normal();
    let mut best: Option<f32> = None;
    let mut keep = |offset: f32| {
        if offset <= limit {
            best = Some(best.map_or(offset, |b| b.min(offset)));
        }
    };

    // Mover vertices travelling along their arcs
    for vertex in outline {
        let radius = (vertex - pivot).norm();
        if radius <= f32::EPSILON {
            continue;
        }
        for s in segment_circle_intersections(segment, pivot, radius, tolerance.linear) {
            let hit = segment.point_at(s);
            if arc_tangent(pivot, hit, direction).dot(&normal) >= 0.0 {
                continue;
            }
            keep(angular_offset(pivot, *vertex, hit, direction, tolerance.angular));
        }
    }

    // Segment endpoints travelling backwards into the mover's edges
    for endpoint in [segment.start, segment.end] {
        if !segment.faces(&arc_tangent(pivot, endpoint, direction)) {
            continue;
        }
        let radius = (endpoint - pivot).norm();
        if radius <= f32::EPSILON {
            continue;
        }
        for edge in outline_edges(outline) {
            let edge_normal = edge.outward_normal();
            for s in segment_circle_intersections(&edge, pivot, radius, tolerance.linear) {
                let hit = edge.point_at(s);
                if arc_tangent(pivot, hit, -direction).dot(&edge_normal) >= 0.0 {
                    continue;
                }
                keep(angular_offset(pivot, endpoint, hit, -direction, tolerance.angular));
            }
        }
    }

    best
}

/// Smallest blocking rotation over `segments`, `|angle|` when nothing blocks
pub fn rotate_against_all<'a>(
    outline: &[Vec2],
    pivot: Vec2,
    angle: f32,
    segments: impl IntoIterator<Item = &'a Segment>,
    tolerance: ArcTolerance,
) -> f32 {
    segments
        .into_iter()
        .filter_map(|segment| rotate_against_segment(outline, pivot, angle, segment, tolerance))
        .fold(angle.abs(), f32::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOL: f32 = 1.0 / 1024.0;
    const ARC: ArcTolerance = ArcTolerance {
        linear: 1.0 / 1024.0,
        angular: 1.0 / 4096.0,
    };

    fn square(center: Vec2, half: f32) -> [Vec2; 4] {
        [
            center + Vec2::new(-half, half),
            center + Vec2::new(half, half),
            center + Vec2::new(half, -half),
            center + Vec2::new(-half, -half),
        ]
    }

    fn wall_at_x5() -> Segment {
        Segment::new(Vec2::new(5.0, -5.0), Vec2::new(5.0, 5.0))
    }

    #[test]
    fn test_only_vertices_on_leading_edges_lead() {
        // ul, ur, dr, dl
        let outline = square(Vec2::zeros(), 1.0);
        let east = Vec2::new(1.0, 0.0);
        let leads: Vec<bool> = (0..4).map(|i| vertex_leads(&outline, i, &east)).collect();
        assert_eq!(leads, vec![false, true, true, false]);

        // Diagonal motion leads with three corners
        let north_east = Vec2::new(1.0, 1.0);
        let leads: Vec<bool> = (0..4).map(|i| vertex_leads(&outline, i, &north_east)).collect();
        assert_eq!(leads, vec![true, true, true, false]);
    }

    #[test]
    fn test_box_stops_at_wall() {
        let outline = square(Vec2::zeros(), 1.0);
        let t = translate_against_segment(&outline, Vec2::new(10.0, 0.0), &wall_at_x5(), TOL).unwrap();
        assert_relative_eq!(t, 0.4, epsilon = 1e-6);
    }

    #[test]
    fn test_back_face_never_blocks() {
        let outline = square(Vec2::zeros(), 1.0);
        let wall = wall_at_x5().reversed();
        assert!(translate_against_segment(&outline, Vec2::new(10.0, 0.0), &wall, TOL).is_none());
    }

    #[test]
    fn test_sliding_along_wall_is_free() {
        let outline = square(Vec2::new(4.0, 0.0), 1.0);
        assert!(translate_against_segment(&outline, Vec2::new(0.0, 3.0), &wall_at_x5(), TOL).is_none());
    }

    #[test]
    fn test_out_of_range_wall_is_ignored() {
        let outline = square(Vec2::zeros(), 1.0);
        assert!(translate_against_segment(&outline, Vec2::new(3.0, 0.0), &wall_at_x5(), TOL).is_none());
    }

    #[test]
    fn test_segment_endpoint_hits_mover_edge() {
        // A short spike whose tip pokes at the middle of the mover's face;
        // no mover vertex ever touches it.
        let outline = square(Vec2::zeros(), 1.0);
        let spike = Segment::new(Vec2::new(3.0, 0.0), Vec2::new(8.0, 0.2));
        let t = translate_against_segment(&outline, Vec2::new(10.0, 0.0), &spike, TOL).unwrap();
        assert_relative_eq!(t, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_touching_contact_blocks_immediately() {
        let outline = square(Vec2::new(4.0, 0.0), 1.0);
        let t = translate_against_segment(&outline, Vec2::new(1.0, 0.0), &wall_at_x5(), TOL).unwrap();
        assert_relative_eq!(t, 0.0);
    }

    #[test]
    fn test_degenerate_segment_never_blocks() {
        let outline = square(Vec2::zeros(), 1.0);
        let point = Segment::new(Vec2::new(3.0, 0.0), Vec2::new(3.0, 0.0));
        assert!(translate_against_segment(&outline, Vec2::new(10.0, 0.0), &point, TOL).is_none());
    }

    #[test]
    fn test_translate_against_all_takes_minimum() {
        let outline = square(Vec2::zeros(), 1.0);
        let near = Segment::new(Vec2::new(3.0, -5.0), Vec2::new(3.0, 5.0));
        let segments = [wall_at_x5(), near];
        let t = translate_against_all(&outline, Vec2::new(10.0, 0.0), &segments, TOL);
        assert_relative_eq!(t, 0.2, epsilon = 1e-6);
        assert_relative_eq!(translate_against_all(&outline, Vec2::new(-10.0, 0.0), &segments, TOL), 1.0);
    }

    #[test]
    fn test_circle_intersections() {
        let line = Segment::new(Vec2::new(-5.0, 1.0), Vec2::new(5.0, 1.0));
        let roots = segment_circle_intersections(&line, Vec2::zeros(), 2.0, TOL);
        assert_eq!(roots.len(), 2);
        let xs: Vec<f32> = roots.iter().map(|s| line.point_at(*s).x).collect();
        assert_relative_eq!(xs[0], -(3.0f32).sqrt(), epsilon = 1e-5);
        assert_relative_eq!(xs[1], (3.0f32).sqrt(), epsilon = 1e-5);

        assert!(segment_circle_intersections(&line, Vec2::zeros(), 0.5, TOL).is_empty());
    }

    #[test]
    fn test_free_rotation_is_unlimited() {
        let outline = square(Vec2::zeros(), 1.0);
        let far = Segment::new(Vec2::new(50.0, -5.0), Vec2::new(50.0, 5.0));
        assert!(rotate_against_segment(&outline, Vec2::zeros(), constants::PI, &far, ARC).is_none());
    }

    #[test]
    fn test_stick_rotates_into_ceiling() {
        // 4 x 0.2 stick; ceiling at y = 1 with solid above
        let outline = [
            Vec2::new(-2.0, 0.1),
            Vec2::new(2.0, 0.1),
            Vec2::new(2.0, -0.1),
            Vec2::new(-2.0, -0.1),
        ];
        let ceiling = Segment::new(Vec2::new(5.0, 1.0), Vec2::new(-5.0, 1.0));

        let radius = Vec2::new(2.0, 0.1).norm();
        let expected = (1.0 / radius).asin() - 0.1f32.atan2(2.0);

        let blocked = rotate_against_segment(&outline, Vec2::zeros(), constants::HALF_PI, &ceiling, ARC).unwrap();
        assert_relative_eq!(blocked, expected, epsilon = 1e-4);

        // Clockwise the right end swings down, away from the ceiling, and
        // the left end reaches it at the same angle
        let mirrored = rotate_against_segment(&outline, Vec2::zeros(), -constants::HALF_PI, &ceiling, ARC).unwrap();
        assert_relative_eq!(mirrored, expected, epsilon = 1e-4);
    }

    #[test]
    fn test_rotation_away_from_touching_wall_is_free() {
        // Right face resting on a wall; rotating about the left bottom
        // corner lifts the face away from it
        let outline = square(Vec2::new(4.0, 0.0), 1.0);
        let wall = wall_at_x5();
        let pivot = Vec2::new(3.0, -1.0);
        assert!(rotate_against_segment(&outline, pivot, 0.5, &wall, ARC).is_none());
    }

    #[test]
    fn test_segment_corner_sweeps_into_mover_edge() {
        // Plank above the pivot swinging counter-clockwise; its bottom face
        // comes down onto the top of a post whose corners sit below it
        let outline = [
            Vec2::new(-3.0, 1.0),
            Vec2::new(3.0, 1.0),
            Vec2::new(3.0, 0.5),
            Vec2::new(-3.0, 0.5),
        ];
        let post_top = Segment::new(Vec2::new(-1.6, 0.0), Vec2::new(-1.4, 0.0));

        let blocked = rotate_against_all(&outline, Vec2::zeros(), constants::HALF_PI, [&post_top], ARC);
        assert_relative_eq!(blocked, (0.5f32 / 1.6).asin(), epsilon = 1e-4);
    }
}
