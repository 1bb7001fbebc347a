//! Path-recording drawing surface and polygon overlap tests.
//!
//! Element outlines are produced by the same path code a renderer would run.
//! [`OutlineContext`] implements [`DrawingContext`] by flattening every path
//! command into a world-space [`Polygon`] instead of drawing pixels.

use crate::float::Float;
use crate::vec::Vec2;
use alloc::vec::Vec as AllocVec;

/// The subset of a 2D canvas API that track shapes draw with.
///
/// Angles follow the canvas convention: measured from the x axis towards the
/// y axis, `anticlockwise` sweeps towards decreasing angles.
pub trait DrawingContext<F: Float> {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2<F>);
    fn rotate(&mut self, angle: F);
    fn begin_path(&mut self);
    fn move_to(&mut self, to: Vec2<F>);
    fn line_to(&mut self, to: Vec2<F>);
    fn arc(&mut self, center: Vec2<F>, radius: F, start: F, end: F, anticlockwise: bool);
    fn bezier_curve_to(&mut self, control1: Vec2<F>, control2: Vec2<F>, to: Vec2<F>);
    fn close_path(&mut self);
    fn fill(&mut self) {}
    fn stroke(&mut self) {}
}

/// Translation + rotation, the only transforms track code applies.
#[derive(Copy, Clone, Debug)]
struct Transform<F: Float> {
    origin: Vec2<F>,
    angle: F,
}

impl<F: Float> Transform<F> {
    fn identity() -> Self {
        Transform { origin: Vec2::zero(), angle: F::zero() }
    }

    fn apply(&self, local: Vec2<F>) -> Vec2<F> {
        self.origin + local.rotate(self.angle)
    }
}

/// A drawing surface that records the current path as a polygon.
pub struct OutlineContext<F: Float> {
    transform: Transform<F>,
    stack: AllocVec<Transform<F>>,
    path: AllocVec<Vec2<F>>,
    pen: Vec2<F>,
    arc_segments: usize,
    bezier_segments: usize,
}

impl<F: Float> OutlineContext<F> {
    pub fn new(arc_segments: usize, bezier_segments: usize) -> Self {
        OutlineContext {
            transform: Transform::identity(),
            stack: AllocVec::new(),
            path: AllocVec::new(),
            pen: Vec2::zero(),
            arc_segments: arc_segments.max(1),
            bezier_segments: bezier_segments.max(1),
        }
    }

    fn push_local(&mut self, local: Vec2<F>) {
        self.pen = local;
        let world = self.transform.apply(local);
        // Arcs start where the previous command ended; skip the duplicate.
        if let Some(last) = self.path.last() {
            if last.distance_sq(world).is_near_zero(F::from_f32(1e-12)) {
                return;
            }
        }
        self.path.push(world);
    }

    /// The recorded path as a closed polygon in world coordinates.
    pub fn into_polygon(self) -> Polygon<F> {
        let mut vertices = self.path;
        if vertices.len() > 1 {
            if let (Some(first), Some(last)) = (vertices.first().copied(), vertices.last().copied()) {
                if first.distance_sq(last).is_near_zero(F::from_f32(1e-12)) {
                    vertices.pop();
                }
            }
        }
        Polygon { vertices }
    }
}

impl<F: Float> DrawingContext<F> for OutlineContext<F> {
    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
    }

    fn translate(&mut self, offset: Vec2<F>) {
        self.transform.origin = self.transform.apply(offset);
    }

    fn rotate(&mut self, angle: F) {
        self.transform.angle = self.transform.angle + angle;
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, to: Vec2<F>) {
        self.push_local(to);
    }

    fn line_to(&mut self, to: Vec2<F>) {
        self.push_local(to);
    }

    fn arc(&mut self, center: Vec2<F>, radius: F, start: F, end: F, anticlockwise: bool) {
        let tau = F::tau();
        let mut sweep = end - start;
        if anticlockwise {
            while sweep > F::zero() {
                sweep = sweep - tau;
            }
        } else {
            while sweep < F::zero() {
                sweep = sweep + tau;
            }
        }
        let n = self.arc_segments;
        for i in 0..=n {
            let a = start + sweep * F::from_usize(i) / F::from_usize(n);
            self.push_local(center + Vec2::from_angle(a).scale(radius));
        }
    }

    fn bezier_curve_to(&mut self, control1: Vec2<F>, control2: Vec2<F>, to: Vec2<F>) {
        let from = self.pen;
        let n = self.bezier_segments;
        for i in 1..=n {
            let t = F::from_usize(i) / F::from_usize(n);
            let u = F::one() - t;
            let three = F::from_f32(3.0);
            let p = from.scale(u * u * u)
                + control1.scale(three * u * u * t)
                + control2.scale(three * u * t * t)
                + to.scale(t * t * t);
            self.push_local(p);
        }
    }

    fn close_path(&mut self) {}
}

/// A closed polygon, vertices in order, last edge implied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon<F: Float> {
    pub vertices: AllocVec<Vec2<F>>,
}

impl<F: Float> Polygon<F> {
    pub fn new(vertices: AllocVec<Vec2<F>>) -> Self {
        Polygon { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterate edges as `(start, end)` pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2<F>, Vec2<F>)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Area using the shoelace formula.
    pub fn area(&self) -> F {
        let mut sum = F::zero();
        for (a, b) in self.edges() {
            sum = sum + a.cross(b);
        }
        (sum * F::half()).abs()
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> Option<(Vec2<F>, Vec2<F>)> {
        let first = *self.vertices.first()?;
        let mut min = first;
        let mut max = first;
        for v in &self.vertices {
            min = Vec2::new(min.x.min(v.x), min.y.min(v.y));
            max = Vec2::new(max.x.max(v.x), max.y.max(v.y));
        }
        Some((min, max))
    }

    /// Check if a point is inside the polygon using ray casting.
    pub fn contains(&self, point: Vec2<F>) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = self.vertices[i];
            let pj = self.vertices[j];
            let dy = pj.y - pi.y;
            if !dy.is_near_zero(F::from_f32(1e-10))
                && ((pi.y > point.y) != (pj.y > point.y))
                && (point.x < (pj.x - pi.x) * (point.y - pi.y) / dy + pi.x)
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Whether the filled areas of the two polygons overlap.
    ///
    /// Edges that merely touch do not count as overlap.
    pub fn overlaps(&self, other: &Polygon<F>) -> bool {
        let (Some((a_min, a_max)), Some((b_min, b_max))) = (self.bounds(), other.bounds()) else {
            return false;
        };
        if a_max.x < b_min.x || b_max.x < a_min.x || a_max.y < b_min.y || b_max.y < a_min.y {
            return false;
        }

        for (a1, a2) in self.edges() {
            for (b1, b2) in other.edges() {
                if segments_intersect(a1, a2, b1, b2) {
                    return true;
                }
            }
        }

        // No crossing edges: overlap only if one polygon sits inside the other.
        other.vertices.iter().any(|&v| self.contains(v))
            || self.vertices.iter().any(|&v| other.contains(v))
    }
}

/// Test if two line segments cross (excluding endpoints and collinear overlap).
pub fn segments_intersect<F: Float>(a1: Vec2<F>, a2: Vec2<F>, b1: Vec2<F>, b2: Vec2<F>) -> bool {
    let da = a2 - a1;
    let db = b2 - b1;
    let denominator = da.cross(db);
    if denominator.is_near_zero(F::from_f32(1e-12)) {
        return false;
    }

    let offset = b1 - a1;
    let ua = offset.cross(db) / denominator;
    if ua <= F::zero() || ua >= F::one() {
        return false;
    }

    let ub = offset.cross(da) / denominator;
    F::zero() < ub && ub < F::one()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
        Polygon::new(vec![
            Vec2::new(x, y),
            Vec2::new(x + size, y),
            Vec2::new(x + size, y + size),
            Vec2::new(x, y + size),
        ])
    }

    #[test]
    fn segments_do_intersect() {
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0), Vec2::new(2.0, 0.0),
        ));
    }

    #[test]
    fn segments_dont_intersect() {
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0),
        ));
    }

    #[test]
    fn overlapping_squares() {
        assert!(square(0.0, 0.0, 2.0).overlaps(&square(1.0, 1.0, 2.0)));
    }

    #[test]
    fn separated_squares() {
        assert!(!square(0.0, 0.0, 1.0).overlaps(&square(5.0, 0.0, 1.0)));
    }

    #[test]
    fn contained_square_overlaps() {
        assert!(square(0.0, 0.0, 10.0).overlaps(&square(4.0, 4.0, 1.0)));
        assert!(square(4.0, 4.0, 1.0).overlaps(&square(0.0, 0.0, 10.0)));
    }

    #[test]
    fn recorded_rectangle_follows_transform() {
        let mut ctx: OutlineContext<f64> = OutlineContext::new(8, 8);
        ctx.translate(Vec2::new(10.0, 0.0));
        ctx.rotate(core::f64::consts::FRAC_PI_2);
        ctx.begin_path();
        ctx.move_to(Vec2::new(0.0, 0.0));
        ctx.line_to(Vec2::new(2.0, 0.0));
        ctx.line_to(Vec2::new(2.0, 1.0));
        ctx.line_to(Vec2::new(0.0, 1.0));
        ctx.close_path();
        let poly = ctx.into_polygon();
        assert_eq!(poly.len(), 4);
        assert!((poly.vertices[1].x - 10.0).abs() < 1e-9);
        assert!((poly.vertices[1].y - 2.0).abs() < 1e-9);
        assert!((poly.area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn arc_sweeps_requested_direction() {
        let mut ctx: OutlineContext<f64> = OutlineContext::new(4, 4);
        ctx.begin_path();
        ctx.arc(Vec2::zero(), 1.0, 0.0, core::f64::consts::FRAC_PI_2, false);
        let forward = ctx.into_polygon();
        assert!(forward.vertices[2].y > 0.0);

        let mut ctx: OutlineContext<f64> = OutlineContext::new(4, 4);
        ctx.begin_path();
        ctx.arc(Vec2::zero(), 1.0, 0.0, core::f64::consts::FRAC_PI_2, true);
        let backward = ctx.into_polygon();
        assert!(backward.vertices[2].y < 0.0);
    }

    #[test]
    fn save_restore_round_trips_transform() {
        let mut ctx: OutlineContext<f64> = OutlineContext::new(4, 4);
        ctx.save();
        ctx.translate(Vec2::new(5.0, 5.0));
        ctx.restore();
        ctx.begin_path();
        ctx.move_to(Vec2::new(1.0, 1.0));
        let poly = ctx.into_polygon();
        assert_eq!(poly.vertices[0], Vec2::new(1.0, 1.0));
    }
}
