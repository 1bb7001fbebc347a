//! Geometry of the three track pieces.
//!
//! Every piece is described in its canonical frame: the center particle sits
//! at the origin and the boundary points are laid out around it. Outline code
//! and train placement are written against that frame only.

use crate::float::Float;
use crate::outline::DrawingContext;
use crate::vec::Vec2;
use alloc::vec;
use alloc::vec::Vec as AllocVec;

/// Length of a straight piece, end to end.
pub const STRAIGHT_LENGTH: f32 = 100.0;
/// Radius of the track center line of a round piece.
pub const ROUND_RADIUS: f32 = 150.0;
/// Width of a piece's wooden body.
pub const ELEMENT_WIDTH: f32 = 30.0;
/// Round pieces needed for a full circle.
pub const ROUND_PIECES_PER_TURN: usize = 8;
/// Angle between the two branches of a split piece (2π/12).
pub const SPLIT_ANGLE: f32 = core::f32::consts::PI / 6.0;
/// Control point offset of the Bezier blends on split outlines.
pub const SPLIT_BLEND: f32 = 10.0;

/// Where a train sits on a piece.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrainPose<F: Float> {
    pub position: Vec2<F>,
    /// Orientation vector perpendicular to the direction of travel
    /// (not normalized); consumers rotate the train sprite by it.
    pub velocity: Vec2<F>,
}

/// Shape-specific behavior of a track piece.
pub trait TrackShape<F: Float> {
    /// Canonical boundary positions and their outward track directions.
    fn layout(&self) -> (AllocVec<Vec2<F>>, AllocVec<Vec2<F>>);

    /// Trace the piece's body in canonical coordinates.
    fn outline_path<C: DrawingContext<F> + ?Sized>(&self, ctx: &mut C);

    /// Place a train a fraction `t` of the way from boundary point `from` to
    /// boundary point `to`, given the live boundary point positions.
    fn locate_train(&self, points: &[Vec2<F>], from: usize, to: usize, t: F) -> TrainPose<F>;

    /// Track length between two boundary points in the live layout.
    fn edge_length(&self, points: &[Vec2<F>], from: usize, to: usize) -> F {
        points[from].distance(points[to])
    }
}

fn lerp_pose<F: Float>(p1: Vec2<F>, p2: Vec2<F>, t: F) -> TrainPose<F> {
    // Weighted form so t = 0 and t = 1 land exactly on the ends.
    TrainPose {
        position: p1.scale(F::one() - t) + p2.scale(t),
        velocity: (p2 - p1).perp(),
    }
}

/// A straight piece along the x axis.
#[derive(Copy, Clone, Debug, Default)]
pub struct Straight;

impl<F: Float> TrackShape<F> for Straight {
    fn layout(&self) -> (AllocVec<Vec2<F>>, AllocVec<Vec2<F>>) {
        let l = F::from_f32(STRAIGHT_LENGTH) * F::half();
        (
            vec![Vec2::new(-l, F::zero()), Vec2::new(l, F::zero())],
            vec![Vec2::new(-F::one(), F::zero()), Vec2::one()],
        )
    }

    fn outline_path<C: DrawingContext<F> + ?Sized>(&self, ctx: &mut C) {
        let l = F::from_f32(STRAIGHT_LENGTH) * F::half();
        let w = F::from_f32(ELEMENT_WIDTH) * F::half();
        ctx.begin_path();
        ctx.move_to(Vec2::new(-l, w));
        ctx.line_to(Vec2::new(l, w));
        ctx.line_to(Vec2::new(l, -w));
        ctx.line_to(Vec2::new(-l, -w));
        ctx.close_path();
    }

    fn locate_train(&self, points: &[Vec2<F>], from: usize, to: usize, t: F) -> TrainPose<F> {
        lerp_pose(points[from], points[to], t)
    }
}

/// A curved piece spanning one eighth of a circle.
///
/// A convex piece bulges towards +y with its curve center below the chord; a
/// concave piece is the mirror image across the chord.
#[derive(Copy, Clone, Debug)]
pub struct Round {
    pub convex: bool,
}

impl Round {
    /// Half of the angle the piece spans.
    pub fn half_angle<F: Float>() -> F {
        F::pi() / F::from_usize(ROUND_PIECES_PER_TURN)
    }

    fn sign<F: Float>(&self) -> F {
        if self.convex { F::one() } else { -F::one() }
    }

    fn curve_center<F: Float>(&self) -> Vec2<F> {
        Vec2::new(F::zero(), -self.sign::<F>() * F::from_f32(ROUND_RADIUS))
    }

    /// Point at radius `r` and polar angle `a` around the curve center,
    /// mirrored for concave pieces.
    fn polar<F: Float>(&self, r: F, a: F) -> Vec2<F> {
        self.curve_center::<F>() + Vec2::from_angle(self.sign::<F>() * a).scale(r)
    }

    fn end_angles<F: Float>() -> (F, F) {
        let quarter = F::pi() * F::half();
        let phi = Self::half_angle::<F>();
        (quarter + phi, quarter - phi)
    }
}

impl<F: Float> TrackShape<F> for Round {
    fn layout(&self) -> (AllocVec<Vec2<F>>, AllocVec<Vec2<F>>) {
        let r = F::from_f32(ROUND_RADIUS);
        let (left, right) = Round::end_angles::<F>();
        let beta = -self.sign::<F>() * Round::half_angle::<F>();
        let (nx, ny) = (beta.cos(), beta.sin());
        (
            vec![self.polar(r, left), self.polar(r, right)],
            vec![Vec2::new(-nx, ny), Vec2::new(nx, ny)],
        )
    }

    fn outline_path<C: DrawingContext<F> + ?Sized>(&self, ctx: &mut C) {
        let r = F::from_f32(ROUND_RADIUS);
        let w = F::from_f32(ELEMENT_WIDTH) * F::half();
        let (left, right) = Round::end_angles::<F>();
        let s = self.sign::<F>();
        let center = self.curve_center::<F>();

        ctx.begin_path();
        ctx.move_to(self.polar(r + w, right));
        ctx.arc(center, r + w, s * right, s * left, !self.convex);
        ctx.line_to(self.polar(r - w, left));
        ctx.arc(center, r - w, s * left, s * right, self.convex);
        ctx.close_path();
    }

    fn locate_train(&self, points: &[Vec2<F>], from: usize, _to: usize, t: F) -> TrainPose<F> {
        let (t, mul) = if from == 1 { (F::one() - t, -F::one()) } else { (t, F::one()) };
        let s = self.sign::<F>();

        // The arc center sits on the chord's bisector, 1/tan(φ) half-chords away.
        let chord = points[1] - points[0];
        let phi = Round::half_angle::<F>();
        let towards_center = Vec2::new(chord.y, -chord.x).scale(s * F::half() / phi.tan());
        let center = points[0] + chord.scale(F::half()) + towards_center;

        let start = points[0] - center;
        let alpha = F::two() * phi * t;
        let radial = start.rotate(-s * alpha);

        TrainPose {
            position: center + radial,
            velocity: radial.scale(mul),
        }
    }

    fn edge_length(&self, points: &[Vec2<F>], from: usize, to: usize) -> F {
        let phi = Round::half_angle::<F>();
        let radius = points[from].distance(points[to]) * F::half() / phi.sin();
        radius * F::two() * phi
    }
}

/// A splitting piece: one stub at -x, two branches diverging by
/// [`SPLIT_ANGLE`] towards +x.
#[derive(Copy, Clone, Debug, Default)]
pub struct Split;

impl Split {
    /// Branch direction of the upper branch; the lower one mirrors it.
    fn branch<F: Float>() -> Vec2<F> {
        Vec2::from_angle(F::from_f32(SPLIT_ANGLE) * F::half())
    }
}

impl<F: Float> TrackShape<F> for Split {
    fn layout(&self) -> (AllocVec<Vec2<F>>, AllocVec<Vec2<F>>) {
        let l = F::from_f32(STRAIGHT_LENGTH) * F::half();
        let d = Split::branch::<F>();
        (
            vec![
                Vec2::new(-l, F::zero()),
                Vec2::new(l * d.x, l * d.y),
                Vec2::new(l * d.x, -l * d.y),
            ],
            vec![
                Vec2::new(-F::one(), F::zero()),
                d,
                Vec2::new(d.x, -d.y),
            ],
        )
    }

    fn outline_path<C: DrawingContext<F> + ?Sized>(&self, ctx: &mut C) {
        let l = F::from_f32(STRAIGHT_LENGTH) * F::half();
        let w = F::from_f32(ELEMENT_WIDTH) * F::half();
        let blend = F::from_f32(SPLIT_BLEND);
        let d = Split::branch::<F>();
        let lower = Vec2::new(d.x, -d.y);
        // Body half-width offsets across each branch end.
        let upper_side = d.perp().scale(w);
        let lower_side = lower.perp().scale(w);

        let upper_end = d.scale(l);
        let lower_end = lower.scale(l);

        ctx.begin_path();
        ctx.move_to(Vec2::new(-l, w));
        ctx.line_to(Vec2::new(-l, -w));
        ctx.bezier_curve_to(
            Vec2::new(-l + blend, -w),
            lower_end - lower_side - lower.scale(blend),
            lower_end - lower_side,
        );
        ctx.line_to(lower_end + lower_side);
        ctx.line_to(upper_end - upper_side);
        ctx.line_to(upper_end + upper_side);
        ctx.bezier_curve_to(
            upper_end + upper_side - d.scale(blend),
            Vec2::new(-l + blend, w),
            Vec2::new(-l, w),
        );
        ctx.close_path();
    }

    fn locate_train(&self, points: &[Vec2<F>], from: usize, to: usize, t: F) -> TrainPose<F> {
        lerp_pose(points[from], points[to], t)
    }
}
