//! Railway elements: a center particle plus a fixed set of boundary
//! particles, held rigid by constraints and drawn in a canonical frame.

use crate::block::Connection;
use crate::config::{BlockConfig, ConstraintRegime};
use crate::constraint::{AngleConstraint, Constraint, DistanceConstraint, ShapeConstraint};
use crate::error::RailwayError;
use crate::float::Float;
use crate::outline::{DrawingContext, OutlineContext, Polygon};
use crate::particle::Particle;
use crate::shape::{Round, Split, Straight, TrackShape, TrainPose};
use crate::vec::Vec2;
use alloc::vec::Vec as AllocVec;

/// Index of an element inside its block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

/// The closed set of track pieces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Straight,
    Round { convex: bool },
    Split,
}

impl ElementKind {
    /// One-letter tag used in snapshots.
    pub fn tag(&self) -> &'static str {
        match self {
            ElementKind::Straight => "s",
            ElementKind::Round { .. } => "r",
            ElementKind::Split => "v",
        }
    }

    pub fn point_count(&self) -> usize {
        match self {
            ElementKind::Straight | ElementKind::Round { .. } => 2,
            ElementKind::Split => 3,
        }
    }

    pub fn layout<F: Float>(&self) -> (AllocVec<Vec2<F>>, AllocVec<Vec2<F>>) {
        match *self {
            ElementKind::Straight => TrackShape::<F>::layout(&Straight),
            ElementKind::Round { convex } => TrackShape::<F>::layout(&Round { convex }),
            ElementKind::Split => TrackShape::<F>::layout(&Split),
        }
    }

    pub fn outline_path<F: Float, C: DrawingContext<F> + ?Sized>(&self, ctx: &mut C) {
        match *self {
            ElementKind::Straight => TrackShape::<F>::outline_path(&Straight, ctx),
            ElementKind::Round { convex } => TrackShape::<F>::outline_path(&Round { convex }, ctx),
            ElementKind::Split => TrackShape::<F>::outline_path(&Split, ctx),
        }
    }

    pub fn locate_train<F: Float>(&self, points: &[Vec2<F>], from: usize, to: usize, t: F) -> TrainPose<F> {
        match *self {
            ElementKind::Straight => TrackShape::<F>::locate_train(&Straight, points, from, to, t),
            ElementKind::Round { convex } => TrackShape::<F>::locate_train(&Round { convex }, points, from, to, t),
            ElementKind::Split => TrackShape::<F>::locate_train(&Split, points, from, to, t),
        }
    }

    pub fn edge_length<F: Float>(&self, points: &[Vec2<F>], from: usize, to: usize) -> F {
        match *self {
            ElementKind::Straight => TrackShape::<F>::edge_length(&Straight, points, from, to),
            ElementKind::Round { convex } => TrackShape::<F>::edge_length(&Round { convex }, points, from, to),
            ElementKind::Split => TrackShape::<F>::edge_length(&Split, points, from, to),
        }
    }
}

/// How an element is nailed to the table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PinLevel {
    /// Not pinned.
    #[default]
    Free,
    /// Center pinned; the piece may still turn around it.
    Center,
    /// Every boundary point pinned.
    Ends,
}

impl PinLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            PinLevel::Free => 0,
            PinLevel::Center => 1,
            PinLevel::Ends => 2,
        }
    }
}

impl TryFrom<i64> for PinLevel {
    type Error = RailwayError;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(PinLevel::Free),
            1 => Ok(PinLevel::Center),
            2 => Ok(PinLevel::Ends),
            other => Err(RailwayError::InvalidPinLevel(other)),
        }
    }
}

/// A track piece living in a [`RailwayBlock`](crate::block::RailwayBlock).
///
/// The element only stores indices into the block's particle arena. Its
/// canonical layout (center at the origin) is kept so rest values, outlines
/// and placements can always be expressed in the construction-time frame.
#[derive(Clone, Debug)]
pub struct RailwayElement<F: Float> {
    pub(crate) id: ElementId,
    kind: ElementKind,
    pub(crate) center: usize,
    pub(crate) points: AllocVec<usize>,
    canonical: AllocVec<Vec2<F>>,
    directions: AllocVec<Vec2<F>>,
    initial_angle: F,
    mass_shift: Vec2<F>,
    pub(crate) pins: PinLevel,
    intersected: bool,
    outline_cache: Option<(u64, Polygon<F>)>,
}

/// Mean of the unwrapped angles from `center` to every point, measured
/// towards the reference axis. Each angle is lifted by full turns until it is
/// no smaller than the previous one so the mean never straddles the ±π seam.
fn unwrapped_mean_angle<F: Float>(center: Vec2<F>, points: impl Iterator<Item = Vec2<F>>) -> F {
    let mut total = F::zero();
    let mut last = F::zero();
    let mut count = 0usize;
    for p in points {
        let mut a = (p - center).angle_to(Vec2::one());
        while a < last {
            a = a + F::tau();
        }
        last = a;
        total = total + a;
        count += 1;
    }
    if count == 0 {
        F::zero()
    } else {
        total / F::from_usize(count)
    }
}

impl<F: Float> RailwayElement<F> {
    /// Lay out a new element whose particles will occupy arena slots
    /// `base` (center) and `base + 1 ..` (boundary points).
    pub(crate) fn new(id: ElementId, kind: ElementKind, base: usize) -> Self {
        let (canonical, directions) = kind.layout::<F>();
        debug_assert_eq!(canonical.len(), kind.point_count());

        let initial_angle = unwrapped_mean_angle(Vec2::zero(), canonical.iter().copied());
        let mut sum = Vec2::zero();
        for p in &canonical {
            sum = sum + *p;
        }
        let mass_shift = sum.scale(F::one() / F::from_usize(canonical.len()));

        RailwayElement {
            id,
            kind,
            center: base,
            points: (1..=canonical.len()).map(|i| base + i).collect(),
            canonical,
            directions,
            initial_angle,
            mass_shift,
            pins: PinLevel::Free,
            intersected: false,
            outline_cache: None,
        }
    }

    /// Fresh particles in canonical position: center first, then points.
    pub(crate) fn spawn_particles(&self) -> AllocVec<Particle<F>> {
        let mut particles = AllocVec::with_capacity(self.points.len() + 1);
        particles.push(Particle::center(Vec2::zero(), self.id));
        for (slot, (pos, dir)) in self.canonical.iter().zip(self.directions.iter()).enumerate() {
            particles.push(Particle::endpoint(*pos, *dir, self.id, slot));
        }
        particles
    }

    /// Constraints that keep this element rigid. Rest values come from the
    /// canonical layout, not from wherever the particles currently are.
    pub(crate) fn shape_constraints(&self, config: &BlockConfig<F>) -> AllocVec<Constraint<F>> {
        let k = config.stiffness;
        let mut constraints = AllocVec::new();
        match config.regime {
            ConstraintRegime::Simple => {
                let n = self.points.len();
                for i in 0..n {
                    for j in (i + 1)..n {
                        let rest = self.canonical[i].distance(self.canonical[j]);
                        constraints.push(Constraint::Distance(DistanceConstraint::new(
                            self.points[i], self.points[j], rest, k,
                        )));
                    }
                    let rest = self.canonical[i].length();
                    constraints.push(Constraint::Distance(DistanceConstraint::new(
                        self.points[i], self.center, rest, k,
                    )));
                }
                for i in 0..n {
                    let j = (i + 1) % n;
                    let target = self.canonical[i].angle_to(self.canonical[j]);
                    constraints.push(Constraint::Angle(AngleConstraint::new(
                        self.points[i], self.center, self.points[j], target, k,
                    )));
                }
            }
            ConstraintRegime::Element => {
                let mut indices = AllocVec::with_capacity(self.points.len() + 1);
                let mut rest = AllocVec::with_capacity(self.points.len() + 1);
                indices.push(self.center);
                rest.push(Vec2::zero());
                indices.extend(self.points.iter().copied());
                rest.extend(self.canonical.iter().copied());
                constraints.push(Constraint::Shape(ShapeConstraint::new(indices, rest, k)));
            }
        }
        constraints
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Arena index of the center particle.
    pub fn center(&self) -> usize {
        self.center
    }

    /// Arena indices of the boundary particles, in slot order.
    pub fn points(&self) -> &[usize] {
        &self.points
    }

    pub fn pins(&self) -> PinLevel {
        self.pins
    }

    pub fn initial_angle(&self) -> F {
        self.initial_angle
    }

    pub fn mass_shift(&self) -> Vec2<F> {
        self.mass_shift
    }

    /// Canonical position of a boundary point relative to the center.
    pub fn canonical_point(&self, slot: usize) -> Vec2<F> {
        self.canonical[slot]
    }

    pub fn intersected(&self) -> bool {
        self.intersected
    }

    pub fn clear_intersected(&mut self) {
        self.intersected = false;
    }

    pub fn set_intersected(&mut self) {
        self.intersected = true;
    }

    pub fn contains_endpoint(&self, particle: usize) -> bool {
        self.points.contains(&particle)
    }

    /// Slot of a boundary particle, if it belongs to this element.
    pub fn slot_of(&self, particle: usize) -> Option<usize> {
        self.points.iter().position(|&p| p == particle)
    }

    pub fn contains_connection(&self, connection: &Connection) -> bool {
        self.points
            .iter()
            .any(|&p| connection.endpoint1 == p || connection.endpoint2 == p)
    }

    /// Every particle index owned by the element, center first.
    pub fn particle_indices(&self) -> impl Iterator<Item = usize> + '_ {
        core::iter::once(self.center).chain(self.points.iter().copied())
    }

    /// Live rotation estimate: mean unwrapped angle of the boundary points
    /// around the center.
    pub fn current_angle(&self, particles: &[Particle<F>]) -> F {
        let c = particles[self.center].pos;
        unwrapped_mean_angle(c, self.points.iter().map(|&i| particles[i].pos))
    }

    /// Rotation that takes the canonical frame to the live one.
    pub fn current_rotation(&self, particles: &[Particle<F>]) -> F {
        self.initial_angle - self.current_angle(particles)
    }

    /// Arithmetic mean of the boundary point positions.
    pub fn current_mass_center(&self, particles: &[Particle<F>]) -> Vec2<F> {
        let mut sum = Vec2::zero();
        for &i in &self.points {
            sum = sum + particles[i].pos;
        }
        sum.scale(F::one() / F::from_usize(self.points.len()))
    }

    /// Map a canonical-frame point into the live world frame.
    pub fn local_to_world(&self, particles: &[Particle<F>], local: Vec2<F>) -> Vec2<F> {
        self.current_mass_center(particles) + (local - self.mass_shift).rotate(self.current_rotation(particles))
    }

    /// Outward track direction at a boundary point in the live frame.
    pub fn current_direction(&self, particles: &[Particle<F>], slot: usize) -> Vec2<F> {
        self.directions[slot].rotate(self.current_rotation(particles))
    }

    /// Set up `ctx` so canonical coordinates land on the live element.
    pub fn transform_context<C: DrawingContext<F> + ?Sized>(&self, ctx: &mut C, particles: &[Particle<F>]) {
        ctx.translate(self.current_mass_center(particles));
        ctx.rotate(self.current_rotation(particles));
        ctx.translate(-self.mass_shift);
    }

    /// Trace the element's body in canonical coordinates.
    pub fn outline_path<C: DrawingContext<F> + ?Sized>(&self, ctx: &mut C) {
        self.kind.outline_path(ctx);
    }

    /// Stroke the element's outline on a real surface.
    pub fn draw_outline<C: DrawingContext<F> + ?Sized>(&self, ctx: &mut C, particles: &[Particle<F>]) {
        ctx.save();
        self.transform_context(ctx, particles);
        self.outline_path(ctx);
        ctx.stroke();
        ctx.restore();
    }

    /// Recompute the world-space outline unless it is already current for
    /// `frame_index`.
    pub(crate) fn refresh_outline(&mut self, particles: &[Particle<F>], frame_index: u64, config: &BlockConfig<F>) {
        if let Some((frame, _)) = &self.outline_cache {
            if *frame == frame_index {
                return;
            }
        }
        let mut ctx = OutlineContext::new(config.arc_segments, config.bezier_segments);
        self.transform_context(&mut ctx, particles);
        self.outline_path(&mut ctx);
        self.outline_cache = Some((frame_index, ctx.into_polygon()));
    }

    /// Cached outline and the frame it was computed for.
    pub fn cached_outline(&self) -> Option<(u64, &Polygon<F>)> {
        self.outline_cache.as_ref().map(|(frame, poly)| (*frame, poly))
    }

    pub(crate) fn invalidate_outline(&mut self) {
        self.outline_cache = None;
    }

    /// Place a train between two of this element's boundary particles.
    ///
    /// # Panics
    /// Panics if either particle is not a boundary point of this element, or
    /// if both are the same point.
    pub fn locate_train(&self, particles: &[Particle<F>], p1: usize, p2: usize, t: F) -> TrainPose<F> {
        let (Some(from), Some(to)) = (self.slot_of(p1), self.slot_of(p2)) else {
            panic!(
                "particles {} and {} are not both boundary points of element {}",
                p1, p2, self.id.0
            );
        };
        assert_ne!(from, to, "train traversal needs two distinct points");

        let live: AllocVec<Vec2<F>> = self.points.iter().map(|&i| particles[i].pos).collect();
        self.kind.locate_train(&live, from, to, t)
    }

    /// Track length between two boundary slots in the live layout.
    pub fn edge_length(&self, particles: &[Particle<F>], from: usize, to: usize) -> F {
        let live: AllocVec<Vec2<F>> = self.points.iter().map(|&i| particles[i].pos).collect();
        self.kind.edge_length(&live, from, to)
    }

    /// Rigid canonical layout placed so `slot` lands on `target` with its
    /// outward direction pointing along `facing`. Center first, then points.
    pub(crate) fn placed_layout(&self, slot: usize, target: Vec2<F>, facing: Vec2<F>) -> AllocVec<Vec2<F>> {
        let turn = self.directions[slot].angle_to(facing);
        let anchor = self.canonical[slot];
        core::iter::once(Vec2::zero())
            .chain(self.canonical.iter().copied())
            .map(|local| target + (local - anchor).rotate(turn))
            .collect()
    }

    pub(crate) fn remap(&mut self, id: ElementId, map: &[Option<usize>]) {
        self.id = id;
        if let Some(c) = map.get(self.center).copied().flatten() {
            self.center = c;
        }
        for p in self.points.iter_mut() {
            if let Some(q) = map.get(*p).copied().flatten() {
                *p = q;
            }
        }
        self.outline_cache = None;
    }
}
