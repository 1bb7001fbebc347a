//! Positional constraints relaxed by the integrator: distance, pin, angle and
//! the aggregate per-element shape constraint.

use crate::float::Float;
use crate::particle::Particle;
use crate::vec::Vec2;
use alloc::vec::Vec as AllocVec;

/// A constraint that can be applied to a set of particles.
///
/// Constraints only refer to particles by their index in the block's particle
/// arena; they never own particle data.
#[derive(Clone, Debug)]
pub enum Constraint<F: Float> {
    Distance(DistanceConstraint<F>),
    Pin(PinConstraint<F>),
    Angle(AngleConstraint<F>),
    Shape(ShapeConstraint<F>),
}

#[derive(Clone, Debug)]
pub struct DistanceConstraint<F: Float> {
    pub a: usize,
    pub b: usize,
    pub rest_length: F,
    pub stiffness: F,
}

#[derive(Clone, Debug)]
pub struct PinConstraint<F: Float> {
    pub particle: usize,
    pub position: Vec2<F>,
    pub stiffness: F,
}

/// Keeps the signed angle `a -> center -> c` at `target_angle`.
#[derive(Clone, Debug)]
pub struct AngleConstraint<F: Float> {
    pub a: usize,
    pub center: usize,
    pub c: usize,
    pub target_angle: F,
    pub stiffness: F,
}

/// Holds a group of particles in the rigid layout `rest` (one entry per
/// particle, same order) by projecting them onto the best-fitting rotation and
/// translation of that layout.
#[derive(Clone, Debug)]
pub struct ShapeConstraint<F: Float> {
    pub particles: AllocVec<usize>,
    pub rest: AllocVec<Vec2<F>>,
    pub stiffness: F,
}

impl<F: Float> Constraint<F> {
    pub fn solve(&self, particles: &mut [Particle<F>]) {
        match self {
            Constraint::Distance(c) => c.solve(particles),
            Constraint::Pin(c) => c.solve(particles),
            Constraint::Angle(c) => c.solve(particles),
            Constraint::Shape(c) => c.solve(particles),
        }
    }

    /// Rewrite particle indices through `map` (old index -> new index).
    ///
    /// Returns `false` if a referenced particle no longer exists.
    pub fn remap(&mut self, map: &[Option<usize>]) -> bool {
        let lookup = |i: &mut usize| match map.get(*i).copied().flatten() {
            Some(j) => {
                *i = j;
                true
            }
            None => false,
        };
        match self {
            Constraint::Distance(c) => lookup(&mut c.a) && lookup(&mut c.b),
            Constraint::Pin(c) => lookup(&mut c.particle),
            Constraint::Angle(c) => lookup(&mut c.a) && lookup(&mut c.center) && lookup(&mut c.c),
            Constraint::Shape(c) => c.particles.iter_mut().all(lookup),
        }
    }
}

impl<F: Float> DistanceConstraint<F> {
    pub fn new(a: usize, b: usize, rest_length: F, stiffness: F) -> Self {
        DistanceConstraint { a, b, rest_length, stiffness }
    }

    pub fn solve(&self, particles: &mut [Particle<F>]) {
        let a_pos = particles[self.a].pos;
        let b_pos = particles[self.b].pos;
        let a_inv = particles[self.a].inv_mass;
        let b_inv = particles[self.b].inv_mass;

        let w_total = a_inv + b_inv;
        if w_total.is_near_zero(F::from_f32(1e-10)) {
            return; // both pinned
        }

        let delta = b_pos - a_pos;
        let dist = delta.length();
        if dist.is_near_zero(F::from_f32(1e-10)) {
            return; // degenerate
        }

        let error = dist - self.rest_length;
        let correction = delta.scale(error * self.stiffness / dist);

        if !particles[self.a].pinned {
            particles[self.a].pos = particles[self.a].pos + correction.scale(a_inv / w_total);
        }
        if !particles[self.b].pinned {
            particles[self.b].pos = particles[self.b].pos - correction.scale(b_inv / w_total);
        }
    }
}

impl<F: Float> PinConstraint<F> {
    pub fn new(particle: usize, position: Vec2<F>, stiffness: F) -> Self {
        PinConstraint { particle, position, stiffness }
    }

    pub fn solve(&self, particles: &mut [Particle<F>]) {
        let correction = self.position - particles[self.particle].pos;
        particles[self.particle].pos = particles[self.particle].pos + correction.scale(self.stiffness);
    }
}

impl<F: Float> AngleConstraint<F> {
    pub fn new(a: usize, center: usize, c: usize, target_angle: F, stiffness: F) -> Self {
        AngleConstraint { a, center, c, target_angle, stiffness }
    }

    pub fn solve(&self, particles: &mut [Particle<F>]) {
        let pivot = particles[self.center].pos;
        let ba = particles[self.a].pos - pivot;
        let bc = particles[self.c].pos - pivot;
        if ba.length_sq().is_near_zero(F::from_f32(1e-12)) || bc.length_sq().is_near_zero(F::from_f32(1e-12)) {
            return;
        }

        // Straight pieces sit right on the ±π seam, so compare on the wrapped error.
        let error = (ba.angle_to(bc) - self.target_angle).wrap_angle();
        let total = error * self.stiffness;

        let (a_free, c_free) = (!particles[self.a].pinned, !particles[self.c].pinned);
        let (turn_a, turn_c) = match (a_free, c_free) {
            (true, true) => (total * F::half(), total * F::half()),
            (true, false) => (total, F::zero()),
            (false, true) => (F::zero(), total),
            (false, false) => return,
        };

        // Opening the angle: A turns forward, C turns back.
        if a_free {
            particles[self.a].pos = particles[self.a].pos.rotate_around(pivot, turn_a);
        }
        if c_free {
            particles[self.c].pos = particles[self.c].pos.rotate_around(pivot, -turn_c);
        }
    }
}

impl<F: Float> ShapeConstraint<F> {
    pub fn new(particles: AllocVec<usize>, rest: AllocVec<Vec2<F>>, stiffness: F) -> Self {
        debug_assert_eq!(particles.len(), rest.len());
        ShapeConstraint { particles, rest, stiffness }
    }

    pub fn solve(&self, particles: &mut [Particle<F>]) {
        let n = self.particles.len();
        if n == 0 {
            return;
        }

        // Pinned particles define the frame when present.
        let pinned = self.particles.iter().filter(|&&i| particles[i].pinned).count();
        let in_anchor = |i: usize| pinned == 0 || particles[i].pinned;

        let mut current_sum = Vec2::zero();
        let mut rest_sum = Vec2::zero();
        let mut anchors = 0usize;
        for (k, &i) in self.particles.iter().enumerate() {
            if in_anchor(i) {
                current_sum = current_sum + particles[i].pos;
                rest_sum = rest_sum + self.rest[k];
                anchors += 1;
            }
        }
        let inv = F::one() / F::from_usize(anchors);
        let current_center = current_sum.scale(inv);
        let rest_center = rest_sum.scale(inv);

        // Orientation from the anchors alone once two or more are fixed.
        let mut sum_cross = F::zero();
        let mut sum_dot = F::zero();
        for (k, &i) in self.particles.iter().enumerate() {
            if anchors >= 2 && !in_anchor(i) {
                continue;
            }
            let q = self.rest[k] - rest_center;
            let p = particles[i].pos - current_center;
            sum_cross = sum_cross + q.cross(p);
            sum_dot = sum_dot + q.dot(p);
        }
        let angle = if sum_cross.is_near_zero(F::from_f32(1e-12)) && sum_dot.is_near_zero(F::from_f32(1e-12)) {
            F::zero()
        } else {
            F::atan2(sum_cross, sum_dot)
        };

        for (k, &i) in self.particles.iter().enumerate() {
            if particles[i].pinned {
                continue;
            }
            let goal = current_center + (self.rest[k] - rest_center).rotate(angle);
            particles[i].pos = particles[i].pos + (goal - particles[i].pos).scale(self.stiffness);
        }
    }
}
