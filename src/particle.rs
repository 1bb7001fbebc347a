//! Track endpoints: Verlet particles that know which element they belong to.

use crate::block::ConnectionId;
use crate::element::ElementId;
use crate::float::Float;
use crate::vec::Vec2;

/// A Verlet particle: position-based dynamics with implicit velocity.
///
/// Every particle is either the center of an element or one of its boundary
/// points (`slot` indexes the element's point list). Boundary points carry the
/// outward direction of the track at that end in canonical orientation and at
/// most one connection to another element's boundary point.
#[derive(Clone, Debug)]
pub struct Particle<F: Float> {
    pub pos: Vec2<F>,
    pub prev_pos: Vec2<F>,
    pub acceleration: Vec2<F>,
    pub mass: F,
    pub inv_mass: F,
    pub pinned: bool,
    pub owner: ElementId,
    pub slot: usize,
    pub is_center: bool,
    pub direction: Vec2<F>,
    pub connection: Option<ConnectionId>,
}

impl<F: Float> Particle<F> {
    pub fn endpoint(pos: Vec2<F>, direction: Vec2<F>, owner: ElementId, slot: usize) -> Self {
        Particle {
            pos,
            prev_pos: pos,
            acceleration: Vec2::zero(),
            mass: F::one(),
            inv_mass: F::one(),
            pinned: false,
            owner,
            slot,
            is_center: false,
            direction,
            connection: None,
        }
    }

    pub fn center(pos: Vec2<F>, owner: ElementId) -> Self {
        Particle {
            is_center: true,
            ..Particle::endpoint(pos, Vec2::zero(), owner, 0)
        }
    }

    pub fn apply_acceleration(&mut self, accel: Vec2<F>) {
        if !self.pinned {
            self.acceleration = self.acceleration + accel;
        }
    }

    pub fn integrate(&mut self, dt: F, damping: F) {
        if self.pinned {
            return;
        }
        let velocity = (self.pos - self.prev_pos).scale(damping);
        let new_pos = self.pos + velocity + self.acceleration.scale(dt * dt);
        self.prev_pos = self.pos;
        self.pos = new_pos;
        self.acceleration = Vec2::zero();
    }

    pub fn velocity_raw(&self) -> Vec2<F> {
        self.pos - self.prev_pos
    }

    /// Place the particle at `pos` with no implied velocity.
    pub fn set_at_rest(&mut self, pos: Vec2<F>) {
        self.pos = pos;
        self.prev_pos = pos;
    }

    pub fn pin(&mut self) {
        self.pinned = true;
        self.inv_mass = F::zero();
        self.prev_pos = self.pos;
    }

    pub fn unpin(&mut self) {
        self.pinned = false;
        self.inv_mass = if self.mass.is_near_zero(F::from_f32(1e-10)) {
            F::zero()
        } else {
            F::one() / self.mass
        };
    }
}
