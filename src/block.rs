//! The railway block: particle arena, constraint list, elements and the
//! connections between them.

use crate::config::BlockConfig;
use crate::constraint::{Constraint, DistanceConstraint, PinConstraint};
use crate::element::{ElementId, ElementKind, PinLevel, RailwayElement};
use crate::error::RailwayError;
use crate::float::Float;
use crate::outline::Polygon;
use crate::particle::Particle;
use crate::shape::TrainPose;
use crate::vec::Vec2;
use alloc::vec;
use alloc::vec::Vec as AllocVec;
use log::{debug, trace};

/// Index of a connection inside its block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub usize);

/// Two boundary particles declared to be the same joint.
///
/// The relation is symmetric; a connection never owns its particles.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    pub endpoint1: usize,
    pub endpoint2: usize,
}

impl Connection {
    pub fn involves(&self, particle: usize) -> bool {
        self.endpoint1 == particle || self.endpoint2 == particle
    }

    /// The endpoint on the far side of `particle`.
    pub fn other(&self, particle: usize) -> Option<usize> {
        if self.endpoint1 == particle {
            Some(self.endpoint2)
        } else if self.endpoint2 == particle {
            Some(self.endpoint1)
        } else {
            None
        }
    }
}

/// Who contributed a constraint to the block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintOwner {
    /// Rigidity constraints of an element.
    Shape(ElementId),
    /// Pin constraints of an element.
    Pins(ElementId),
    /// Coincidence constraint of a connection.
    Joint(ConnectionId),
    /// Ad-hoc block-level constraint.
    Block,
}

#[derive(Clone, Debug)]
pub struct OwnedConstraint<F: Float> {
    pub owner: ConstraintOwner,
    pub constraint: Constraint<F>,
}

/// Aggregate simulation state.
///
/// `particles` and `constraints` are always exactly what the current
/// elements, pins and connections contributed plus any block-level
/// constraints. `frame_index` counts completed ticks and tags outline caches.
pub struct RailwayBlock<F: Float> {
    pub(crate) particles: AllocVec<Particle<F>>,
    pub(crate) constraints: AllocVec<OwnedConstraint<F>>,
    pub(crate) elements: AllocVec<RailwayElement<F>>,
    pub(crate) connections: AllocVec<Connection>,
    pub(crate) frame_index: u64,
    config: BlockConfig<F>,
}

impl<F: Float> RailwayBlock<F> {
    pub fn new(config: BlockConfig<F>) -> Self {
        RailwayBlock {
            particles: AllocVec::new(),
            constraints: AllocVec::new(),
            elements: AllocVec::new(),
            connections: AllocVec::new(),
            frame_index: 0,
            config,
        }
    }

    pub fn config(&self) -> &BlockConfig<F> {
        &self.config
    }

    pub fn particles(&self) -> &[Particle<F>] {
        &self.particles
    }

    pub fn particle(&self, index: usize) -> &Particle<F> {
        &self.particles[index]
    }

    pub fn constraints(&self) -> &[OwnedConstraint<F>] {
        &self.constraints
    }

    pub fn elements(&self) -> &[RailwayElement<F>] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&RailwayElement<F>> {
        self.elements.get(id.0)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id.0)
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn particle_count(&self) -> usize { self.particles.len() }
    pub fn constraint_count(&self) -> usize { self.constraints.len() }
    pub fn element_count(&self) -> usize { self.elements.len() }

    fn check_element(&self, id: ElementId) -> Result<(), RailwayError> {
        if id.0 < self.elements.len() {
            Ok(())
        } else {
            Err(RailwayError::ElementOutOfBounds { index: id.0, count: self.elements.len() })
        }
    }

    fn check_particle(&self, index: usize) -> Result<(), RailwayError> {
        if index < self.particles.len() {
            Ok(())
        } else {
            Err(RailwayError::ParticleOutOfBounds { index, count: self.particles.len() })
        }
    }

    /// Build a new element in canonical position and add its particles and
    /// rigidity constraints to the block.
    pub fn add_element(&mut self, kind: ElementKind) -> ElementId {
        let id = ElementId(self.elements.len());
        let element = RailwayElement::new(id, kind, self.particles.len());
        self.particles.extend(element.spawn_particles());
        self.constraints.extend(
            element
                .shape_constraints(&self.config)
                .into_iter()
                .map(|constraint| OwnedConstraint { owner: ConstraintOwner::Shape(id), constraint }),
        );
        debug!("added {:?} element {} ({} particles)", kind, id.0, element.points.len() + 1);
        self.elements.push(element);
        id
    }

    /// Remove an element together with its particles, constraints, pins and
    /// connections. Ids of later elements, connections and particle indices
    /// shift down to stay dense.
    pub fn remove_element(&mut self, id: ElementId) -> Result<(), RailwayError> {
        self.check_element(id)?;
        self.set_pins(id, PinLevel::Free)?;

        let owned: AllocVec<usize> = self.elements[id.0].particle_indices().collect();
        self.retain_connections(|c| !owned.iter().any(|&p| c.involves(p)));
        self.constraints.retain(|c| c.owner != ConstraintOwner::Shape(id));

        // Particle compaction.
        let mut map = vec![None; self.particles.len()];
        let mut next = 0;
        for (old, p) in self.particles.iter().enumerate() {
            if p.owner != id {
                map[old] = Some(next);
                next += 1;
            }
        }
        self.particles.retain(|p| p.owner != id);
        self.constraints.retain_mut(|c| c.constraint.remap(&map));
        for c in self.connections.iter_mut() {
            if let (Some(a), Some(b)) = (map[c.endpoint1], map[c.endpoint2]) {
                c.endpoint1 = a;
                c.endpoint2 = b;
            }
        }

        // Element compaction.
        self.elements.remove(id.0);
        let shift = |e: ElementId| if e.0 > id.0 { ElementId(e.0 - 1) } else { e };
        for (i, element) in self.elements.iter_mut().enumerate() {
            element.remap(ElementId(i), &map);
        }
        for p in self.particles.iter_mut() {
            p.owner = shift(p.owner);
        }
        for c in self.constraints.iter_mut() {
            c.owner = match c.owner {
                ConstraintOwner::Shape(e) => ConstraintOwner::Shape(shift(e)),
                ConstraintOwner::Pins(e) => ConstraintOwner::Pins(shift(e)),
                other => other,
            };
        }

        debug!("removed element {} ({} elements left)", id.0, self.elements.len());
        Ok(())
    }

    /// Remove every element, particle, constraint and connection.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.constraints.clear();
        self.elements.clear();
        self.connections.clear();
    }

    /// Drop connections failing `keep`, along with their joint constraints,
    /// and renumber the rest.
    fn retain_connections(&mut self, keep: impl Fn(&Connection) -> bool) {
        let mut map = vec![None; self.connections.len()];
        let mut kept = AllocVec::with_capacity(self.connections.len());
        for (old, c) in self.connections.iter().enumerate() {
            if keep(c) {
                map[old] = Some(ConnectionId(kept.len()));
                kept.push(*c);
            }
        }
        self.connections = kept;
        for p in self.particles.iter_mut() {
            p.connection = p.connection.and_then(|c| map[c.0]);
        }
        self.constraints.retain_mut(|c| match c.owner {
            ConstraintOwner::Joint(old) => match map[old.0] {
                Some(new) => {
                    c.owner = ConstraintOwner::Joint(new);
                    true
                }
                None => false,
            },
            _ => true,
        });
    }

    /// Change how an element is pinned.
    ///
    /// The previous pin constraints are always removed before the new ones
    /// are installed; setting the current level again does nothing.
    pub fn set_pins(&mut self, id: ElementId, level: PinLevel) -> Result<(), RailwayError> {
        self.check_element(id)?;
        if self.elements[id.0].pins == level {
            return Ok(());
        }
        self.install_pins(id, level);
        debug!("element {} pins set to {:?}", id.0, level);
        Ok(())
    }

    fn install_pins(&mut self, id: ElementId, level: PinLevel) {
        self.constraints.retain(|c| c.owner != ConstraintOwner::Pins(id));
        let element = &mut self.elements[id.0];
        element.pins = level;
        for i in core::iter::once(element.center).chain(element.points.iter().copied()) {
            self.particles[i].unpin();
        }

        let anchored: AllocVec<usize> = match level {
            PinLevel::Free => AllocVec::new(),
            PinLevel::Center => vec![element.center],
            PinLevel::Ends => element.points.clone(),
        };
        for i in anchored {
            self.particles[i].pin();
            let constraint = PinConstraint::new(i, self.particles[i].pos, F::one());
            self.constraints.push(OwnedConstraint {
                owner: ConstraintOwner::Pins(id),
                constraint: Constraint::Pin(constraint),
            });
        }
    }

    /// Re-anchor pins at the element's current position.
    fn refresh_pins(&mut self, id: ElementId) {
        let level = self.elements[id.0].pins;
        if level != PinLevel::Free {
            self.install_pins(id, level);
        }
    }

    /// Append a block-level constraint, e.g. a pin that is not tied to any
    /// element's pin level.
    pub fn add_block_constraint(&mut self, constraint: Constraint<F>) {
        self.constraints.push(OwnedConstraint { owner: ConstraintOwner::Block, constraint });
    }

    /// Translate an element, at rest, so its center lands on `pos`.
    pub fn move_element(&mut self, id: ElementId, pos: Vec2<F>) -> Result<(), RailwayError> {
        self.check_element(id)?;
        let element = &self.elements[id.0];
        let translate = pos - self.particles[element.center].pos;
        for i in element.particle_indices() {
            let target = self.particles[i].pos + translate;
            self.particles[i].set_at_rest(target);
        }
        self.elements[id.0].invalidate_outline();
        self.refresh_pins(id);
        Ok(())
    }

    /// Rigidly place an element so boundary point `slot` sits on `target`
    /// with its track running out against `outward` (the direction a
    /// neighbouring end points in). The element is reset to its exact
    /// canonical shape and left at rest.
    pub fn place(&mut self, id: ElementId, slot: usize, target: Vec2<F>, outward: Vec2<F>) -> Result<(), RailwayError> {
        self.check_element(id)?;
        let element = &self.elements[id.0];
        if slot >= element.points.len() {
            return Err(RailwayError::SlotOutOfBounds { slot, count: element.points.len() });
        }
        let layout = element.placed_layout(slot, target, -outward);
        let indices: AllocVec<usize> = element.particle_indices().collect();
        for (i, pos) in indices.into_iter().zip(layout) {
            self.particles[i].set_at_rest(pos);
        }
        self.elements[id.0].invalidate_outline();
        self.refresh_pins(id);
        Ok(())
    }

    /// Snap boundary point `slot` of `id` onto boundary particle `particle`
    /// of another element and connect the two.
    pub fn attach(&mut self, id: ElementId, slot: usize, particle: usize) -> Result<ConnectionId, RailwayError> {
        self.check_element(id)?;
        let points = &self.elements[id.0].points;
        let Some(&endpoint) = points.get(slot) else {
            return Err(RailwayError::SlotOutOfBounds { slot, count: points.len() });
        };
        // Nothing moves unless the joint will be accepted.
        self.check_joint(endpoint, particle)?;
        if self.particles[particle].owner == id {
            return Err(RailwayError::SelfConnection(particle));
        }

        let host = &self.particles[particle];
        let (target, host_slot, host_id) = (host.pos, host.slot, host.owner);
        let outward = self.elements[host_id.0].current_direction(&self.particles, host_slot);
        self.place(id, slot, target, outward)?;
        self.add_connection(endpoint, particle)
    }

    fn check_joint(&self, p1: usize, p2: usize) -> Result<(), RailwayError> {
        self.check_particle(p1)?;
        self.check_particle(p2)?;
        if p1 == p2 {
            return Err(RailwayError::SelfConnection(p1));
        }
        for p in [p1, p2] {
            if self.particles[p].is_center {
                return Err(RailwayError::NotAnEndpoint(p));
            }
            if self.particles[p].connection.is_some() {
                return Err(RailwayError::AlreadyConnected(p));
            }
        }
        Ok(())
    }

    /// Declare two boundary particles the same joint.
    pub fn add_connection(&mut self, p1: usize, p2: usize) -> Result<ConnectionId, RailwayError> {
        self.check_joint(p1, p2)?;

        let id = ConnectionId(self.connections.len());
        self.connections.push(Connection { endpoint1: p1, endpoint2: p2 });
        self.particles[p1].connection = Some(id);
        self.particles[p2].connection = Some(id);
        if self.config.enforce_joints {
            self.constraints.push(OwnedConstraint {
                owner: ConstraintOwner::Joint(id),
                constraint: Constraint::Distance(DistanceConstraint::new(p1, p2, F::zero(), self.config.stiffness)),
            });
        }
        debug!("connected particles {} and {} as joint {}", p1, p2, id.0);
        Ok(id)
    }

    /// Remove a connection; later connection ids shift down.
    pub fn disconnect(&mut self, id: ConnectionId) -> Result<(), RailwayError> {
        if id.0 >= self.connections.len() {
            return Err(RailwayError::ConnectionOutOfBounds { index: id.0, count: self.connections.len() });
        }
        let target = self.connections[id.0];
        self.retain_connections(|c| *c != target);
        debug!("disconnected joint {}", id.0);
        Ok(())
    }

    /// The particle on the other side of `particle`'s connection.
    pub fn neighbor(&self, particle: usize) -> Option<usize> {
        let connection = self.particles.get(particle)?.connection?;
        self.connections.get(connection.0)?.other(particle)
    }

    /// Whether any boundary point of `other` is connected to a boundary
    /// point of `element`.
    pub fn is_connected_with(&self, element: ElementId, other: ElementId) -> bool {
        let (Some(this), Some(that)) = (self.element(element), self.element(other)) else {
            return false;
        };
        that.points.iter().any(|&p| {
            self.particles[p]
                .connection
                .and_then(|c| self.connections.get(c.0))
                .is_some_and(|c| this.contains_connection(c))
        })
    }

    /// Connect every pair of free boundary points of different elements that
    /// lie within `tolerance` of each other. Returns the number of new
    /// connections.
    pub fn connect_coincident(&mut self, tolerance: F) -> usize {
        let limit = tolerance * tolerance;
        let mut made = 0;
        for a in 0..self.particles.len() {
            for b in (a + 1)..self.particles.len() {
                let (pa, pb) = (&self.particles[a], &self.particles[b]);
                if pa.is_center || pb.is_center || pa.owner == pb.owner {
                    continue;
                }
                if pa.connection.is_some() || pb.connection.is_some() {
                    continue;
                }
                if pa.pos.distance_sq(pb.pos) <= limit && self.add_connection(a, b).is_ok() {
                    made += 1;
                }
            }
        }
        made
    }

    /// Displace a particle without touching its previous position, giving
    /// it a velocity the way a drag does.
    pub fn nudge(&mut self, particle: usize, offset: Vec2<F>) -> Result<(), RailwayError> {
        self.check_particle(particle)?;
        let p = &mut self.particles[particle];
        p.pos = p.pos + offset;
        Ok(())
    }

    /// One sequential relaxation pass over every constraint.
    pub(crate) fn relax(&mut self) {
        for c in &self.constraints {
            c.constraint.solve(&mut self.particles);
        }
    }

    /// World-space outline of an element, cached for the current frame.
    pub fn intersection_outline(&mut self, id: ElementId) -> Result<&Polygon<F>, RailwayError> {
        self.check_element(id)?;
        let (frame, count) = (self.frame_index, self.elements.len());
        let element = &mut self.elements[id.0];
        element.refresh_outline(&self.particles, frame, &self.config);
        element
            .cached_outline()
            .map(|(_, outline)| outline)
            .ok_or(RailwayError::ElementOutOfBounds { index: id.0, count })
    }

    /// Flag every element whose outline overlaps an element it is not
    /// connected to. Returns the number of flagged elements.
    pub fn evaluate_intersections(&mut self) -> usize {
        let frame = self.frame_index;
        for element in self.elements.iter_mut() {
            element.clear_intersected();
            element.refresh_outline(&self.particles, frame, &self.config);
        }

        let n = self.elements.len();
        let mut hits = vec![false; n];
        for i in 0..n {
            for j in (i + 1)..n {
                if self.is_connected_with(ElementId(i), ElementId(j)) {
                    continue;
                }
                let (Some((_, a)), Some((_, b))) = (self.elements[i].cached_outline(), self.elements[j].cached_outline()) else {
                    continue;
                };
                if a.overlaps(b) {
                    hits[i] = true;
                    hits[j] = true;
                }
            }
        }

        let mut flagged = 0;
        for (element, hit) in self.elements.iter_mut().zip(hits) {
            if hit {
                element.set_intersected();
                flagged += 1;
            }
        }
        trace!("frame {}: {} intersected elements", frame, flagged);
        flagged
    }

    /// Topmost element whose outline contains `point`.
    pub fn element_at(&mut self, point: Vec2<F>) -> Option<ElementId> {
        let frame = self.frame_index;
        for element in self.elements.iter_mut().rev() {
            element.refresh_outline(&self.particles, frame, &self.config);
            if let Some((_, outline)) = element.cached_outline() {
                if outline.contains(point) {
                    return Some(element.id);
                }
            }
        }
        None
    }

    /// Place a train between two boundary particles of an element.
    ///
    /// # Panics
    /// Panics if `id` is not an element of the block or the particles are not
    /// two distinct boundary points of it.
    pub fn locate_train(&self, id: ElementId, p1: usize, p2: usize, t: F) -> TrainPose<F> {
        self.elements[id.0].locate_train(&self.particles, p1, p2, t)
    }
}

impl<F: Float> Default for RailwayBlock<F> {
    fn default() -> Self {
        Self::new(BlockConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_element_fills_block() {
        let mut block: RailwayBlock<f64> = RailwayBlock::default();
        let a = block.add_element(ElementKind::Straight);
        let b = block.add_element(ElementKind::Split);
        assert_eq!(block.particle_count(), 3 + 4);
        // Straight: 1 pair + 2 center + 2 angles. Split: 3 + 3 + 3.
        assert_eq!(block.constraint_count(), 5 + 9);
        assert_eq!(block.element(b).map(|e| e.points().len()), Some(3));
        assert_eq!(block.particle(block.element(a).map(|e| e.center()).unwrap_or(0)).owner, a);
    }

    #[test]
    fn set_pins_replaces_previous_anchors() {
        let mut block: RailwayBlock<f64> = RailwayBlock::default();
        let id = block.add_element(ElementKind::Split);
        let base = block.constraint_count();

        block.set_pins(id, PinLevel::Ends).unwrap();
        assert_eq!(block.constraint_count(), base + 3);
        block.set_pins(id, PinLevel::Center).unwrap();
        assert_eq!(block.constraint_count(), base + 1);
        block.set_pins(id, PinLevel::Center).unwrap();
        assert_eq!(block.constraint_count(), base + 1);
        block.set_pins(id, PinLevel::Free).unwrap();
        assert_eq!(block.constraint_count(), base);
        assert!(block.particles().iter().all(|p| !p.pinned));
    }

    #[test]
    fn connection_rules() {
        let mut block: RailwayBlock<f64> = RailwayBlock::default();
        let a = block.add_element(ElementKind::Straight);
        let b = block.add_element(ElementKind::Straight);
        let (ea, eb) = (block.elements()[a.0].points().to_vec(), block.elements()[b.0].points().to_vec());

        assert_eq!(block.add_connection(ea[1], ea[1]), Err(RailwayError::SelfConnection(ea[1])));
        let center = block.elements()[a.0].center();
        assert_eq!(block.add_connection(center, eb[0]), Err(RailwayError::NotAnEndpoint(center)));
        block.add_connection(ea[1], eb[0]).unwrap();
        assert_eq!(block.add_connection(ea[1], eb[1]), Err(RailwayError::AlreadyConnected(ea[1])));

        assert!(block.is_connected_with(a, b));
        assert!(block.is_connected_with(b, a));
        assert_eq!(block.neighbor(eb[0]), Some(ea[1]));
        assert_eq!(block.neighbor(eb[1]), None);
    }

    #[test]
    fn remove_element_compacts_everything() {
        let mut block: RailwayBlock<f64> = RailwayBlock::new(BlockConfig::new().with_enforced_joints(true));
        let a = block.add_element(ElementKind::Straight);
        let b = block.add_element(ElementKind::Round { convex: true });
        let c = block.add_element(ElementKind::Straight);
        let a_end = block.elements()[a.0].points()[1];
        let c_start = block.elements()[c.0].points()[0];
        block.attach(b, 0, a_end).unwrap();
        let b_end = block.elements()[b.0].points()[1];
        block.attach(c, 0, b_end).unwrap();
        block.set_pins(b, PinLevel::Center).unwrap();
        let per_straight = 5;

        block.remove_element(b).unwrap();

        assert_eq!(block.element_count(), 2);
        assert_eq!(block.particle_count(), 6);
        assert_eq!(block.connections().len(), 0);
        assert_eq!(block.constraint_count(), 2 * per_straight);
        assert!(block.particles().iter().all(|p| p.connection.is_none()));
        // The old third element is now element 1, with shifted particle indices.
        let moved = &block.elements()[1];
        assert_eq!(moved.id(), ElementId(1));
        assert_eq!(moved.points()[0], c_start - 3);
        for (i, p) in block.particles().iter().enumerate() {
            let owner = &block.elements()[p.owner.0];
            assert!(owner.center() == i || owner.points().contains(&i));
        }
    }

    #[test]
    fn attach_makes_endpoints_coincide() {
        let mut block: RailwayBlock<f64> = RailwayBlock::default();
        let a = block.add_element(ElementKind::Split);
        let b = block.add_element(ElementKind::Round { convex: false });
        let branch = block.elements()[a.0].points()[2];
        block.attach(b, 0, branch).unwrap();
        let joint = block.elements()[b.0].points()[0];
        assert!(block.particle(joint).pos.distance(block.particle(branch).pos) < 1e-9);

        // Track continues: outward directions at the joint are opposite.
        let da = block.elements()[a.0].current_direction(block.particles(), 2);
        let db = block.elements()[b.0].current_direction(block.particles(), 0);
        assert!((da + db).length() < 1e-9);
    }

    #[test]
    fn refused_attach_leaves_element_in_place() {
        let mut block: RailwayBlock<f64> = RailwayBlock::default();
        let a = block.add_element(ElementKind::Straight);
        let b = block.add_element(ElementKind::Straight);
        let c = block.add_element(ElementKind::Straight);
        let end = block.elements()[a.0].points()[1];
        block.attach(b, 0, end).unwrap();
        block.move_element(c, Vec2::new(0.0, 500.0)).unwrap();
        block.set_pins(c, PinLevel::Center).unwrap();

        let before: AllocVec<Vec2<f64>> = block.elements()[c.0]
            .particle_indices()
            .map(|i| block.particle(i).pos)
            .collect();
        let constraints = block.constraint_count();
        let own_end = block.elements()[c.0].points()[1];
        let center = block.elements()[a.0].center();

        assert_eq!(block.attach(c, 0, end), Err(RailwayError::AlreadyConnected(end)));
        assert_eq!(block.attach(c, 1, own_end), Err(RailwayError::SelfConnection(own_end)));
        assert_eq!(block.attach(c, 0, center), Err(RailwayError::NotAnEndpoint(center)));
        assert_eq!(block.attach(c, 0, own_end), Err(RailwayError::SelfConnection(own_end)));
        assert_eq!(block.attach(c, 5, end), Err(RailwayError::SlotOutOfBounds { slot: 5, count: 2 }));

        let after: AllocVec<Vec2<f64>> = block.elements()[c.0]
            .particle_indices()
            .map(|i| block.particle(i).pos)
            .collect();
        assert_eq!(before, after);
        assert_eq!(block.constraint_count(), constraints);
        assert_eq!(block.connections().len(), 1);
    }

    #[test]
    fn move_element_keeps_shape_and_re_anchors_pins() {
        let mut block: RailwayBlock<f64> = RailwayBlock::default();
        let id = block.add_element(ElementKind::Straight);
        block.set_pins(id, PinLevel::Center).unwrap();
        block.move_element(id, Vec2::new(200.0, 50.0)).unwrap();
        let center = block.elements()[id.0].center();
        assert_eq!(block.particle(center).pos, Vec2::new(200.0, 50.0));
        let anchored = block.constraints().iter().any(|c| match &c.constraint {
            Constraint::Pin(pin) => pin.particle == center && pin.position == Vec2::new(200.0, 50.0),
            _ => false,
        });
        assert!(anchored);
    }

    #[test]
    fn connect_coincident_rebuilds_joints() {
        let mut block: RailwayBlock<f64> = RailwayBlock::default();
        let a = block.add_element(ElementKind::Straight);
        let b = block.add_element(ElementKind::Straight);
        let end = block.elements()[a.0].points()[1];
        block.attach(b, 0, end).unwrap();
        let first = block.connections()[0];
        block.disconnect(ConnectionId(0)).unwrap();
        assert!(!block.is_connected_with(a, b));

        assert_eq!(block.connect_coincident(1e-6), 1);
        assert!(block.is_connected_with(a, b));
        let rebuilt = block.connections()[0];
        assert!(rebuilt.involves(first.endpoint1) && rebuilt.involves(first.endpoint2));
    }

    #[test]
    fn outline_cache_is_per_frame() {
        let mut block: RailwayBlock<f64> = RailwayBlock::default();
        let id = block.add_element(ElementKind::Straight);
        let before = block.intersection_outline(id).unwrap().clone();
        // Moving bumps nothing but the cache is invalidated explicitly.
        block.move_element(id, Vec2::new(10.0, 0.0)).unwrap();
        let after = block.intersection_outline(id).unwrap().clone();
        assert!((after.vertices[0].x - before.vertices[0].x - 10.0).abs() < 1e-9);

        // A raw nudge inside the same frame keeps serving the cached outline.
        let p = block.elements()[id.0].points()[0];
        block.nudge(p, Vec2::new(0.0, 5.0)).unwrap();
        let cached = block.intersection_outline(id).unwrap().clone();
        assert_eq!(cached, after);
        block.frame_index += 1;
        let fresh = block.intersection_outline(id).unwrap().clone();
        assert_ne!(fresh, after);
    }

    #[test]
    fn overlapping_pieces_are_flagged_unless_connected() {
        let mut block: RailwayBlock<f64> = RailwayBlock::default();
        let a = block.add_element(ElementKind::Straight);
        let b = block.add_element(ElementKind::Straight);
        let c = block.add_element(ElementKind::Straight);
        block.move_element(b, Vec2::new(20.0, 8.0)).unwrap();
        block.move_element(c, Vec2::new(500.0, 0.0)).unwrap();

        assert_eq!(block.evaluate_intersections(), 2);
        assert!(block.elements()[a.0].intersected());
        assert!(block.elements()[b.0].intersected());
        assert!(!block.elements()[c.0].intersected());

        let (pa, pb) = (block.elements()[a.0].points()[1], block.elements()[b.0].points()[0]);
        block.add_connection(pa, pb).unwrap();
        assert_eq!(block.evaluate_intersections(), 0);
    }

    #[test]
    fn element_at_hits_topmost() {
        let mut block: RailwayBlock<f64> = RailwayBlock::default();
        let a = block.add_element(ElementKind::Straight);
        let b = block.add_element(ElementKind::Straight);
        block.move_element(b, Vec2::new(30.0, 0.0)).unwrap();
        assert_eq!(block.element_at(Vec2::new(40.0, 0.0)), Some(b));
        assert_eq!(block.element_at(Vec2::new(-40.0, 0.0)), Some(a));
        assert_eq!(block.element_at(Vec2::new(0.0, 100.0)), None);
    }
}
