//! Moving a train along connected track.

use crate::block::RailwayBlock;
use crate::element::{ElementId, ElementKind};
use crate::float::Float;
use crate::shape::TrainPose;
use log::trace;

/// Which branch a train takes when it enters a split piece from its stub.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Switch {
    /// Slot 1.
    #[default]
    Left,
    /// Slot 2.
    Right,
}

/// A train's position: travelling on `element` from boundary slot `from`
/// to boundary slot `to`, a fraction `t` of the way along.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrainCursor<F: Float> {
    pub element: ElementId,
    pub from: usize,
    pub to: usize,
    pub t: F,
}

/// Slot a train leaves by after entering `kind` at `entry`.
fn exit_slot(kind: ElementKind, entry: usize, switch: Switch) -> usize {
    match (kind, entry) {
        (ElementKind::Split, 0) => match switch {
            Switch::Left => 1,
            Switch::Right => 2,
        },
        (ElementKind::Split, _) => 0,
        _ => 1 - entry,
    }
}

impl<F: Float> TrainCursor<F> {
    /// Start at boundary slot `entry` of `element`, heading for the slot the
    /// track leads to.
    pub fn new(block: &RailwayBlock<F>, element: ElementId, entry: usize, switch: Switch) -> Option<Self> {
        let kind = block.element(element)?.kind();
        if entry >= kind.point_count() {
            return None;
        }
        Some(TrainCursor {
            element,
            from: entry,
            to: exit_slot(kind, entry, switch),
            t: F::zero(),
        })
    }

    pub fn pose(&self, block: &RailwayBlock<F>) -> TrainPose<F> {
        let points = block.elements()[self.element.0].points();
        block.locate_train(self.element, points[self.from], points[self.to], self.t)
    }

    /// Move `distance` along the track, crossing connections as needed.
    /// Trains only move forward; a negative distance is treated as zero.
    ///
    /// Returns `false` if the train ran into an unconnected end; it then stops
    /// at that end.
    pub fn advance(&mut self, block: &RailwayBlock<F>, distance: F, switch: Switch) -> bool {
        let particles = block.particles();
        let mut remaining = distance.max(F::zero());
        loop {
            let element = &block.elements()[self.element.0];
            let length = element.edge_length(particles, self.from, self.to);
            let left = (F::one() - self.t) * length;
            if remaining <= left {
                if !length.is_near_zero(F::from_f32(1e-9)) {
                    self.t = self.t + remaining / length;
                }
                return true;
            }
            remaining = remaining - left;

            let exit = element.points()[self.to];
            let Some(next) = block.neighbor(exit) else {
                self.t = F::one();
                return false;
            };
            let entry = block.particle(next);
            let kind = block.elements()[entry.owner.0].kind();
            trace!("train moves from element {} to {}", self.element.0, entry.owner.0);
            self.element = entry.owner;
            self.from = entry.slot;
            self.to = exit_slot(kind, entry.slot, switch);
            self.t = F::zero();
        }
    }
}
