//! Per-frame Verlet integration and constraint relaxation for a block.

use crate::block::RailwayBlock;
use crate::config::SolverConfig;
use crate::float::Float;
use crate::observer::{NoOpStepObserver, StepObserver};
use log::trace;

/// Drives a [`RailwayBlock`] one frame at a time.
#[derive(Clone, Debug, Default)]
pub struct Integrator<F: Float> {
    pub config: SolverConfig<F>,
}

impl<F: Float> Integrator<F> {
    pub fn new(config: SolverConfig<F>) -> Self {
        Integrator { config }
    }

    /// Advance the block by `dt`: integrate free particles, relax every
    /// constraint `iterations` times per sub-step, bump the frame counter and
    /// re-evaluate intersections. Returns the number of intersected elements.
    pub fn step<O: StepObserver>(&self, block: &mut RailwayBlock<F>, dt: F, observer: &mut O) -> usize {
        let sub_steps = self.config.sub_steps.max(1);
        let sub_dt = dt / F::from_usize(sub_steps);

        for _sub in 0..sub_steps {
            for p in block.particles.iter_mut() {
                p.apply_acceleration(self.config.gravity);
            }

            for p in block.particles.iter_mut() {
                p.integrate(sub_dt, self.config.damping);
            }
            observer.on_integrate();

            for i in 0..self.config.iterations {
                block.relax();
                observer.on_constraint_iteration(i);
            }
        }

        block.frame_index += 1;
        let intersected = block.evaluate_intersections();
        observer.on_intersections(intersected);
        trace!("frame {} done", block.frame_index);
        observer.on_step_complete(block.frame_index);
        intersected
    }

    /// One frame at the configured time step with no observer.
    pub fn advance(&self, block: &mut RailwayBlock<F>) -> usize {
        self.step(block, self.config.time_step, &mut NoOpStepObserver)
    }
}
