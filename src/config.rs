//! Configuration types for the integrator and the railway block.

use crate::float::Float;
use crate::vec::Vec2;

/// Configuration for the Verlet integrator.
///
/// # Builder Pattern
/// ```
/// use woodrail::config::SolverConfig;
/// use woodrail::vec::Vec2;
///
/// let config: SolverConfig<f32> = SolverConfig::new()
///     .with_iterations(8)
///     .with_gravity(Vec2::new(0.0, 0.0))
///     .with_damping(0.99)
///     .with_sub_steps(2);
/// ```
#[derive(Clone, Debug)]
pub struct SolverConfig<F: Float> {
    /// Number of constraint relaxation passes per sub-step.
    /// More passes = closer to rigid but slower. Default: 16.
    pub iterations: usize,
    /// Global acceleration. Default: zero (the table is flat).
    pub gravity: Vec2<F>,
    /// Velocity damping factor [0, 1]. 1.0 = no damping. Default: 0.99.
    pub damping: F,
    /// Number of sub-steps per frame. Default: 1.
    pub sub_steps: usize,
    /// Frame time used by [`Integrator::advance`](crate::solver::Integrator::advance). Default: 1/60.
    pub time_step: F,
}

impl<F: Float> SolverConfig<F> {
    /// Create a new config with default values.
    pub fn new() -> Self {
        SolverConfig {
            iterations: 16,
            gravity: Vec2::zero(),
            damping: F::from_f32(0.99),
            sub_steps: 1,
            time_step: F::from_f32(1.0 / 60.0),
        }
    }

    /// Set the number of relaxation passes.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the gravity vector.
    pub fn with_gravity(mut self, gravity: Vec2<F>) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the damping factor.
    pub fn with_damping(mut self, damping: F) -> Self {
        self.damping = damping;
        self
    }

    /// Set the number of sub-steps.
    pub fn with_sub_steps(mut self, sub_steps: usize) -> Self {
        self.sub_steps = sub_steps.max(1);
        self
    }

    /// Set the frame time.
    pub fn with_time_step(mut self, time_step: F) -> Self {
        self.time_step = time_step;
        self
    }
}

impl<F: Float> Default for SolverConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// How an element keeps its particles rigid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ConstraintRegime {
    /// Pairwise distance constraints plus one angle constraint per
    /// consecutive pair of boundary points around the center.
    #[default]
    Simple,
    /// A single shape-matching constraint per element.
    Element,
}

/// Per-block settings, fixed when the block is created.
#[derive(Clone, Debug)]
pub struct BlockConfig<F: Float> {
    /// Constraint regime used by every element of the block.
    pub regime: ConstraintRegime,
    /// Stiffness of element constraints. Default: 1.0.
    pub stiffness: F,
    /// Add a zero-length distance constraint for every connection. Default: off.
    pub enforce_joints: bool,
    /// Line segments used to flatten an outline arc. Default: 16.
    pub arc_segments: usize,
    /// Line segments used to flatten an outline Bezier curve. Default: 12.
    pub bezier_segments: usize,
}

impl<F: Float> BlockConfig<F> {
    pub fn new() -> Self {
        BlockConfig {
            regime: ConstraintRegime::Simple,
            stiffness: F::one(),
            enforce_joints: false,
            arc_segments: 16,
            bezier_segments: 12,
        }
    }

    pub fn with_regime(mut self, regime: ConstraintRegime) -> Self {
        self.regime = regime;
        self
    }

    pub fn with_stiffness(mut self, stiffness: F) -> Self {
        self.stiffness = stiffness.clamp(F::zero(), F::one());
        self
    }

    pub fn with_enforced_joints(mut self, enforce: bool) -> Self {
        self.enforce_joints = enforce;
        self
    }

    pub fn with_arc_segments(mut self, segments: usize) -> Self {
        self.arc_segments = segments.max(1);
        self
    }

    pub fn with_bezier_segments(mut self, segments: usize) -> Self {
        self.bezier_segments = segments.max(1);
        self
    }
}

impl<F: Float> Default for BlockConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}
