//! Step observer trait for monitoring simulation frames.

/// Trait for observing simulation frames.
///
/// Implement this trait to hook into a frame (e.g., for debugging, drawing
/// overlays, or profiling). All methods have default no-op implementations.
pub trait StepObserver {
    /// Called after all particles have been integrated (Verlet step).
    fn on_integrate(&mut self) {}

    /// Called after each constraint relaxation pass.
    fn on_constraint_iteration(&mut self, _iteration: usize) {}

    /// Called once intersections have been evaluated, with the number of
    /// elements flagged as intersected.
    fn on_intersections(&mut self, _intersected: usize) {}

    /// Called when a frame is fully complete.
    fn on_step_complete(&mut self, _frame_index: u64) {}
}

/// A no-op observer that does nothing. Use as default when no observation needed.
pub struct NoOpStepObserver;

impl StepObserver for NoOpStepObserver {}
