//! The seam between the scheduler façade and a concrete solving strategy.

use std::time::Duration as WallClock;

use bellum_core::{BellumError, EstimationMatrix, Project, SchedulerSolution};

/// A single solving strategy (constraint programming, genetic algorithm, ...).
///
/// Implementations stream every improving solution they find to `on_improved`
/// before returning, so a caller watching a long search sees progress rather than
/// waiting in silence for the final answer. The last solution handed to
/// `on_improved` is always the same one the `Ok` result carries.
pub trait SolverAlgorithm: Send + Sync {
    /// Machine-readable name used for registry lookup (e.g. `"cp"`, `"ga"`).
    fn name(&self) -> &'static str;

    fn describe(&self) -> &'static str;

    fn solve(
        &self,
        project: &Project,
        estimation_matrix: &EstimationMatrix,
        time_limit: WallClock,
        on_improved: &mut dyn FnMut(SchedulerSolution),
    ) -> Result<SchedulerSolution, BellumError>;
}
