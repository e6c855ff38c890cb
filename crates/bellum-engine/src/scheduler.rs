//! The `Scheduler` façade: one entry point in front of any `SolverAlgorithm`,
//! enforcing that at most one run is in flight at a time (spec §4.6 / §6.2).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration as WallClock;

use bellum_core::{BellumError, EstimationMatrix, Project, SchedulerSolution, SolutionHistory};

use crate::algorithm::SolverAlgorithm;

/// Runs a single `SolverAlgorithm` against a `Project`, guaranteeing that only one
/// `find_optimal_schedule`/`collect_all_optimal_schedules` call is in flight at a
/// time. A second call made while one is running fails immediately with
/// `AlreadyProcessing` rather than queuing or blocking.
pub struct Scheduler {
    algorithm: Arc<dyn SolverAlgorithm>,
    is_processing: AtomicBool,
}

impl Scheduler {
    pub fn new(algorithm: Arc<dyn SolverAlgorithm>) -> Self {
        Self { algorithm, is_processing: AtomicBool::new(false) }
    }

    pub fn solver_name(&self) -> &'static str {
        self.algorithm.name()
    }

    /// Run the solver to completion (or until `time_limit` elapses), returning
    /// only the best solution found. `on_improved` is invoked once per
    /// monotonically-improving solution along the way.
    pub fn find_optimal_schedule(
        &self,
        project: &Project,
        estimation_matrix: &EstimationMatrix,
        time_limit: WallClock,
        mut on_improved: impl FnMut(&SchedulerSolution),
    ) -> Result<SchedulerSolution, BellumError> {
        let _guard = self.acquire()?;
        self.algorithm
            .solve(project, estimation_matrix, time_limit, &mut |solution| on_improved(&solution))
    }

    /// Run the solver to completion, returning every improving solution in the
    /// order it was found (spec §4.6: solution history collection). Delivered via
    /// a channel rather than accumulated in a `Vec` inside the callback, so a
    /// solver that is killed partway through (future work: cancellation) still
    /// lets the caller observe everything found up to that point.
    pub fn collect_all_optimal_schedules(
        &self,
        project: &Project,
        estimation_matrix: &EstimationMatrix,
        time_limit: WallClock,
    ) -> Result<SolutionHistory, BellumError> {
        let _guard = self.acquire()?;
        let (tx, rx) = mpsc::channel::<SchedulerSolution>();
        let result = self.algorithm.solve(project, estimation_matrix, time_limit, &mut |solution| {
            let _ = tx.send(solution);
        });
        drop(tx);
        let mut history: SolutionHistory = rx.try_iter().collect();
        result?;
        if history.is_empty() {
            return Err(BellumError::CallbackError(
                "solver reported success but delivered no solutions".to_string(),
            ));
        }
        Ok(history)
    }

    fn acquire(&self) -> Result<ProcessingGuard<'_>, BellumError> {
        if self
            .is_processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BellumError::AlreadyProcessing);
        }
        Ok(ProcessingGuard { flag: &self.is_processing })
    }
}

/// Clears `is_processing` when dropped, including on an early return via `?`.
struct ProcessingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bellum_core::{CustomEstimator, Employee, SkillMap};
    use std::sync::Barrier;
    use std::thread;

    struct StubAlgorithm;

    impl SolverAlgorithm for StubAlgorithm {
        fn name(&self) -> &'static str {
            "stub"
        }
        fn describe(&self) -> &'static str {
            "always returns the input project unchanged"
        }
        fn solve(
            &self,
            project: &Project,
            _estimation_matrix: &EstimationMatrix,
            _time_limit: WallClock,
            on_improved: &mut dyn FnMut(SchedulerSolution),
        ) -> Result<SchedulerSolution, BellumError> {
            let solution = SchedulerSolution::new(
                project.clone(),
                true,
                WallClock::from_millis(1),
                Default::default(),
            );
            on_improved(solution.clone());
            Ok(solution)
        }
    }

    fn sample_project() -> Project {
        Project::new(
            "p",
            chrono::Utc::now(),
            vec![Employee::new("Ada", SkillMap::new()).unwrap()],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn find_optimal_schedule_returns_solver_output() {
        let scheduler = Scheduler::new(Arc::new(StubAlgorithm));
        let matrix = EstimationMatrix::new(Box::new(CustomEstimator::new()));
        let solution = scheduler
            .find_optimal_schedule(&sample_project(), &matrix, WallClock::from_secs(1), |_| {})
            .unwrap();
        assert!(solution.optimal);
    }

    #[test]
    fn rejects_concurrent_runs() {
        let scheduler = Arc::new(Scheduler::new(Arc::new(BlockingAlgorithm::new())));
        let matrix = Arc::new(EstimationMatrix::new(Box::new(CustomEstimator::new())));
        let barrier = Arc::new(Barrier::new(2));

        let s1 = Arc::clone(&scheduler);
        let m1 = Arc::clone(&matrix);
        let b1 = Arc::clone(&barrier);
        let handle = thread::spawn(move || {
            b1.wait();
            s1.find_optimal_schedule(&sample_project(), &m1, WallClock::from_millis(50), |_| {})
        });

        barrier.wait();
        thread::sleep(WallClock::from_millis(10));
        let err = scheduler
            .find_optimal_schedule(&sample_project(), &matrix, WallClock::from_millis(50), |_| {})
            .unwrap_err();
        assert!(matches!(err, BellumError::AlreadyProcessing));

        handle.join().unwrap().unwrap();
    }

    struct BlockingAlgorithm {
        started: std::sync::atomic::AtomicBool,
    }

    impl BlockingAlgorithm {
        fn new() -> Self {
            Self { started: std::sync::atomic::AtomicBool::new(false) }
        }
    }

    impl SolverAlgorithm for BlockingAlgorithm {
        fn name(&self) -> &'static str {
            "blocking"
        }
        fn describe(&self) -> &'static str {
            "sleeps briefly to let a concurrent call observe AlreadyProcessing"
        }
        fn solve(
            &self,
            project: &Project,
            _estimation_matrix: &EstimationMatrix,
            _time_limit: WallClock,
            _on_improved: &mut dyn FnMut(SchedulerSolution),
        ) -> Result<SchedulerSolution, BellumError> {
            self.started.store(true, Ordering::SeqCst);
            thread::sleep(WallClock::from_millis(40));
            Ok(SchedulerSolution::new(
                project.clone(),
                true,
                WallClock::from_millis(40),
                Default::default(),
            ))
        }
    }
}
