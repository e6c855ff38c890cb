//! A memoized `(employee, task) -> duration` cache sitting in front of a
//! `TimeEstimator`, so the solvers can query the same pair repeatedly (every CP
//! propagation step, every GA decode) without recomputing the estimate.

use dashmap::DashMap;

use crate::employee::{Employee, EmployeeId};
use crate::error::BellumError;
use crate::estimator::TimeEstimator;
use crate::task::{Task, TaskId};
use crate::time::Duration;

pub struct EstimationMatrix {
    estimator: Box<dyn TimeEstimator>,
    cache: DashMap<(EmployeeId, TaskId), Duration>,
}

impl EstimationMatrix {
    pub fn new(estimator: Box<dyn TimeEstimator>) -> Self {
        Self { estimator, cache: DashMap::new() }
    }

    /// Look up or compute the estimate for `employee` working on `task`. Both must
    /// be present in `employees`/`tasks`; an id absent from its slice fails with
    /// the matching `InvalidEmployeeId`/`InvalidTaskId` variant rather than reaching
    /// the estimator with a dangling reference.
    pub fn estimate(
        &self,
        employees: &[Employee],
        tasks: &[Task],
        employee_id: EmployeeId,
        task_id: TaskId,
    ) -> Result<Duration, BellumError> {
        if let Some(cached) = self.cache.get(&(employee_id, task_id)) {
            return Ok(*cached);
        }

        let employee = employees
            .iter()
            .find(|e| e.id() == employee_id)
            .ok_or_else(|| BellumError::InvalidEmployeeId(employee_id.to_string()))?;
        let task = tasks
            .iter()
            .find(|t| t.id() == task_id)
            .ok_or_else(|| BellumError::InvalidTaskId(task_id.to_string()))?;

        let duration = match self.cache.entry((employee_id, task_id)) {
            dashmap::mapref::entry::Entry::Occupied(entry) => *entry.get(),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let computed = self.estimator.estimate(employee, task)?;
                *entry.insert(computed)
            }
        };
        Ok(duration)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
