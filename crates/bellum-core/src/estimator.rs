//! Time estimation: given an employee's and a task's skill profiles, predict how
//! long the employee will take on the task.

use std::collections::HashMap;

use crate::employee::{Employee, EmployeeId};
use crate::error::BellumError;
use crate::skill::SkillMap;
use crate::task::{Task, TaskId};
use crate::time::Duration;

/// Predicts how long an employee will take to complete a task.
pub trait TimeEstimator: Send + Sync {
    fn estimate(&self, employee: &Employee, task: &Task) -> Result<Duration, BellumError>;
}

/// The default estimator: the better an employee's skill profile correlates with a
/// task's required profile, the shorter the estimate. Correlation is Pearson's `r`
/// over the value pairs produced by aligning the two skill maps (spec §4.2).
///
/// `duration = round(5 + 40 * (1 - r))` minutes, clamped to `[5, 85]`. `r`'s
/// range `[-1, 1]` makes `5` the best case (`r = 1`, perfectly matched) and `85`
/// the worst (`r = -1`, perfectly anti-correlated); `r = NaN` (too few paired
/// points with nonzero variance) falls back to `r = 0`, the neutral midpoint.
#[derive(Debug, Default)]
pub struct PearsonEstimator;

impl PearsonEstimator {
    pub fn new() -> Self {
        Self
    }

    fn duration_for(skills_a: &SkillMap, skills_b: &SkillMap) -> Result<Duration, BellumError> {
        let paired = skills_a.align(skills_b);
        if paired.len() < 2 {
            return Err(BellumError::InsufficientSkills(format!(
                "need at least 2 paired skill points to estimate, got {}",
                paired.len()
            )));
        }
        let r = pearson_correlation(&paired);
        let minutes = (5.0 + 40.0 * (1.0 - r)).round() as i64;
        Duration::minutes(minutes.clamp(5, 85))
    }
}

impl TimeEstimator for PearsonEstimator {
    fn estimate(&self, employee: &Employee, task: &Task) -> Result<Duration, BellumError> {
        Self::duration_for(employee.skills(), &task.core().required_skills)
    }
}

/// Pearson's `r` over `(x, y)` pairs. Returns `0.0`, the estimator's neutral
/// midpoint, whenever either series has zero variance (division by zero would
/// otherwise yield `NaN`).
fn pearson_correlation(pairs: &[(u8, u8)]) -> f64 {
    let n = pairs.len() as f64;
    let (sum_x, sum_y) = pairs
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + f64::from(x), sy + f64::from(y)));
    let mean_x = sum_x / n;
    let mean_y = sum_y / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for &(x, y) in pairs {
        let dx = f64::from(x) - mean_x;
        let dy = f64::from(y) - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        (cov / denom).clamp(-1.0, 1.0)
    }
}

/// An estimator backed by a fixed `(employee, task) -> duration` table, useful for
/// tests and for callers who already have measured durations. Looking up a pair
/// that isn't in the table fails rather than silently falling back.
#[derive(Debug, Default)]
pub struct CustomEstimator {
    table: HashMap<(EmployeeId, TaskId), Duration>,
}

impl CustomEstimator {
    pub fn new() -> Self {
        Self { table: HashMap::new() }
    }

    pub fn with(mut self, employee: EmployeeId, task: TaskId, duration: Duration) -> Self {
        self.table.insert((employee, task), duration);
        self
    }
}

impl TimeEstimator for CustomEstimator {
    fn estimate(&self, employee: &Employee, task: &Task) -> Result<Duration, BellumError> {
        self.table
            .get(&(employee.id(), task.id()))
            .copied()
            .ok_or_else(|| {
                BellumError::EstimationFailure(format!(
                    "no estimate registered for employee {} / task {}",
                    employee.id(),
                    task.id()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::SkillPoint;
    use crate::task::Priority;

    fn skills(values: &[u8]) -> SkillMap {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (format!("skill{i}"), SkillPoint::new(v).unwrap()))
            .collect()
    }

    #[test]
    fn perfectly_anti_correlated_profiles_yield_max_estimate() {
        let employee = Employee::new("e", skills(&[1, 2, 3])).unwrap();
        let task = Task::new("t", Priority::Major, skills(&[3, 2, 1]), None).unwrap();
        let duration = PearsonEstimator::new().estimate(&employee, &task).unwrap();
        assert_eq!(duration.as_minutes(), 85);
    }

    #[test]
    fn perfectly_correlated_profiles_yield_min_estimate() {
        let employee = Employee::new("e", skills(&[1, 2, 3])).unwrap();
        let task = Task::new("t", Priority::Major, skills(&[1, 2, 3]), None).unwrap();
        let duration = PearsonEstimator::new().estimate(&employee, &task).unwrap();
        assert_eq!(duration.as_minutes(), 5);
    }

    #[test]
    fn constant_profiles_have_zero_variance_and_yield_neutral_estimate() {
        let employee = Employee::new("e", skills(&[4, 4, 4])).unwrap();
        let task = Task::new("t", Priority::Major, skills(&[4, 4, 4]), None).unwrap();
        let duration = PearsonEstimator::new().estimate(&employee, &task).unwrap();
        assert_eq!(duration.as_minutes(), 45);
    }

    #[test]
    fn anti_correlated_equal_length_vectors_yield_max_estimate() {
        let employee = Employee::new("e", skills(&[1, 2, 3])).unwrap();
        let task = Task::new("t", Priority::Major, skills(&[3, 2, 1]), None).unwrap();
        let duration = PearsonEstimator::new().estimate(&employee, &task).unwrap();
        assert_eq!(duration.as_minutes(), 85);
    }

    #[test]
    fn fewer_than_two_paired_points_fails() {
        let employee = Employee::new("e", skills(&[1])).unwrap();
        let task = Task::new("t", Priority::Major, skills(&[1]), None).unwrap();
        let err = PearsonEstimator::new().estimate(&employee, &task).unwrap_err();
        assert!(matches!(err, BellumError::InsufficientSkills(_)));
    }

    #[test]
    fn custom_estimator_fails_on_unregistered_pair() {
        let employee = Employee::new("e", SkillMap::new()).unwrap();
        let task = Task::new("t", Priority::Major, SkillMap::new(), None).unwrap();
        let err = CustomEstimator::new().estimate(&employee, &task).unwrap_err();
        assert!(matches!(err, BellumError::EstimationFailure(_)));
    }

    #[test]
    fn custom_estimator_returns_registered_duration() {
        let employee = Employee::new("e", SkillMap::new()).unwrap();
        let task = Task::new("t", Priority::Major, SkillMap::new(), None).unwrap();
        let estimator = CustomEstimator::new().with(
            employee.id(),
            task.id(),
            Duration::minutes(42).unwrap(),
        );
        let duration = estimator.estimate(&employee, &task).unwrap();
        assert_eq!(duration.as_minutes(), 42);
    }
}
