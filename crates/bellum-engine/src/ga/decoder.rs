//! The deterministic greedy decoder: turns a task permutation into a concrete
//! schedule by walking it in order and assigning each task to whichever capable,
//! available employee finishes it soonest.

use std::collections::HashMap;

use bellum_core::{Duration, EstimationMatrix, Instant, Project, Task, TaskId};

/// Penalty added to fitness for each dependency that, in the decoded order,
/// has not yet been scheduled when its dependent is reached — i.e. the
/// permutation implies a cycle or an out-of-order dependency.
pub const CIRCULAR_DEPENDENCY_PENALTY: i64 = 10_000_000;

/// Penalty added to fitness for each task no employee could be estimated for.
pub const NO_ESTIMATE_PENALTY: i64 = 1_000_000;

pub struct DecodedSchedule {
    pub tasks: Vec<Task>,
    pub makespan_minutes: i64,
    pub priority_cost: i64,
    pub infeasible_count: u32,
    pub penalty: i64,
}

impl DecodedSchedule {
    /// `penalty + 100 * makespan + priorityCost`, lower is better.
    pub fn fitness(&self) -> i64 {
        self.penalty + 100 * self.makespan_minutes + self.priority_cost
    }
}

/// Insert a busy interval for `employee`, keeping the interval list sorted by start
/// so `earliest_gap` can scan it in order.
fn occupy(
    busy: &mut HashMap<bellum_core::EmployeeId, Vec<(Instant, Instant)>>,
    employee: bellum_core::EmployeeId,
    start: Instant,
    end: Instant,
) {
    let intervals = busy.entry(employee).or_default();
    intervals.push((start, end));
    intervals.sort_by_key(|(start, _)| *start);
}

/// The first gap in `intervals` (sorted ascending by start) that admits `duration`
/// no earlier than `ready` — spec §4.5 step 3's "first gap... admitting duration
/// after readyTime."
fn earliest_gap(intervals: &[(Instant, Instant)], ready: Instant, duration: Duration) -> Instant {
    let mut candidate = ready;
    for &(start, end) in intervals {
        if duration.add_to(candidate) <= start {
            return candidate;
        }
        if end > candidate {
            candidate = end;
        }
    }
    candidate
}

/// Decode `order` (a permutation of every task index in `project.tasks()`) into a
/// concrete schedule. Always succeeds; infeasibility is expressed as penalty, not
/// as an error, so the GA can still rank an infeasible individual against others.
pub fn decode(
    project: &Project,
    estimation_matrix: &EstimationMatrix,
    order: &[usize],
) -> DecodedSchedule {
    let tasks = project.tasks();
    let employees = project.employees();
    let mut ends: HashMap<TaskId, Instant> = HashMap::new();
    let mut busy: HashMap<bellum_core::EmployeeId, Vec<(Instant, Instant)>> = HashMap::new();
    let mut decoded: Vec<Task> = Vec::with_capacity(tasks.len());
    let mut decoded_by_id: HashMap<TaskId, Task> = HashMap::new();

    let mut infeasible_count = 0u32;
    let mut penalty = 0i64;
    let mut makespan_minutes = 0i64;

    for &index in order {
        let task = &tasks[index];

        if task.pinned() {
            let end = task.ends_at().expect("pinned task is assigned");
            ends.insert(task.id(), end);
            if let Some(employee) = task.employee() {
                occupy(&mut busy, employee, task.start_at().expect("pinned task is assigned"), end);
            }
            makespan_minutes = makespan_minutes.max((end - project.kick_off()).num_minutes());
            decoded_by_id.insert(task.id(), task.clone());
            decoded.push(task.clone());
            continue;
        }

        let earliest_start = match task.depends_on() {
            Some(dep_id) => match ends.get(&dep_id) {
                Some(end) => *end,
                None => {
                    // The dependency hasn't been placed yet in this order: either a
                    // cycle, or the permutation simply visits the dependent first.
                    infeasible_count += 1;
                    penalty += CIRCULAR_DEPENDENCY_PENALTY;
                    project.kick_off()
                }
            },
            None => project.kick_off(),
        };

        // Candidate (employee, start, duration) for every employee with a valid
        // estimate, `start` being the first gap in that employee's sorted busy
        // intervals that admits `duration` no earlier than `earliest_start`.
        let mut candidates: Vec<(bellum_core::EmployeeId, Instant, Duration)> = Vec::new();
        for employee in employees {
            let Ok(duration) =
                estimation_matrix.estimate(employees, tasks, employee.id(), task.id())
            else {
                continue;
            };
            let start = match busy.get(&employee.id()) {
                Some(intervals) => earliest_gap(intervals, earliest_start, duration),
                None => earliest_start,
            };
            candidates.push((employee.id(), start, duration));
        }

        let earliest_finish = candidates
            .iter()
            .map(|&(_, start, duration)| duration.add_to(start))
            .min();

        let best = earliest_finish.and_then(|finish| {
            let tied: Vec<_> = candidates
                .iter()
                .copied()
                .filter(|&(_, start, duration)| duration.add_to(start) == finish)
                .collect();
            // Tie-break: favour whichever employee was originally assigned to
            // this task in the input project, if it's among the tied finishers.
            tied.iter()
                .copied()
                .find(|&(id, _, _)| task.employee() == Some(id))
                .or_else(|| tied.first().copied())
        });

        let Some((employee_id, start, duration)) = best else {
            infeasible_count += 1;
            penalty += NO_ESTIMATE_PENALTY;
            let fallback_duration = Duration::minutes(10).unwrap();
            let assigned = task.assign(
                employees.first().map_or_else(bellum_core::EmployeeId::new, |e| e.id()),
                earliest_start,
                fallback_duration,
            );
            ends.insert(task.id(), fallback_duration.add_to(earliest_start));
            decoded_by_id.insert(task.id(), assigned.clone());
            decoded.push(assigned);
            continue;
        };

        let end = duration.add_to(start);
        occupy(&mut busy, employee_id, start, end);
        ends.insert(task.id(), end);
        makespan_minutes = makespan_minutes.max((end - project.kick_off()).num_minutes());

        let assigned = task.assign(employee_id, start, duration);
        decoded_by_id.insert(task.id(), assigned.clone());
        decoded.push(assigned);
    }

    // Restore original task ordering; the permutation is a decoding order, not the
    // schedule's storage order.
    let ordered: Vec<Task> = tasks
        .iter()
        .map(|t| decoded_by_id.get(&t.id()).cloned().unwrap_or_else(|| t.clone()))
        .collect();

    let priority_cost = bellum_core::priority_cost_of(&ordered);
    DecodedSchedule {
        tasks: ordered,
        makespan_minutes,
        priority_cost,
        infeasible_count,
        penalty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bellum_core::{CustomEstimator, Employee, Priority, SkillMap};

    #[test]
    fn decodes_independent_tasks_in_parallel_when_employees_allow() {
        let e1 = Employee::new("e1", SkillMap::new()).unwrap();
        let e2 = Employee::new("e2", SkillMap::new()).unwrap();
        let t1 = Task::new("t1", Priority::Major, SkillMap::new(), None).unwrap();
        let t2 = Task::new("t2", Priority::Major, SkillMap::new(), None).unwrap();

        let estimator = CustomEstimator::new()
            .with(e1.id(), t1.id(), Duration::minutes(30).unwrap())
            .with(e2.id(), t1.id(), Duration::minutes(30).unwrap())
            .with(e1.id(), t2.id(), Duration::minutes(20).unwrap())
            .with(e2.id(), t2.id(), Duration::minutes(20).unwrap());
        let matrix = EstimationMatrix::new(Box::new(estimator));

        let project = Project::new(
            "p",
            chrono::Utc::now(),
            vec![e1, e2],
            vec![t1.clone(), t2.clone()],
        )
        .unwrap();

        let decoded = decode(&project, &matrix, &[0, 1]);
        assert_eq!(decoded.infeasible_count, 0);
        assert_eq!(decoded.makespan_minutes, 30);
    }

    #[test]
    fn missing_dependency_in_order_is_penalized() {
        let e1 = Employee::new("e1", SkillMap::new()).unwrap();
        let t1 = Task::new("t1", Priority::Major, SkillMap::new(), None).unwrap();
        let t2 = Task::new("t2", Priority::Major, SkillMap::new(), Some(t1.id())).unwrap();

        let estimator = CustomEstimator::new()
            .with(e1.id(), t1.id(), Duration::minutes(10).unwrap())
            .with(e1.id(), t2.id(), Duration::minutes(10).unwrap());
        let matrix = EstimationMatrix::new(Box::new(estimator));

        let project =
            Project::new("p", chrono::Utc::now(), vec![e1], vec![t1, t2]).unwrap();

        // Decode t2 (index 1) before t1 (index 0): dependency not yet placed.
        let decoded = decode(&project, &matrix, &[1, 0]);
        assert_eq!(decoded.infeasible_count, 1);
        assert!(decoded.penalty >= CIRCULAR_DEPENDENCY_PENALTY);
    }
}
