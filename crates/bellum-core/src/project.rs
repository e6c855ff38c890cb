//! Projects: the aggregate root tying employees and tasks together, and the
//! invariants that keep that aggregate internally consistent.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::employee::{Employee, EmployeeId};
use crate::error::BellumError;
use crate::identifier::Identifier;
use crate::task::{Task, TaskId};
use crate::time::Instant;
use crate::validation::{RuleSet, ValidationOutcome};

/// Marker type for `Identifier<ProjectMarker>`.
#[derive(Debug)]
pub struct ProjectMarker;

pub type ProjectId = Identifier<ProjectMarker>;

/// The overall scheduling status of a project, derived from its tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledStatus {
    None,
    Partial,
    Scheduled,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: String,
    kick_off: Instant,
    employees: Vec<Employee>,
    tasks: Vec<Task>,
}

impl Project {
    /// Construct a project, running the *init* invariants (spec §4.1): every
    /// dependency must name a task present in this project, the dependency graph
    /// must be acyclic, and every assigned task's employee must be present in this
    /// project. Failure surfaces as a single `BellumError::Validation` carrying
    /// every violated rule, not just the first.
    pub fn new(
        name: impl Into<String>,
        kick_off: Instant,
        employees: Vec<Employee>,
        tasks: Vec<Task>,
    ) -> Result<Self, BellumError> {
        Self::with_id(ProjectId::new(), name, kick_off, employees, tasks)
    }

    pub fn with_id(
        id: ProjectId,
        name: impl Into<String>,
        kick_off: Instant,
        employees: Vec<Employee>,
        tasks: Vec<Task>,
    ) -> Result<Self, BellumError> {
        let name = name.into();
        let candidate = Self { id, name, kick_off, employees, tasks };
        init_rules().evaluate(&candidate).into_result()?;
        Ok(candidate)
    }

    pub const fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn kick_off(&self) -> Instant {
        self.kick_off
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn employee(&self, id: EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id() == id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// Run the full invariant set (init rules plus no-overlap and precedence), never
    /// raising — callers that need a hard failure should call `.into_result()` on the
    /// returned outcome themselves. The scheduling engine uses this, non-fatally, to
    /// decide whether a candidate solution is admissible.
    pub fn validate(&self) -> ValidationOutcome {
        init_rules().evaluate(self).merge(full_rules().evaluate(self))
    }

    /// The derived scheduling status: `None` if no task is assigned, `Scheduled` if
    /// every task is assigned, `Partial` otherwise.
    pub fn scheduled_status(&self) -> ScheduledStatus {
        let assigned = self.tasks.iter().filter(|t| t.is_assigned()).count();
        if assigned == 0 {
            ScheduledStatus::None
        } else if assigned == self.tasks.len() {
            ScheduledStatus::Scheduled
        } else {
            ScheduledStatus::Partial
        }
    }

    /// The latest `endsAt` among all assigned tasks, if any are assigned.
    pub fn ends_at(&self) -> Option<Instant> {
        self.tasks.iter().filter_map(Task::ends_at).max()
    }

    /// Sum of every assigned task's duration, in minutes.
    pub fn total_duration_minutes(&self) -> i64 {
        self.tasks
            .iter()
            .filter_map(Task::duration)
            .map(crate::time::Duration::as_minutes)
            .sum()
    }

    /// Count of ordered pairs `(i, j)` of assigned tasks where `i` has lower
    /// priority than `j` (a numerically larger `Priority`) yet `i` was started
    /// first — a priority inversion. The priority term of the objective (spec
    /// §4.4/§4.5).
    pub fn priority_cost(&self) -> i64 {
        priority_cost_of(&self.tasks)
    }
}

/// Free function so solvers can score a decoded task list before it is wrapped
/// back into a `Project`.
pub fn priority_cost_of(tasks: &[Task]) -> i64 {
    let assigned: Vec<&Task> = tasks.iter().filter(|t| t.is_assigned()).collect();
    let mut inversions = 0i64;
    for i in 0..assigned.len() {
        for j in 0..assigned.len() {
            if i == j {
                continue;
            }
            let (ti, tj) = (assigned[i], assigned[j]);
            if ti.priority() as i64 > tj.priority() as i64
                && ti.start_at().unwrap() < tj.start_at().unwrap()
            {
                inversions += 1;
            }
        }
    }
    inversions
}

/// Rules that must hold for a `Project` to be constructible at all.
fn init_rules() -> RuleSet<Project> {
    RuleSet::new()
        .rule("missing task dependencies", missing_dependencies_rule)
        .rule("circular task dependency", circular_dependency_rule)
        .rule("unknown employee assignment", unknown_employee_rule)
}

/// Rules checked on every candidate solution, but that do not block construction.
fn full_rules() -> RuleSet<Project> {
    RuleSet::new()
        .rule("employees with overlap", overlap_rule)
        .rule("precedence violated", precedence_rule)
}

fn missing_dependencies_rule(project: &Project) -> Option<String> {
    let known: HashSet<TaskId> = project.tasks.iter().map(Task::id).collect();
    let mut missing: Vec<String> = project
        .tasks
        .iter()
        .filter_map(Task::depends_on)
        .filter(|dep| !known.contains(dep))
        .map(|dep| dep.to_string())
        .collect();
    if missing.is_empty() {
        return None;
    }
    missing.sort();
    missing.dedup();
    Some(missing.join(", "))
}

/// Detect cycles in the `depends_on` relation. On failure, the message lists the
/// cycle as a chain of descriptions joined by `" - "`, closing back on the start
/// (e.g. `t1 - t3 - t5 - t1`) per the spec's worked example.
fn circular_dependency_rule(project: &Project) -> Option<String> {
    let by_id: HashMap<TaskId, &Task> = project.tasks.iter().map(|t| (t.id(), t)).collect();

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        InProgress,
        Done,
    }
    let mut marks: HashMap<TaskId, Mark> = HashMap::new();

    for task in &project.tasks {
        if marks.contains_key(&task.id()) {
            continue;
        }
        let mut path: Vec<TaskId> = Vec::new();
        let mut cursor = task.id();
        loop {
            match marks.get(&cursor) {
                Some(Mark::Done) => break,
                Some(Mark::InProgress) => {
                    let start = path.iter().position(|id| *id == cursor).unwrap_or(0);
                    let cycle: Vec<&Task> = path[start..]
                        .iter()
                        .filter_map(|id| by_id.get(id).copied())
                        .collect();
                    let mut names: Vec<&str> =
                        cycle.iter().map(|t| t.description()).collect();
                    names.sort_unstable();
                    if let Some(first) = names.first().copied() {
                        names.push(first);
                    }
                    return Some(names.join(" - "));
                }
                None => {}
            }
            marks.insert(cursor, Mark::InProgress);
            path.push(cursor);
            match by_id.get(&cursor).and_then(|t| t.depends_on()) {
                Some(next) if by_id.contains_key(&next) => cursor = next,
                _ => break,
            }
        }
        for id in path {
            marks.insert(id, Mark::Done);
        }
    }
    None
}

fn unknown_employee_rule(project: &Project) -> Option<String> {
    let known: HashSet<EmployeeId> = project.employees.iter().map(Employee::id).collect();
    let mut unknown: Vec<String> = project
        .tasks
        .iter()
        .filter_map(Task::employee)
        .filter(|id| !known.contains(id))
        .map(|id| id.to_string())
        .collect();
    if unknown.is_empty() {
        return None;
    }
    unknown.sort();
    unknown.dedup();
    Some(unknown.join(", "))
}

/// No two tasks assigned to the same employee may overlap in time.
fn overlap_rule(project: &Project) -> Option<String> {
    let mut by_employee: HashMap<EmployeeId, Vec<&Task>> = HashMap::new();
    for task in &project.tasks {
        if let Some(employee) = task.employee() {
            by_employee.entry(employee).or_default().push(task);
        }
    }
    for tasks in by_employee.values() {
        for i in 0..tasks.len() {
            for j in (i + 1)..tasks.len() {
                let (a, b) = (tasks[i], tasks[j]);
                let (a_start, a_end) = (a.start_at().unwrap(), a.ends_at().unwrap());
                let (b_start, b_end) = (b.start_at().unwrap(), b.ends_at().unwrap());
                if a_start < b_end && b_start < a_end {
                    return Some(format!("{} overlaps {}", a.description(), b.description()));
                }
            }
        }
    }
    None
}

/// An assigned task's predecessor, if also assigned, must end no later than the
/// task itself starts.
fn precedence_rule(project: &Project) -> Option<String> {
    for task in &project.tasks {
        let (Some(dep_id), Some(start)) = (task.depends_on(), task.start_at()) else {
            continue;
        };
        let Some(dep) = project.task(dep_id) else { continue };
        if let Some(dep_end) = dep.ends_at() {
            if dep_end > start {
                return Some(format!(
                    "{} starts before its dependency {} ends",
                    task.description(),
                    dep.description()
                ));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::SkillMap;
    use crate::task::Priority;
    use crate::time::Duration;
    use chrono::TimeZone;

    fn kick_off() -> Instant {
        chrono::Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn rejects_missing_dependency() {
        let t1 = Task::new("t1", Priority::Major, SkillMap::new(), Some(TaskId::new())).unwrap();
        let err = Project::new("p", kick_off(), vec![], vec![t1]).unwrap_err();
        assert!(err.has_label("missing task dependencies"));
    }

    #[test]
    fn rejects_circular_dependency() {
        let t1 = Task::new("t1", Priority::Major, SkillMap::new(), None).unwrap();
        let t3 = Task::new("t3", Priority::Major, SkillMap::new(), Some(t1.id())).unwrap();
        let t5 = Task::new("t5", Priority::Major, SkillMap::new(), Some(t3.id())).unwrap();
        let t1 = t1.change_dependency(Some(t5.id()));
        let err = Project::new("p", kick_off(), vec![], vec![t1, t3, t5]).unwrap_err();
        assert!(err.has_label("circular task dependency"));
        let issues = err.validation_issues().unwrap();
        let issue = issues.iter().find(|i| i.label == "circular task dependency").unwrap();
        assert_eq!(issue.message, "t1 - t3 - t5 - t1");
    }

    #[test]
    fn rejects_unknown_employee() {
        let t1 = Task::new("t1", Priority::Major, SkillMap::new(), None).unwrap();
        let assigned = t1.assign(EmployeeId::new(), kick_off(), Duration::minutes(30).unwrap());
        let err = Project::new("p", kick_off(), vec![], vec![assigned]).unwrap_err();
        assert!(err.has_label("unknown employee assignment"));
    }

    #[test]
    fn accepts_well_formed_project() {
        let employee = Employee::new("Ada", SkillMap::new()).unwrap();
        let t1 = Task::new("t1", Priority::Major, SkillMap::new(), None).unwrap();
        let assigned = t1.assign(employee.id(), kick_off(), Duration::minutes(30).unwrap());
        let project = Project::new("p", kick_off(), vec![employee], vec![assigned]).unwrap();
        assert_eq!(project.scheduled_status(), ScheduledStatus::Scheduled);
    }

    #[test]
    fn priority_cost_counts_inversions_not_priority_sum() {
        let e1 = Employee::new("Ada", SkillMap::new()).unwrap();
        let t1 = Task::new("critical", Priority::Critical, SkillMap::new(), None).unwrap();
        let t2 = Task::new("minor", Priority::Minor, SkillMap::new(), None).unwrap();
        // minor task starts first, critical task starts later: one inversion.
        let a1 = t1.assign(e1.id(), kick_off() + chrono::Duration::minutes(30), Duration::minutes(10).unwrap());
        let a2 = t2.assign(e1.id(), kick_off(), Duration::minutes(30).unwrap());
        let project = Project::new("p", kick_off(), vec![e1], vec![a1, a2]).unwrap();
        assert_eq!(project.priority_cost(), 1);
    }

    #[test]
    fn priority_cost_is_zero_when_no_inversions() {
        let e1 = Employee::new("Ada", SkillMap::new()).unwrap();
        let t1 = Task::new("critical", Priority::Critical, SkillMap::new(), None).unwrap();
        let t2 = Task::new("minor", Priority::Minor, SkillMap::new(), None).unwrap();
        let a1 = t1.assign(e1.id(), kick_off(), Duration::minutes(10).unwrap());
        let a2 = t2.assign(e1.id(), kick_off() + chrono::Duration::minutes(10), Duration::minutes(30).unwrap());
        let project = Project::new("p", kick_off(), vec![e1], vec![a1, a2]).unwrap();
        assert_eq!(project.priority_cost(), 0);
    }

    #[test]
    fn detects_overlap_in_full_validation() {
        let employee = Employee::new("Ada", SkillMap::new()).unwrap();
        let t1 = Task::new("t1", Priority::Major, SkillMap::new(), None).unwrap();
        let t2 = Task::new("t2", Priority::Major, SkillMap::new(), None).unwrap();
        let a1 = t1.assign(employee.id(), kick_off(), Duration::minutes(60).unwrap());
        let a2 = t2.assign(employee.id(), kick_off(), Duration::minutes(30).unwrap());
        let project = Project::new("p", kick_off(), vec![employee], vec![a1, a2]).unwrap();
        let outcome = project.validate();
        assert!(!outcome.is_valid());
        assert_eq!(outcome.by_label("employees with overlap").len(), 1);
    }
}
