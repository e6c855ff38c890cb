//! End-to-end scenarios for the CP solver, seeded from the scheduling
//! scenario used throughout the domain model's test suite: three employees,
//! five tasks, two precedence edges, a fixed per-employee duration matrix.

use std::time::Duration as WallClock;

use bellum_core::{
    CustomEstimator, Duration, Employee, EstimationMatrix, Priority, Project, ScheduledStatus,
    SkillMap, Task,
};
use bellum_engine::{CpSolver, SolverAlgorithm};
use chrono::TimeZone;

fn kick_off() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()
}

fn minutes(m: i64) -> Duration {
    Duration::minutes(m).unwrap()
}

/// task3 depends on task1, task4 depends on task2; task5 is independent.
/// Durations (minutes), one row per employee: E1=[10,20,30,40,50],
/// E2=[15,25,35,45,55], E3=[12,22,32,42,52].
fn five_task_project() -> (Project, EstimationMatrix) {
    let e1 = Employee::new("e1", SkillMap::new()).unwrap();
    let e2 = Employee::new("e2", SkillMap::new()).unwrap();
    let e3 = Employee::new("e3", SkillMap::new()).unwrap();

    let t1 = Task::new("task1", Priority::Major, SkillMap::new(), None).unwrap();
    let t2 = Task::new("task2", Priority::Major, SkillMap::new(), None).unwrap();
    let t3 = Task::new("task3", Priority::Major, SkillMap::new(), Some(t1.id())).unwrap();
    let t4 = Task::new("task4", Priority::Major, SkillMap::new(), Some(t2.id())).unwrap();
    let t5 = Task::new("task5", Priority::Major, SkillMap::new(), None).unwrap();

    let durations = [
        (e1.id(), [10, 20, 30, 40, 50]),
        (e2.id(), [15, 25, 35, 45, 55]),
        (e3.id(), [12, 22, 32, 42, 52]),
    ];
    let task_ids = [t1.id(), t2.id(), t3.id(), t4.id(), t5.id()];

    let mut estimator = CustomEstimator::new();
    for (employee_id, row) in durations {
        for (task_id, minutes_value) in task_ids.iter().zip(row) {
            estimator = estimator.with(employee_id, *task_id, minutes(minutes_value));
        }
    }
    let matrix = EstimationMatrix::new(Box::new(estimator));

    let project = Project::new(
        "five-task",
        kick_off(),
        vec![e1, e2, e3],
        vec![t1, t2, t3, t4, t5],
    )
    .unwrap();

    (project, matrix)
}

#[test]
fn cp_solver_finds_the_sixty_minute_optimum() {
    let (project, matrix) = five_task_project();
    let solver = CpSolver::new();

    let mut improvements = 0;
    let solution = solver
        .solve(&project, &matrix, WallClock::from_secs(30), &mut |_| improvements += 1)
        .expect("feasible schedule exists for this scenario");

    assert!(improvements >= 1);
    assert!(solution.optimal);

    let scheduled = &solution.project;
    assert_eq!(scheduled.scheduled_status(), ScheduledStatus::Scheduled);
    assert!(scheduled.validate().is_valid());
    assert_eq!(scheduled.ends_at(), Some(kick_off() + chrono::Duration::minutes(60)));
}

#[test]
fn cp_solution_never_overlaps_an_employee_or_violates_precedence() {
    let (project, matrix) = five_task_project();
    let solver = CpSolver::new();
    let solution = solver
        .solve(&project, &matrix, WallClock::from_secs(30), &mut |_| {})
        .unwrap();

    let outcome = solution.project.validate();
    assert!(outcome.by_label("employees with overlap").is_empty());
    assert!(outcome.by_label("precedence violated").is_empty());
}
