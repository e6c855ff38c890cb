//! `SolutionSummaryDto`: the JSON shape a `run` invocation prints (spec §6.3).
//!
//! The authoritative shape is `{ solutions, solutionHistory, solverStats }`, not an
//! ad-hoc per-solution struct — it's rendered once per invocation, covering every
//! streamed solution, since the HTML dashboard collaborator this layout serves reads
//! the whole run at once.

use std::collections::HashMap;
use std::time::Duration as WallClock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use bellum_core::{Project, ScheduledStatus, SchedulerSolution, SolutionHistory};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionSummaryDto {
    pub solutions: Vec<ProjectDto>,
    pub solution_history: Vec<SolutionHistoryEntryDto>,
    pub solver_stats: HashMap<String, Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDto {
    pub id: String,
    pub name: String,
    pub kick_off: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub scheduled_status: ScheduledStatus,
    pub assignments: Vec<AssignmentDto>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDto {
    pub task_id: String,
    pub description: String,
    pub employee_id: String,
    pub employee_name: String,
    pub start_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionHistoryEntryDto {
    /// Wall-clock time the solver spent finding this solution, ISO-8601 (e.g. `"PT5M"`).
    pub solver_duration: String,
    /// The schedule's own makespan (`endsAt - kickOff`), ISO-8601.
    pub max_duration: String,
    pub priority_cost: i64,
    pub valid: bool,
    pub optimal: bool,
}

impl SolutionSummaryDto {
    /// Render a single solution (the `find_optimal_schedule` path) as a
    /// one-element run summary.
    pub fn from_solution(solution: &SchedulerSolution) -> Self {
        Self::from_solutions(std::slice::from_ref(solution))
    }

    /// Render every solution streamed over one run (the
    /// `collect_all_optimal_schedules` path), in streamed order.
    pub fn from_history(history: &SolutionHistory) -> Self {
        Self::from_solutions(history.solutions())
    }

    fn from_solutions(solutions: &[SchedulerSolution]) -> Self {
        let solver_stats = solutions.last().map(|s| s.stats.clone()).unwrap_or_default();
        let projects = solutions.iter().map(|s| ProjectDto::from_project(&s.project)).collect();
        let history = solutions.iter().map(SolutionHistoryEntryDto::from_solution).collect();

        Self {
            solutions: projects,
            solution_history: history,
            solver_stats,
        }
    }
}

impl ProjectDto {
    fn from_project(project: &Project) -> Self {
        let assignments = project
            .tasks()
            .iter()
            .filter_map(|task| {
                let employee_id = task.employee()?;
                let employee = project.employee(employee_id)?;
                Some(AssignmentDto {
                    task_id: task.id().to_string(),
                    description: task.description().to_string(),
                    employee_id: employee_id.to_string(),
                    employee_name: employee.name().to_string(),
                    start_at: task.start_at()?,
                    ends_at: task.ends_at()?,
                })
            })
            .collect();

        Self {
            id: project.id().to_string(),
            name: project.name().to_string(),
            kick_off: project.kick_off(),
            ends_at: project.ends_at(),
            scheduled_status: project.scheduled_status(),
            assignments,
        }
    }
}

impl SolutionHistoryEntryDto {
    fn from_solution(solution: &SchedulerSolution) -> Self {
        let project = &solution.project;
        let max_duration_minutes = project
            .ends_at()
            .map(|end| (end - project.kick_off()).num_minutes())
            .unwrap_or(0);

        Self {
            solver_duration: iso8601_duration(solution.solve_time),
            max_duration: iso8601_duration_minutes(max_duration_minutes),
            priority_cost: project.priority_cost(),
            valid: project.validate().is_valid(),
            optimal: solution.optimal,
        }
    }
}

/// Render a wall-clock duration as an ISO-8601 duration string (`"PT5M"`,
/// `"PT1H2M3.500S"`). No ISO-8601-duration crate is in the teacher's dependency
/// tree, so this mirrors `bellum_core::solution::wall_clock_millis` — a small
/// hand-written serde-adjacent helper rather than a pulled-in dependency.
fn iso8601_duration(duration: WallClock) -> String {
    let total_secs = duration.as_secs_f64();
    let hours = (total_secs / 3600.0).floor() as u64;
    let minutes = ((total_secs - hours as f64 * 3600.0) / 60.0).floor() as u64;
    let seconds = total_secs - hours as f64 * 3600.0 - minutes as f64 * 60.0;

    let mut rendered = String::from("PT");
    if hours > 0 {
        rendered.push_str(&format!("{hours}H"));
    }
    if minutes > 0 {
        rendered.push_str(&format!("{minutes}M"));
    }
    if seconds > 0.0 || (hours == 0 && minutes == 0) {
        if seconds.fract() == 0.0 {
            rendered.push_str(&format!("{}S", seconds as u64));
        } else {
            rendered.push_str(&format!("{seconds:.3}S"));
        }
    }
    rendered
}

fn iso8601_duration_minutes(minutes: i64) -> String {
    iso8601_duration(WallClock::from_secs(minutes.max(0) as u64 * 60))
}
