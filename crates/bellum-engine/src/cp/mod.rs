//! The constraint-programming solver: formulates scheduling as a CSP over
//! `pumpkin-solver` and streams every improving solution it finds.

mod model;

use std::collections::HashMap;
use std::time::{Duration as WallClock, Instant as WallClockInstant};

use pumpkin_solver::optimisation::linear_sat_unsat::LinearSatUnsat;
use pumpkin_solver::optimisation::OptimisationDirection;
use pumpkin_solver::results::{OptimisationResult, ProblemSolution};
use pumpkin_solver::termination::TimeBudget;
use serde_json::json;

use bellum_core::{BellumError, Duration, EstimationMatrix, Project, SchedulerSolution, Task};

use crate::algorithm::SolverAlgorithm;
use model::{CpModel, ModelVars};

pub struct CpSolver;

impl CpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverAlgorithm for CpSolver {
    fn name(&self) -> &'static str {
        "cp"
    }

    fn describe(&self) -> &'static str {
        "constraint-programming solver over pumpkin-solver, optimal under its time budget"
    }

    fn solve(
        &self,
        project: &Project,
        estimation_matrix: &EstimationMatrix,
        time_limit: WallClock,
        on_improved: &mut dyn FnMut(SchedulerSolution),
    ) -> Result<SchedulerSolution, BellumError> {
        let started = WallClockInstant::now();
        let build_started = WallClockInstant::now();
        let CpModel { mut solver, vars } = CpModel::build(project, estimation_matrix)?;
        let build_time = build_started.elapsed();
        let mut termination = TimeBudget::starting_now(time_limit);
        let mut brancher = solver.default_brancher();

        let mut nodes_explored = 0u64;
        let mut best: Option<SchedulerSolution> = None;

        let objective = LinearSatUnsat::new(OptimisationDirection::Minimise, vars.objective, |solution| {
            nodes_explored += 1;
            let decoded = decode(project, &vars, solution, started.elapsed(), build_time, nodes_explored, "RUNNING");
            on_improved(decoded.clone());
            best = Some(decoded);
        });

        let result = solver.optimise(&mut brancher, &mut termination, objective);

        match result {
            OptimisationResult::Optimal(solution) => {
                let mut decoded = decode(project, &vars, &solution, started.elapsed(), build_time, nodes_explored, "TERMINATED");
                decoded.optimal = true;
                best = Some(decoded.clone());
                on_improved(decoded);
            }
            OptimisationResult::Satisfiable(solution) => {
                let decoded = decode(project, &vars, &solution, started.elapsed(), build_time, nodes_explored, "STOPPED");
                best = Some(decoded.clone());
                on_improved(decoded);
            }
            OptimisationResult::Unsatisfiable => {
                return Err(BellumError::Validation {
                    errors: vec![bellum_core::ValidationIssue::new(
                        "unsatisfiable schedule",
                        "no feasible schedule exists under the given constraints",
                    )],
                });
            }
            OptimisationResult::Unknown => {}
        }

        best.ok_or_else(|| {
            BellumError::CallbackError("CP solver timed out before finding any solution".to_string())
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn decode(
    project: &Project,
    model_vars: &ModelVars,
    solution: &impl ProblemSolution,
    elapsed: WallClock,
    build_time: WallClock,
    nodes_explored: u64,
    search_state: &str,
) -> SchedulerSolution {
    let mut tasks: Vec<Task> = Vec::with_capacity(project.tasks().len());
    let mut makespan_minutes = 0i64;

    for (i, task) in project.tasks().iter().enumerate() {
        let vars = &model_vars.tasks[i];
        let start_minutes = solution.get_integer_value(vars.start) as i64;
        let duration_minutes = solution.get_integer_value(vars.duration) as i64;
        makespan_minutes = makespan_minutes.max(start_minutes + duration_minutes);

        let employee_index = vars
            .assigned
            .iter()
            .position(|v| v.is_some_and(|v| solution.get_integer_value(v) == 1))
            .expect("exactly-one constraint guarantees exactly one assigned employee");
        let employee = &model_vars.employees[employee_index];

        let start_instant = project.kick_off() + chrono::Duration::minutes(start_minutes);
        let duration = Duration::minutes(duration_minutes).unwrap_or_else(|_| Duration::zero());
        tasks.push(task.assign(employee.id(), start_instant, duration));
    }

    let priority_cost = bellum_core::priority_cost_of(&tasks);

    let decoded_project = Project::with_id(
        project.id(),
        project.name(),
        project.kick_off(),
        project.employees().to_vec(),
        tasks,
    )
    .expect("solver output always satisfies project invariants by construction");

    let mut stats = HashMap::new();
    stats.insert("solver".to_string(), json!("Choco Solver"));
    stats.insert(
        "modelName".to_string(),
        json!(format!(
            "bellum-cp-{}t-{}e",
            project.tasks().len(),
            project.employees().len()
        )),
    );
    stats.insert("searchState".to_string(), json!(search_state));
    stats.insert("solutions".to_string(), json!(nodes_explored));
    stats.insert("buildTimeMs".to_string(), json!(build_time.as_millis() as u64));
    stats.insert("resolutionTimeMs".to_string(), json!(elapsed.as_millis() as u64));
    stats.insert(
        "policy".to_string(),
        json!("default brancher over all variables, minimise 100*makespan + priorityCost"),
    );
    stats.insert("makespanMinutes".to_string(), json!(makespan_minutes));
    stats.insert("priorityCost".to_string(), json!(priority_cost));
    stats.insert(
        "objective".to_string(),
        json!(100 * makespan_minutes + priority_cost),
    );
    // pumpkin-solver's public result/callback surface (the only API this crate's
    // reference usage exercises) does not expose internal branch-and-bound
    // counters, so these four are tracked locally rather than read off the
    // solver: `nodes` mirrors the improving-solution count above, and the other
    // three are left at zero. See DESIGN.md.
    stats.insert("nodes".to_string(), json!(nodes_explored));
    stats.insert("backtracks".to_string(), json!(0));
    stats.insert("fails".to_string(), json!(0));
    stats.insert("restarts".to_string(), json!(0));

    SchedulerSolution::new(decoded_project, false, elapsed, stats)
}
