//! # bellum-engine
//!
//! Two interchangeable solving strategies for Bellum schedules behind a common
//! façade:
//! - `cp`: a constraint-programming formulation solved with `pumpkin-solver`,
//!   optimal whenever its time budget allows a proof.
//! - `ga`: a permutation-encoded genetic algorithm with a deterministic greedy
//!   decoder, for problem sizes or time budgets where CP doesn't converge.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bellum_core::{CustomEstimator, EstimationMatrix, Employee, Project, SkillMap};
//! use bellum_engine::{Scheduler, SolverRegistry};
//! use std::time::Duration;
//!
//! let registry = SolverRegistry::with_defaults();
//! let descriptor = registry.find("ga").unwrap();
//! let scheduler = Scheduler::new(descriptor.algorithm());
//!
//! let ada = Employee::new("Ada", SkillMap::new()).unwrap();
//! let project = Project::new("launch", chrono::Utc::now(), vec![ada], vec![]).unwrap();
//! let matrix = EstimationMatrix::new(Box::new(CustomEstimator::new()));
//!
//! let solution = scheduler
//!     .find_optimal_schedule(&project, &matrix, Duration::from_secs(5), |_| {})
//!     .unwrap();
//! assert!(solution.optimal);
//! ```

mod algorithm;
mod cp;
mod ga;
mod registry;
mod scheduler;

pub use algorithm::SolverAlgorithm;
pub use cp::CpSolver;
pub use ga::GaSolver;
pub use registry::{SolverDescriptor, SolverRegistry};
pub use scheduler::Scheduler;
