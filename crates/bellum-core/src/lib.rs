//! # bellum-core
//!
//! Domain model, validation, and time estimation for the Bellum scheduling engine.
//!
//! This crate provides:
//! - Domain types: `Project`, `Task`, `Employee`, `SkillMap`
//! - Time estimation: `TimeEstimator`, `PearsonEstimator`, `CustomEstimator`,
//!   `EstimationMatrix`
//! - The error taxonomy (`BellumError`) and a small validation-rule combinator
//!   (`RuleSet`)
//! - `SchedulerSolution` / `SolutionHistory`, the output types a solver produces
//!
//! ## Example
//!
//! ```rust
//! use bellum_core::{Employee, Project, SkillMap};
//! use chrono::Utc;
//!
//! let ada = Employee::new("Ada Lovelace", SkillMap::new()).unwrap();
//! let project = Project::new("launch", Utc::now(), vec![ada], vec![]).unwrap();
//! assert_eq!(project.employees().len(), 1);
//! ```

mod employee;
mod error;
mod estimation_matrix;
mod estimator;
mod identifier;
mod project;
mod skill;
mod solution;
mod task;
mod time;
mod validation;

pub use employee::{Employee, EmployeeId, EmployeeMarker};
pub use error::{BellumError, BellumResult, ValidationIssue};
pub use estimation_matrix::EstimationMatrix;
pub use estimator::{CustomEstimator, PearsonEstimator, TimeEstimator};
pub use identifier::Identifier;
pub use project::{priority_cost_of, Project, ProjectId, ProjectMarker, ScheduledStatus};
pub use skill::{SkillMap, SkillName, SkillPoint};
pub use solution::{SchedulerSolution, SolutionHistory};
pub use task::{Priority, Task, TaskCore, TaskId, TaskMarker};
pub use time::{Duration, Instant};
pub use validation::{RuleSet, ValidationOutcome};
