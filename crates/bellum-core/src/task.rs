//! Tasks: a tagged `Unassigned | Assigned` variant sharing a common core.
//!
//! The source this spec was distilled from models `Task` by inheritance
//! (an assignable base with an `Assigned` subclass). Rust has no inheritance; the
//! idiomatic shape per spec §9 is a sum type, so `Task` is an `enum` over a shared
//! `TaskCore` instead.

use serde::{Deserialize, Serialize};

use crate::employee::EmployeeId;
use crate::error::BellumError;
use crate::identifier::Identifier;
use crate::skill::SkillMap;
use crate::time::{Duration, Instant};

/// Marker type for `Identifier<TaskMarker>`.
#[derive(Debug)]
pub struct TaskMarker;

pub type TaskId = Identifier<TaskMarker>;

/// Scheduling priority. Variants are ordered `Critical < Major < Minor` so that
/// `priority(i) > priority(j)` (spec's priority-inversion definition: `i` is *less*
/// important than `j`) reads directly as `Ord::gt` on this enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Critical = 0,
    Major = 1,
    Minor = 2,
}

/// Fields shared by both task variants.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskCore {
    pub id: TaskId,
    pub description: String,
    pub priority: Priority,
    pub required_skills: SkillMap,
    /// The predecessor's identifier, stored as a *relation*, never as an owning
    /// reference — the id graph is allowed to contain cycles that the type system
    /// does not forbid, so that `Project` construction can detect and reject them
    /// (spec §9: "cyclic task graph in storage").
    pub depends_on: Option<TaskId>,
}

/// A schedulable unit of work, either not yet assigned or fully assigned.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Task {
    Unassigned(TaskCore),
    Assigned {
        core: TaskCore,
        employee: EmployeeId,
        start_at: Instant,
        duration: Duration,
        pinned: bool,
    },
}

impl Task {
    /// Construct a new, unassigned task. Rejects a blank description.
    pub fn new(
        description: impl Into<String>,
        priority: Priority,
        required_skills: SkillMap,
        depends_on: Option<TaskId>,
    ) -> Result<Self, BellumError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(BellumError::validation_single(
                "task description non-blank",
                "task description must not be blank",
            ));
        }
        Ok(Self::Unassigned(TaskCore {
            id: TaskId::new(),
            description,
            priority,
            required_skills,
            depends_on,
        }))
    }

    pub fn core(&self) -> &TaskCore {
        match self {
            Self::Unassigned(core) => core,
            Self::Assigned { core, .. } => core,
        }
    }

    pub fn id(&self) -> TaskId {
        self.core().id
    }

    pub fn description(&self) -> &str {
        &self.core().description
    }

    pub fn priority(&self) -> Priority {
        self.core().priority
    }

    pub fn depends_on(&self) -> Option<TaskId> {
        self.core().depends_on
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned { .. })
    }

    /// Start time of an assigned task, if assigned.
    pub fn start_at(&self) -> Option<Instant> {
        match self {
            Self::Assigned { start_at, .. } => Some(*start_at),
            Self::Unassigned(_) => None,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            Self::Assigned { duration, .. } => Some(*duration),
            Self::Unassigned(_) => None,
        }
    }

    /// `startAt + duration`, if assigned.
    pub fn ends_at(&self) -> Option<Instant> {
        match self {
            Self::Assigned { start_at, duration, .. } => Some(duration.add_to(*start_at)),
            Self::Unassigned(_) => None,
        }
    }

    pub fn employee(&self) -> Option<EmployeeId> {
        match self {
            Self::Assigned { employee, .. } => Some(*employee),
            Self::Unassigned(_) => None,
        }
    }

    pub fn pinned(&self) -> bool {
        matches!(self, Self::Assigned { pinned: true, .. })
    }

    /// Produce an `Assigned` task from any starting variant, preserving identity
    /// (id, description, priority, required skills, dependency).
    pub fn assign(&self, employee: EmployeeId, start_at: Instant, duration: Duration) -> Self {
        Self::Assigned {
            core: self.core().clone(),
            employee,
            start_at,
            duration,
            pinned: false,
        }
    }

    /// Produce an `Unassigned` task from any starting variant, preserving identity.
    pub fn unassign(&self) -> Self {
        Self::Unassigned(self.core().clone())
    }

    /// Produce a new task with a replaced dependency, preserving variant and identity.
    pub fn change_dependency(&self, dep: Option<TaskId>) -> Self {
        match self {
            Self::Unassigned(core) => {
                let mut core = core.clone();
                core.depends_on = dep;
                Self::Unassigned(core)
            }
            Self::Assigned { core, employee, start_at, duration, pinned } => {
                let mut core = core.clone();
                core.depends_on = dep;
                Self::Assigned {
                    core,
                    employee: *employee,
                    start_at: *start_at,
                    duration: *duration,
                    pinned: *pinned,
                }
            }
        }
    }

    /// Mark an already-assigned task as pinned (the CP solver uses this to seed and
    /// then fix partial-assignment hints from the input project).
    pub fn pin(&self) -> Self {
        match self {
            Self::Assigned { core, employee, start_at, duration, .. } => Self::Assigned {
                core: core.clone(),
                employee: *employee,
                start_at: *start_at,
                duration: *duration,
                pinned: true,
            },
            Self::Unassigned(_) => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Task {
        Task::new("design", Priority::Major, SkillMap::new(), None).unwrap()
    }

    #[test]
    fn rejects_blank_description() {
        let err = Task::new("   ", Priority::Minor, SkillMap::new(), None).unwrap_err();
        assert!(err.has_label("task description non-blank"));
    }

    #[test]
    fn assign_then_unassign_preserves_identity() {
        let task = sample();
        let id = task.id();
        let employee = EmployeeId::new();
        let start = chrono::Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let assigned = task.assign(employee, start, Duration::minutes(30).unwrap());
        assert!(assigned.is_assigned());
        assert_eq!(assigned.id(), id);
        assert_eq!(assigned.employee(), Some(employee));
        assert_eq!(assigned.ends_at(), Some(start + chrono::Duration::minutes(30)));

        let unassigned = assigned.unassign();
        assert!(!unassigned.is_assigned());
        assert_eq!(unassigned.id(), id);
    }

    #[test]
    fn change_dependency_preserves_variant() {
        let task = sample();
        let dep = TaskId::new();
        let changed = task.change_dependency(Some(dep));
        assert!(!changed.is_assigned());
        assert_eq!(changed.depends_on(), Some(dep));
        assert_eq!(changed.id(), task.id());
    }

    #[test]
    fn priority_ordering_matches_inversion_semantics() {
        // priority(i) > priority(j) means i is *less* important than j.
        assert!(Priority::Minor > Priority::Major);
        assert!(Priority::Major > Priority::Critical);
    }
}
