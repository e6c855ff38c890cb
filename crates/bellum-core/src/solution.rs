//! A solution is a fully- or partially-scheduled `Project` plus the metadata a
//! solver attaches to it: whether it is provably optimal, how long the solver took
//! to find it, and solver-specific statistics.

use std::collections::HashMap;
use std::time::Duration as WallClock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::project::Project;

/// One candidate schedule produced by a solver run.
///
/// `solve_time` is wall-clock time spent finding *this* solution, measured by the
/// solver loop — deliberately `std::time::Duration`, not `crate::time::Duration`,
/// since the two measure unrelated things: the latter is a property of the
/// schedule itself (task durations, in whole minutes), the former a property of
/// the search that produced it (may be sub-minute).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchedulerSolution {
    pub project: Project,
    pub optimal: bool,
    #[serde(with = "wall_clock_millis")]
    pub solve_time: WallClock,
    pub stats: HashMap<String, Value>,
}

impl SchedulerSolution {
    pub fn new(
        project: Project,
        optimal: bool,
        solve_time: WallClock,
        stats: HashMap<String, Value>,
    ) -> Self {
        Self { project, optimal, solve_time, stats }
    }
}

mod wall_clock_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        (value.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// The ordered sequence of improving solutions a solver produced over one run. The
/// last entry is the best (and, if `optimal`, provably so) solution found.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SolutionHistory {
    solutions: Vec<SchedulerSolution>,
}

impl SolutionHistory {
    pub fn new() -> Self {
        Self { solutions: Vec::new() }
    }

    pub fn push(&mut self, solution: SchedulerSolution) {
        self.solutions.push(solution);
    }

    pub fn solutions(&self) -> &[SchedulerSolution] {
        &self.solutions
    }

    pub fn best(&self) -> Option<&SchedulerSolution> {
        self.solutions.last()
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }
}

impl FromIterator<SchedulerSolution> for SolutionHistory {
    fn from_iter<I: IntoIterator<Item = SchedulerSolution>>(iter: I) -> Self {
        Self { solutions: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::Employee;
    use crate::skill::SkillMap;
    use chrono::TimeZone;

    fn sample_project() -> Project {
        Project::new(
            "p",
            chrono::Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
            vec![Employee::new("Ada", SkillMap::new()).unwrap()],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn history_best_is_last_pushed() {
        let mut history = SolutionHistory::new();
        history.push(SchedulerSolution::new(
            sample_project(),
            false,
            WallClock::from_millis(10),
            HashMap::new(),
        ));
        history.push(SchedulerSolution::new(
            sample_project(),
            true,
            WallClock::from_millis(50),
            HashMap::new(),
        ));
        assert_eq!(history.len(), 2);
        assert!(history.best().unwrap().optimal);
    }

    #[test]
    fn empty_history_has_no_best() {
        assert!(SolutionHistory::new().best().is_none());
    }
}
