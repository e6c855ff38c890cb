//! Deserializes a project definition file (spec §6.1) into domain types. This is
//! a thin `serde_json` mapping, not a parser in its own right — `bellum-core`'s
//! constructors still run every init invariant on the result.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use bellum_core::{Employee, Priority, Project, SkillMap, SkillPoint, Task};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectFile {
    name: String,
    kick_off: DateTime<Utc>,
    employees: Vec<EmployeeFile>,
    tasks: Vec<TaskFile>,
}

#[derive(Deserialize)]
struct EmployeeFile {
    name: String,
    #[serde(default)]
    skills: HashMap<String, u8>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskFile {
    description: String,
    #[serde(default = "default_priority")]
    priority: String,
    #[serde(default)]
    required_skills: HashMap<String, u8>,
    /// Index into this file's `tasks` array, not a Bellum task id — ids don't
    /// exist yet until the file is loaded.
    depends_on: Option<usize>,
}

fn default_priority() -> String {
    "major".to_string()
}

pub fn load(contents: &str) -> Result<Project> {
    let file: ProjectFile = serde_json::from_str(contents)
        .with_context(|| "project file is not valid JSON for the expected shape")?;

    let employees = file
        .employees
        .iter()
        .map(|e| Employee::new(e.name.clone(), to_skill_map(&e.skills)))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| "invalid employee in project file")?;

    let mut tasks: Vec<Task> = file
        .tasks
        .iter()
        .map(|t| {
            let priority = parse_priority(&t.priority)?;
            Ok(Task::new(t.description.clone(), priority, to_skill_map(&t.required_skills), None)?)
        })
        .collect::<Result<Vec<Task>>>()
        .with_context(|| "invalid task in project file")?;

    for (i, t) in file.tasks.iter().enumerate() {
        if let Some(dep_index) = t.depends_on {
            let Some(dep_task) = tasks.get(dep_index) else {
                bail!("task {i} depends_on index {dep_index} is out of range");
            };
            let dep_id = dep_task.id();
            tasks[i] = tasks[i].change_dependency(Some(dep_id));
        }
    }

    Ok(Project::new(file.name, file.kick_off, employees, tasks)?)
}

fn parse_priority(raw: &str) -> Result<Priority> {
    match raw.to_ascii_lowercase().as_str() {
        "critical" => Ok(Priority::Critical),
        "major" => Ok(Priority::Major),
        "minor" => Ok(Priority::Minor),
        other => bail!("unknown priority {other:?}; expected critical, major, or minor"),
    }
}

fn to_skill_map(raw: &HashMap<String, u8>) -> SkillMap {
    raw.iter()
        .filter_map(|(name, value)| SkillPoint::new(*value).ok().map(|p| (name.clone(), p)))
        .collect()
}
