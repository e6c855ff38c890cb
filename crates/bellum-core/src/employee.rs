//! Employees: immutable entities carrying a skill profile.

use serde::{Deserialize, Serialize};

use crate::error::BellumError;
use crate::identifier::Identifier;
use crate::skill::SkillMap;

/// Marker type for `Identifier<EmployeeMarker>`.
#[derive(Debug)]
pub struct EmployeeMarker;

pub type EmployeeId = Identifier<EmployeeMarker>;

/// A person who can be assigned to tasks. Immutable after construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Employee {
    id: EmployeeId,
    name: String,
    skills: SkillMap,
}

impl Employee {
    /// Construct an employee, rejecting a blank name.
    pub fn new(name: impl Into<String>, skills: SkillMap) -> Result<Self, BellumError> {
        Self::with_id(EmployeeId::new(), name, skills)
    }

    /// Construct an employee with an explicit id (used when round-tripping from
    /// storage, where the id must be preserved).
    pub fn with_id(
        id: EmployeeId,
        name: impl Into<String>,
        skills: SkillMap,
    ) -> Result<Self, BellumError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BellumError::validation_single(
                "employee name non-blank",
                "employee name must not be blank",
            ));
        }
        Ok(Self { id, name, skills })
    }

    pub const fn id(&self) -> EmployeeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn skills(&self) -> &SkillMap {
        &self.skills
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::SkillPoint;

    #[test]
    fn rejects_blank_name() {
        let err = Employee::new("   ", SkillMap::new()).unwrap_err();
        assert!(err.has_label("employee name non-blank"));
    }

    #[test]
    fn accepts_non_blank_name_with_skills() {
        let skills = SkillMap::new().with("skill1", SkillPoint::new(7).unwrap());
        let employee = Employee::new("Ada Lovelace", skills).unwrap();
        assert_eq!(employee.name(), "Ada Lovelace");
        assert_eq!(employee.skills().get("skill1").unwrap().value(), 7);
    }
}
