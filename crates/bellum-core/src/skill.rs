//! Bounded skill levels and the skill maps that carry them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::BellumError;

/// An integer skill level in `[0, 9]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkillPoint(u8);

impl SkillPoint {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 9;

    /// Construct a skill point, rejecting anything outside `[0, 9]`.
    pub fn new(value: u8) -> Result<Self, BellumError> {
        if value > Self::MAX {
            return Err(BellumError::validation_single(
                "skill point range",
                format!("skill point {value} is out of range [0, 9]"),
            ));
        }
        Ok(Self(value))
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SkillPoint {
    type Error = BellumError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A skill name, conventionally `"skill1".."skillN"`.
pub type SkillName = String;

/// A named set of skill points. Keys are unique; ordering is not meaningful, but a
/// `BTreeMap` gives deterministic iteration which keeps test output and solver seeding
/// reproducible.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillMap(BTreeMap<SkillName, SkillPoint>);

impl SkillMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, name: impl Into<SkillName>, point: SkillPoint) {
        self.0.insert(name.into(), point);
    }

    pub fn with(mut self, name: impl Into<SkillName>, point: SkillPoint) -> Self {
        self.insert(name, point);
        self
    }

    pub fn get(&self, name: &str) -> Option<SkillPoint> {
        self.0.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SkillName, &SkillPoint)> {
        self.0.iter()
    }

    /// Align two skill maps by key, treating a missing entry on either side as `0`.
    /// Returns the paired `(employee, task)` point values for every key appearing in
    /// either map.
    pub fn align(&self, other: &SkillMap) -> Vec<(u8, u8)> {
        let mut keys: Vec<&SkillName> = self.0.keys().chain(other.0.keys()).collect();
        keys.sort();
        keys.dedup();
        keys.into_iter()
            .map(|key| {
                let a = self.0.get(key).map_or(0, |p| p.value());
                let b = other.0.get(key).map_or(0, |p| p.value());
                (a, b)
            })
            .collect()
    }
}

impl FromIterator<(SkillName, SkillPoint)> for SkillMap {
    fn from_iter<I: IntoIterator<Item = (SkillName, SkillPoint)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
