//! Looks up a `SolverAlgorithm` implementation by name.

use std::sync::Arc;

use bellum_core::BellumError;

use crate::algorithm::SolverAlgorithm;

/// One entry in the registry: a name, a human-readable description, and the
/// algorithm itself.
#[derive(Clone)]
pub struct SolverDescriptor {
    name: &'static str,
    description: &'static str,
    algorithm: Arc<dyn SolverAlgorithm>,
}

impl SolverDescriptor {
    pub fn new(algorithm: Arc<dyn SolverAlgorithm>) -> Self {
        Self { name: algorithm.name(), description: algorithm.describe(), algorithm }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn algorithm(&self) -> Arc<dyn SolverAlgorithm> {
        Arc::clone(&self.algorithm)
    }
}

/// A case-insensitive lookup table of the solvers a `Scheduler` can be built with.
pub struct SolverRegistry {
    descriptors: Vec<SolverDescriptor>,
}

impl SolverRegistry {
    pub fn new() -> Self {
        Self { descriptors: Vec::new() }
    }

    /// The registry pre-populated with Bellum's two built-in solvers, `"cp"` and
    /// `"ga"`.
    pub fn with_defaults() -> Self {
        Self::new()
            .register(Arc::new(crate::cp::CpSolver::new()))
            .register(Arc::new(crate::ga::GaSolver::new()))
    }

    pub fn register(mut self, algorithm: Arc<dyn SolverAlgorithm>) -> Self {
        self.descriptors.push(SolverDescriptor::new(algorithm));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.descriptors.iter().map(SolverDescriptor::name).collect()
    }

    /// Look up a solver by name, case-insensitively. Fails with `UnknownSolver`
    /// listing every registered name when `name` doesn't match.
    pub fn find(&self, name: &str) -> Result<&SolverDescriptor, BellumError> {
        self.descriptors
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| BellumError::UnknownSolver {
                name: name.to_string(),
                available: self.names().into_iter().map(str::to_string).collect(),
            })
    }
}

impl Default for SolverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_registered_solver_case_insensitively() {
        let registry = SolverRegistry::with_defaults();
        assert!(registry.find("CP").is_ok());
        assert!(registry.find("ga").is_ok());
    }

    #[test]
    fn unknown_name_lists_available_solvers() {
        let registry = SolverRegistry::with_defaults();
        let err = registry.find("bogus").unwrap_err();
        match err {
            BellumError::UnknownSolver { name, available } => {
                assert_eq!(name, "bogus");
                assert!(available.contains(&"cp".to_string()));
                assert!(available.contains(&"ga".to_string()));
            }
            other => panic!("expected UnknownSolver, got {other:?}"),
        }
    }
}
