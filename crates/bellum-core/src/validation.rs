//! A small rule-set combinator, used instead of exceptions-for-control-flow.
//!
//! A validation is a set of named rules `(label, predicate)`. A predicate reads the
//! target and returns `None` on success or `Some(message)` — the message already has
//! any `{value}` template substituted — on failure. Rules compose by conjunction: all
//! rules in a `RuleSet` run, and every failure is collected, never just the first.

use crate::error::{BellumError, ValidationIssue};

type Predicate<T> = Box<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// An ordered collection of labeled rules evaluated against a single target type.
pub struct RuleSet<T> {
    rules: Vec<(&'static str, Predicate<T>)>,
}

impl<T> RuleSet<T> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Register a rule. `predicate` returns `None` on success, or the offending
    /// message on failure.
    pub fn rule(
        mut self,
        label: &'static str,
        predicate: impl Fn(&T) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.rules.push((label, Box::new(predicate)));
        self
    }

    /// Evaluate every rule against `target`, collecting every failure (not just the
    /// first).
    pub fn evaluate(&self, target: &T) -> ValidationOutcome {
        let errors = self
            .rules
            .iter()
            .filter_map(|(label, predicate)| {
                predicate(target).map(|message| ValidationIssue::new(*label, message))
            })
            .collect();
        ValidationOutcome { errors }
    }
}

impl<T> Default for RuleSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of evaluating a `RuleSet`: `{isValid, errors}` from spec §4.1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    errors: Vec<ValidationIssue>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    /// All issues matching a given rule label — lets tests assert on one specific
    /// check without parsing messages.
    pub fn by_label<'a>(&'a self, label: &str) -> Vec<&'a ValidationIssue> {
        self.errors.iter().filter(|e| e.label == label).collect()
    }

    /// Merge another outcome's errors into this one (used to sequence an *initial*
    /// rule set with a *full* rule set).
    pub fn merge(mut self, other: ValidationOutcome) -> Self {
        self.errors.extend(other.errors);
        self
    }

    /// Convert a failing outcome into the single typed `BellumError::Validation`
    /// spec §7 requires init-invariant failures to surface as. Returns `Ok(())` if
    /// the outcome was valid.
    pub fn into_result(self) -> Result<(), BellumError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(BellumError::Validation { errors: self.errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positive_rule(n: &i32) -> Option<String> {
        if *n > 0 {
            None
        } else {
            Some(format!("{n} is not positive"))
        }
    }

    fn even_rule(n: &i32) -> Option<String> {
        if *n % 2 == 0 {
            None
        } else {
            Some(format!("{n} is not even"))
        }
    }

    #[test]
    fn collects_every_failing_rule() {
        let rules: RuleSet<i32> = RuleSet::new()
            .rule("is positive", positive_rule)
            .rule("is even", even_rule);

        let outcome = rules.evaluate(&-3);
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors().len(), 2);
        assert_eq!(outcome.by_label("is positive").len(), 1);
        assert_eq!(outcome.by_label("is even").len(), 1);
    }

    #[test]
    fn passing_target_has_no_errors() {
        let rules: RuleSet<i32> = RuleSet::new().rule("is positive", positive_rule);
        let outcome = rules.evaluate(&4);
        assert!(outcome.is_valid());
    }

    #[test]
    fn is_idempotent_across_repeated_calls() {
        let rules: RuleSet<i32> = RuleSet::new().rule("is positive", positive_rule);
        let first = rules.evaluate(&-1);
        let second = rules.evaluate(&-1);
        assert_eq!(first, second);
    }
}
