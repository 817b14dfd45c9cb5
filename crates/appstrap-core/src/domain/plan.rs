//! Bootstrap plans and the toolchain requirement that gates them.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::{error::DomainError, step::Step, version::VersionRequirement};

/// The toolchain a template was written against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolRequirement {
    /// Display name, e.g. `Rails`.
    pub name: String,
    /// Probe command printing the installed version, e.g. `rails --version`.
    pub command: Vec<String>,
    pub requirement: VersionRequirement,
}

impl ToolRequirement {
    pub fn new(
        name: impl Into<String>,
        command: Vec<String>,
        requirement: VersionRequirement,
    ) -> Self {
        Self {
            name: name.into(),
            command,
            requirement,
        }
    }
}

/// An ordered list of steps plus the upstream gems whose requirements are
/// captured before any step runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapPlan {
    pub name: String,
    pub capture_gems: Vec<String>,
    pub steps: Vec<Step>,
}

impl BootstrapPlan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capture_gems: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn capture_gem(mut self, gem: impl Into<String>) -> Self {
        self.capture_gems.push(gem.into());
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Validate every step and reject duplicate step names.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            step.validate()?;
            if !seen.insert(step.name.as_str()) {
                return Err(DomainError::DuplicateStep(step.name.clone()));
            }
        }
        Ok(())
    }

    pub fn action_count(&self) -> usize {
        self.steps.iter().map(|s| s.actions.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::step::Action;

    fn touch(name: &str) -> Step {
        Step::new(name).then(Action::CreateEmptyFile {
            path: format!("{name}.txt").into(),
        })
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let plan = BootstrapPlan::new("p").step(touch("a")).step(touch("a"));
        assert_eq!(plan.validate(), Err(DomainError::DuplicateStep("a".into())));
    }

    #[test]
    fn valid_plan_counts_actions() {
        let plan = BootstrapPlan::new("p")
            .capture_gem("rails")
            .step(touch("a"))
            .step(touch("b"));
        assert!(plan.validate().is_ok());
        assert_eq!(plan.action_count(), 2);
        assert_eq!(plan.capture_gems, ["rails"]);
    }

    #[test]
    fn invalid_step_fails_plan() {
        let plan = BootstrapPlan::new("p").step(Step::new("empty"));
        assert!(matches!(plan.validate(), Err(DomainError::InvalidStep { .. })));
    }
}
