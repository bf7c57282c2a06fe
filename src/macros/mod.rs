//! Macros and the registry they are looked up in

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::action::{Action, Opcode};
use crate::backend::Backend;
use crate::Error;

/// An ordered, immutable list of actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Macro {
    steps: Vec<Action>,
}

/// One step that did not complete
#[derive(Debug)]
pub struct StepFailure {
    /// Zero-based position in the macro
    pub index: usize,
    pub opcode: Opcode,
    pub error: Error,
}

/// Outcome of [`Macro::run`]
#[derive(Debug, Default)]
pub struct RunReport {
    /// Steps attempted; always the full length of the macro
    pub executed: usize,
    pub failures: Vec<StepFailure>,
}

impl RunReport {
    /// Whether every step succeeded
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Macro {
    #[must_use]
    pub const fn new(steps: Vec<Action>) -> Self {
        Self { steps }
    }

    #[must_use]
    pub fn steps(&self) -> &[Action] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps that fail validation, with the reason
    #[must_use]
    pub fn invalid_steps(&self) -> Vec<(usize, Error)> {
        self.steps
            .iter()
            .enumerate()
            .filter_map(|(i, step)| step.validate().err().map(|e| (i, e)))
            .collect()
    }

    /// Execute every step in order
    ///
    /// A failing step is logged and recorded; the remaining steps still run.
    pub async fn run(&self, backend: &dyn Backend) -> RunReport {
        let mut report = RunReport::default();

        for (index, step) in self.steps.iter().enumerate() {
            report.executed += 1;
            if let Err(error) = step.execute(backend).await {
                match &error {
                    Error::Validation { .. } | Error::UnknownOpcode(_) => {
                        tracing::warn!(step = index, opcode = %step.opcode(), error = %error, "step skipped");
                    }
                    _ => {
                        tracing::error!(step = index, opcode = %step.opcode(), error = %error, "step failed");
                    }
                }
                report.failures.push(StepFailure {
                    index,
                    opcode: step.opcode(),
                    error,
                });
            }
        }

        report
    }
}

/// Name to macro lookup table, filled once before serving
#[derive(Debug, Clone, Default)]
pub struct MacroRegistry {
    macros: HashMap<String, Macro>,
}

impl MacroRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a macro, replacing any previous one with the same name
    pub fn insert(&mut self, name: impl Into<String>, r#macro: Macro) -> Option<Macro> {
        self.macros.insert(name.into(), r#macro)
    }

    /// Look up a macro by name
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.macros.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Macro names in sorted order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.macros.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Iterate over `(name, macro)` pairs in sorted name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Macro)> {
        let mut entries: Vec<(&str, &Macro)> =
            self.macros.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries.into_iter()
    }
}

impl FromIterator<(String, Macro)> for MacroRegistry {
    fn from_iter<I: IntoIterator<Item = (String, Macro)>>(iter: I) -> Self {
        Self {
            macros: iter.into_iter().collect(),
        }
    }
}
