use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ExtractError;

/// Extraction steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Metadata,
    Timex,
    Compound,
    Ner,
    LinkedEntity,
    AdditionalTerm,
    Predicate,
    Coordination,
    Coreference,
    Role,
    Instances,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Metadata => "metadata",
            Step::Timex => "timex",
            Step::Compound => "compound",
            Step::Ner => "ner",
            Step::LinkedEntity => "linked_entity",
            Step::AdditionalTerm => "additional_term",
            Step::Predicate => "predicate",
            Step::Coordination => "coordination",
            Step::Coreference => "coreference",
            Step::Role => "role",
            Step::Instances => "instances",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub step: Step,
    pub item: String,
    pub message: String,
}

/// What happened to one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub document: String,
    pub mentions: usize,
    pub annotations: usize,
    pub statements: usize,
    pub failures: Vec<StepFailure>,
}

impl ExtractionReport {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            ..Default::default()
        }
    }

    pub fn record_failure(&mut self, step: Step, item: &str, err: &ExtractError) {
        self.failures.push(StepFailure {
            step,
            item: item.to_string(),
            message: err.to_string(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
