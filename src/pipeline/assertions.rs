//! Assertion gate.
//!
//! Runs every configured [`Assertion`] against the run statistics before the
//! snapshot is written. Warnings are logged and let the run continue; a
//! single failed rule blocks publication.

use crate::error::{AppError, Result};
use crate::models::{Assertion, AssertionOutcome};
use crate::pipeline::DatasetStats;

/// Summary of a gate run that did not fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssertionReport {
    pub passed: usize,
    pub warned: usize,
}

/// Checks assertions against dataset statistics.
#[derive(Debug, Clone, Default)]
pub struct AssertionGate {
    assertions: Vec<Assertion>,
}

impl AssertionGate {
    pub fn new(assertions: Vec<Assertion>) -> Self {
        Self { assertions }
    }

    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    /// Evaluate every assertion, logging each outcome.
    ///
    /// All rules run even after a failure so the log lists every violation.
    /// Returns the first [`AppError::AssertionFailed`] if any rule failed.
    pub fn validate(&self, stats: &DatasetStats) -> Result<AssertionReport> {
        let mut report = AssertionReport::default();
        let mut first_failure: Option<AppError> = None;

        for assertion in &self.assertions {
            let observed = stats.count(&assertion.filter_attribute, &assertion.filter_value);
            match assertion.evaluate(observed) {
                Ok(AssertionOutcome::Passed) => report.passed += 1,
                Ok(AssertionOutcome::Warned) => report.warned += 1,
                Err(e) => {
                    first_failure.get_or_insert(e);
                }
            }
        }

        match first_failure {
            Some(err) => {
                log::error!("Assertion gate: FAILED - snapshot will not be written");
                Err(err)
            }
            None => {
                log::info!(
                    "Assertion gate: OK ({} passed, {} warned)",
                    report.passed,
                    report.warned
                );
                Ok(report)
            }
        }
    }
}
