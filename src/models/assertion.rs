//! Data assertions checked at the end of an ingestion run.
//!
//! An assertion compares an aggregate count (e.g. the number of emitted
//! `Person` entities) against a threshold:
//!
//! ```toml
//! [[dataset.assertions]]
//! comparison = "GT"
//! threshold = 100
//! action = "FAIL"
//! filter = { attribute = "schema", value = "Person" }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use toml::Value;

use crate::error::{AppError, Result};

/// How the observed count is compared against the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    /// Violated when `observed > threshold`
    #[serde(rename = "GT")]
    Gt,
    /// Violated when `observed < threshold`
    #[serde(rename = "LT")]
    Lt,
}

impl Comparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Gt => "GT",
            Comparison::Lt => "LT",
        }
    }
}

impl FromStr for Comparison {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "GT" => Ok(Comparison::Gt),
            "LT" => Ok(Comparison::Lt),
            other => Err(AppError::config(format!(
                "Invalid assertion comparison '{other}'. Expected one of: GT, LT"
            ))),
        }
    }
}

/// What happens when an assertion is violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Emit a warning-level log message and continue
    #[serde(rename = "WARN")]
    Warn,
    /// Fail the run; the dataset is not published
    #[serde(rename = "FAIL")]
    Fail,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Warn => "WARN",
            Action::Fail => "FAIL",
        }
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "WARN" => Ok(Action::Warn),
            "FAIL" => Ok(Action::Fail),
            other => Err(AppError::config(format!(
                "Invalid assertion action '{other}'. Expected one of: WARN, FAIL"
            ))),
        }
    }
}

/// Result of evaluating an assertion that did not abort the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionOutcome {
    Passed,
    Warned,
}

/// A validated, immutable assertion rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assertion {
    pub comparison: Comparison,
    pub threshold: i64,
    pub action: Action,
    pub filter_attribute: String,
    pub filter_value: String,
}

impl Assertion {
    pub fn new(
        comparison: Comparison,
        threshold: i64,
        action: Action,
        filter_attribute: impl Into<String>,
        filter_value: impl Into<String>,
    ) -> Self {
        Self {
            comparison,
            threshold,
            action,
            filter_attribute: filter_attribute.into(),
            filter_value: filter_value.into(),
        }
    }

    /// Construct from a raw config table, rejecting anything malformed.
    pub fn from_config(config: &Value) -> Result<Self> {
        let table = config
            .as_table()
            .ok_or_else(|| AppError::config("Assertion must be a table"))?;

        let comparison =
            require_str(table, "comparison", "assertion")?.parse::<Comparison>()?;
        let threshold = require_int(table, "threshold")?;
        let action = require_str(table, "action", "assertion")?.parse::<Action>()?;

        let filter = table
            .get("filter")
            .ok_or_else(|| AppError::config("Assertion is missing 'filter'"))?
            .as_table()
            .ok_or_else(|| AppError::config("Assertion 'filter' must be a table"))?;
        let filter_attribute = require_str(filter, "attribute", "assertion filter")?;
        let filter_value = require_str(filter, "value", "assertion filter")?;

        Ok(Self::new(
            comparison,
            threshold,
            action,
            filter_attribute,
            filter_value,
        ))
    }

    /// Whether `observed` violates the rule.
    pub fn is_violated(&self, observed: u64) -> bool {
        let observed = i128::from(observed);
        let threshold = i128::from(self.threshold);
        match self.comparison {
            Comparison::Gt => observed > threshold,
            Comparison::Lt => observed < threshold,
        }
    }

    /// Evaluate against a measured count.
    ///
    /// WARN violations are logged and return [`AssertionOutcome::Warned`];
    /// FAIL violations return [`AppError::AssertionFailed`].
    pub fn evaluate(&self, observed: u64) -> Result<AssertionOutcome> {
        if !self.is_violated(observed) {
            log::debug!("Assertion passed: {} (observed: {})", self, observed);
            return Ok(AssertionOutcome::Passed);
        }

        match self.action {
            Action::Warn => {
                log::warn!("Assertion warning: {} (observed: {})", self, observed);
                Ok(AssertionOutcome::Warned)
            }
            Action::Fail => {
                log::error!("Assertion failed: {} (observed: {})", self, observed);
                Err(AppError::AssertionFailed {
                    rule: self.to_string(),
                    observed,
                })
            }
        }
    }
}

impl TryFrom<&Value> for Assertion {
    type Error = AppError;

    fn try_from(value: &Value) -> Result<Self> {
        Self::from_config(value)
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} filter: {}={}",
            self.comparison.as_str(),
            self.threshold,
            self.filter_attribute,
            self.filter_value
        )
    }
}

fn require_str<'a>(table: &'a toml::Table, key: &str, what: &str) -> Result<&'a str> {
    match table.get(key) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(AppError::config(format!(
            "{what} '{key}' must be a string, got {}",
            other.type_str()
        ))),
        None => Err(AppError::config(format!("{what} is missing '{key}'"))),
    }
}

fn require_int(table: &toml::Table, key: &str) -> Result<i64> {
    match table.get(key) {
        Some(Value::Integer(i)) => Ok(*i),
        Some(Value::Float(f)) if f.is_finite() => Ok(f.trunc() as i64),
        Some(other) => Err(AppError::config(format!(
            "assertion '{key}' must be a number, got {}",
            other.type_str()
        ))),
        None => Err(AppError::config(format!("assertion is missing '{key}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<Assertion> {
        let value: Value = toml::from_str(src).unwrap();
        Assertion::from_config(&value)
    }

    const GT_FAIL: &str = r#"
        comparison = "GT"
        threshold = 100
        action = "FAIL"
        filter = { attribute = "schema", value = "Person" }
    "#;

    #[test]
    fn test_construct_valid() {
        let assertion = parse(GT_FAIL).unwrap();
        assert_eq!(assertion.comparison, Comparison::Gt);
        assert_eq!(assertion.threshold, 100);
        assert_eq!(assertion.action, Action::Fail);
        assert_eq!(assertion.filter_attribute, "schema");
        assert_eq!(assertion.filter_value, "Person");
    }

    #[test]
    fn test_display() {
        let assertion = parse(GT_FAIL).unwrap();
        assert_eq!(assertion.to_string(), "GT 100 filter: schema=Person");
    }

    #[test]
    fn test_gt_fail_violation_aborts() {
        let assertion = parse(GT_FAIL).unwrap();
        let err = assertion.evaluate(150).unwrap_err();
        assert!(err.is_assertion_failure());
        assert!(matches!(err, AppError::AssertionFailed { observed: 150, .. }));
    }

    #[test]
    fn test_gt_fail_within_bounds() {
        let assertion = parse(GT_FAIL).unwrap();
        assert_eq!(assertion.evaluate(50).unwrap(), AssertionOutcome::Passed);
        assert_eq!(assertion.evaluate(100).unwrap(), AssertionOutcome::Passed);
    }

    #[test]
    fn test_lt_warn_continues() {
        let assertion = Assertion::new(Comparison::Lt, 10, Action::Warn, "schema", "Company");
        assert_eq!(assertion.evaluate(3).unwrap(), AssertionOutcome::Warned);
        assert_eq!(assertion.evaluate(10).unwrap(), AssertionOutcome::Passed);
    }

    #[test]
    fn test_float_threshold_coerced() {
        let assertion = parse(
            r#"
            comparison = "LT"
            threshold = 10.9
            action = "WARN"
            filter = { attribute = "country", value = "ru" }
            "#,
        )
        .unwrap();
        assert_eq!(assertion.threshold, 10);
    }

    #[test]
    fn test_negative_threshold() {
        let assertion = Assertion::new(Comparison::Gt, -1, Action::Fail, "schema", "X");
        assert!(assertion.is_violated(0));
    }

    #[test]
    fn test_rejects_unknown_comparison() {
        let err = parse(&GT_FAIL.replace("\"GT\"", "\"GTE\"")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_rejects_lowercase_literals() {
        assert!(parse(&GT_FAIL.replace("\"GT\"", "\"gt\"")).is_err());
        assert!(parse(&GT_FAIL.replace("\"FAIL\"", "\"fail\"")).is_err());
    }

    #[test]
    fn test_rejects_unknown_action() {
        let err = parse(&GT_FAIL.replace("\"FAIL\"", "\"ABORT\"")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_rejects_string_threshold() {
        let err = parse(&GT_FAIL.replace("100", "\"100\"")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_rejects_missing_keys() {
        assert!(parse(r#"comparison = "GT""#).is_err());
        let no_filter = r#"
            comparison = "GT"
            threshold = 1
            action = "WARN"
        "#;
        assert!(parse(no_filter).is_err());
        let no_value = r#"
            comparison = "GT"
            threshold = 1
            action = "WARN"
            filter = { attribute = "schema" }
        "#;
        assert!(parse(no_value).is_err());
    }

    #[test]
    fn test_rejects_non_table() {
        assert!(Assertion::from_config(&Value::Integer(3)).is_err());
        assert!(Assertion::try_from(&Value::String("GT".into())).is_err());
    }
}
