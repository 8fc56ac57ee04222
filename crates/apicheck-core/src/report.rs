//! Test results and run reports
//!
//! Serializable so a run can be exported as JSON; the JSON Schema of
//! [`RunReport`] is generated with `schemars`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Outcome of one named test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    /// Failure message (absent on success)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TestResult {
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: None,
        }
    }

    #[must_use]
    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: Some(message.into()),
        }
    }
}

/// Everything recorded for one executed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StepReport {
    /// Request name
    pub name: String,
    /// Response status, absent when the request could not be sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub latency_ms: u64,
    /// Tests recorded by the pre-request and test scripts
    #[serde(default)]
    pub tests: Vec<TestResult>,
    /// Transport error, if the request failed to send
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    #[must_use]
    pub fn failed_tests(&self) -> usize {
        self.tests.iter().filter(|t| !t.passed).count()
    }
}

/// Aggregate of a collection run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunReport {
    pub steps: Vec<StepReport>,
    pub total_tests: u64,
    pub passed_tests: u64,
    pub failed_tests: u64,
    /// Run-level errors (transport failures, unknown jump targets)
    #[serde(default)]
    pub errors: Vec<String>,
    /// Whether a stop request or a run-level error ended the run early
    #[serde(default)]
    pub stopped_early: bool,
}

impl RunReport {
    /// Append a step and update the counters.
    pub fn push(&mut self, step: StepReport) {
        let failed = step.failed_tests() as u64;
        self.total_tests += step.tests.len() as u64;
        self.failed_tests += failed;
        self.passed_tests += step.tests.len() as u64 - failed;
        if let Some(err) = &step.error {
            self.errors.push(format!("{}: {err}", step.name));
        }
        self.steps.push(step);
    }

    /// PASS iff at least one test ran, none failed, and there were no errors.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.total_tests > 0 && self.failed_tests == 0 && self.errors.is_empty()
    }

    /// Human-readable summary for terminals.
    #[must_use]
    pub fn to_terminal(&self) -> String {
        let mut lines = Vec::new();

        for step in &self.steps {
            let status = step
                .status_code
                .map_or_else(|| "---".to_string(), |s| s.to_string());
            lines.push(format!("{} [{status}] {}ms", step.name, step.latency_ms));
            for test in &step.tests {
                match &test.message {
                    Some(msg) => lines.push(format!("  FAIL {}: {msg}", test.name)),
                    None => lines.push(format!("  PASS {}", test.name)),
                }
            }
            if let Some(err) = &step.error {
                lines.push(format!("  ERROR {err}"));
            }
        }

        lines.push(String::new());
        lines.push(format!(
            "{}: {} tests, {} passed, {} failed",
            if self.is_success() { "PASS" } else { "FAIL" },
            self.total_tests,
            self.passed_tests,
            self.failed_tests,
        ));
        if !self.errors.is_empty() {
            lines.push(format!("  {} errors", self.errors.len()));
        }
        if self.stopped_early {
            lines.push("  Stopped early".to_string());
        }

        lines.join("\n")
    }
}

/// JSON Schema of [`RunReport`], pretty-printed
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(RunReport);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
