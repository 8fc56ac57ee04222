//! Run-scoped context passed to every script
//!
//! Holds what the scripts share during one collection run: the variable
//! store (which also carries the trace level and once flags), the name of
//! the current request, the recorded test results and the next-step pointer.

use crate::config::Config;
use crate::flow::NextStep;
use crate::report::TestResult;
use crate::trace::{Trace, TraceLevel, TraceSink, Tracer};
use crate::variables::Variables;

/// Context shared by all scripts of a run
#[derive(Debug)]
pub struct Session {
    pub(crate) config: Config,
    pub(crate) variables: Variables,
    pub(crate) tracer: Tracer,
    pub(crate) request_name: String,
    pub(crate) results: Vec<TestResult>,
    pub(crate) next_step: NextStep,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Session {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let tracer = Tracer::new(config.trace_variable.clone(), config.default_trace_level());
        Self {
            config,
            variables: Variables::new(),
            tracer,
            request_name: String::new(),
            results: Vec::new(),
            next_step: NextStep::Continue,
        }
    }

    /// Route trace output to `sink` instead of the `log` facade.
    #[must_use]
    pub fn with_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.tracer = Tracer::new(
            self.config.trace_variable.clone(),
            self.config.default_trace_level(),
        )
        .with_sink(sink);
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }

    #[must_use]
    pub fn request_name(&self) -> &str {
        &self.request_name
    }

    /// Set the name of the request whose scripts run next.
    pub fn set_request_name(&mut self, name: impl Into<String>) {
        self.request_name = name.into();
    }

    /// Trace level controls.
    pub fn trace(&mut self) -> Trace<'_> {
        Trace {
            tracer: &mut self.tracer,
            vars: &mut self.variables,
        }
    }

    /// Emit `message` if the stored trace level admits `level`.
    pub fn log(&mut self, message: &str, level: TraceLevel) {
        self.tracer.log(&self.variables, message, level);
    }

    /// Test name: `explicit`, else the request name with an optional suffix.
    #[must_use]
    pub fn resolve_name(&self, explicit: Option<&str>, suffix: Option<&str>) -> String {
        resolve_name(explicit, &self.request_name, suffix)
    }

    pub fn record(&mut self, result: TestResult) {
        self.results.push(result);
    }

    #[must_use]
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Drain results recorded since the last call.
    pub fn take_results(&mut self) -> Vec<TestResult> {
        std::mem::take(&mut self.results)
    }
}

/// Resolve a test name.
///
/// An explicit, non-empty name wins. Otherwise the request name is used,
/// followed by `" - suffix"` when a non-empty suffix is given.
#[must_use]
pub fn resolve_name(explicit: Option<&str>, request: &str, suffix: Option<&str>) -> String {
    if let Some(name) = explicit.filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    match suffix.filter(|s| !s.is_empty()) {
        Some(suffix) => format!("{request} - {suffix}"),
        None => request.to_string(),
    }
}
