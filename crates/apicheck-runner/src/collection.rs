//! Sequential collection runner
//!
//! One step at a time: pre-request script, send, test script. The next-step
//! pointer set by the scripts is read only after the test script returns.

use std::collections::HashSet;

use apicheck_core::{
    CheckResult, Config, NextStep, Response, RunReport, Session, StepReport, TestResult,
    TraceLevel,
};

use crate::transport::{RequestSpec, Transport};

/// Script run before the request is sent
pub type PreRequestScript<'a> = Box<dyn FnMut(&mut Session) -> CheckResult + 'a>;

/// Script run against the response
pub type TestScript<'a> = Box<dyn FnMut(&Response, &mut Session) -> CheckResult + 'a>;

/// A request with its scripts
pub struct Step<'a> {
    pub request: RequestSpec,
    pre_request: Option<PreRequestScript<'a>>,
    tests: Option<TestScript<'a>>,
}

impl<'a> Step<'a> {
    #[must_use]
    pub fn new(request: RequestSpec) -> Self {
        Self {
            request,
            pre_request: None,
            tests: None,
        }
    }

    #[must_use]
    pub fn pre_request(mut self, script: impl FnMut(&mut Session) -> CheckResult + 'a) -> Self {
        self.pre_request = Some(Box::new(script));
        self
    }

    #[must_use]
    pub fn tests(
        mut self,
        script: impl FnMut(&Response, &mut Session) -> CheckResult + 'a,
    ) -> Self {
        self.tests = Some(Box::new(script));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.request.name
    }
}

/// Ordered steps with unique names
#[derive(Default)]
pub struct Collection<'a> {
    steps: Vec<Step<'a>>,
}

impl<'a> Collection<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn step(mut self, step: Step<'a>) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.name() == name)
    }

    fn check_unique_names(&self) -> Result<(), RunnerError> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.name()) {
                return Err(RunnerError::DuplicateStep(step.name().to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Collection has no steps")]
    Empty,
    #[error("Duplicate request name '{0}'")]
    DuplicateStep(String),
}

/// Runs a collection against a transport
pub struct CollectionRunner<T> {
    transport: T,
    /// Upper bound on executed steps (jumps can revisit steps)
    max_iterations: u32,
}

impl<T: Transport> CollectionRunner<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            max_iterations: Config::default().max_iterations,
        }
    }

    #[must_use]
    pub fn from_config(transport: T, config: &Config) -> Self {
        Self {
            transport,
            max_iterations: config.max_iterations,
        }
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Run every step in order, honouring skip/stop requests.
    ///
    /// # Errors
    ///
    /// Returns error if the collection is empty or has duplicate step names.
    pub fn run(
        &self,
        collection: &mut Collection<'_>,
        session: &mut Session,
    ) -> Result<RunReport, RunnerError> {
        if collection.is_empty() {
            return Err(RunnerError::Empty);
        }
        collection.check_unique_names()?;

        let mut report = RunReport::default();
        let mut index = 0;
        let mut executed: u32 = 0;

        while index < collection.steps.len() {
            if executed >= self.max_iterations {
                report.errors.push(format!(
                    "Stopped after {} steps (max_iterations)",
                    self.max_iterations
                ));
                report.stopped_early = true;
                break;
            }
            executed += 1;

            let step = &mut collection.steps[index];
            let step_report = self.execute_step(step, session);
            session.log(
                &format!(
                    "{}: {} tests, {} failed",
                    step_report.name,
                    step_report.tests.len(),
                    step_report.failed_tests()
                ),
                TraceLevel::MINIMAL,
            );
            report.push(step_report);

            match session.take_next_step() {
                NextStep::Continue => index += 1,
                NextStep::Stop => {
                    report.stopped_early = true;
                    break;
                }
                NextStep::Jump(target) => match collection.position(&target) {
                    Some(next) => index = next,
                    None => {
                        report
                            .errors
                            .push(format!("Unknown request '{target}' requested as next step"));
                        report.stopped_early = true;
                        break;
                    }
                },
            }
        }

        if report.stopped_early {
            session.log("Stopped early", TraceLevel::MINIMAL);
        }
        Ok(report)
    }

    fn execute_step(&self, step: &mut Step<'_>, session: &mut Session) -> StepReport {
        let name = step.request.name.clone();
        session.set_request_name(name.clone());
        session.take_next_step();

        if let Some(script) = step.pre_request.as_mut() {
            if let Err(err) = script(session) {
                session.record(TestResult::fail(
                    format!("{name} - pre-request script"),
                    err.to_string(),
                ));
            }
        }

        let request = step.request.resolve(session.variables());
        match self.transport.send(&request) {
            Ok(response) => {
                if let Some(script) = step.tests.as_mut() {
                    if let Err(err) = script(&response, session) {
                        session.record(TestResult::fail(
                            format!("{name} - test script"),
                            err.to_string(),
                        ));
                    }
                }
                StepReport {
                    name,
                    status_code: Some(response.status_code),
                    latency_ms: response.latency_ms,
                    tests: session.take_results(),
                    error: None,
                }
            }
            Err(err) => {
                log::warn!("{name}: {err}");
                StepReport {
                    name,
                    status_code: None,
                    latency_ms: 0,
                    tests: session.take_results(),
                    error: Some(err.to_string()),
                }
            }
        }
    }
}
