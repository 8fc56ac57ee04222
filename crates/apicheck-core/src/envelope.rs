//! Positive, negative and neutral test envelopes
//!
//! Every envelope follows the same shape: log start, run the built-in check,
//! run the custom callback if the check passed, route any failure through the
//! error callback and the standard handler, record the result, log end.

use crate::error::{CheckError, CheckResult};
use crate::report::TestResult;
use crate::response::Response;
use crate::service_code::{ServiceCode, split_spec};
use crate::session::Session;
use crate::trace::TraceLevel;

/// Custom validation run after the built-in check passes
pub type Validate<'a> = Box<dyn FnOnce(&Response, &mut Session) -> CheckResult + 'a>;

/// Called with the failure before it is recorded; its own error is only logged
pub type OnError<'a> = Box<dyn FnOnce(&CheckError, &mut Session) -> CheckResult + 'a>;

/// Options shared by all envelopes
#[derive(Default)]
pub struct Test<'a> {
    name: Option<String>,
    suffix: Option<String>,
    status: Option<u16>,
    service_property: Option<String>,
    service_value: Option<String>,
    validate: Option<Validate<'a>>,
    on_error: Option<OnError<'a>>,
}

impl<'a> Test<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit name; otherwise the current request name is used.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Appended to the request name when no explicit name is set.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Expected status; defaults come from [`Config`](crate::Config).
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Expected application error code under `property` (negative tests).
    #[must_use]
    pub fn service_code(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.service_property = Some(property.into());
        self.service_value = Some(value.into());
        self
    }

    /// Expected application error code under the configured property.
    #[must_use]
    pub fn service_value(mut self, value: impl Into<String>) -> Self {
        self.service_value = Some(value.into());
        self
    }

    /// Expected application error code as `"value"`, `"name:value"` or `"name=value"`.
    ///
    /// An empty string disables the check; `"name:"` expects an empty value.
    #[must_use]
    pub fn service_code_spec(mut self, spec: &str) -> Self {
        let (property, value) = split_spec(spec);
        self.service_property = property.map(str::to_string);
        self.service_value = Some(value.to_string());
        self
    }

    #[must_use]
    pub fn validate(
        mut self,
        f: impl FnOnce(&Response, &mut Session) -> CheckResult + 'a,
    ) -> Self {
        self.validate = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_error(
        mut self,
        f: impl FnOnce(&CheckError, &mut Session) -> CheckResult + 'a,
    ) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

impl Session {
    /// Status must equal the expected success code (default 200).
    ///
    /// On mismatch the message carries the problem-details `detail` or
    /// `title` of the body, when there is one.
    pub fn positive(&mut self, response: &Response, test: Test<'_>) -> TestResult {
        let expected = test.status.unwrap_or(self.config.positive_status);
        let name = self.resolve_name(test.name.as_deref(), test.suffix.as_deref());
        let validate = test.validate;

        self.run_test(&name, "Positive", test.on_error, |session| {
            if response.status_code != expected {
                return Err(CheckError::Status {
                    expected,
                    actual: response.status_code,
                    problem: response
                        .problem()
                        .and_then(|p| p.summary().map(str::to_string)),
                });
            }
            if let Some(validate) = validate {
                validate(response, session)?;
            }
            Ok(())
        })
    }

    /// Status must equal the expected error code (default 400) and, when a
    /// service code is given, the body must carry it.
    pub fn negative(&mut self, response: &Response, test: Test<'_>) -> TestResult {
        let expected = test.status.unwrap_or(self.config.negative_status);
        let name = self.resolve_name(test.name.as_deref(), test.suffix.as_deref());
        let service_code = ServiceCode::from_parts(
            test.service_property.as_deref(),
            test.service_value.as_deref(),
            &self.config.service_code_property,
        );
        let validate = test.validate;

        self.run_test(&name, "Negative", test.on_error, |session| {
            if response.status_code != expected {
                return Err(CheckError::Status {
                    expected,
                    actual: response.status_code,
                    problem: None,
                });
            }
            if let Some(code) = &service_code {
                code.check(&response.json()?)?;
            }
            if let Some(validate) = validate {
                validate(response, session)?;
            }
            Ok(())
        })
    }

    /// No built-in check; wraps `validate` in the standard envelope.
    pub fn neutral(
        &mut self,
        response: &Response,
        test: Test<'_>,
        validate: impl FnOnce(&Response, &mut Session) -> CheckResult,
    ) -> TestResult {
        let name = self.resolve_name(test.name.as_deref(), test.suffix.as_deref());
        self.run_test(&name, "Neutral", test.on_error, |session| {
            validate(response, session)
        })
    }

    fn run_test(
        &mut self,
        name: &str,
        kind: &str,
        on_error: Option<OnError<'_>>,
        body: impl FnOnce(&mut Session) -> CheckResult,
    ) -> TestResult {
        self.log(&format!("{kind} test start: {name}"), TraceLevel::DEFAULT);
        let result = match self.guard(name, on_error, body) {
            Ok(()) => TestResult::pass(name),
            Err(err) => TestResult::fail(name, err.to_string()),
        };
        self.log(&format!("{kind} test end: {name}"), TraceLevel::DEFAULT);
        self.record(result.clone());
        result
    }

    /// Run `body`; on failure run the error callback, then the standard handler.
    ///
    /// The callback's own failure is logged and never replaces `err`.
    pub(crate) fn guard(
        &mut self,
        name: &str,
        on_error: Option<OnError<'_>>,
        body: impl FnOnce(&mut Session) -> CheckResult,
    ) -> CheckResult {
        let Err(err) = body(self) else {
            return Ok(());
        };
        if let Some(on_error) = on_error {
            if let Err(handler_err) = on_error(&err, self) {
                self.log(
                    &format!("Error handler failed for {name}: {handler_err}"),
                    TraceLevel::MINIMAL,
                );
            }
        }
        self.log(&format!("FAILED {name}: {err}"), TraceLevel::MINIMAL);
        Err(err)
    }
}
