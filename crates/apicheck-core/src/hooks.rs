//! Folder hooks: run once per collection run, or on every request

use crate::envelope::OnError;
use crate::error::{CheckError, CheckResult};
use crate::report::TestResult;
use crate::session::Session;
use crate::trace::TraceLevel;

/// Where an always-hook is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    /// Folder test script
    Script,
    /// Per-request pre-request script
    PreRequest,
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Script => write!(f, "Script"),
            Self::PreRequest => write!(f, "Pre-request"),
        }
    }
}

/// Hook body with an optional error callback
pub struct Hook<'a> {
    body: Box<dyn FnOnce(&mut Session) -> CheckResult + 'a>,
    on_error: Option<OnError<'a>>,
}

impl<'a> Hook<'a> {
    #[must_use]
    pub fn new(body: impl FnOnce(&mut Session) -> CheckResult + 'a) -> Self {
        Self {
            body: Box::new(body),
            on_error: None,
        }
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
    /// Run `hook` the first time `name` is seen in this run.
    ///
    /// The flag is set before the body runs, so a failing body is not retried.
    /// A failure is recorded as a failed test; the hook owns it, so the return
    /// value only tells whether the body passed (or was skipped).
    pub fn run_once(&mut self, name: &str, hook: Hook<'_>) -> bool {
        if self.variables.has(name) {
            self.log(&format!("Run once skipped: {name}"), TraceLevel::VERBOSE);
            return true;
        }
        self.variables.set(name, true);
        self.log(&format!("Run once start: {name}"), TraceLevel::DEFAULT);
        if !self.run_hook(name, hook) {
            return false;
        }
        self.log(&format!("Run once end: {name}"), TraceLevel::DEFAULT);
        true
    }

    /// Run `hook` unconditionally; log lines are labelled with `kind`.
    ///
    /// Returns whether the body passed; a failure is recorded as a failed test.
    pub fn run_always(&mut self, kind: HookKind, hook: Hook<'_>) -> bool {
        let name = format!("{kind} {}", self.request_name);
        self.log(&format!("{kind} start: {}", self.request_name), TraceLevel::DEFAULT);
        if !self.run_hook(&name, hook) {
            return false;
        }
        self.log(&format!("{kind} end: {}", self.request_name), TraceLevel::DEFAULT);
        true
    }

    fn run_hook(&mut self, name: &str, hook: Hook<'_>) -> bool {
        let Hook { body, on_error } = hook;
        match self.guard(name, on_error, body) {
            Ok(()) => true,
            Err(err) => {
                self.record(TestResult::fail(name, err.to_string()));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::MemorySink;
    use std::cell::Cell;

    fn session() -> (Session, MemorySink) {
        let sink = MemorySink::new();
        let mut session = Session::default().with_sink(sink.clone());
        session.set_request_name("List orders");
        (session, sink)
    }

    #[test]
    fn once_runs_once_per_name() {
        let (mut session, _) = session();
        let runs = Cell::new(0);

        for _ in 0..2 {
            let passed = session.run_once(
                "orders-setup",
                Hook::new(|_| {
                    runs.set(runs.get() + 1);
                    Ok(())
                }),
            );
            assert!(passed);
        }
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn once_with_different_names_runs_both() {
        let (mut session, _) = session();
        let runs = Cell::new(0);

        for name in ["orders-setup", "users-setup"] {
            session.run_once(
                name,
                Hook::new(|_| {
                    runs.set(runs.get() + 1);
                    Ok(())
                }),
            );
        }
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn existing_flag_of_any_value_skips() {
        let (mut session, _) = session();
        session.variables_mut().set("setup", false);
        let ran = Cell::new(false);
        assert!(session.run_once(
            "setup",
            Hook::new(|_| {
                ran.set(true);
                Ok(())
            }),
        ));
        assert!(!ran.get());
    }

    #[test]
    fn once_failure_is_recorded_and_not_retried() {
        let (mut session, sink) = session();
        let handled = Cell::new(false);

        let passed = session.run_once(
            "seed",
            Hook::new(|_| Err(CheckError::custom("seed data rejected"))).on_error(|_, _| {
                handled.set(true);
                Ok(())
            }),
        );

        assert!(!passed);
        assert!(handled.get());
        assert!(sink.contains("FAILED seed: seed data rejected"));
        assert!(!sink.contains("Run once end: seed"));
        assert_eq!(
            session.results(),
            &[TestResult::fail("seed", "seed data rejected")]
        );

        assert!(session.run_once("seed", Hook::new(|_| Ok(()))));
        assert_eq!(session.results().len(), 1);
    }

    #[test]
    fn once_body_can_use_session() {
        let (mut session, _) = session();
        session.run_once(
            "auth",
            Hook::new(|s| {
                s.variables_mut().set("token", "abc");
                s.trace().set_minimal();
                Ok(())
            }),
        );
        assert_eq!(session.variables().get_str("token"), Some("abc"));
        assert_eq!(session.trace().level(), TraceLevel::MINIMAL);
    }

    #[test]
    fn always_runs_every_time_and_labels_kind() {
        let (mut session, sink) = session();
        let runs = Cell::new(0);

        for kind in [HookKind::PreRequest, HookKind::Script] {
            session.run_always(
                kind,
                Hook::new(|_| {
                    runs.set(runs.get() + 1);
                    Ok(())
                }),
            );
        }

        assert_eq!(runs.get(), 2);
        assert!(sink.contains("Pre-request start: List orders"));
        assert!(sink.contains("Script end: List orders"));
        assert!(session.results().is_empty());
    }

    #[test]
    fn always_failure_recorded_with_kind_in_name() {
        let (mut session, _) = session();
        let passed = session.run_always(
            HookKind::PreRequest,
            Hook::new(|_| Err(CheckError::custom("missing token"))),
        );
        assert!(!passed);
        assert_eq!(
            session.results(),
            &[TestResult::fail("Pre-request List orders", "missing token")]
        );
    }
}
