//! Skip/stop flow control
//!
//! Scripts only set a pointer; the runner reads it after the current script
//! returns and decides which request runs next.

use std::time::Duration;

use crate::session::Session;
use crate::trace::TraceLevel;

/// What the runner should do after the current request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NextStep {
    /// Run the following request
    #[default]
    Continue,
    /// Jump to the named request
    Jump(String),
    /// End the run
    Stop,
}

impl Session {
    /// Continue with the named request after this one.
    pub fn skip_to(&mut self, request: impl Into<String>) {
        let request = request.into();
        self.log(&format!("Next request: {request}"), TraceLevel::DEFAULT);
        self.next_step = NextStep::Jump(request);
    }

    pub fn skip_to_if(&mut self, condition: bool, request: impl Into<String>) {
        if condition {
            self.skip_to(request);
        }
    }

    /// End the run after this request.
    pub fn stop(&mut self) {
        self.log(
            &format!("Stopping run after {}", self.request_name),
            TraceLevel::MINIMAL,
        );
        self.next_step = NextStep::Stop;
    }

    pub fn stop_if(&mut self, condition: bool) {
        if condition {
            self.stop();
        }
    }

    #[must_use]
    pub fn next_step(&self) -> &NextStep {
        &self.next_step
    }

    /// Read and reset the pointer.
    pub fn take_next_step(&mut self) -> NextStep {
        std::mem::take(&mut self.next_step)
    }

    /// Block the current thread for `duration`.
    pub fn wait(&mut self, duration: Duration) {
        self.log(
            &format!("Waiting {} ms", duration.as_millis()),
            TraceLevel::DEFAULT,
        );
        std::thread::sleep(duration);
    }
}
