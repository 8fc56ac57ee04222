//! apicheck-core: Assertion and flow helpers for HTTP API tests
//!
//! Checks run against a [`Response`] snapshot and report through
//! [`CheckResult`]. A [`Session`] carries the run-scoped state: variables,
//! trace level, once flags, recorded results and the next-step pointer.

pub mod config;
pub mod envelope;
pub mod error;
pub mod flow;
pub mod hooks;
pub mod property;
pub mod report;
pub mod response;
pub mod service_code;
pub mod session;
pub mod shape;
pub mod trace;
pub mod variables;

pub use config::{Config, ConfigError};
pub use envelope::{OnError, Test, Validate};
pub use error::{BodyKind, CheckError, CheckResult, ensure};
pub use flow::NextStep;
pub use hooks::{Hook, HookKind};
pub use property::Case;
pub use report::{RunReport, StepReport, TestResult};
pub use response::{ProblemDetails, Response};
pub use service_code::ServiceCode;
pub use session::Session;
pub use shape::Cardinality;
pub use trace::{LogSink, MemorySink, TraceLevel, TraceSink, Tracer};
pub use variables::Variables;
