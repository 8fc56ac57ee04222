//! Level-gated trace output
//!
//! The active level lives in the session's variable store so that scripts
//! can change it mid-run. A line requested at level `n` is emitted iff the
//! stored level is `>= n`.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::variables::Variables;

/// Trace verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TraceLevel(pub i64);

impl TraceLevel {
    pub const NONE: Self = Self(0);
    pub const MINIMAL: Self = Self(1);
    pub const DEFAULT: Self = Self(2);
    pub const VERBOSE: Self = Self(3);
    pub const ALL: Self = Self(i64::MAX);
}

impl std::fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Destination for emitted trace lines
pub trait TraceSink {
    fn emit(&mut self, level: TraceLevel, line: &str);
}

/// Forwards lines to the `log` facade under target `apicheck`
#[derive(Debug, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn emit(&mut self, level: TraceLevel, line: &str) {
        if level <= TraceLevel::MINIMAL {
            log::info!(target: "apicheck", "{line}");
        } else {
            log::debug!(target: "apicheck", "{line}");
        }
    }
}

/// Keeps emitted lines in memory; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Whether any emitted line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.contains(needle))
    }
}

impl TraceSink for MemorySink {
    fn emit(&mut self, _level: TraceLevel, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}

/// Reads the stored level and writes accepted lines to a sink
pub struct Tracer {
    variable: String,
    default: TraceLevel,
    sink: Box<dyn TraceSink>,
}

impl Tracer {
    #[must_use]
    pub fn new(variable: impl Into<String>, default: TraceLevel) -> Self {
        Self {
            variable: variable.into(),
            default,
            sink: Box::new(LogSink),
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Stored level; absent or non-numeric values fall back to the default.
    ///
    /// Fractional levels are floored. A negative level suppresses every line.
    #[must_use]
    pub fn level(&self, vars: &Variables) -> TraceLevel {
        vars.get(&self.variable)
            .and_then(|v| match v {
                Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(floor)),
                Value::String(s) => s.trim().parse::<f64>().ok().and_then(floor),
                _ => None,
            })
            .map_or(self.default, TraceLevel)
    }

    pub fn set(&self, vars: &mut Variables, level: TraceLevel) {
        vars.set(self.variable.clone(), level.0);
    }

    /// Emit `message` if the stored level admits `level`.
    pub fn log(&mut self, vars: &Variables, message: &str, level: TraceLevel) {
        if self.level(vars) >= level {
            self.sink.emit(level, message);
        }
    }
}

/// Floor a finite float to an `i64`, saturating at the bounds.
#[allow(clippy::cast_possible_truncation)]
fn floor(n: f64) -> Option<i64> {
    n.is_finite().then(|| n.floor() as i64)
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("variable", &self.variable)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// Borrowed view pairing a tracer with the store that holds its level
pub struct Trace<'a> {
    pub(crate) tracer: &'a mut Tracer,
    pub(crate) vars: &'a mut Variables,
}

impl Trace<'_> {
    pub fn set_none(&mut self) {
        self.set_custom(TraceLevel::NONE);
    }

    pub fn set_minimal(&mut self) {
        self.set_custom(TraceLevel::MINIMAL);
    }

    pub fn set_default(&mut self) {
        self.set_custom(TraceLevel::DEFAULT);
    }

    pub fn set_all(&mut self) {
        self.set_custom(TraceLevel::ALL);
    }

    pub fn set_custom(&mut self, level: TraceLevel) {
        self.tracer.set(self.vars, level);
    }

    #[must_use]
    pub fn level(&self) -> TraceLevel {
        self.tracer.level(&*self.vars)
    }

    pub fn log(&mut self, message: &str, level: TraceLevel) {
        self.tracer.log(&*self.vars, message, level);
    }
}
