//! apicheck-runner: Sequential collection execution over HTTP

pub mod collection;
pub mod transport;

pub use collection::{Collection, CollectionRunner, PreRequestScript, RunnerError, Step, TestScript};
pub use transport::{HttpTransport, RequestBody, RequestSpec, Transport, TransportError};
