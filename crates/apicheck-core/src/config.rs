//! Project configuration for API checks

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::service_code::DEFAULT_PROPERTY;
use crate::trace::TraceLevel;

/// Project configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL prepended to relative request paths
    pub base_url: String,

    /// HTTP headers sent with every request (auth, API keys)
    pub headers: HashMap<String, String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Expected status of a positive test when none is given
    pub positive_status: u16,

    /// Expected status of a negative test when none is given
    pub negative_status: u16,

    /// Property holding the application error code in error bodies
    pub service_code_property: String,

    /// Trace level used when the session store holds none
    pub trace_level: i64,

    /// Session variable that stores the current trace level
    pub trace_variable: String,

    /// Upper bound on executed steps per run (guards jump loops)
    pub max_iterations: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            headers: HashMap::new(),
            timeout_secs: 10,
            positive_status: 200,
            negative_status: 400,
            service_code_property: DEFAULT_PROPERTY.to_string(),
            trace_level: TraceLevel::DEFAULT.0,
            trace_variable: "traceLevel".to_string(),
            max_iterations: 1000,
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.apicheck.toml)
    ///
    /// # Errors
    ///
    /// Returns error if a candidate file exists but cannot be read or parsed
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load the first default candidate found in `dir`, or defaults.
    ///
    /// # Errors
    ///
    /// Returns error if a candidate file exists but cannot be read or parsed
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let candidates = [".apicheck.toml", ".apicheck.json", "apicheck.toml"];

        for name in candidates {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        Ok(Self::default())
    }

    /// Trace level from config as a typed level
    #[must_use]
    pub const fn default_trace_level(&self) -> TraceLevel {
        TraceLevel(self.trace_level)
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# apicheck configuration

# Server under test
base_url = "http://localhost:8080"
timeout_secs = 10

# Expected status codes when a test does not name one
positive_status = 200
negative_status = 400

# Property carrying the application error code in problem-details bodies
service_code_property = "serviceCode"

# Trace output: 0 = none, 1 = minimal, 2 = default
trace_level = 2
# trace_variable = "traceLevel"

# Guard against skip/jump loops
# max_iterations = 1000

# HTTP headers (auth, api keys)
[headers]
Authorization = "Bearer your-token-here"
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}
