//! A named command with optional stdin redirection and limits

use crate::errors::{CallError, Result};
use crate::resources::rlimit::LimitSpec;
use crate::resources::units::{MemoryLimit, TimeLimit};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One command to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Invocation {
    /// Label used in log lines
    pub name: String,
    /// Program followed by its arguments
    pub argv: Vec<String>,
    /// File to redirect into the child's stdin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<PathBuf>,
    /// CPU time limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<TimeLimit>,
    /// Address space limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<MemoryLimit>,
}

impl Invocation {
    pub fn new<I, S>(name: &str, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            argv: argv.into_iter().map(Into::into).collect(),
            stdin: None,
            time_limit: None,
            memory_limit: None,
        }
    }

    pub fn with_stdin(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = Some(path.into());
        self
    }

    pub fn with_time_limit(mut self, limit: TimeLimit) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Set time limit from string (e.g., "30s", "5m")
    pub fn with_time_limit_str(self, s: &str) -> Result<Self> {
        Ok(self.with_time_limit(s.parse()?))
    }

    pub fn with_memory_limit(mut self, limit: MemoryLimit) -> Self {
        self.memory_limit = Some(limit);
        self
    }

    /// Set memory limit from string (e.g., "512M", "2G")
    pub fn with_memory_limit_str(self, s: &str) -> Result<Self> {
        Ok(self.with_memory_limit(s.parse()?))
    }

    /// Load an invocation from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let invocation: Self =
            serde_json::from_str(json).map_err(|e| CallError::Config(e.to_string()))?;
        invocation.validate()?;
        Ok(invocation)
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Check structural invariants and resolve the limits.
    pub fn validate(&self) -> Result<LimitSpec> {
        if self.name.is_empty() {
            return Err(CallError::InvalidInvocation(
                "name cannot be empty".to_string(),
            ));
        }
        if self.argv.is_empty() {
            return Err(CallError::InvalidInvocation(format!(
                "{}: command cannot be empty",
                self.name
            )));
        }
        LimitSpec::resolve(self.time_limit, self.memory_limit)
    }
}
