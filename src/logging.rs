//! Invocation logging
//!
//! Settings are logged before anything is spawned so that an operator can see
//! what was intended even when the call aborts.

use crate::errors::Result;
use crate::execution::Invocation;
use crate::resources::units::to_megabytes;
use crate::utils::{escape_command, shell_escape};
use std::fmt;
use std::sync::Mutex;

/// Destination for invocation log lines
pub trait CallLog: fmt::Debug + Send + Sync {
    fn info(&self, line: &str);
}

/// Forwards lines to the `log` facade at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl CallLog for LogSink {
    fn info(&self, line: &str) {
        log::info!("{}", line);
    }
}

/// Keeps lines in memory
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines recorded so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

impl CallLog for MemoryLog {
    fn info(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(line.to_string());
    }
}

/// Render the settings lines of an invocation, in logging order.
pub fn settings_lines(invocation: &Invocation) -> Result<Vec<String>> {
    let name = &invocation.name;
    let stdin = invocation
        .stdin
        .as_ref()
        .map(|path| shell_escape(&path.to_string_lossy()));

    let time_limit = invocation
        .time_limit
        .map(|t| t.to_string())
        .unwrap_or_else(|| "none".to_string());

    let memory_limit = match to_megabytes(invocation.memory_limit)? {
        Some(mb) => format!("{} MB", mb.floor() as u64),
        None => "none".to_string(),
    };

    let mut command_line = escape_command(&invocation.argv);
    if let Some(ref path) = stdin {
        command_line.push_str(" < ");
        command_line.push_str(path);
    }

    Ok(vec![
        format!("{} stdin: {}", name, stdin.as_deref().unwrap_or("none")),
        format!("{} time limit: {}", name, time_limit),
        format!("{} memory limit: {}", name, memory_limit),
        format!("{} command line string: {}", name, command_line),
    ])
}

/// Log every setting of `invocation` and the escaped command line.
pub fn log_settings(sink: &dyn CallLog, invocation: &Invocation) -> Result<()> {
    for line in settings_lines(invocation)? {
        sink.info(&line);
    }
    Ok(())
}
