//! Error types for limited calls

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for limited calls
pub type Result<T> = std::result::Result<T, CallError>;

/// Fixed diagnostic printed when limits are requested but cannot be enforced.
pub const LIMITS_UNSUPPORTED_MSG: &str = "Resource limits cannot be set on this platform. \
     Therefore, running commands with time or memory limits is not possible.";

/// Errors that can occur while running a limited call
#[derive(Error, Debug)]
pub enum CallError {
    #[error("{}", LIMITS_UNSUPPORTED_MSG)]
    LimitsUnsupported,

    #[error("Invalid limit value: {0}")]
    InvalidLimitValue(String),

    #[error("Invalid invocation: {0}")]
    InvalidInvocation(String),

    #[error("Cannot open stdin file {}: {source}", path.display())]
    Stdin {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Process exited with code {code}")]
    NonZeroExit { code: i32 },

    #[error("Process killed by signal {}", signal_name(*signal))]
    Signaled { signal: i32 },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CallError {
    /// True when the child was started and then failed.
    pub fn child_ran(&self) -> bool {
        matches!(self, Self::NonZeroExit { .. } | Self::Signaled { .. })
    }

    /// Exit status a command-line front end should report for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NonZeroExit { code } => *code,
            Self::Signaled { signal } => 128 + signal,
            Self::Spawn { .. } => 127,
            _ => 1,
        }
    }
}

/// Symbolic name of a signal number, e.g. `SIGXCPU`.
#[cfg(unix)]
pub fn signal_name(signal: i32) -> String {
    nix::sys::signal::Signal::try_from(signal)
        .map(|sig| sig.as_str().to_string())
        .unwrap_or_else(|_| signal.to_string())
}

#[cfg(not(unix))]
pub fn signal_name(signal: i32) -> String {
    signal.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CallError::NonZeroExit { code: 3 };
        assert_eq!(err.to_string(), "Process exited with code 3");
    }

    #[test]
    fn test_unsupported_message_is_fixed() {
        assert_eq!(
            CallError::LimitsUnsupported.to_string(),
            LIMITS_UNSUPPORTED_MSG
        );
    }

    #[test]
    fn test_spawn_keeps_os_detail() {
        let err = CallError::Spawn {
            program: "missing".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert!(err.to_string().contains("missing"));
        assert!(err.to_string().contains("No such file"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_wait_error_is_not_a_spawn_error() {
        let err = CallError::Wait {
            program: "planner".to_string(),
            source: io::Error::from_raw_os_error(libc::ECHILD),
        };
        assert!(err.to_string().starts_with("Failed to wait for planner"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_child_ran_distinguishes_spawn_failures() {
        assert!(CallError::NonZeroExit { code: 1 }.child_ran());
        assert!(CallError::Signaled { signal: 9 }.child_ran());
        assert!(!CallError::LimitsUnsupported.child_ran());
        let spawn = CallError::Spawn {
            program: "x".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(!spawn.child_ran());
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_names() {
        assert_eq!(signal_name(libc::SIGKILL), "SIGKILL");
        assert_eq!(signal_name(libc::SIGXCPU), "SIGXCPU");
        assert_eq!(signal_name(4242), "4242");
        let err = CallError::Signaled {
            signal: libc::SIGXCPU,
        };
        assert_eq!(err.to_string(), "Process killed by signal SIGXCPU");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CallError::NonZeroExit { code: 4 }.exit_code(), 4);
        assert_eq!(CallError::Signaled { signal: 24 }.exit_code(), 152);
        assert_eq!(CallError::LimitsUnsupported.exit_code(), 1);
        assert_eq!(
            CallError::InvalidLimitValue("0".to_string()).exit_code(),
            1
        );
    }
}
