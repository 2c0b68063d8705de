//! setrlimit-based limits for spawned children
//!
//! Limits are installed as a `pre_exec` hook and take effect in the child
//! after fork and before exec. The parent's own limits are never touched.

use crate::errors::{CallError, Result};
use crate::resources::units::{MemoryLimit, TimeLimit};
use log::debug;
use std::fmt;
use std::process::Command;

/// Resolved limits for one call, in the units the kernel expects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitSpec {
    /// CPU time in seconds (RLIMIT_CPU)
    pub cpu_seconds: Option<u64>,
    /// Address space size in bytes (RLIMIT_AS)
    pub memory_bytes: Option<u64>,
}

impl LimitSpec {
    pub fn resolve(time_limit: Option<TimeLimit>, memory_limit: Option<MemoryLimit>) -> Result<Self> {
        Ok(Self {
            cpu_seconds: time_limit.map(|t| t.cpu_seconds()),
            memory_bytes: memory_limit.map(|m| m.bytes()).transpose()?,
        })
    }

    /// Returns `true` if no limit is configured.
    pub fn is_empty(&self) -> bool {
        self.cpu_seconds.is_none() && self.memory_bytes.is_none()
    }
}

/// Something that can attach a [`LimitSpec`] to a command before it is spawned.
pub trait ResourceLimiter: fmt::Debug + Send + Sync {
    /// Whether limits can be enforced at all.
    fn can_set_limits(&self) -> bool;

    /// Attach `spec` to `command`. Only called with a non-empty spec.
    fn install(&self, command: &mut Command, spec: LimitSpec) -> Result<()>;
}

/// POSIX limiter: soft and hard limits are set to the same value so the
/// child cannot raise them again.
#[derive(Debug, Clone, Copy, Default)]
pub struct RlimitLimiter;

impl ResourceLimiter for RlimitLimiter {
    fn can_set_limits(&self) -> bool {
        crate::capabilities::can_set_limits()
    }

    #[cfg(unix)]
    fn install(&self, command: &mut Command, spec: LimitSpec) -> Result<()> {
        use std::os::unix::process::CommandExt;

        debug!(
            "Installing pre-exec limits: cpu={:?}s memory={:?} bytes",
            spec.cpu_seconds, spec.memory_bytes
        );

        // SAFETY: the hook runs between fork and exec. It only calls
        // setrlimit on Copy values and reports failures as raw OS errors,
        // so it neither allocates nor touches locks held by other threads.
        unsafe {
            command.pre_exec(move || apply_in_child(spec));
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn install(&self, _command: &mut Command, _spec: LimitSpec) -> Result<()> {
        Err(CallError::LimitsUnsupported)
    }
}

/// Limiter for hosts without resource-limit primitives.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedLimiter;

impl ResourceLimiter for UnsupportedLimiter {
    fn can_set_limits(&self) -> bool {
        false
    }

    fn install(&self, _command: &mut Command, _spec: LimitSpec) -> Result<()> {
        Err(CallError::LimitsUnsupported)
    }
}

/// Apply `spec` to the calling process. Meant for the child side of a fork.
#[cfg(unix)]
pub fn apply_in_child(spec: LimitSpec) -> std::io::Result<()> {
    use nix::sys::resource::{setrlimit, Resource};

    if let Some(cpu) = spec.cpu_seconds {
        setrlimit(Resource::RLIMIT_CPU, cpu, cpu)?;
    }
    if let Some(mem) = spec.memory_bytes {
        setrlimit(Resource::RLIMIT_AS, mem, mem)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::units::MemoryUnit;

    #[test]
    fn test_limit_spec_default() {
        let spec = LimitSpec::default();
        assert!(spec.is_empty());
        assert!(spec.cpu_seconds.is_none());
        assert!(spec.memory_bytes.is_none());
    }

    #[test]
    fn test_resolve_uses_unrounded_bytes() {
        let memory = MemoryLimit::new(1.5, MemoryUnit::Megabytes);
        let spec = LimitSpec::resolve(None, Some(memory)).unwrap();
        assert_eq!(spec.memory_bytes, Some(1536 * 1024));
        assert!(!spec.is_empty());
    }

    #[test]
    fn test_resolve_time_only() {
        let time = TimeLimit::from_secs_f64(2.5).unwrap();
        let spec = LimitSpec::resolve(Some(time), None).unwrap();
        assert_eq!(spec.cpu_seconds, Some(3));
        assert_eq!(spec.memory_bytes, None);
    }

    #[test]
    fn test_resolve_rejects_invalid_memory() {
        let memory = MemoryLimit::new(-1.0, MemoryUnit::Gigabytes);
        assert!(matches!(
            LimitSpec::resolve(None, Some(memory)),
            Err(CallError::InvalidLimitValue(_))
        ));
    }

    #[test]
    fn test_unsupported_limiter_refuses() {
        let limiter = UnsupportedLimiter;
        assert!(!limiter.can_set_limits());
        let mut command = Command::new("true");
        let spec = LimitSpec {
            cpu_seconds: Some(1),
            memory_bytes: None,
        };
        assert!(matches!(
            limiter.install(&mut command, spec),
            Err(CallError::LimitsUnsupported)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_spec_apply_succeeds() {
        assert!(apply_in_child(LimitSpec::default()).is_ok());
    }
}
