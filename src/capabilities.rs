//! Runtime detection of resource-limit support
//!
//! Probes whether this host can cap CPU time and address space of a child
//! before it execs. The answer cannot change while the process runs, so it is
//! computed once and cached.

use crate::resources::rlimit::{ResourceLimiter, RlimitLimiter, UnsupportedLimiter};
use std::sync::{Arc, OnceLock};

/// Detected resource-limit capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitCapabilities {
    /// RLIMIT_CPU can be queried and set
    pub has_cpu_limit: bool,
    /// RLIMIT_AS can be queried and set
    pub has_address_space_limit: bool,
    /// Children can run a hook between fork and exec
    pub has_pre_exec: bool,
}

impl LimitCapabilities {
    /// Detect capabilities of the current host
    pub fn detect() -> Self {
        Self {
            has_cpu_limit: detect_cpu_limit(),
            has_address_space_limit: detect_address_space_limit(),
            has_pre_exec: cfg!(unix),
        }
    }

    /// Both limits can be installed on a not-yet-spawned child
    pub fn can_set_limits(&self) -> bool {
        self.has_pre_exec && self.has_cpu_limit && self.has_address_space_limit
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        let check = |available: bool| if available { "[ok]" } else { "[--]" };

        [
            format!("{} Pre-exec hooks", check(self.has_pre_exec)),
            format!("{} CPU time limit (RLIMIT_CPU)", check(self.has_cpu_limit)),
            format!(
                "{} Address space limit (RLIMIT_AS)",
                check(self.has_address_space_limit)
            ),
        ]
        .join("\n")
    }
}

/// Cached capabilities of this process
pub fn capabilities() -> LimitCapabilities {
    static CAPABILITIES: OnceLock<LimitCapabilities> = OnceLock::new();
    *CAPABILITIES.get_or_init(LimitCapabilities::detect)
}

/// Can this runtime install resource limits on a child before it execs?
pub fn can_set_limits() -> bool {
    capabilities().can_set_limits()
}

/// Limiter matching the host: [`RlimitLimiter`] when limits can be set,
/// [`UnsupportedLimiter`] otherwise.
pub fn default_limiter() -> Arc<dyn ResourceLimiter> {
    if can_set_limits() {
        Arc::new(RlimitLimiter)
    } else {
        Arc::new(UnsupportedLimiter)
    }
}

#[cfg(unix)]
fn detect_cpu_limit() -> bool {
    use nix::sys::resource::{getrlimit, Resource};
    getrlimit(Resource::RLIMIT_CPU).is_ok()
}

#[cfg(unix)]
fn detect_address_space_limit() -> bool {
    use nix::sys::resource::{getrlimit, Resource};
    getrlimit(Resource::RLIMIT_AS).is_ok()
}

#[cfg(not(unix))]
fn detect_cpu_limit() -> bool {
    false
}

#[cfg(not(unix))]
fn detect_address_space_limit() -> bool {
    false
}
