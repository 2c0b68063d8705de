//! Combining per-call limits with an overall budget
//!
//! A caller running several commands in sequence often has a limit for the
//! whole run as well as one per command. These helpers pick the tighter of
//! the two, and for memory also respect whatever limit this process has
//! already inherited from its parent.

use crate::errors::{CallError, Result};
use std::time::Duration;

/// Lowest of the component limit, the overall limit and the inherited
/// `RLIMIT_AS` of this process. `None` when none of them is set.
pub fn effective_memory_limit(component: Option<u64>, overall: Option<u64>) -> Option<u64> {
    [component, overall, inherited_memory_limit()]
        .into_iter()
        .flatten()
        .min()
}

/// Smaller of the component limit and what is left of the overall budget
/// after `elapsed`. The result may be zero when the budget is spent.
pub fn effective_time_limit(
    component: Option<Duration>,
    overall: Option<Duration>,
    elapsed: Duration,
) -> Option<Duration> {
    let remaining = overall.map(|total| total.saturating_sub(elapsed));
    match (component, remaining) {
        (Some(c), Some(r)) => Some(c.min(r)),
        (c, r) => c.or(r),
    }
}

/// CPU time (user + system) consumed so far by this process and its reaped
/// children.
#[cfg(unix)]
pub fn elapsed_cpu_time() -> Result<Duration> {
    use nix::sys::resource::{getrusage, UsageWho};

    let mut total = Duration::ZERO;
    for who in [UsageWho::RUSAGE_SELF, UsageWho::RUSAGE_CHILDREN] {
        let usage = getrusage(who).map_err(|e| {
            CallError::InvalidLimitValue(format!("cannot measure elapsed time: {}", e))
        })?;
        total += timeval_to_duration(usage.user_time()) + timeval_to_duration(usage.system_time());
    }
    Ok(total)
}

#[cfg(not(unix))]
pub fn elapsed_cpu_time() -> Result<Duration> {
    Err(CallError::LimitsUnsupported)
}

#[cfg(unix)]
fn timeval_to_duration(tv: nix::sys::time::TimeVal) -> Duration {
    let secs = u64::try_from(tv.tv_sec()).unwrap_or(0);
    let micros = u64::try_from(tv.tv_usec()).unwrap_or(0);
    Duration::from_secs(secs) + Duration::from_micros(micros)
}

/// Soft `RLIMIT_AS` if finite, else the hard one, else `None`.
#[cfg(unix)]
fn inherited_memory_limit() -> Option<u64> {
    use nix::sys::resource::{getrlimit, Resource};

    let (soft, hard) = getrlimit(Resource::RLIMIT_AS).ok()?;
    [soft, hard]
        .into_iter()
        .find(|&limit| limit != libc::RLIM_INFINITY)
}

#[cfg(not(unix))]
fn inherited_memory_limit() -> Option<u64> {
    None
}
