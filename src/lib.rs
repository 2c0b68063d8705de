//! limit-call: run external commands under CPU time and memory limits
//!
//! Each call logs its settings and a shell-escaped, copy-pasteable command
//! line, optionally redirects stdin from a file, installs `setrlimit` caps in
//! the child before exec and reports how the child exited. If limits are
//! requested on a host that cannot enforce them, nothing is spawned.
//!
//! # Modules
//!
//! - **execution**: Invocations and the executor
//! - **resources**: Limit units, rlimit hooks and limit budgets
//! - **capabilities**: Detection of resource-limit support
//! - **logging**: Settings lines and log sinks
//! - **utils**: Shell escaping for display
//!
//! # Example
//!
//! ```ignore
//! use limit_call::{Invocation, Executor};
//!
//! let invocation = Invocation::new("search", ["downward", "--alias", "lama-first"])
//!     .with_time_limit_str("30m")?
//!     .with_memory_limit_str("2G")?;
//!
//! match Executor::default().try_call(&invocation) {
//!     Ok(()) => println!("done"),
//!     Err(e) if e.child_ran() => println!("planner failed: {}", e),
//!     Err(e) => return Err(e),
//! }
//! ```

pub mod capabilities;
pub mod errors;
pub mod execution;
pub mod logging;
pub mod resources;
pub mod utils;

pub use capabilities::{can_set_limits, LimitCapabilities};
pub use errors::{CallError, Result, LIMITS_UNSUPPORTED_MSG};
pub use execution::{run, Executor, Invocation};
pub use logging::{log_settings, CallLog, LogSink, MemoryLog};
pub use resources::{
    to_bytes, to_megabytes, LimitSpec, MemoryLimit, MemoryUnit, ResourceLimiter, RlimitLimiter,
    TimeLimit, UnsupportedLimiter,
};
pub use utils::{escape_command, shell_escape};
