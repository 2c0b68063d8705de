//! Resource limits: units, rlimit hooks and budgets

pub mod budget;
pub mod rlimit;
pub mod units;

pub use budget::{effective_memory_limit, effective_time_limit, elapsed_cpu_time};
pub use rlimit::{LimitSpec, ResourceLimiter, RlimitLimiter, UnsupportedLimiter};
pub use units::{to_bytes, to_megabytes, MemoryLimit, MemoryUnit, TimeLimit};
