//! Execution layer: running a named command under resource limits
//!
//! # Examples
//!
//! ```ignore
//! use limit_call::execution::{Executor, Invocation};
//!
//! let invocation = Invocation::new("search", ["downward", "--alias", "lama-first"])
//!     .with_stdin("output.sas")
//!     .with_time_limit_str("30m")?
//!     .with_memory_limit_str("3584M")?;
//!
//! Executor::default().check_call(&invocation)?;
//! ```

pub mod call;
pub mod invocation;

pub use call::{abort_unsupported, run, Executor, UNSUPPORTED_EXIT_CODE};
pub use invocation::Invocation;
