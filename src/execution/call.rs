//! Running one invocation under its limits
//!
//! The call is synchronous: the calling thread blocks until the child exits.
//! Limits are enforced by the kernel inside the child; this side only sees
//! the final exit status.

use crate::capabilities::default_limiter;
use crate::errors::{CallError, Result, LIMITS_UNSUPPORTED_MSG};
use crate::execution::Invocation;
use crate::logging::{log_settings, CallLog, LogSink};
use crate::resources::rlimit::{LimitSpec, ResourceLimiter};
use crate::resources::units::{MemoryLimit, TimeLimit};
use log::debug;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;

/// Exit status of the host process when limits cannot be enforced
pub const UNSUPPORTED_EXIT_CODE: i32 = 1;

/// Runs invocations with a limiter and a log sink
#[derive(Debug, Clone)]
pub struct Executor {
    limiter: Arc<dyn ResourceLimiter>,
    log: Arc<dyn CallLog>,
}

impl Default for Executor {
    fn default() -> Self {
        Self {
            limiter: default_limiter(),
            log: Arc::new(LogSink),
        }
    }
}

impl Executor {
    pub fn new(limiter: Arc<dyn ResourceLimiter>, log: Arc<dyn CallLog>) -> Self {
        Self { limiter, log }
    }

    pub fn with_limiter(mut self, limiter: Arc<dyn ResourceLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_log(mut self, log: Arc<dyn CallLog>) -> Self {
        self.log = log;
        self
    }

    /// Run `invocation` and wait for it.
    ///
    /// Returns `Ok(())` only when the child exits with code 0. When limits
    /// are requested but the limiter cannot enforce them this returns
    /// [`CallError::LimitsUnsupported`] without spawning anything.
    pub fn try_call(&self, invocation: &Invocation) -> Result<()> {
        let spec = invocation.validate()?;
        log_settings(self.log.as_ref(), invocation)?;

        if !spec.is_empty() && !self.limiter.can_set_limits() {
            return Err(CallError::LimitsUnsupported);
        }

        let stdin = match invocation.stdin {
            Some(ref path) => Some(open_stdin(path)?),
            None => None,
        };

        let status = self.spawn_and_wait(invocation, spec, stdin)?;
        debug!("{} finished: {}", invocation.name, status);
        check_status(status)
    }

    /// Like [`try_call`](Self::try_call), but terminates the whole process
    /// when limits cannot be enforced.
    pub fn check_call(&self, invocation: &Invocation) -> Result<()> {
        match self.try_call(invocation) {
            Err(CallError::LimitsUnsupported) => abort_unsupported(),
            other => other,
        }
    }

    /// The command, and with it the stdin file, lives only inside this
    /// function, so the handle is closed on every return path.
    fn spawn_and_wait(
        &self,
        invocation: &Invocation,
        spec: LimitSpec,
        stdin: Option<File>,
    ) -> Result<ExitStatus> {
        let (program, args) = invocation.argv.split_first().ok_or_else(|| {
            CallError::InvalidInvocation(format!("{}: command cannot be empty", invocation.name))
        })?;

        let mut command = Command::new(program);
        command.args(args);

        if let Some(file) = stdin {
            command.stdin(Stdio::from(file));
        }

        if !spec.is_empty() {
            self.limiter.install(&mut command, spec)?;
        }

        // Keep our own output ordered before the child's.
        if let Err(e) = std::io::stdout().flush() {
            debug!("Flushing stdout before spawn failed: {}", e);
        }
        log::logger().flush();

        let mut child = command.spawn().map_err(|source| CallError::Spawn {
            program: program.clone(),
            source,
        })?;
        child.wait().map_err(|source| CallError::Wait {
            program: program.clone(),
            source,
        })
    }
}

/// Open the stdin file for reading; directories are rejected.
fn open_stdin(path: &Path) -> Result<File> {
    let stdin_error = |source| CallError::Stdin {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(stdin_error)?;
    if file.metadata().map_err(stdin_error)?.is_dir() {
        return Err(stdin_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "is a directory",
        )));
    }
    Ok(file)
}

fn check_status(status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    if let Some(code) = status.code() {
        return Err(CallError::NonZeroExit { code });
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(CallError::Signaled { signal });
        }
    }

    Err(CallError::NonZeroExit { code: 1 })
}

/// Print the fixed diagnostic and exit the process.
pub fn abort_unsupported() -> ! {
    eprintln!("{}", LIMITS_UNSUPPORTED_MSG);
    std::process::exit(UNSUPPORTED_EXIT_CODE)
}

/// Run `argv` under the given limits with the default executor.
///
/// Terminates the process if limits are requested on a host that cannot
/// enforce them.
pub fn run<S: AsRef<str>>(
    name: &str,
    argv: &[S],
    stdin: Option<&Path>,
    time_limit: Option<TimeLimit>,
    memory_limit: Option<MemoryLimit>,
) -> Result<()> {
    let mut invocation = Invocation::new(name, argv.iter().map(|s| s.as_ref().to_string()));
    invocation.stdin = stdin.map(Path::to_path_buf);
    invocation.time_limit = time_limit;
    invocation.memory_limit = memory_limit;

    Executor::default().check_call(&invocation)
}
