use limit_call::resources::{effective_memory_limit, effective_time_limit, elapsed_cpu_time};
use limit_call::{CallError, Executor, Invocation, MemoryLimit, Result, TimeLimit};
use log::debug;
use std::path::{Path, PathBuf};

/// Configuration for one call from the command line
#[derive(Debug, Default)]
pub struct RunConfig {
    pub name: Option<String>,
    pub argv: Vec<String>,
    pub invocation_file: Option<PathBuf>,
    pub stdin: Option<PathBuf>,
    pub time_limit: Option<TimeLimit>,
    pub memory_limit: Option<MemoryLimit>,
    pub overall_time_limit: Option<TimeLimit>,
    pub overall_memory_limit: Option<MemoryLimit>,
}

/// Assemble the invocation: JSON file first, then command-line overrides,
/// then the overall budgets.
pub fn build_invocation(config: RunConfig) -> Result<Invocation> {
    let mut invocation = match config.invocation_file {
        Some(ref path) => load_invocation(path)?,
        None => {
            let name = match config.name {
                Some(ref name) => name.clone(),
                None => default_name(&config.argv)?,
            };
            Invocation::new(&name, config.argv.iter().cloned())
        }
    };

    if let Some(name) = config.name {
        invocation.name = name;
    }
    if config.stdin.is_some() {
        invocation.stdin = config.stdin;
    }
    if config.time_limit.is_some() {
        invocation.time_limit = config.time_limit;
    }
    if config.memory_limit.is_some() {
        invocation.memory_limit = config.memory_limit;
    }

    if let Some(overall) = config.overall_time_limit {
        let component = invocation.time_limit.map(|t| t.as_duration());
        let elapsed = elapsed_cpu_time()?;
        let remaining = effective_time_limit(component, Some(overall.as_duration()), elapsed);
        debug!("Time budget: {:?} used of {}", elapsed, overall);
        if let Some(remaining) = remaining {
            invocation.time_limit = Some(TimeLimit::from_duration(remaining).map_err(|_| {
                CallError::InvalidLimitValue(format!("overall time limit of {} is used up", overall))
            })?);
        }
    }

    if let Some(overall) = config.overall_memory_limit {
        let component = invocation.memory_limit.map(|m| m.bytes()).transpose()?;
        if let Some(bytes) = effective_memory_limit(component, Some(overall.bytes()?)) {
            invocation.memory_limit = Some(MemoryLimit::from_bytes(bytes));
        }
    }

    invocation.validate()?;
    Ok(invocation)
}

fn load_invocation(path: &Path) -> Result<Invocation> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        CallError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    Invocation::from_json(&json)
}

fn default_name(argv: &[String]) -> Result<String> {
    let program = argv
        .first()
        .ok_or_else(|| CallError::InvalidInvocation("No program specified".to_string()))?;
    Ok(Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.clone()))
}

/// Run the configured call; exits the process if limits are unsupported.
pub fn run_call(config: RunConfig) -> Result<()> {
    let invocation = build_invocation(config)?;
    Executor::default().check_call(&invocation)
}
