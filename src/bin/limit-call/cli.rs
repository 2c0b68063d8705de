use clap::{Parser, Subcommand};
use limit_call::{MemoryLimit, TimeLimit};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "limit-call")]
#[command(version, about = "Run a command under CPU time and memory limits", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Direct execution
    limit-call --time-limit 30m --memory-limit 3584M -- downward --alias lama-first
    limit-call --name search --stdin output.sas -- downward --search 'astar(lmcut())'

    # Leave room for later steps of a longer run
    limit-call --time-limit 10m --overall-time-limit 30m -- ./translate.py domain.pddl

    # Using subcommands
    limit-call run --invocation call.json
    limit-call check
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Label used in log lines (defaults to the program name)
    #[arg(short, long, value_name = "NAME", global = true)]
    pub name: Option<String>,

    /// File to redirect into the command's stdin
    #[arg(long, value_name = "PATH", global = true)]
    pub stdin: Option<PathBuf>,

    /// CPU time limit (30, 30s, 5m, 1h)
    #[arg(short, long, value_name = "TIME", global = true)]
    pub time_limit: Option<TimeLimit>,

    /// Address space limit (512M, 2G)
    #[arg(short, long, value_name = "SIZE", global = true)]
    pub memory_limit: Option<MemoryLimit>,

    /// Time budget of the whole run; the command gets what is left of it
    #[arg(long, value_name = "TIME", global = true)]
    pub overall_time_limit: Option<TimeLimit>,

    /// Memory budget of the whole run
    #[arg(long, value_name = "SIZE", global = true)]
    pub overall_memory_limit: Option<MemoryLimit>,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Program and arguments
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub argv: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an invocation described in a JSON file
    Run {
        /// JSON file with name, argv, stdin, time_limit and memory_limit
        #[arg(short, long, value_name = "FILE")]
        invocation: PathBuf,
    },

    /// Check whether resource limits can be enforced on this host
    Check,
}
