//! limit-call - run a command under CPU time and memory limits

mod cli;
mod logging;
mod runner;

use clap::Parser;
use cli::{Cli, Commands};
use console::style;
use limit_call::capabilities::capabilities;
use runner::{run_call, RunConfig};

fn check_requirements() {
    let caps = capabilities();

    println!("Checking resource-limit support...\n");
    println!("{}", caps.summary());
    println!();

    if caps.can_set_limits() {
        println!("{}", style("Time and memory limits can be enforced").green());
    } else {
        println!("{}", style(limit_call::LIMITS_UNSUPPORTED_MSG).red());
    }
}

fn main() {
    let cli = Cli::parse();

    logging::init_logger(cli.verbose, cli.quiet);

    let invocation_file = match cli.command {
        Some(Commands::Check) => {
            check_requirements();
            return;
        }
        Some(Commands::Run { invocation }) => Some(invocation),
        None => None,
    };

    let config = RunConfig {
        name: cli.name,
        argv: cli.argv,
        invocation_file,
        stdin: cli.stdin,
        time_limit: cli.time_limit,
        memory_limit: cli.memory_limit,
        overall_time_limit: cli.overall_time_limit,
        overall_memory_limit: cli.overall_memory_limit,
    };

    if let Err(e) = run_call(config) {
        eprintln!("{} {}", style("error:").red().bold(), e);
        std::process::exit(e.exit_code());
    }
}
