use console::style;
use env_logger::{Builder, Env};
use log::{Level, LevelFilter};
use std::io::Write;

fn default_level(verbose: bool, quiet: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    }
}

/// Initialize logger; `RUST_LOG` takes precedence over the flags
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = default_level(verbose, quiet);
    let env = Env::default().filter_or("RUST_LOG", level.as_str().to_lowercase());

    Builder::from_env(env)
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => format!("{}", style("ERROR").red().bold()),
                Level::Warn => format!("{}", style("WARN ").yellow().bold()),
                Level::Info => format!("{}", style("INFO ").green()),
                Level::Debug => format!("{}", style("DEBUG").cyan()),
                Level::Trace => format!("{}", style("TRACE").dim()),
            };
            writeln!(buf, "{} {}", level, record.args())
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_follows_flags() {
        assert_eq!(default_level(false, false), LevelFilter::Info);
        assert_eq!(default_level(true, false), LevelFilter::Debug);
        assert_eq!(default_level(false, true), LevelFilter::Warn);
    }
}
