use syncbench::{config::BenchConfig, report, Runner};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::{error, info};

/// Environment variable naming the config file when no argument is given
const CONFIG_ENV: &str = "SYNCBENCH_CONFIG";

const USAGE: &str = "\
Usage: syncbench [CONFIG.json]

Runs the contention and buffer reuse benchmark suite.

The config file may also be named by SYNCBENCH_CONFIG. Without one the
standard suite runs with default settings. Log verbosity follows RUST_LOG.

Options:
  -h, --help    Print this message";

/// What the command line asks for
#[derive(Debug, PartialEq)]
enum Invocation {
    /// Run the suite, optionally from a config file
    Run(Option<PathBuf>),
    /// Print usage and exit
    Help,
}

/// Interpret the first argument, falling back to the environment variable
fn parse_args(arg: Option<OsString>, env: Option<OsString>) -> anyhow::Result<Invocation> {
    let Some(arg) = arg else {
        return Ok(Invocation::Run(env.map(PathBuf::from)));
    };

    if let Some(flag) = arg.to_str() {
        if flag == "-h" || flag == "--help" {
            return Ok(Invocation::Help);
        }
        if flag.starts_with('-') {
            anyhow::bail!("unknown option '{}'\n\n{}", flag, USAGE);
        }
    }

    Ok(Invocation::Run(Some(PathBuf::from(arg))))
}

#[tokio::main]
async fn main() {
    // Initialize logging (INFO unless RUST_LOG says otherwise)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        error!("syncbench failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let path = match parse_args(std::env::args_os().nth(1), std::env::var_os(CONFIG_ENV))? {
        Invocation::Run(path) => path,
        Invocation::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
    };

    let config = BenchConfig::load(path.as_deref())?;
    info!(
        "syncbench starting: {} warm-up + {} samples per case, {} worker threads",
        config.warmup_runs,
        config.samples,
        num_cpus::get()
    );

    let output = config.output;
    let reports = Runner::new(config)?.run().await?;

    println!("{}", report::render(&reports, output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_flags() {
        assert_eq!(parse_args(Some("--help".into()), None).unwrap(), Invocation::Help);
        assert_eq!(parse_args(Some("-h".into()), None).unwrap(), Invocation::Help);
    }

    #[test]
    fn test_unknown_flag_is_rejected_with_usage() {
        let err = parse_args(Some("--samples".into()), None).unwrap_err();

        assert!(err.to_string().contains("unknown option '--samples'"));
        assert!(err.to_string().contains("Usage: syncbench"));
    }

    #[test]
    fn test_argument_wins_over_environment() {
        let invocation = parse_args(Some("suite.json".into()), Some("env.json".into())).unwrap();
        assert_eq!(invocation, Invocation::Run(Some(PathBuf::from("suite.json"))));
    }

    #[test]
    fn test_environment_and_defaults() {
        assert_eq!(
            parse_args(None, Some("env.json".into())).unwrap(),
            Invocation::Run(Some(PathBuf::from("env.json")))
        );
        assert_eq!(parse_args(None, None).unwrap(), Invocation::Run(None));
    }
}
