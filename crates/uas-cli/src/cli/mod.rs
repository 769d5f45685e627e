mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use uas_core::domain::UasError;

const BINARY_NAME: &str = "uas";

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let diagnostic = error.as_uas_error();
            eprintln!("{}", diagnostic.diagnostic_line());
            diagnostic.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once(BINARY_NAME.to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            init_tracing(cli.verbose);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

/// Logs go to stderr; `RUST_LOG` wins over the `--verbose` default.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when the CLI runs in-process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = BINARY_NAME,
    version,
    about = "Methane unit absorption spectrum generator"
)]
struct Cli {
    /// Log pipeline stages at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Create a unit absorption spectrum for the given scene and sensor header
    Generate(commands::GenerateArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Generate(args) => commands::run_generate_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(UasError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_uas_error(&self) -> UasError {
        match self {
            Self::Usage(message) => UasError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => UasError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BINARY_NAME, Cli, CliError, run};
    use clap::CommandFactory;

    #[test]
    fn command_reads_as_uas_generate() {
        let command = Cli::command();
        command.clone().debug_assert();
        assert_eq!(command.get_name(), BINARY_NAME);
        assert!(command.find_subcommand("generate").is_some());
    }

    #[test]
    fn help_exits_cleanly() {
        assert_eq!(run(["--help"]).expect("help"), 0);
        assert_eq!(run(["generate", "--help"]).expect("generate help"), 0);
    }

    #[test]
    fn missing_required_flags_are_usage_errors() {
        let error = run(["generate", "-z", "0"]).expect_err("missing flags");
        assert!(matches!(error, CliError::Usage(_)));
        let diagnostic = error.as_uas_error();
        assert_eq!(diagnostic.code(), "INPUT.CLI_USAGE");
        assert_eq!(diagnostic.exit_code(), 2);
    }

    #[test]
    fn unsupported_spline_order_is_rejected() {
        let error = run([
            "generate", "-z", "0", "-s", "200", "-g", "0", "-w", "0", "--order", "2", "--hdr",
            "scene.hdr",
        ])
        .expect_err("order 2");
        assert!(matches!(error, CliError::Usage(ref message) if message.contains("order")));
    }

    #[test]
    fn compute_errors_keep_their_exit_code() {
        let error = CliError::Compute(uas_core::domain::UasError::io_system(
            "IO.GRID_OPEN",
            "missing",
        ));
        assert_eq!(error.as_uas_error().exit_code(), 3);
        assert_eq!(
            CliError::Internal(anyhow::anyhow!("stdout closed"))
                .as_uas_error()
                .diagnostic_line(),
            "ERROR: [IO.CLI] stdout closed"
        );
    }
}
