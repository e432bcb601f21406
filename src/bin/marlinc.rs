//! `marlinc check <path>`: analyze a file or directory and print its diagnostics.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use marlin::{Analysis, Frontend, FrontendConfig, FrontendResult};
use marlin_core::Fatality;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "marlinc", version, about = "Marlin compiler frontend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Tokenize, parse and resolve a program without generating code.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// A source file or a directory searched recursively.
    path: PathBuf,

    /// Standard library directory [default: $MARLIN_STDLIB, else `std` beside marlinc].
    #[arg(long)]
    stdlib: Option<PathBuf>,

    /// Also print informational diagnostics and debug logs.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Check(args) => check(args),
    }
}

fn check(args: CheckArgs) -> ExitCode {
    init_logging(args.verbose);

    match run_check(&args) {
        Ok(analysis) => {
            for diagnostic in &analysis.diagnostics {
                if args.verbose || diagnostic.fatality != Fatality::Information {
                    eprintln!("{diagnostic}");
                }
            }
            let code = analysis.result_code();
            eprintln!(
                "{} diagnostics, {} errors",
                analysis.diagnostics.len(),
                analysis.diagnostics.severe_count()
            );
            exit_code(code.exit_code())
        }
        Err(error) => {
            eprintln!("error: {error}");
            exit_code(error.exit_code())
        }
    }
}

fn run_check(args: &CheckArgs) -> FrontendResult<Analysis> {
    let mut config = FrontendConfig::new();
    if let Some(stdlib) = &args.stdlib {
        config = config.with_stdlib(stdlib);
    }
    Frontend::new(config).analyze_directory(&args.path)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX))
}
