mod args;
mod install;
mod package;
mod status;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use easygif_provision::config::TerminalFeatures;
use easygif_provision::{Output, Verbosity};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "easygif-setup")]
#[command(about = "Install and package the native binaries easygif needs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// More output (-v for details, -vv for debug logs)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download whatever is missing from the binaries directory (default)
    Install(install::InstallArgs),

    /// Show which binaries are present and where missing ones come from
    Status(status::StatusArgs),

    /// Copy a built artifact into place and write its .dfl sidecar
    Package(package::PackageArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli, terminal: TerminalFeatures, output: &Output) -> Result<i32> {
    match cli.command {
        Some(Commands::Install(args)) => install::execute(args, terminal, output),
        Some(Commands::Status(args)) => status::execute(args, terminal, output),
        Some(Commands::Package(args)) => package::execute(args, output),
        None => install::execute(install::InstallArgs::default(), terminal, output),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let terminal = TerminalFeatures::detect();
    let mut output = Output::new(terminal.ansi);
    output.set_verbosity(if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose > 0 {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    });

    match run(cli, terminal, &output) {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            output.error(&e.to_string());
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}
