//! sparam CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or not found
//! - 3: Validation failure

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;

use commands::{Cli, CommandContext, Commands};
use config::CliConfig;
use sparam_format::SharedParamError;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let result = CliConfig::load(cli.config.as_deref()).and_then(|config| {
        let ctx = CommandContext {
            file: cli.file,
            config,
            quiet: cli.quiet,
        };
        run(&ctx, cli.command)
    });

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn run(ctx: &CommandContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Show(args) => commands::show::execute(ctx, args),
        Commands::List(args) => commands::list::execute(ctx, args),
        Commands::Validate(args) => commands::validate::execute(ctx, args),
        Commands::AddGroup(args) => commands::groups::add(ctx, args),
        Commands::RenameGroup(args) => commands::groups::rename(ctx, args),
        Commands::RemoveGroup(args) => commands::groups::remove(ctx, args),
        Commands::AddParam(args) => commands::params::add(ctx, args),
        Commands::UpdateParam(args) => commands::params::update(ctx, args),
        Commands::RemoveParam(args) => commands::params::remove(ctx, args),
        Commands::Export(args) => commands::export::execute(ctx, args),
        Commands::Init(args) => commands::init::execute(ctx, args),
        Commands::Find(args) => commands::find::execute(ctx, args),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_directive = if verbose {
        "sparam_cli=debug,sparam_format=debug"
    } else if quiet {
        "error"
    } else {
        "sparam_cli=info,warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(err) = e.downcast_ref::<SharedParamError>() {
        return match err {
            SharedParamError::Format { .. }
            | SharedParamError::Reference { .. }
            | SharedParamError::Duplicate { .. } => ExitCodes::VALIDATION_FAILURE,
            SharedParamError::NotFound(_) => ExitCodes::INVALID_ARGS,
            _ => ExitCodes::GENERAL_ERROR,
        };
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("validation") {
        ExitCodes::VALIDATION_FAILURE
    } else if msg.contains("argument") || msg.contains("not found") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
