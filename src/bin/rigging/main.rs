//! Rigging CLI - a recipe-driven build orchestrator for CMake projects

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use rigging::builder::BuildInvocationError;
use rigging::ops::{EvaluationError, LoadOptions};
use rigging::util::diagnostic::{emit, suggestions};
use rigging::util::{Diagnostic, GlobalContext, Shell};

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("rigging=debug")
    } else if cli.quiet {
        EnvFilter::new("rigging=error")
    } else {
        EnvFilter::new("rigging=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::from_flags(cli.quiet, cli.verbose);

    if let Err(err) = run(cli, &shell) {
        std::process::exit(report(&err, &shell));
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let load = LoadOptions {
        recipe: cli.recipe,
        settings: cli.settings,
    };

    match cli.command {
        Commands::Version => commands::version::execute(&ctx, &load),
        Commands::Layout(args) => commands::layout::execute(&ctx, &load, args),
        Commands::Generate => commands::generate::execute(&ctx, &load, shell),
        Commands::Build(args) => commands::build::execute(&ctx, load, args, shell),
        Commands::Clean(args) => commands::clean::execute(&ctx, &load, args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error and pick the process exit code.
///
/// A failed backend phase has its captured output replayed verbatim and its
/// exit code propagated.
fn report(err: &anyhow::Error, shell: &Shell) -> i32 {
    let mut diag = Diagnostic::from_error(err);
    let mut code = 1;

    if let Some(EvaluationError::Invocation(
        failed @ BuildInvocationError::Failed { stdout, stderr, .. },
    )) = err.downcast_ref::<EvaluationError>()
    {
        replay(&mut io::stdout(), stdout);
        replay(&mut io::stderr(), stderr);
        if !shell.is_verbose() {
            diag = diag.with_suggestion(suggestions::BUILD_FAILED);
        }
        code = failed.exit_code().unwrap_or(1);
    }

    emit(&diag, shell.use_color());
    code
}

fn replay(out: &mut impl Write, bytes: &[u8]) {
    // Nowhere left to report a broken pipe.
    let _ = out.write_all(bytes).and_then(|()| out.flush());
}
