use anyhow::{Context, Result};
use std::env;
use std::io;
use std::process::ExitCode;
use testrig_config::{ConfigLoader, Registry};

mod cli;
mod config;
mod runner;
mod testing;

use config::RunContext;
use runner::Runner;
use testing::ProcessEngine;

/// Install a stderr subscriber when `TESTRIG_LOG` or `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let directives = match env::var("TESTRIG_LOG").or_else(|_| env::var("RUST_LOG")) {
        Ok(directives) => directives,
        Err(_) => return,
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();
}

/// Resolve the configuration and run the suite. Returns whether it passed.
fn run(context: &mut RunContext) -> Result<bool> {
    let cwd = env::current_dir().context("cannot determine the current directory")?;

    let mut registry = Registry::new();
    let project = ConfigLoader::new()
        .load(&mut registry, &cwd)
        .context("failed to load configuration")?;

    let mut builder = cli::parse(&registry, context, env::args_os())?;
    builder.apply_environment_defaults();
    colored::control::set_override(context.ansi);

    let mut runner = Runner::new(builder.build(), context);
    runner.setup_load_path(&project);
    let tally = runner.run(&mut ProcessEngine::new(), io::stdout())?;
    Ok(tally.is_success())
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let mut context = RunContext::from_env();

    match run(&mut context) {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => Ok(ExitCode::FAILURE),
        Err(e) => {
            // Help and version exit 0, usage errors exit 2
            if let Some(usage) = e.downcast_ref::<clap::Error>() {
                usage.exit();
            }
            if context.debug {
                return Err(e);
            }
            eprintln!("ERROR: {e:#}");
            Ok(ExitCode::FAILURE)
        }
    }
}
