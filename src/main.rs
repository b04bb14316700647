//! servboot - main entry point
//!
//! Root check, settings, then one interactive session.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use servboot::cli::Cli;
use servboot::config_file::Settings;
use servboot::prompt::{LinePrompter, Prompter, TerminalPrompter};
use servboot::registry::Registry;
use servboot::session::{Presets, Session, SessionOutcome};
use servboot::{ShellCommandRunner, process_guard, sanity};

/// Initialize the tracing subscriber. Logs go to stderr so prompts on stdout
/// stay readable; RUST_LOG overrides the default level.
fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logger(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let registry = Registry::builtin();

    if cli.list {
        print_components(&registry);
        return Ok(());
    }

    sanity::require_root()?;
    info!("servboot starting up");

    if let Err(e) = process_guard::init_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
    }

    let settings = load_settings(&cli)?;
    debug!(?settings, "settings resolved");

    let package_manager = sanity::package_manager_binary(&settings.package_install_command)
        .map(|b| vec![b])
        .unwrap_or_default();
    let check = sanity::verify_environment(&package_manager);
    if !check.is_ok() {
        if settings.dry_run {
            warn!("Missing binaries (ignored in dry-run): {:?}", check.missing_binaries);
        } else {
            anyhow::bail!("Missing required binaries: {:?}", check.missing_binaries);
        }
    }

    let interactive = std::io::stdin().is_terminal();
    let runner = if settings.dry_run {
        ShellCommandRunner::dry_run()
    } else if interactive {
        ShellCommandRunner::new().attached_to_terminal()
    } else {
        ShellCommandRunner::new()
    };

    let presets = Presets {
        assume_yes: cli.yes,
        selection: cli.components.clone(),
    };
    let session = Session::new(&registry, &settings, &runner).with_presets(presets);

    let mut prompter: Box<dyn Prompter> = if interactive {
        Box::new(TerminalPrompter)
    } else {
        Box::new(LinePrompter::new(std::io::stdin().lock(), std::io::stdout()))
    };

    match session.run(prompter.as_mut())? {
        SessionOutcome::Declined => {}
        SessionOutcome::Completed(report) => {
            info!("Installed {:?}, ran {:?}", report.installed, report.ran);
            for failure in &report.failures {
                warn!("{} ({}): {}", failure.component, failure.phase, failure.message);
            }
            if report.is_clean() {
                info!("All done");
            } else {
                warn!("Finished with {} tolerated failure(s)", report.failures.len());
            }
        }
    }

    Ok(())
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let settings = match &cli.config {
        Some(path) => {
            info!("Loading settings from {:?}", path);
            Settings::load_from_file(path)?
        }
        None => Settings::default(),
    };

    let settings = cli.apply_to(settings);
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

fn print_components(registry: &Registry) {
    for component in registry.components() {
        println!("{}", component.name());
        println!("    {}", component.description());
        println!("    packages: {}", component.package_dependencies().join(" "));
    }
}
