//! Executes a resolved selection
//!
//! One pass, three steps, strictly sequential:
//!
//! 1. One package manager transaction for the union of all package
//!    dependencies (skipped when the union is empty)
//! 2. The install phase of every component, in selection order
//! 3. The run phase of every installed component, in the same order
//!
//! No install phase runs after a run phase has started. There is no rollback
//! and no retry. Failures follow the configured [`FailurePolicy`]: fail-fast
//! stops at the first one, continue records it in the [`ExecutionReport`] and
//! moves on. A component whose install failed has no run phase to run.
//! Fatal errors (closed input) stop the batch under either policy.

use crate::command_runner::CommandRunner;
use crate::component::{Component, PhaseContext, RunPhase};
use crate::config_file::Settings;
use crate::error::{BootstrapError, Result};
use crate::logic::resolver::{aggregate_packages, undeclared_dependencies};
use crate::prompt::Prompter;
use crate::types::FailurePolicy;
use strum::Display;
use tracing::{error, info, warn};

/// Label used for failures of the package transaction
pub const PACKAGES_STEP: &str = "packages";

/// Step of the pipeline a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Packages,
    Install,
    Run,
}

/// A failure that was tolerated under [`FailurePolicy::Continue`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub component: &'static str,
    pub phase: Phase,
    pub message: String,
}

/// What happened during one execution
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Packages passed to the package manager
    pub packages: Vec<String>,
    /// Components whose install phase completed, in order
    pub installed: Vec<&'static str>,
    /// Components whose run phase completed, in order
    pub ran: Vec<&'static str>,
    /// Tolerated failures, in the order they happened
    pub failures: Vec<Failure>,
}

impl ExecutionReport {
    pub fn record_failure(&mut self, component: &'static str, phase: Phase, message: String) {
        self.failures.push(Failure {
            component,
            phase,
            message,
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives the package, install and run steps for a selection
pub struct Executor<'a> {
    settings: &'a Settings,
    runner: &'a dyn CommandRunner,
}

impl<'a> Executor<'a> {
    pub fn new(settings: &'a Settings, runner: &'a dyn CommandRunner) -> Self {
        Self { settings, runner }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.settings.on_error
    }

    /// Execute `components` in order.
    ///
    /// # Errors
    ///
    /// Under fail-fast, the first command failure or phase error. Under
    /// either policy, fatal errors such as closed input.
    pub fn execute(
        &self,
        components: &[&dyn Component],
        prompter: &mut dyn Prompter,
    ) -> Result<ExecutionReport> {
        let mut report = ExecutionReport::default();

        for missing in undeclared_dependencies(components) {
            warn!(
                "{} declares a dependency on {}, which is not selected",
                missing.component, missing.requires
            );
        }

        self.install_packages(components, prompter, &mut report)?;

        let mut run_phases: Vec<(&'static str, Box<dyn RunPhase>)> =
            Vec::with_capacity(components.len());
        for component in components {
            let name = component.name();
            info!("Installing component {}", name);
            let outcome = {
                let mut ctx = self.context(prompter, &mut report, name, Phase::Install);
                component.install(&mut ctx)
            };
            match outcome {
                Ok(run) => {
                    report.installed.push(name);
                    run_phases.push((name, run));
                }
                Err(err) => self.tolerate(err, &mut report, name, Phase::Install)?,
            }
        }

        for (name, run) in run_phases {
            info!("Running component {}", name);
            let outcome = {
                let mut ctx = self.context(prompter, &mut report, name, Phase::Run);
                run.run(&mut ctx)
            };
            match outcome {
                Ok(()) => report.ran.push(name),
                Err(err) => self.tolerate(err, &mut report, name, Phase::Run)?,
            }
        }

        Ok(report)
    }

    fn install_packages(
        &self,
        components: &[&dyn Component],
        prompter: &mut dyn Prompter,
        report: &mut ExecutionReport,
    ) -> Result<()> {
        let packages = aggregate_packages(components);
        if packages.is_empty() {
            info!("No packages to install");
            return Ok(());
        }

        let command = self.settings.package_install_command_for(&packages);
        report.packages = packages.into_iter().collect();

        let outcome = {
            let mut ctx = self.context(prompter, report, PACKAGES_STEP, Phase::Packages);
            ctx.execute(&command)
        };
        match outcome {
            Ok(()) => Ok(()),
            Err(err) => self.tolerate(err, report, PACKAGES_STEP, Phase::Packages),
        }
    }

    fn context<'c>(
        &'c self,
        prompter: &'c mut dyn Prompter,
        report: &'c mut ExecutionReport,
        component: &'static str,
        phase: Phase,
    ) -> PhaseContext<'c> {
        PhaseContext::new(self.settings, self.runner, prompter, report, component, phase)
    }

    /// Apply the failure policy to a phase error
    fn tolerate(
        &self,
        err: BootstrapError,
        report: &mut ExecutionReport,
        component: &'static str,
        phase: Phase,
    ) -> Result<()> {
        if err.is_fatal() || self.policy().is_fail_fast() {
            error!(component, %phase, "{}", err);
            return Err(err);
        }

        error!(component, %phase, "{}; continuing", err);
        report.record_failure(component, phase, err.to_string());
        Ok(())
    }
}
