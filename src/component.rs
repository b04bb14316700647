//! Component model
//!
//! A component is a named installable unit: a static list of OS packages it
//! needs, an install phase, and a run phase. The run phase is produced by a
//! successful install, so anything the install phase asked the operator for
//! (a domain, a monitoring server) travels to the run phase as a typed value
//! and a run can never happen without its install.

use crate::command_runner::CommandRunner;
use crate::config_file::Settings;
use crate::error::{BootstrapError, Result};
use crate::executor::{ExecutionReport, Phase};
use crate::prompt::Prompter;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

/// A named installable unit.
///
/// Constructors must not perform I/O; only [`Component::install`] and the
/// returned [`RunPhase`] may touch the system.
pub trait Component {
    /// Registry name, matched against operator input by substring
    fn name(&self) -> &'static str;

    /// One-paragraph description shown by `--list`
    fn description(&self) -> &'static str;

    /// OS packages that must be installed before the install phase
    fn package_dependencies(&self) -> &'static [&'static str];

    /// Other components this one expects to be selected alongside it.
    ///
    /// Declared only: missing dependencies are reported, never pulled in.
    fn component_dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    /// Install the component and return what its run phase needs
    fn install(&self, ctx: &mut PhaseContext<'_>) -> Result<Box<dyn RunPhase>>;
}

/// Work left for after every selected component has been installed
pub trait RunPhase {
    fn run(&self, ctx: &mut PhaseContext<'_>) -> Result<()>;
}

/// Run phase of components that are done once installed
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRun;

impl RunPhase for NoRun {
    fn run(&self, _ctx: &mut PhaseContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Collaborators available to a component while one of its phases runs
pub struct PhaseContext<'a> {
    settings: &'a Settings,
    runner: &'a dyn CommandRunner,
    prompter: &'a mut dyn Prompter,
    report: &'a mut ExecutionReport,
    component: &'static str,
    phase: Phase,
}

impl<'a> PhaseContext<'a> {
    pub fn new(
        settings: &'a Settings,
        runner: &'a dyn CommandRunner,
        prompter: &'a mut dyn Prompter,
        report: &'a mut ExecutionReport,
        component: &'static str,
        phase: Phase,
    ) -> Self {
        Self {
            settings,
            runner,
            prompter,
            report,
            component,
            phase,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    /// Run a shell command and apply the failure policy to its exit status.
    ///
    /// Under fail-fast a nonzero status is returned as
    /// [`BootstrapError::CommandFailed`]; under continue it is logged,
    /// recorded in the report, and `Ok(())` is returned.
    pub fn execute(&mut self, command: &str) -> Result<()> {
        let status = self.runner.execute(command)?;
        if status.success() {
            return Ok(());
        }

        let err = BootstrapError::command_failed(command, status.code);
        if self.settings.on_error.is_fail_fast() {
            return Err(err);
        }

        warn!(component = self.component, phase = %self.phase, "{}", err);
        self.report
            .record_failure(self.component, self.phase, err.to_string());
        Ok(())
    }

    /// Ask the operator for a value, labeled with the component name
    pub fn ask(&mut self, message: &str) -> Result<String> {
        let prompt = format!("[INPUT {}] {}:", self.component, message);
        let answer = self.prompter.ask(&prompt)?;
        Ok(answer.trim().to_string())
    }

    /// Ask until the operator gives a non-empty answer
    pub fn ask_required(&mut self, message: &str) -> Result<String> {
        loop {
            let answer = self.ask(message)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            warn!(component = self.component, "A value is required for {:?}", message);
        }
    }

    /// Write `contents` to an absolute system path beneath the target root
    pub fn write_file(&mut self, path: impl AsRef<Path>, contents: &str) -> Result<()> {
        let target = self.settings.target_path(path);
        if self.settings.dry_run {
            info!("[dry-run] Writing {} ({} bytes)", target.display(), contents.len());
            return Ok(());
        }

        info!("Writing {}", target.display());
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, contents)?;
        Ok(())
    }

    /// Recursively copy `relative` from the assets directory to an absolute
    /// system path beneath the target root
    pub fn copy_asset_dir(&mut self, relative: &str, destination: impl AsRef<Path>) -> Result<()> {
        let assets = self.settings.assets_dir.as_ref().ok_or_else(|| {
            BootstrapError::config(format!(
                "{} needs the assets directory (first positional argument)",
                self.component
            ))
        })?;
        let source = assets.join(relative);
        if !source.is_dir() {
            return Err(BootstrapError::config(format!(
                "asset directory {} does not exist",
                source.display()
            )));
        }

        let target = self.settings.target_path(destination);
        if self.settings.dry_run {
            info!("[dry-run] Copying {} to {}", source.display(), target.display());
            return Ok(());
        }

        info!("Copying {} to {}", source.display(), target.display());
        for entry in WalkDir::new(&source) {
            let entry = entry.map_err(|e| {
                BootstrapError::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::other("filesystem loop while copying assets")
                }))
            })?;
            let relative = entry
                .path()
                .strip_prefix(&source)
                .map_err(|e| BootstrapError::component(self.component, e.to_string()))?;
            let dest = target.join(relative);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest)?;
            } else {
                fs::copy(entry.path(), &dest)?;
            }
        }
        Ok(())
    }
}
