//! Shell command execution boundary
//!
//! Components never spawn processes themselves; every side-effecting command
//! goes through a [`CommandRunner`]. The runner only reports the exit status.
//! Whether a nonzero status is an error is decided by the failure policy in
//! the phase context, not here.

use crate::error::Result;
use crate::process_guard::{self, ChildRegistry, CommandLifecycle};
use std::process::Command;
use tracing::{debug, info, warn};

/// Exit status of a shell command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// Exit code, `None` if the command was terminated by a signal
    pub code: Option<i32>,
}

impl CommandStatus {
    pub const SUCCESS: Self = Self { code: Some(0) };

    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Abstraction for running shell command lines.
pub trait CommandRunner {
    /// Runs `command` through the shell and returns its exit status.
    ///
    /// # Errors
    ///
    /// Returns an error only when the command could not be spawned or
    /// waited on. A command that runs and fails is an `Ok` status.
    fn execute(&self, command: &str) -> Result<CommandStatus>;
}

/// Runs commands with `sh -c` on the host, inheriting stdio so the operator
/// sees package manager output. Each command leads its own process group.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellCommandRunner {
    dry_run: bool,
    attach_terminal: bool,
}

impl ShellCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner that logs every command and reports success without spawning
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    /// Hand the terminal's foreground to each command while it runs, so
    /// commands that prompt (certbot, debconf) can read from it
    pub fn attached_to_terminal(mut self) -> Self {
        self.attach_terminal = true;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

impl CommandRunner for ShellCommandRunner {
    fn execute(&self, command: &str) -> Result<CommandStatus> {
        if self.dry_run {
            info!("[dry-run] Executing {}", command);
            return Ok(CommandStatus::SUCCESS);
        }

        info!("Executing {}", command);

        let foreground = self.attach_terminal && process_guard::owns_terminal();
        let mut shell = Command::new("sh");
        shell.arg("-c").arg(command);
        if foreground {
            shell.in_foreground_process_group();
        } else {
            shell.in_new_process_group();
        }
        let mut child = shell.spawn()?;
        let pid = child.id();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.register(pid);
        }

        let waited = child.wait();

        if foreground {
            if let Err(e) = process_guard::reclaim_terminal() {
                warn!("Failed to take back the terminal: {}", e);
            }
        }

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.unregister(pid);
        }

        let status = waited?;
        debug!(command, code = ?status.code(), "command finished");

        Ok(CommandStatus {
            code: status.code(),
        })
    }
}
