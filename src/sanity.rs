//! Pre-flight checks for the runtime environment
//!
//! - Running with root privileges (EUID 0)
//! - Required runtime binaries are present
//!
//! The privilege check runs before any prompt is shown.

use crate::error::{BootstrapError, Result};
use std::process::Command;

/// Required runtime binaries
const REQUIRED_BINARIES: &[&str] = &[
    "sh",        // Command execution
    "systemctl", // Service management
];

/// Result of environment verification
#[derive(Debug)]
pub struct SanityCheckResult {
    pub missing_binaries: Vec<String>,
    pub is_root: bool,
}

impl SanityCheckResult {
    pub fn is_ok(&self) -> bool {
        self.missing_binaries.is_empty() && self.is_root
    }
}

fn binary_exists(name: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {} >/dev/null 2>&1", name))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Check if running as root (EUID 0)
pub fn is_running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Fail with [`BootstrapError::Privilege`] unless running as root
pub fn require_root() -> Result<()> {
    if is_running_as_root() {
        Ok(())
    } else {
        Err(BootstrapError::Privilege)
    }
}

/// First word of the package install command, e.g. `apt`
pub fn package_manager_binary(package_install_command: &str) -> Option<&str> {
    package_install_command.split_whitespace().next()
}

/// Perform all sanity checks. `extra` names binaries this session needs on
/// top of the fixed list (the package manager).
pub fn verify_environment(extra: &[&str]) -> SanityCheckResult {
    let missing_binaries = REQUIRED_BINARIES
        .iter()
        .chain(extra.iter())
        .filter(|binary| !binary_exists(binary))
        .map(|binary| (*binary).to_string())
        .collect();

    SanityCheckResult {
        missing_binaries,
        is_root: is_running_as_root(),
    }
}
