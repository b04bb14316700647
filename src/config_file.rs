//! Settings handling: defaults, optional JSON settings file, CLI overrides.
//!
//! Everything a component may consult besides operator answers lives here and
//! is passed explicitly into the executor. There is no process-wide working
//! directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::FailurePolicy;

/// Placeholder substituted with the space-separated package list
pub const PACKAGES_PLACEHOLDER: &str = "{packages}";

/// Default package install command (Debian/Ubuntu)
pub const DEFAULT_PACKAGE_INSTALL_COMMAND: &str = "apt install {packages} -y";

/// Runtime settings for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base directory for template/config assets (e.g. the `.vnc` directory)
    pub assets_dir: Option<PathBuf>,
    /// Root under which configuration files are written
    pub target_root: PathBuf,
    /// Failure policy for commands and component phases
    pub on_error: FailurePolicy,
    /// Log commands and skip writes instead of touching the system
    pub dry_run: bool,
    /// Command template used for the single batched package install
    pub package_install_command: String,
    /// Account that owns the VNC session; asked for interactively when unset
    pub desktop_user: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            assets_dir: None,
            target_root: PathBuf::from("/"),
            on_error: FailurePolicy::default(),
            dry_run: false,
            package_install_command: DEFAULT_PACKAGE_INSTALL_COMMAND.to_string(),
            desktop_user: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file; missing fields take their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {:?}", path.as_ref()))?;

        let settings: Self =
            serde_json::from_str(&content).context("Failed to parse settings JSON")?;

        Ok(settings)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if !self.package_install_command.contains(PACKAGES_PLACEHOLDER) {
            anyhow::bail!(
                "package_install_command must contain the {} placeholder",
                PACKAGES_PLACEHOLDER
            );
        }

        if !self.target_root.is_absolute() {
            anyhow::bail!(
                "target_root must be an absolute path, got {:?}",
                self.target_root
            );
        }

        if let Some(dir) = &self.assets_dir {
            if !dir.is_dir() {
                anyhow::bail!("Assets directory {:?} does not exist", dir);
            }
        }

        if let Some(user) = &self.desktop_user {
            if !is_valid_user_name(user) {
                anyhow::bail!("desktop_user {:?} is not a valid account name", user);
            }
        }

        Ok(())
    }

    /// Render the package install command for a set of packages
    pub fn package_install_command_for<'a, I>(&self, packages: I) -> String
    where
        I: IntoIterator<Item = &'a String>,
    {
        let joined = packages
            .into_iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        self.package_install_command
            .replace(PACKAGES_PLACEHOLDER, &joined)
    }

    /// Map an absolute system path beneath the target root
    pub fn target_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        let relative = path.strip_prefix("/").unwrap_or(path);
        self.target_root.join(relative)
    }
}

/// Whether `name` is a portable account name (`[a-z_][a-z0-9_-]*`, at most
/// 32 bytes). Names end up unquoted in shell commands and home paths.
pub fn is_valid_user_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && name.len() <= 32
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_defaults_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.on_error, FailurePolicy::FailFast);
        assert!(!settings.dry_run);
    }

    #[test]
    fn test_package_command_requires_placeholder() {
        let settings = Settings {
            package_install_command: "apt install -y".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_relative_target_root_rejected() {
        let settings = Settings {
            target_root: PathBuf::from("relative/root"),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_package_install_command_rendering() {
        let settings = Settings::default();
        let packages: BTreeSet<String> = ["nginx", "curl"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            settings.package_install_command_for(&packages),
            "apt install curl nginx -y"
        );
    }

    #[test]
    fn test_target_path_joins_under_root() {
        let settings = Settings {
            target_root: PathBuf::from("/tmp/root"),
            ..Settings::default()
        };
        assert_eq!(
            settings.target_path("/etc/nginx/sites-enabled/default"),
            PathBuf::from("/tmp/root/etc/nginx/sites-enabled/default")
        );
        assert_eq!(
            Settings::default().target_path("/etc/zabbix/zabbix_agentd.conf"),
            PathBuf::from("/etc/zabbix/zabbix_agentd.conf")
        );
    }

    #[test]
    fn test_load_partial_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("servboot.json");
        fs::write(&path, r#"{ "on_error": "continue", "desktop_user": "operator" }"#).unwrap();

        let settings = Settings::load_from_file(&path).unwrap();
        assert_eq!(settings.on_error, FailurePolicy::Continue);
        assert_eq!(settings.desktop_user.as_deref(), Some("operator"));
        assert_eq!(settings.package_install_command, DEFAULT_PACKAGE_INSTALL_COMMAND);
    }

    #[test]
    fn test_user_name_validation() {
        assert!(is_valid_user_name("operator"));
        assert!(is_valid_user_name("_svc-01"));
        assert!(!is_valid_user_name("Operator"));
        assert!(!is_valid_user_name("bad user"));
        assert!(!is_valid_user_name("1user"));
        assert!(!is_valid_user_name("../root"));
        assert!(!is_valid_user_name(""));
    }

    #[test]
    fn test_desktop_user_with_shell_metacharacters_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("servboot.json");
        fs::write(&path, r#"{ "desktop_user": "x;touch${IFS}/tmp/owned" }"#).unwrap();

        let settings = Settings::load_from_file(&path).unwrap();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("desktop_user"));
    }

    #[test]
    fn test_unknown_settings_field_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("servboot.json");
        fs::write(&path, r#"{ "workdir": "/srv" }"#).unwrap();
        assert!(Settings::load_from_file(&path).is_err());
    }
}
