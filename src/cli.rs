use clap::Parser;
use std::path::PathBuf;

use crate::config_file::Settings;
use crate::types::FailurePolicy;

/// servboot - bootstrap a personal server one component at a time
#[derive(Parser, Debug)]
#[command(name = "servboot")]
#[command(about = "Interactive installer for Docker, nginx + certbot, Zabbix, VNC and friends")]
#[command(version)]
pub struct Cli {
    /// Directory holding template/config assets (e.g. the `.vnc` session)
    pub assets_dir: Option<PathBuf>,

    /// JSON settings file; command line flags take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// What to do when a command or component fails
    #[arg(long, value_enum)]
    pub on_error: Option<FailurePolicy>,

    /// Dry-run mode: log commands and file writes without performing them
    #[arg(long)]
    pub dry_run: bool,

    /// Write configuration files beneath this directory instead of /
    #[arg(long)]
    pub target_root: Option<PathBuf>,

    /// Skip the "install anything?" question
    #[arg(short, long)]
    pub yes: bool,

    /// Comma-separated selection to use instead of asking
    #[arg(long)]
    pub components: Option<String>,

    /// List available components and exit
    #[arg(long)]
    pub list: bool,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply command line overrides on top of `settings`
    pub fn apply_to(&self, mut settings: Settings) -> Settings {
        if let Some(dir) = &self.assets_dir {
            settings.assets_dir = Some(dir.clone());
        }
        if let Some(policy) = self.on_error {
            settings.on_error = policy;
        }
        if self.dry_run {
            settings.dry_run = true;
        }
        if let Some(root) = &self.target_root {
            settings.target_root = root.clone();
        }
        settings
    }
}
