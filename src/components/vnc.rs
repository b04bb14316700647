//! TightVNC server with a minimal desktop session
//!
//! The session files (`xstartup`, `passwd`) come from the `.vnc` directory
//! of the assets directory passed on the command line.

use crate::component::{Component, PhaseContext, RunPhase};
use crate::config_file::is_valid_user_name;
use crate::error::{BootstrapError, Result};
use tracing::warn;

/// Desktop packages the VNC session needs. Trimming this list has broken the
/// session before, so it stays broad.
const DESKTOP_PACKAGES: &[&str] = &[
    "xserver-xorg-core",
    "xserver-xorg-input-all",
    "tightvncserver",
    "xserver-xorg-video-fbdev",
    "libx11-6",
    "x11-common",
    "x11-utils",
    "x11-xkb-utils",
    "x11-xserver-utils",
    "xterm",
    "lightdm",
    "openbox",
    "gnome-panel",
    "gnome-settings-daemon",
    "metacity",
    "nautilus",
    "gnome-terminal",
    "ubuntu-desktop",
    "terminator",
];

const GEOMETRY: &str = "1920x1080";

#[derive(Debug, Default)]
pub struct Vnc;

impl Component for Vnc {
    fn name(&self) -> &'static str {
        "VNC"
    }

    fn description(&self) -> &'static str {
        "TightVNC server. Used to connect to a remote desktop without ssh"
    }

    fn package_dependencies(&self) -> &'static [&'static str] {
        DESKTOP_PACKAGES
    }

    fn install(&self, ctx: &mut PhaseContext<'_>) -> Result<Box<dyn RunPhase>> {
        let configured = ctx.settings().desktop_user.clone();
        let user = match configured {
            Some(user) if is_valid_user_name(&user) => user,
            Some(user) => {
                return Err(BootstrapError::config(format!(
                    "desktop_user {:?} is not a valid account name",
                    user
                )));
            }
            None => loop {
                let answer = ctx.ask_required("specify the desktop user")?;
                if is_valid_user_name(&answer) {
                    break answer;
                }
                warn!("{:?} is not a valid user name", answer);
            },
        };

        let vnc_dir = format!("/home/{}/.vnc", user);
        ctx.copy_asset_dir(".vnc", &vnc_dir)?;
        ctx.execute(&format!("chown -R {}:nogroup {}", user, vnc_dir))?;
        ctx.execute(&format!("chmod +x {}/xstartup", vnc_dir))?;

        Ok(Box::new(StartVncServer { user }))
    }
}

/// Start the VNC server as the desktop user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartVncServer {
    pub user: String,
}

impl RunPhase for StartVncServer {
    fn run(&self, ctx: &mut PhaseContext<'_>) -> Result<()> {
        ctx.execute(&format!(
            "su - {} -c 'tightvncserver -geometry {}'",
            self.user, GEOMETRY
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::testing::Harness;
    use crate::error::BootstrapError;
    use std::fs;

    #[test]
    fn test_vnc_copies_session_and_starts_server() {
        let mut harness = Harness::new("operator\n");
        harness.add_asset(".vnc/xstartup", "#!/bin/sh\nopenbox-session &\n");

        harness.install_and_run(&Vnc).unwrap();

        assert_eq!(
            harness.commands(),
            vec![
                "chown -R operator:nogroup /home/operator/.vnc".to_string(),
                "chmod +x /home/operator/.vnc/xstartup".to_string(),
                "su - operator -c 'tightvncserver -geometry 1920x1080'".to_string(),
            ]
        );
        let xstartup = fs::read_to_string(harness.target("home/operator/.vnc/xstartup")).unwrap();
        assert!(xstartup.contains("openbox-session"));
    }

    #[test]
    fn test_configured_desktop_user_skips_prompt() {
        let mut harness = Harness::new("");
        harness.add_asset(".vnc/xstartup", "#!/bin/sh\n");
        harness.settings.desktop_user = Some("deploy".to_string());

        harness.install_and_run(&Vnc).unwrap();
        assert_eq!(
            harness.commands()[0],
            "chown -R deploy:nogroup /home/deploy/.vnc"
        );
    }

    #[test]
    fn test_vnc_without_assets_fails() {
        let mut harness = Harness::new("operator\n");
        let err = harness.install_and_run(&Vnc).unwrap_err();
        assert!(matches!(err, BootstrapError::Config(_)));
        assert!(harness.commands().is_empty());
    }

    #[test]
    fn test_invalid_configured_desktop_user_runs_nothing() {
        let mut harness = Harness::new("");
        harness.add_asset(".vnc/xstartup", "#!/bin/sh\n");
        harness.settings.desktop_user = Some("x;touch${IFS}/tmp/owned".to_string());

        let err = harness.install_and_run(&Vnc).unwrap_err();

        assert!(matches!(err, BootstrapError::Config(_)));
        assert!(harness.commands().is_empty());
        assert!(!harness.target("home").exists());
    }
}
