//! Docker engine via the upstream convenience script

use crate::component::{Component, NoRun, PhaseContext, RunPhase};
use crate::error::Result;

const INSTALL_SCRIPT: &str = "curl -sSL https://get.docker.com | sh";

#[derive(Debug, Default)]
pub struct Docker;

impl Component for Docker {
    fn name(&self) -> &'static str {
        "Docker"
    }

    fn description(&self) -> &'static str {
        "Container service. Docker container engine, allows development of portable & scalable apps"
    }

    fn package_dependencies(&self) -> &'static [&'static str] {
        &[
            "apt-transport-https",
            "ca-certificates",
            "curl",
            "gnupg-agent",
            "software-properties-common",
        ]
    }

    fn install(&self, ctx: &mut PhaseContext<'_>) -> Result<Box<dyn RunPhase>> {
        ctx.execute(INSTALL_SCRIPT)?;
        Ok(Box::new(NoRun))
    }
}
