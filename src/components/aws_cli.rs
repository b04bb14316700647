//! AWS command line interface from the official bundle

use crate::component::{Component, NoRun, PhaseContext, RunPhase};
use crate::error::Result;

const BUNDLE_URL: &str = "https://awscli.amazonaws.com/awscli-exe-linux-x86_64.zip";
const BUNDLE_PATH: &str = "/tmp/awscliv2.zip";

#[derive(Debug, Default)]
pub struct AwsCli;

impl Component for AwsCli {
    fn name(&self) -> &'static str {
        "AwsCli"
    }

    fn description(&self) -> &'static str {
        "AWS CLI v2, command line access to your cloud account"
    }

    fn package_dependencies(&self) -> &'static [&'static str] {
        &["curl", "unzip"]
    }

    fn install(&self, ctx: &mut PhaseContext<'_>) -> Result<Box<dyn RunPhase>> {
        ctx.execute(&format!("curl -sSL {} -o {}", BUNDLE_URL, BUNDLE_PATH))?;
        ctx.execute(&format!("unzip -o -q {} -d /tmp", BUNDLE_PATH))?;
        ctx.execute("/tmp/aws/install --update")?;
        Ok(Box::new(NoRun))
    }
}
