//! Prometheus node exporter as a systemd service

use crate::component::{Component, PhaseContext, RunPhase};
use crate::error::Result;
use crate::template::NODE_EXPORTER_UNIT;

pub const VERSION: &str = "1.8.2";
pub const UNIT_PATH: &str = "/etc/systemd/system/node_exporter.service";

#[derive(Debug, Default)]
pub struct NodeExporter;

impl NodeExporter {
    fn release() -> String {
        format!("node_exporter-{}.linux-amd64", VERSION)
    }
}

impl Component for NodeExporter {
    fn name(&self) -> &'static str {
        "NodeExporter"
    }

    fn description(&self) -> &'static str {
        "Prometheus node exporter, publishes host metrics on :9100"
    }

    fn package_dependencies(&self) -> &'static [&'static str] {
        &["curl", "tar"]
    }

    fn install(&self, ctx: &mut PhaseContext<'_>) -> Result<Box<dyn RunPhase>> {
        let release = Self::release();
        ctx.execute(&format!(
            "curl -sSL https://github.com/prometheus/node_exporter/releases/download/v{}/{}.tar.gz | tar -xz -C /tmp",
            VERSION, release
        ))?;
        ctx.execute(&format!(
            "install -m 0755 /tmp/{}/node_exporter /usr/local/bin/node_exporter",
            release
        ))?;
        ctx.execute(
            "id -u node_exporter >/dev/null 2>&1 || useradd --system --no-create-home --shell /usr/sbin/nologin node_exporter",
        )?;
        ctx.write_file(UNIT_PATH, NODE_EXPORTER_UNIT)?;
        Ok(Box::new(EnableService))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EnableService;

impl RunPhase for EnableService {
    fn run(&self, ctx: &mut PhaseContext<'_>) -> Result<()> {
        ctx.execute("systemctl daemon-reload")?;
        ctx.execute("systemctl enable --now node_exporter")?;
        Ok(())
    }
}
