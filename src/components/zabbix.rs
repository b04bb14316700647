//! Zabbix monitoring agent

use crate::component::{Component, PhaseContext, RunPhase};
use crate::error::Result;
use crate::template;

pub const CONFIG_PATH: &str = "/etc/zabbix/zabbix_agentd.conf";
const SERVICE: &str = "zabbix-agent";

#[derive(Debug, Default)]
pub struct ZabbixAgent;

impl Component for ZabbixAgent {
    fn name(&self) -> &'static str {
        "ZabbixAgent"
    }

    fn description(&self) -> &'static str {
        "Zabbix monitoring agent, reports this host to your Zabbix server"
    }

    fn package_dependencies(&self) -> &'static [&'static str] {
        &["zabbix-agent"]
    }

    fn install(&self, ctx: &mut PhaseContext<'_>) -> Result<Box<dyn RunPhase>> {
        let server_hosts = ctx.ask_required("specify zabbix server hosts")?;
        let hostname = ctx.ask_required("specify zabbix server name")?;

        // The package starts the agent with the stock config; stop it so the
        // restart in the run phase is the first start with ours.
        ctx.execute(&format!("systemctl stop {}", SERVICE))?;
        let config = template::render_zabbix_agent(&server_hosts, &hostname)?;
        ctx.write_file(CONFIG_PATH, &config)?;

        Ok(Box::new(StartAgent))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StartAgent;

impl RunPhase for StartAgent {
    fn run(&self, ctx: &mut PhaseContext<'_>) -> Result<()> {
        ctx.execute(&format!("systemctl restart {}", SERVICE))?;
        ctx.execute(&format!("systemctl enable {}", SERVICE))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::testing::Harness;
    use std::fs;

    #[test]
    fn test_zabbix_agent_renders_config() {
        let mut harness = Harness::new("zabbix.example.com\nweb-01\n");
        harness.install_and_run(&ZabbixAgent).unwrap();

        assert_eq!(
            harness.commands(),
            vec![
                "systemctl stop zabbix-agent".to_string(),
                "systemctl restart zabbix-agent".to_string(),
                "systemctl enable zabbix-agent".to_string(),
            ]
        );

        let config = fs::read_to_string(harness.target("etc/zabbix/zabbix_agentd.conf")).unwrap();
        assert!(config.contains("Server=zabbix.example.com\n"));
        assert!(config.contains("Hostname=web-01\n"));
    }

    #[test]
    fn test_prompts_are_labeled() {
        let mut harness = Harness::new("10.0.0.1\nagent\n");
        harness.install_and_run(&ZabbixAgent).unwrap();
        assert_eq!(
            harness.prompts(),
            "[INPUT ZabbixAgent] specify zabbix server hosts:\n\
             [INPUT ZabbixAgent] specify zabbix server name:\n"
        );
    }
}
