//! Configuration file templates
//!
//! Templates are compiled into the binary and rendered with minijinja in
//! strict mode, so a missing field is an error instead of an empty string.

use crate::error::Result;
use minijinja::{Environment, UndefinedBehavior, context};

pub const NGINX_SITE: &str = "nginx_default.conf";
pub const ZABBIX_AGENT: &str = "zabbix_agentd.conf";

/// Static systemd unit for the node exporter; nothing to render
pub const NODE_EXPORTER_UNIT: &str = include_str!("../templates/node_exporter.service");

const TEMPLATES: &[(&str, &str)] = &[
    (NGINX_SITE, include_str!("../templates/nginx_default.conf.j2")),
    (ZABBIX_AGENT, include_str!("../templates/zabbix_agentd.conf.j2")),
];

fn environment() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    for &(name, source) in TEMPLATES {
        env.add_template(name, source)?;
    }
    Ok(env)
}

/// Render the reverse-proxy site for `domain`
pub fn render_nginx_site(domain: &str) -> Result<String> {
    let env = environment()?;
    let rendered = env
        .get_template(NGINX_SITE)?
        .render(context! { domain => domain })?;
    Ok(rendered)
}

/// Render the Zabbix agent configuration
pub fn render_zabbix_agent(server_hosts: &str, hostname: &str) -> Result<String> {
    let env = environment()?;
    let rendered = env.get_template(ZABBIX_AGENT)?.render(context! {
        server_hosts => server_hosts,
        hostname => hostname,
    })?;
    Ok(rendered)
}
