//! Built-in components, in the order they are offered to the operator.

pub mod aws_cli;
pub mod docker;
pub mod nginx;
pub mod node_exporter;
pub mod vnc;
pub mod zabbix;

pub use aws_cli::AwsCli;
pub use docker::Docker;
pub use nginx::NginxDomain;
pub use node_exporter::NodeExporter;
pub use vnc::Vnc;
pub use zabbix::ZabbixAgent;

use crate::component::Component;

/// Construct every built-in component. Performs no I/O.
pub fn builtin() -> Vec<Box<dyn Component>> {
    vec![
        Box::new(Docker),
        Box::new(NginxDomain),
        Box::new(Vnc),
        Box::new(ZabbixAgent),
        Box::new(AwsCli),
        Box::new(NodeExporter),
    ]
}
