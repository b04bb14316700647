//! nginx reverse proxy with a certbot certificate for one domain

use crate::component::{Component, PhaseContext, RunPhase};
use crate::error::Result;
use crate::template;
use tracing::warn;

pub const SITE_PATH: &str = "/etc/nginx/sites-enabled/default";

#[derive(Debug, Default)]
pub struct NginxDomain;

impl Component for NginxDomain {
    fn name(&self) -> &'static str {
        "NginxDomain"
    }

    fn description(&self) -> &'static str {
        "Bootstraps nginx and asks for your domain to obtain a certificate from certbot"
    }

    fn package_dependencies(&self) -> &'static [&'static str] {
        &["certbot", "python3-certbot-nginx", "nginx"]
    }

    fn install(&self, ctx: &mut PhaseContext<'_>) -> Result<Box<dyn RunPhase>> {
        let domain = loop {
            let answer = ctx.ask_required("Insert your fqdn")?;
            if is_valid_fqdn(&answer) {
                break answer;
            }
            warn!("{:?} is not a valid domain name", answer);
        };
        let site = template::render_nginx_site(&domain)?;
        ctx.write_file(SITE_PATH, &site)?;
        Ok(Box::new(CertifyDomain { domain }))
    }
}

/// Dot-separated labels of letters, digits and inner hyphens, 253 chars max
fn is_valid_fqdn(domain: &str) -> bool {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    !domain.is_empty()
        && domain.len() <= 253
        && domain.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Reload nginx with the new site and request a certificate for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertifyDomain {
    pub domain: String,
}

impl RunPhase for CertifyDomain {
    fn run(&self, ctx: &mut PhaseContext<'_>) -> Result<()> {
        ctx.execute("systemctl reload nginx")?;
        ctx.execute(&format!("certbot --nginx -d {}", self.domain))?;
        Ok(())
    }
}
