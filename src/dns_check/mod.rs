//! DNS readiness check.
//!
//! Before Certbot can answer an HTTP-01 challenge, both `domain` and `www.domain` must resolve to
//! this server. [`check_domain`] looks up the server's public IP through a [`PublicIpSource`],
//! resolves both names with a [`HostResolver`], and reports which names match.
//!
//! ```bash
//! ❯ check-dns example.com
//! Server IP: 203.0.113.5
//! ✅ example.com -> 203.0.113.5
//! ❌ www.example.com -> 198.51.100.9
//!    Update the DNS A record for www.example.com to point to 203.0.113.5
//! ```

use crate::error::Error;
use std::net::IpAddr;

pub mod public_ip;
pub mod resolver;

pub use public_ip::HttpPublicIp;
pub use resolver::SystemResolver;

/// Resolves a host name to the address a client would connect to.
#[async_trait::async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<IpAddr, Error>;
}

/// Reports the address this server is reachable at from the internet.
#[async_trait::async_trait]
pub trait PublicIpSource: Send + Sync {
    async fn public_ip(&self) -> Result<IpAddr, Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameStatus {
    Matches(IpAddr),
    Mismatch(IpAddr),
    Unresolved(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCheck {
    pub name: String,
    pub status: NameStatus,
}

impl NameCheck {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self.status, NameStatus::Matches(_))
    }

    /// What to change in DNS so that this name points at `server_ip`.
    #[must_use]
    pub fn hint(&self, server_ip: IpAddr) -> Option<String> {
        let record = if server_ip.is_ipv4() { "A" } else { "AAAA" };
        match self.status {
            NameStatus::Matches(_) => None,
            NameStatus::Mismatch(_) => Some(format!(
                "Update the DNS {record} record for {} to point to {server_ip}",
                self.name
            )),
            NameStatus::Unresolved(_) => Some(format!(
                "Create a DNS {record} record for {} pointing to {server_ip}",
                self.name
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsReport {
    pub server_ip: IpAddr,
    /// Bare domain first, then the `www.` form.
    pub checks: Vec<NameCheck>,
}

impl DnsReport {
    /// True only when every checked name points at the server.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.checks.iter().all(NameCheck::is_ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = &NameCheck> {
        self.checks.iter().filter(|c| !c.is_ok())
    }
}

/// Split user input into the bare domain and its `www.` form, whichever was given. A leading
/// `www.` is only stripped when at least two labels remain, so `www.com` is itself the bare name.
#[must_use]
pub fn domain_variants(input: &str) -> (String, String) {
    let input = input.trim().trim_end_matches('.').to_ascii_lowercase();
    match input.strip_prefix("www.").filter(|rest| rest.contains('.')) {
        Some(bare) => (bare.to_string(), input.clone()),
        None => (input.clone(), format!("www.{input}")),
    }
}

/// Check that `domain` and its `www.` counterpart both resolve to this server's public IP.
///
/// # Errors
///
/// Returns an error only when the public IP can't be determined. Per-name resolution failures are
/// reported in the [`DnsReport`].
pub async fn check_domain(
    domain: &str,
    resolver: &dyn HostResolver,
    ip_source: &dyn PublicIpSource,
) -> Result<DnsReport, Error> {
    let server_ip = ip_source.public_ip().await?;
    tracing::debug!("server public IP is {server_ip}");

    let (bare, www) = domain_variants(domain);
    let mut checks = Vec::with_capacity(2);
    for name in [bare, www] {
        let status = match resolver.resolve(&name).await {
            Ok(ip) if ip == server_ip => NameStatus::Matches(ip),
            Ok(ip) => NameStatus::Mismatch(ip),
            Err(err) => {
                tracing::debug!("{err}");
                NameStatus::Unresolved(err.to_string())
            }
        };
        checks.push(NameCheck { name, status });
    }
    Ok(DnsReport { server_ip, checks })
}
