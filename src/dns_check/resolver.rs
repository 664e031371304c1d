use crate::dns_check::HostResolver;
use crate::error::Error;
use std::net::IpAddr;
use trust_dns_resolver::TokioAsyncResolver;

/// [`HostResolver`] using the system resolver configuration (`/etc/resolv.conf`).
pub struct SystemResolver {
    resolver: TokioAsyncResolver,
}

impl SystemResolver {
    /// # Errors
    ///
    /// Returns [`Error::Resolve`] if the system resolver configuration can't be read.
    pub fn from_system_conf() -> Result<Self, Error> {
        let resolver =
            TokioAsyncResolver::tokio_from_system_conf().map_err(|err| Error::Resolve {
                name: "system resolver".to_string(),
                reason: err.to_string(),
            })?;
        Ok(Self { resolver })
    }
}

#[async_trait::async_trait]
impl HostResolver for SystemResolver {
    /// First IPv4 address for `name`, falling back to the first IPv6 address.
    async fn resolve(&self, name: &str) -> Result<IpAddr, Error> {
        let lookup = self
            .resolver
            .lookup_ip(name)
            .await
            .map_err(|err| Error::Resolve {
                name: name.to_string(),
                reason: err.to_string(),
            })?;
        let addrs: Vec<IpAddr> = lookup.iter().collect();
        addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| Error::Resolve {
                name: name.to_string(),
                reason: "no addresses returned".to_string(),
            })
    }
}
