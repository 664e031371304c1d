use crate::dns_check::PublicIpSource;
use crate::error::Error;
use std::net::IpAddr;
use std::time::Duration;

pub const DEFAULT_IP_SERVICE: &str = "https://api.ipify.org";

/// [`PublicIpSource`] asking a plain-text "what is my IP" HTTP service.
pub struct HttpPublicIp {
    client: reqwest::Client,
    url: String,
}

impl HttpPublicIp {
    /// # Errors
    ///
    /// Returns [`Error::HTTP`] if the HTTP client can't be constructed.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait::async_trait]
impl PublicIpSource for HttpPublicIp {
    async fn public_ip(&self) -> Result<IpAddr, Error> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let body = body.trim();
        body.parse()
            .map_err(|_| Error::InvalidPublicIp(body.to_string()))
    }
}
