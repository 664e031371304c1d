//! vhostcrab
//!
//! Puts local HTTP services behind Apache. For each domain, `vhostcrab create` writes a reverse
//! proxy virtual host to `localhost:<port>`. It enables the site, tests and reloads Apache, and
//! can optionally obtain a [Let's Encrypt] certificate through [Certbot]. Configured sites are
//! remembered in a small JSON state file so they can be listed and deleted later.
//!
//! The companion `check-dns` binary checks that a domain and its `www.` alias resolve to this
//! server's public IP, which Certbot needs before it can issue a certificate.
//!
//! [Let's Encrypt]: https://letsencrypt.org
//! [Certbot]: https://certbot.eff.org
//!
#![warn(clippy::pedantic)]

pub mod command;
pub mod config;
pub mod dns_check;
pub mod error;
pub mod logging;
pub mod manager;
pub mod probe;
pub mod prompt;
pub mod render;
pub mod site_store;
pub mod validate;

pub use config::Config;
pub use error::Error;
pub use manager::{CreateOutcome, CreateRequest, Manager};
pub use site_store::{FileSiteStore, InMemorySiteStore, SiteRecord, SiteStore};
