//! Record of the virtual hosts vhostcrab has configured.
//!
//! Sites are keyed by domain. Each [`SiteRecord`] remembers the backend port, whether a
//! certificate was issued, when the site was created and where its Apache configuration lives.
//!
//! Two implementations are provided, [`memory::InMemorySiteStore`] and [`file::FileSiteStore`].
//! The latter rewrites a JSON file on disk after every mutation, in the format:
//!
//! ```json
//! {
//!   "api.example.com": {
//!     "port": 3000,
//!     "ssl": false,
//!     "created": "2024-03-01T09:15:00Z",
//!     "config_file": "/etc/apache2/sites-available/api.example.com.conf"
//!   }
//! }
//! ```

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::OffsetDateTime;

pub mod file;
pub mod memory;
mod timestamp;

#[allow(clippy::module_name_repetitions)]
pub use file::FileSiteStore;
#[allow(clippy::module_name_repetitions)]
pub use memory::InMemorySiteStore;
pub use timestamp::format_listing;

/// A configured virtual host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub port: u16,
    #[serde(rename = "ssl")]
    pub ssl_enabled: bool,
    #[serde(rename = "created", with = "timestamp")]
    pub created_at: OffsetDateTime,
    pub config_file: PathBuf,
}

impl SiteRecord {
    #[must_use]
    pub fn new(port: u16, ssl_enabled: bool, config_file: PathBuf) -> Self {
        Self {
            port,
            ssl_enabled,
            created_at: OffsetDateTime::now_utc(),
            config_file,
        }
    }
}

/// Storage of [`SiteRecord`]s by domain.
#[async_trait::async_trait]
#[allow(clippy::module_name_repetitions)]
pub trait SiteStore: Send + Sync {
    /// Get the record for `domain` (if any).
    fn get(&self, domain: &str) -> Option<&SiteRecord>;

    /// All records, ordered by domain.
    fn sites(&self) -> Vec<(&str, &SiteRecord)>;

    /// Add or replace the record for `domain`.
    async fn insert(&mut self, domain: String, record: SiteRecord) -> Result<(), Error>;

    /// Remove the record for `domain`, returning it if it existed.
    async fn remove(&mut self, domain: &str) -> Result<Option<SiteRecord>, Error>;

    fn contains(&self, domain: &str) -> bool {
        self.get(domain).is_some()
    }
}
