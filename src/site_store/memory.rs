use crate::error::Error;
use crate::site_store::{SiteRecord, SiteStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemorySiteStore {
    sites: BTreeMap<String, SiteRecord>,
}

impl InMemorySiteStore {
    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

#[async_trait::async_trait]
impl SiteStore for InMemorySiteStore {
    fn get(&self, domain: &str) -> Option<&SiteRecord> {
        self.sites.get(domain)
    }

    fn sites(&self) -> Vec<(&str, &SiteRecord)> {
        self.sites.iter().map(|(d, r)| (d.as_str(), r)).collect()
    }

    async fn insert(&mut self, domain: String, record: SiteRecord) -> Result<(), Error> {
        self.sites.insert(domain, record);
        Ok(())
    }

    async fn remove(&mut self, domain: &str) -> Result<Option<SiteRecord>, Error> {
        Ok(self.sites.remove(domain))
    }
}
