//! A JSON file-backed implementation of the [`SiteStore`][super::SiteStore] trait.
//!
//! Wraps a [`InMemorySiteStore`][super::memory::InMemorySiteStore] instance, persisting
//! every mutation to a JSON file on disk that is reloaded on the next run.
use crate::error::Error;
use crate::site_store::memory::InMemorySiteStore;
use crate::site_store::{SiteRecord, SiteStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Mode applied to the state file after each save: owner read/write, group read.
#[cfg(unix)]
const STATE_FILE_MODE: u32 = 0o640;

/// A file-backed site store. After each update the whole JSON file is rewritten through a
/// temporary file and a rename, so readers never observe a partial write.
///
/// No locking is performed; concurrent processes mutating the same file will lose updates.
#[derive(Default, Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct FileSiteStore {
    site_store: InMemorySiteStore,
    path: PathBuf,
}

impl FileSiteStore {
    /// Save the state of the site store as JSON to the store's configured path, or return an
    /// Error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJSON`] if a record can't be serialized.
    ///
    /// Returns [`Error::IO`] if the state can't be written, renamed into place, or have its
    /// permissions restricted.
    pub async fn save(&self) -> Result<(), Error> {
        let data = serde_json::to_string_pretty(&self.site_store)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let tmp_path = self.tmp_path();
        if let Err(err) = self.write_and_replace(&tmp_path, data.as_bytes()).await {
            if let Err(cleanup) = fs::remove_file(&tmp_path).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    tracing::warn!("failed to remove {}: {cleanup}", tmp_path.display());
                }
            }
            return Err(err);
        }
        tracing::info!("configuration saved to {}", self.path.display());
        Ok(())
    }

    async fn write_and_replace(&self, tmp_path: &Path, data: &[u8]) -> Result<(), Error> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(STATE_FILE_MODE);
        let mut output_file = options.open(tmp_path).await?;
        output_file.write_all(data).await?;
        output_file.flush().await?;
        output_file.sync_all().await?;
        drop(output_file);

        // A leftover temp file keeps its old mode when reopened.
        restrict_permissions(tmp_path).await?;
        fs::rename(tmp_path, &self.path).await?;
        Ok(())
    }

    /// Load a [`FileSiteStore`] from the JSON state located at the given path, or return an
    /// Error. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJSON`] if the JSON state file is invalid.
    ///
    /// Returns [`Error::IO`] if the path exists but can't be read.
    pub async fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let path = p.as_ref().to_path_buf();
        let site_store = match fs::read(&path).await {
            Ok(contents) => serde_json::from_slice(&contents)?,
            Err(err) if err.kind() == ErrorKind::NotFound => InMemorySiteStore::default(),
            Err(err) => return Err(Error::IO(err)),
        };
        Ok(Self { site_store, path })
    }

    /// Like [`FileSiteStore::try_from_file`], but an unreadable or corrupt file is logged and
    /// treated as an empty store. The file itself is left untouched until the next save.
    pub async fn load(p: impl AsRef<Path>) -> Self {
        let path = p.as_ref();
        match Self::try_from_file(path).await {
            Ok(store) if store.site_store.is_empty() => {
                tracing::info!("no existing configuration found, starting fresh");
                store
            }
            Ok(store) => {
                tracing::info!(
                    "loaded configuration with {} sites",
                    store.site_store.len()
                );
                store
            }
            Err(err) => {
                tracing::error!("failed to load configuration {}: {err}", path.display());
                Self {
                    site_store: InMemorySiteStore::default(),
                    path: path.to_path_buf(),
                }
            }
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[cfg(unix)]
async fn restrict_permissions(p: &Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(p, std::fs::Permissions::from_mode(STATE_FILE_MODE)).await?;
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unused_async)]
async fn restrict_permissions(_p: &Path) -> Result<(), Error> {
    Ok(())
}

#[async_trait::async_trait]
impl SiteStore for FileSiteStore {
    fn get(&self, domain: &str) -> Option<&SiteRecord> {
        self.site_store.get(domain)
    }

    fn sites(&self) -> Vec<(&str, &SiteRecord)> {
        self.site_store.sites()
    }

    async fn insert(&mut self, domain: String, record: SiteRecord) -> Result<(), Error> {
        self.site_store.insert(domain, record).await?;
        self.save().await?;
        Ok(())
    }

    async fn remove(&mut self, domain: &str) -> Result<Option<SiteRecord>, Error> {
        let removed = self.site_store.remove(domain).await?;
        if removed.is_some() {
            self.save().await?;
        }
        Ok(removed)
    }
}
