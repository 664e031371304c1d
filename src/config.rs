use crate::error::Error;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Path checked for a configuration file when `--config` isn't given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/vhostcrab/config.json";

/// Tool configuration. Every field has a default so the JSON file may be partial or absent.
#[serde_as]
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// Directory the `<domain>.conf` virtual host files are written to.
    pub sites_available: PathBuf,
    /// JSON site store location.
    pub state_path: PathBuf,
    /// Where the Let's Encrypt notification email is remembered between runs.
    pub certbot_email_path: PathBuf,
    pub log_dir: PathBuf,
    pub apache_service: String,
    pub apache_modules: Vec<String>,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub command_timeout: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub probe_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sites_available: PathBuf::from("/etc/apache2/sites-available"),
            state_path: PathBuf::from("/etc/vhost_manager.json"),
            certbot_email_path: PathBuf::from("/etc/letsencrypt/.email"),
            log_dir: PathBuf::from("/var/log/vhost-manager"),
            apache_service: "apache2".to_string(),
            apache_modules: ["proxy", "proxy_http", "rewrite", "ssl", "headers"]
                .map(String::from)
                .to_vec(),
            command_timeout: Duration::from_secs(300),
            probe_timeout: Duration::from_secs(2),
        }
    }
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.timeouts_are_nonzero()?;
        Ok(conf)
    }

    /// Load the explicitly requested file, or [`DEFAULT_CONFIG_PATH`] when it exists, or fall back
    /// to [`Config::default`].
    pub fn load(explicit: Option<&Path>) -> Result<Self, Error> {
        match explicit {
            Some(path) => Self::try_from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::try_from_file(DEFAULT_CONFIG_PATH)
            }
            None => Ok(Self::default()),
        }
    }

    /// Path of the virtual host file for `domain`.
    #[must_use]
    pub fn vhost_path(&self, domain: &str) -> PathBuf {
        self.sites_available.join(format!("{domain}.conf"))
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(crate::logging::LOG_FILE)
    }

    fn timeouts_are_nonzero(&self) -> Result<(), Error> {
        if self.command_timeout.is_zero() {
            return Err(Error::InvalidConfig("command_timeout must be non-zero".into()));
        }
        if self.probe_timeout.is_zero() {
            return Err(Error::InvalidConfig("probe_timeout must be non-zero".into()));
        }
        Ok(())
    }
}
