//! Error types.

use std::path::PathBuf;

/// Error enumerates the possible vhostcrab error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned by [`validate_domain`][crate::validate::validate_domain] for a string that isn't a
    /// dot-separated list of 1-63 character alphanumeric/hyphen labels, at most 253 characters long.
    #[error("invalid domain name: \"{0}\"")]
    InvalidDomain(String),

    /// Returned by [`validate_port`][crate::validate::validate_port] when the input isn't an
    /// integer at all.
    #[error("invalid port format: \"{0}\"")]
    InvalidPort(String),

    /// Returned by [`validate_port`][crate::validate::validate_port] for integers outside
    /// `1..=65535`.
    #[error("port {0} is out of valid range (1-65535)")]
    PortOutOfRange(String),

    /// Returned for a Let's Encrypt notification address that doesn't look like an email.
    #[error("invalid email address: \"{0}\"")]
    InvalidEmail(String),

    /// Returned when a mutating command is run without an effective root user.
    #[error("this command must be run with root privileges")]
    NotRoot,

    /// Returned when a confirmation or input is required but stdin isn't a terminal.
    #[error("cannot ask \"{0}\": stdin is not a terminal")]
    NotInteractive(String),

    /// Returned when the user aborts an interactive prompt.
    #[error("operation cancelled by user")]
    Cancelled,

    /// Returned when the rendered virtual host file can't be written. No Apache state has been
    /// changed at this point.
    #[error("failed to write virtual host configuration {path:?}")]
    WriteConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Returned by `delete` when the virtual host file exists but can't be removed. Apache hasn't
    /// been reloaded and the site is still recorded.
    #[error("failed to remove virtual host configuration {path:?}")]
    RemoveConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Returned when `a2ensite` fails for a freshly written configuration.
    #[error("failed to enable site \"{0}\"")]
    SiteEnableFailed(String),

    /// Returned when `apache2ctl configtest` rejects the configuration. Carries the raw test
    /// output.
    #[error("invalid Apache configuration:\n{output}")]
    ConfigTestFailed { output: String },

    /// Returned when the web server reload fails. The message describes what state was left
    /// behind.
    #[error("failed to reload {service}: {state}")]
    ReloadFailed { service: String, state: String },

    /// Returned when `certbot renew` fails.
    #[error("failed to renew SSL certificates")]
    CertificateRenewalFailed,

    /// Returned when deleting a domain that isn't in the site store.
    #[error("site \"{0}\" does not exist in configuration")]
    SiteNotFound(String),

    /// Returned when a name can't be resolved to an address.
    #[error("failed to resolve {name}: {reason}")]
    Resolve { name: String, reason: String },

    /// Returned when the public IP lookup service responds with something other than an address.
    #[error("public IP lookup returned an invalid address: \"{0}\"")]
    InvalidPublicIp(String),

    /// Returned when the public IP lookup service can't be reached.
    #[error("failed to get server IP")]
    HTTP(#[from] reqwest::Error),

    /// Returned when a [`Config`][crate::config::Config] value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when processing JSON from disk (e.g.
    /// [trying to load a `Config`][crate::config::Config::try_from_file]) fails due to invalid
    /// JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),
}

impl Error {
    /// A one-line suggestion for fixing the condition, if there is one worth showing.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Error::NotRoot => Some("re-run with sudo, e.g. `sudo vhostcrab <command>`".to_string()),
            Error::NotInteractive(_) => {
                Some("pass --yes (and --email for certificates) to run unattended".to_string())
            }
            Error::ReloadFailed { service, .. } => Some(format!(
                "check `systemctl status {service}` and `apache2ctl configtest`"
            )),
            Error::ConfigTestFailed { .. } => {
                Some("fix the reported directives, then run `apache2ctl configtest`".to_string())
            }
            Error::RemoveConfig { path, .. } => Some(format!(
                "remove {} by hand, then run the delete again",
                path.display()
            )),
            Error::SiteNotFound(_) => Some("run `vhostcrab list` to see configured sites".to_string()),
            Error::CertificateRenewalFailed => {
                Some("run `certbot renew --dry-run` to see the failure".to_string())
            }
            _ => None,
        }
    }
}
