//! External command execution.
//!
//! Every side effect vhostcrab has on the host (Apache modules and sites, config tests, service
//! reloads, Certbot) goes through the [`CommandExecutor`] trait. [`system::SystemExecutor`] runs
//! the real tools with a [`runner::CommandRunner`]; tests substitute a recorder.
//!
//! Failures are reported in the returned [`CommandOutput`] rather than as errors. Callers decide
//! whether a failed step is fatal.

pub mod runner;
pub mod system;

pub use runner::{CommandRunner, Echo};
pub use system::SystemExecutor;

/// Result of running one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Captured stdout followed by stderr, trimmed. `apache2ctl` reports on stderr even when it
    /// succeeds, so this is what gets shown to users.
    #[must_use]
    pub fn combined(&self) -> String {
        [self.stdout.trim(), self.stderr.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The host operations needed to manage Apache virtual hosts and their certificates.
#[async_trait::async_trait]
pub trait CommandExecutor: Send + Sync {
    /// `a2enmod <module>`.
    async fn enable_module(&self, module: &str) -> CommandOutput;

    /// `a2ensite <domain>`.
    async fn enable_site(&self, domain: &str) -> CommandOutput;

    /// `a2dissite <domain>`.
    async fn disable_site(&self, domain: &str) -> CommandOutput;

    /// `apache2ctl configtest`.
    async fn config_test(&self) -> CommandOutput;

    /// `systemctl reload <service>`.
    async fn reload_service(&self) -> CommandOutput;

    /// Whether `certbot` is on `PATH`.
    async fn certbot_available(&self) -> bool;

    /// Install Certbot and its Apache plugin.
    async fn install_certbot(&self) -> CommandOutput;

    /// Request a certificate covering `domain` and `www.domain`, letting Certbot rewrite the
    /// virtual host.
    async fn issue_certificate(&self, domain: &str, email: &str) -> CommandOutput;

    /// `certbot renew`.
    async fn renew_certificates(&self) -> CommandOutput;
}
