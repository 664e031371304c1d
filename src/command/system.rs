//! [`CommandExecutor`] backed by the Debian/Ubuntu Apache and Certbot tooling.
use crate::command::runner::{CommandRunner, Echo};
use crate::command::{CommandExecutor, CommandOutput};
use crate::config::Config;

#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct SystemExecutor {
    runner: CommandRunner,
    service: String,
}

impl SystemExecutor {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            runner: CommandRunner::new(config.command_timeout),
            service: config.apache_service.clone(),
        }
    }
}

#[async_trait::async_trait]
impl CommandExecutor for SystemExecutor {
    async fn enable_module(&self, module: &str) -> CommandOutput {
        self.runner.run("a2enmod", &[module], Echo::Quiet).await
    }

    async fn enable_site(&self, domain: &str) -> CommandOutput {
        self.runner.run("a2ensite", &[domain], Echo::Quiet).await
    }

    async fn disable_site(&self, domain: &str) -> CommandOutput {
        self.runner.run("a2dissite", &[domain], Echo::Quiet).await
    }

    async fn config_test(&self) -> CommandOutput {
        self.runner
            .run("apache2ctl", &["configtest"], Echo::Quiet)
            .await
    }

    async fn reload_service(&self) -> CommandOutput {
        self.runner
            .run("systemctl", &["reload", &self.service], Echo::Quiet)
            .await
    }

    async fn certbot_available(&self) -> bool {
        self.runner
            .run("which", &["certbot"], Echo::Quiet)
            .await
            .success
    }

    async fn install_certbot(&self) -> CommandOutput {
        let update = self.runner.run("apt-get", &["update"], Echo::Quiet).await;
        if !update.success {
            return update;
        }
        self.runner
            .run(
                "apt-get",
                &["install", "-y", "certbot", "python3-certbot-apache"],
                Echo::Quiet,
            )
            .await
    }

    async fn issue_certificate(&self, domain: &str, email: &str) -> CommandOutput {
        let www = format!("www.{domain}");
        self.runner
            .run(
                "certbot",
                &[
                    "--apache",
                    "-d",
                    domain,
                    "-d",
                    &www,
                    "--non-interactive",
                    "--agree-tos",
                    "--redirect",
                    "--email",
                    email,
                ],
                Echo::Show,
            )
            .await
    }

    async fn renew_certificates(&self) -> CommandOutput {
        self.runner
            .run("certbot", &["renew", "--quiet"], Echo::Quiet)
            .await
    }
}
