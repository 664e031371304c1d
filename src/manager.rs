//! Virtual host lifecycle.
//!
//! # `create`
//!
//! 1. Validate the domain and port. If the domain is already configured, confirm replacing it. If
//!    nothing listens on the port, confirm continuing. Declining stops here with nothing changed.
//! 2. Render and write `<sites_available>/<domain>.conf`.
//! 3. Enable the Apache modules (best effort).
//! 4. Enable the site, test the configuration, reload the service. Each of these is required.
//! 5. With SSL requested and confirmed, issue a certificate for `domain` and `www.domain`.
//! 6. Save the [`SiteRecord`], whatever the certificate outcome was.
//!
//! # `delete`
//!
//! Disable the site (best effort), remove its configuration file, reload, then drop the record.
//! A configuration file that exists but can't be removed stops the deletion before the reload.
//! When the reload fails the record is kept so the half-removed site still shows up in `list`.
//! The removed configuration file is not restored.
//!
//! # `renew-ssl`
//!
//! Renew every certificate Certbot manages, then reload.

use crate::command::CommandExecutor;
use crate::config::Config;
use crate::error::Error;
use crate::probe::{probe, PortStatus};
use crate::prompt::Prompt;
use crate::render::render_vhost;
use crate::site_store::{SiteRecord, SiteStore};
use crate::validate::{validate_domain, validate_email, validate_port};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Mode for generated virtual host files.
#[cfg(unix)]
const VHOST_FILE_MODE: u32 = 0o644;

/// Arguments to [`Manager::create`], as given on the command line.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub domain: String,
    pub port: String,
    pub ssl: bool,
    /// Let's Encrypt notification address. When absent the saved address is used, or the user is
    /// asked.
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateOutcome {
    /// Created with `--no-ssl`.
    NotRequested,
    /// The user chose not to request a certificate now.
    Skipped,
    Issued,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct CreatedSite {
    pub domain: String,
    pub record: SiteRecord,
    pub backend: PortStatus,
    pub certificate: CertificateOutcome,
    /// False when the site is live but the record couldn't be saved.
    pub persisted: bool,
}

#[derive(Debug, Clone)]
pub enum CreateOutcome {
    Created(CreatedSite),
    /// The user answered no to a confirmation. Nothing was changed.
    Declined,
}

#[derive(Debug, Clone)]
pub struct DeletedSite {
    pub domain: String,
    pub record: SiteRecord,
    pub persisted: bool,
}

/// Sequences validation, rendering, the external commands and the site store.
pub struct Manager<'a> {
    config: &'a Config,
    executor: &'a dyn CommandExecutor,
    store: &'a mut dyn SiteStore,
    prompt: &'a dyn Prompt,
}

impl<'a> Manager<'a> {
    pub fn new(
        config: &'a Config,
        executor: &'a dyn CommandExecutor,
        store: &'a mut dyn SiteStore,
        prompt: &'a dyn Prompt,
    ) -> Self {
        Self {
            config,
            executor,
            store,
            prompt,
        }
    }

    pub async fn create(&mut self, req: &CreateRequest) -> Result<CreateOutcome, Error> {
        let domain = validate_domain(&req.domain)?.to_string();
        let port = validate_port(&req.port)?;
        let email = req.email.as_deref().map(validate_email).transpose()?;

        if self.store.contains(&domain)
            && !self
                .prompt
                .confirm(&format!("Site {domain} already exists. Replace it?"))?
        {
            return Ok(CreateOutcome::Declined);
        }

        let backend = probe(port, self.config.probe_timeout).await;
        match backend {
            PortStatus::LikelyInUse => {
                tracing::info!("service appears to be running on port {port}");
            }
            PortStatus::LikelyFree => {
                tracing::warn!("no service detected on port {port}");
                if !self.prompt.confirm(&format!(
                    "No service detected on port {port}. Continue anyway?"
                ))? {
                    return Ok(CreateOutcome::Declined);
                }
            }
        }

        tracing::info!("creating virtual host for {domain} on port {port}");
        let config_file = self.config.vhost_path(&domain);
        write_vhost(&config_file, &render_vhost(&domain, port, req.ssl)).await?;
        tracing::info!("virtual host configuration created: {}", config_file.display());

        self.enable_modules().await;

        if !self.executor.enable_site(&domain).await.success {
            return Err(Error::SiteEnableFailed(domain));
        }

        let test = self.executor.config_test().await;
        if !test.success {
            return Err(Error::ConfigTestFailed {
                output: test.combined(),
            });
        }

        if !self.executor.reload_service().await.success {
            return Err(Error::ReloadFailed {
                service: self.config.apache_service.clone(),
                state: format!(
                    "{domain} is enabled and {} is written, but the site is not live",
                    config_file.display()
                ),
            });
        }

        let certificate = if req.ssl {
            self.offer_certificate(&domain, email).await
        } else {
            CertificateOutcome::NotRequested
        };

        let record = SiteRecord::new(
            port,
            certificate == CertificateOutcome::Issued,
            config_file,
        );
        let persisted = match self.store.insert(domain.clone(), record.clone()).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!("failed to save configuration for {domain}: {err}");
                false
            }
        };

        Ok(CreateOutcome::Created(CreatedSite {
            domain,
            record,
            backend,
            certificate,
            persisted,
        }))
    }

    pub async fn delete(&mut self, domain: &str) -> Result<DeletedSite, Error> {
        let Some(record) = self.store.get(domain).cloned() else {
            return Err(Error::SiteNotFound(domain.to_string()));
        };
        tracing::info!("deleting virtual host {domain}");

        if !self.executor.disable_site(domain).await.success {
            tracing::warn!("failed to disable site {domain}, continuing");
        }

        match fs::remove_file(&record.config_file).await {
            Ok(()) => tracing::info!(
                "removed configuration file: {}",
                record.config_file.display()
            ),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                tracing::error!(
                    "failed to remove {}: {source}",
                    record.config_file.display()
                );
                return Err(Error::RemoveConfig {
                    path: record.config_file,
                    source,
                });
            }
        }

        if !self.executor.reload_service().await.success {
            return Err(Error::ReloadFailed {
                service: self.config.apache_service.clone(),
                state: format!(
                    "{domain} was disabled but is still recorded; its configuration file is not \
                     restored"
                ),
            });
        }

        let persisted = match self.store.remove(domain).await {
            Ok(_) => true,
            Err(err) => {
                tracing::error!("failed to save configuration after deleting {domain}: {err}");
                false
            }
        };
        tracing::info!("deleted virtual host: {domain}");
        Ok(DeletedSite {
            domain: domain.to_string(),
            record,
            persisted,
        })
    }

    pub async fn renew_certificates(&self) -> Result<(), Error> {
        tracing::info!("renewing SSL certificates");
        if !self.executor.renew_certificates().await.success {
            tracing::error!("SSL certificate renewal failed");
            return Err(Error::CertificateRenewalFailed);
        }
        if !self.executor.reload_service().await.success {
            return Err(Error::ReloadFailed {
                service: self.config.apache_service.clone(),
                state: "certificates were renewed but are not loaded yet".to_string(),
            });
        }
        tracing::info!("SSL certificates renewed successfully");
        Ok(())
    }

    async fn enable_modules(&self) {
        tracing::info!("enabling required Apache modules");
        for module in &self.config.apache_modules {
            if self.executor.enable_module(module).await.success {
                tracing::info!("enabled Apache module: {module}");
            } else {
                tracing::warn!("failed to enable module {module} (may already be enabled)");
            }
        }
    }

    async fn offer_certificate(&self, domain: &str, email: Option<&str>) -> CertificateOutcome {
        match self
            .prompt
            .confirm("Install SSL certificate with Let's Encrypt?")
        {
            Ok(true) => self.issue_certificate(domain, email).await,
            Ok(false) => CertificateOutcome::Skipped,
            Err(err) => {
                tracing::warn!("not requesting a certificate for {domain}: {err}");
                CertificateOutcome::Skipped
            }
        }
    }

    async fn issue_certificate(&self, domain: &str, email: Option<&str>) -> CertificateOutcome {
        tracing::info!("installing SSL certificate for {domain}");

        if !self.executor.certbot_available().await {
            tracing::info!("certbot not found, installing it");
            if !self.executor.install_certbot().await.success {
                return CertificateOutcome::Failed("failed to install Certbot".to_string());
            }
        }

        let email = match self.notification_email(email).await {
            Ok(email) => email,
            Err(err) => return CertificateOutcome::Failed(err.to_string()),
        };

        if self.executor.issue_certificate(domain, &email).await.success {
            tracing::info!("SSL certificate installed for {domain}");
            CertificateOutcome::Issued
        } else {
            tracing::error!("SSL certificate installation failed for {domain}");
            CertificateOutcome::Failed(format!("certbot could not issue a certificate for {domain}"))
        }
    }

    /// The explicit address, else the remembered one, else ask. A new address is remembered
    /// for later runs.
    async fn notification_email(&self, explicit: Option<&str>) -> Result<String, Error> {
        let path = &self.config.certbot_email_path;
        let saved = match fs::read_to_string(path).await {
            Ok(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Ok(_) => None,
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };

        let email = match (explicit, &saved) {
            (Some(email), _) => email.to_string(),
            (None, Some(saved)) => return Ok(saved.clone()),
            (None, None) => {
                let answer = self
                    .prompt
                    .input("Enter your email for Let's Encrypt notifications")?;
                validate_email(&answer)?.to_string()
            }
        };

        if saved.is_none() {
            if let Err(err) = remember_email(path, &email).await {
                tracing::warn!("failed to save notification email to {}: {err}", path.display());
            }
        }
        Ok(email)
    }
}

async fn write_vhost(path: &Path, contents: &str) -> Result<(), Error> {
    let write = async {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, contents).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, std::fs::Permissions::from_mode(VHOST_FILE_MODE)).await?;
        }
        Ok::<(), std::io::Error>(())
    };
    write.await.map_err(|source| {
        tracing::error!("failed to create configuration file: {source}");
        Error::WriteConfig {
            path: path.to_path_buf(),
            source,
        }
    })
}

async fn remember_email(path: &Path, email: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, email).await
}
