use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tokio::signal;
use tracing_appender::non_blocking::WorkerGuard;
use vhostcrab::command::SystemExecutor;
use vhostcrab::manager::{CertificateOutcome, CreatedSite};
use vhostcrab::probe::PortStatus;
use vhostcrab::prompt::TerminalPrompt;
use vhostcrab::site_store::format_listing;
use vhostcrab::{
    logging, Config, CreateOutcome, CreateRequest, Error, FileSiteStore, Manager, SiteStore,
};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Parser, Debug)]
#[command(
    name = "vhostcrab",
    version,
    about = "Apache reverse-proxy virtual host manager",
    after_help = "Examples:\n  \
                  sudo vhostcrab create mysite.com 8080\n  \
                  sudo vhostcrab create api.example.com 3000 --no-ssl\n  \
                  sudo vhostcrab delete mysite.com\n  \
                  vhostcrab list"
)]
struct Cli {
    /// JSON configuration file [default: /etc/vhostcrab/config.json when present]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a virtual host proxying DOMAIN to localhost:PORT
    Create {
        domain: String,
        #[arg(allow_hyphen_values = true)]
        port: String,
        /// Serve plain HTTP only and don't offer a certificate
        #[arg(long)]
        no_ssl: bool,
        /// Let's Encrypt notification email (otherwise the saved one, or ask)
        #[arg(long)]
        email: Option<String>,
        /// Answer yes to every confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete a virtual host
    Delete { domain: String },
    /// List configured virtual hosts
    List,
    /// Renew all certificates and reload Apache
    RenewSsl,
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("❌ failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    let guard = logging::init(cli.verbose, Some(&config.log_dir));
    let log_file = config.log_file();

    let task = tokio::spawn(run(cli.command, config));
    tokio::select! {
        _ = signal::ctrl_c() => cancelled(guard),
        res = task => match res {
            Ok(Ok(())) => ExitCode::SUCCESS,
            Ok(Err(err)) => report(&err, &log_file),
            Err(err) => report(&err.into(), &log_file),
        },
    }
}

async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Version => print_version(),
        Command::List => {
            let store = FileSiteStore::load(&config.state_path).await;
            print_sites(&store);
        }
        Command::Create {
            domain,
            port,
            no_ssl,
            email,
            yes,
        } => {
            require_root()?;
            let mut store = FileSiteStore::load(&config.state_path).await;
            let executor = SystemExecutor::new(&config);
            let prompt = TerminalPrompt::new(yes);
            let req = CreateRequest {
                domain,
                port,
                ssl: !no_ssl,
                email,
            };
            println!("🚀 Creating Virtual Host for {} on port {}...", req.domain, req.port);
            let outcome = Manager::new(&config, &executor, &mut store, &prompt)
                .create(&req)
                .await?;
            match outcome {
                CreateOutcome::Declined => println!("Nothing was changed."),
                CreateOutcome::Created(site) => print_created(&site, &config),
            }
        }
        Command::Delete { domain } => {
            require_root()?;
            let mut store = FileSiteStore::load(&config.state_path).await;
            let executor = SystemExecutor::new(&config);
            let prompt = TerminalPrompt::default();
            println!("🗑️  Deleting Virtual Host {domain}...");
            let deleted = Manager::new(&config, &executor, &mut store, &prompt)
                .delete(&domain)
                .await?;
            println!("✅ Site {} deleted successfully", deleted.domain);
            if !deleted.persisted {
                warn_not_saved(&config);
            }
        }
        Command::RenewSsl => {
            require_root()?;
            let mut store = FileSiteStore::load(&config.state_path).await;
            let executor = SystemExecutor::new(&config);
            let prompt = TerminalPrompt::default();
            println!("🔄 Renewing SSL certificates...");
            Manager::new(&config, &executor, &mut store, &prompt)
                .renew_certificates()
                .await?;
            println!("✅ SSL certificates renewed");
        }
    }
    Ok(())
}

fn require_root() -> Result<(), Error> {
    #[cfg(unix)]
    {
        if matches!(sudo::check(), sudo::RunningAs::Root) {
            return Ok(());
        }
    }
    Err(Error::NotRoot)
}

fn report(err: &anyhow::Error, log_file: &Path) -> ExitCode {
    tracing::error!("{err:#}");
    eprintln!("❌ {err:#}");
    match err.downcast_ref::<Error>().and_then(Error::hint) {
        Some(hint) => eprintln!("💡 {hint}"),
        None => eprintln!(
            "Please check the logs for more details: {}",
            log_file.display()
        ),
    }
    ExitCode::FAILURE
}

fn cancelled(guard: Option<WorkerGuard>) -> ExitCode {
    println!("\n\n🛑 Operation cancelled by user");
    tracing::warn!("operation cancelled by user");
    drop(guard);
    // A blocked prompt would keep the runtime from shutting down.
    std::process::exit(130)
}

fn print_version() {
    println!(
        "Apache Virtual Host Manager ({}) v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    println!("Repository: {}", env!("CARGO_PKG_REPOSITORY"));
}

fn print_created(site: &CreatedSite, config: &Config) {
    if site.backend == PortStatus::LikelyFree {
        println!("⚠️  No service detected on port {} yet", site.record.port);
    }
    match &site.certificate {
        CertificateOutcome::Issued => {
            println!("✅ SSL certificate installed successfully!");
            println!("🔄 Automatic renewal is configured");
        }
        CertificateOutcome::Failed(reason) => {
            println!("❌ Failed to install SSL certificate: {reason}");
            println!("💡 Make sure your DNS points to this server and ports 80/443 are accessible");
        }
        CertificateOutcome::Skipped | CertificateOutcome::NotRequested => {}
    }

    println!("\n✅ Virtual Host created successfully!");
    println!("{RULE}");
    println!("📍 Domain: {}", site.domain);
    println!("🔌 Port: {}", site.record.port);
    if site.record.ssl_enabled {
        println!("🔒 HTTPS: Enabled (automatic redirect)");
        println!("🌐 URL: https://{}", site.domain);
    } else {
        println!("🌐 URL: http://{}", site.domain);
    }
    println!("📁 Config: {}", site.record.config_file.display());
    println!("📝 Logs: /var/log/apache2/{}-*.log", site.domain);
    println!("{RULE}");

    if !site.persisted {
        warn_not_saved(config);
    }
}

fn warn_not_saved(config: &Config) {
    println!(
        "⚠️  Apache was updated but {} could not be written; see {}",
        config.state_path.display(),
        config.log_file().display()
    );
}

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Scheme")]
    scheme: &'static str,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Config")]
    config: String,
}

fn print_sites(store: &dyn SiteStore) {
    let sites = store.sites();
    if sites.is_empty() {
        println!("📝 No sites configured");
        return;
    }
    let rows: Vec<SiteRow> = sites
        .into_iter()
        .map(|(domain, record)| SiteRow {
            domain: domain.to_string(),
            scheme: if record.ssl_enabled { "HTTPS" } else { "HTTP" },
            port: record.port,
            created: format_listing(record.created_at),
            config: record.config_file.display().to_string(),
        })
        .collect();
    println!("📋 Configured Sites:");
    println!("{}", Table::new(rows).with(Style::rounded()));
}
