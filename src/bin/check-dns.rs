use anyhow::{bail, Result};
use clap::{ArgAction, Parser};
use std::process::ExitCode;
use std::time::Duration;
use vhostcrab::dns_check::public_ip::DEFAULT_IP_SERVICE;
use vhostcrab::dns_check::{
    check_domain, domain_variants, HttpPublicIp, NameStatus, SystemResolver,
};
use vhostcrab::logging;
use vhostcrab::validate::is_valid_domain;

/// Check that a domain and its www. alias point at this server before requesting a certificate.
#[derive(Parser, Debug)]
#[command(name = "check-dns", version, after_help = "Example:\n  check-dns mysite.com")]
struct Cli {
    /// Domain to check, with or without the www. prefix
    domain: String,

    /// Plain-text service returning this server's public IP
    #[arg(long, default_value = DEFAULT_IP_SERVICE)]
    ip_service: String,

    /// Public IP lookup timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// More log output on stderr
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version land here too.
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    let _guard = logging::init(cli.verbose, None);

    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("❌ {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<bool> {
    let (bare, _) = domain_variants(&cli.domain);
    if !is_valid_domain(&bare) {
        bail!("invalid domain name: \"{}\"", cli.domain);
    }

    println!("🔍 Checking DNS configuration for {bare}...");
    let resolver = SystemResolver::from_system_conf()?;
    let ip_source = HttpPublicIp::new(&cli.ip_service, Duration::from_secs(cli.timeout))?;

    let report = match check_domain(&bare, &resolver, &ip_source).await {
        Ok(report) => report,
        Err(err) => {
            println!("❌ {:#}", anyhow::Error::from(err));
            print_verdict(&bare, false);
            return Ok(false);
        }
    };

    println!("🌐 Server IP: {}", report.server_ip);
    for check in &report.checks {
        match &check.status {
            NameStatus::Matches(ip) => {
                println!("✅ {} -> {ip} (points to this server)", check.name);
            }
            NameStatus::Mismatch(ip) => {
                println!("❌ {} -> {ip} (does not point to this server)", check.name);
            }
            NameStatus::Unresolved(reason) => println!("❌ {reason}"),
        }
        if let Some(hint) = check.hint(report.server_ip) {
            println!("   💡 {hint}");
        }
    }

    let ready = report.is_ready();
    print_verdict(&bare, ready);
    Ok(ready)
}

fn print_verdict(domain: &str, ready: bool) {
    if ready {
        println!("\n🎉 {domain} is ready for SSL certificate installation!");
    } else {
        println!("\n⚠️  {domain} is not ready for SSL certificate installation");
        println!("Please update your DNS settings and try again.");
    }
}
