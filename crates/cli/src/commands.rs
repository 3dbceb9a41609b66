use anyhow::{bail, Context};
use hostblock_domain::{Config, DomainOutcome};
use hostblock_infrastructure::responder::write_self_signed;
use hostblock_jobs::{ExpiryScheduler, MAX_EXPIRY};
use std::path::Path;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::di::Services;
use crate::server;

fn report(verb: &str, outcomes: &[DomainOutcome]) -> anyhow::Result<()> {
    for outcome in outcomes {
        match &outcome.result {
            Ok(edit) if edit.is_noop() => println!("{:<30} already {}", edit.domain, verb),
            Ok(edit) => println!(
                "{:<30} {} ({} lines)",
                edit.domain, verb, edit.lines_changed
            ),
            Err(e) => println!("{:<30} failed: {}", outcome.input, e),
        }
    }

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        bail!("{} of {} domains failed", failed, outcomes.len());
    }
    Ok(())
}

fn configured_or(domains: Vec<String>, config: &Config) -> anyhow::Result<Vec<String>> {
    if !domains.is_empty() {
        return Ok(domains);
    }
    if config.blocking.sites.is_empty() {
        bail!("No domains given and no sites configured in [blocking]");
    }
    Ok(config.blocking.sites.clone())
}

pub async fn block(services: &Services, domains: Vec<String>) -> anyhow::Result<()> {
    let engine = services.engine.clone();
    let outcomes = tokio::task::spawn_blocking(move || engine.block_batch(&domains)).await?;
    report("blocked", &outcomes)
}

pub async fn unblock(services: &Services, domains: Vec<String>) -> anyhow::Result<()> {
    let engine = services.engine.clone();
    let outcomes = tokio::task::spawn_blocking(move || engine.unblock_batch(&domains)).await?;
    report("unblocked", &outcomes)
}

pub async fn status(
    services: &Services,
    config: &Config,
    domains: Vec<String>,
) -> anyhow::Result<()> {
    let domains = configured_or(domains, config)?;
    let engine = services.engine.clone();
    let states = tokio::task::spawn_blocking(move || {
        domains
            .into_iter()
            .map(|d| {
                let state = engine.is_blocked(&d);
                (d, state)
            })
            .collect::<Vec<_>>()
    })
    .await?;

    for (domain, state) in states {
        match state {
            Ok(true) => println!("{:<30} blocked", domain),
            Ok(false) => println!("{:<30} not blocked", domain),
            Err(e) => println!("{:<30} unknown: {}", domain, e),
        }
    }
    Ok(())
}

pub async fn add(services: &Services, config: &Config, domain: String) -> anyhow::Result<()> {
    let use_case = services.add_site.clone();
    let mut sites = config.blocking.sites.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let result = use_case.execute(&mut sites, &domain);
        DomainOutcome::new(domain, result)
    })
    .await?;
    report("blocked", &[outcome])
}

pub async fn remove(services: &Services, config: &Config, domain: String) -> anyhow::Result<()> {
    let use_case = services.remove_site.clone();
    let mut sites = config.blocking.sites.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let result = use_case.execute(&mut sites, &domain);
        DomainOutcome::new(domain, result)
    })
    .await?;
    report("unblocked", &[outcome])
}

pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let Some(running) = server::start_responder(&config.responder, shutdown.clone()).await else {
        bail!("Responder is disabled in [responder]; nothing to serve");
    };

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Shutting down block page responder");

    shutdown.cancel();
    running.wait().await;
    Ok(())
}

pub async fn timed(
    services: &Services,
    config: &Config,
    minutes: u64,
    domains: Vec<String>,
) -> anyhow::Result<()> {
    if minutes == 0 {
        bail!("--minutes must be at least 1");
    }
    let domains = configured_or(domains, config)?;
    let duration = minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .filter(|d| *d <= MAX_EXPIRY)
        .with_context(|| format!("--minutes {} is too large", minutes))?;

    let scheduler = ExpiryScheduler::new(services.engine.clone(), Handle::current());
    let mut events = scheduler.subscribe();

    let blocking_scheduler = scheduler.clone();
    let (outcomes, armed) =
        tokio::task::spawn_blocking(move || blocking_scheduler.block_for(duration, &domains))
            .await?;
    if let Err(e) = report("blocked", &outcomes) {
        warn!(error = %e, "Timed block started with failures");
    }
    if armed.domains.is_empty() {
        scheduler.cancel();
        bail!("Nothing was blocked");
    }

    println!(
        "Blocking {} domains for {} minutes",
        armed.domains.len(),
        minutes
    );

    let shutdown = CancellationToken::new();
    let running = server::start_responder(&config.responder, shutdown.clone()).await;

    tokio::select! {
        event = events.recv() => {
            let event = event.context("Expiry notification channel closed")?;
            println!("Blocking period ended");
            if let Err(e) = report("unblocked", &event.outcomes) {
                warn!(error = %e, "Some domains could not be unblocked");
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            scheduler.cancel();
            println!("Interrupted before the blocking period ended; domains stay blocked");
            println!("Run `hostblock unblock` to remove them");
        }
    }

    shutdown.cancel();
    if let Some(running) = running {
        running.wait().await;
    }
    Ok(())
}

pub fn cert(out_dir: &str, hosts: &[String]) -> anyhow::Result<()> {
    let (cert_path, key_path) = write_self_signed(Path::new(out_dir), hosts)
        .context("Failed to generate certificate")?;

    println!("Certificate: {}", cert_path.display());
    println!("Private key: {}", key_path.display());
    println!("Set responder.cert_path and responder.key_path to use them");
    Ok(())
}
