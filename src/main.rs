use anyhow::{Context, Result};
use clap::Parser;
use renewals::{
    config::Cli,
    normalize::normalize_partners,
    report::{
        export::export_report,
        render::{write_filter_options, write_report},
        RenewalReport,
    },
    roster::{SheetCredentials, Source, SourceCache},
};
use reqwest::Client;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) resolve configuration ────────────────────────────────────
    let cli = Cli::parse();
    let source = cli.source()?;
    let creds = cli.credentials();
    let client = Client::new();
    let cache = SourceCache::new(cli.cache_ttl());
    info!(source = %source, ttl = ?cache.ttl(), "startup");

    // ─── 3) one-shot report ──────────────────────────────────────────
    let Some(interval) = cli.watch_interval()? else {
        return run_once(&cli, &source, &client, &creds, &cache).await;
    };

    // ─── 4) watch: recompute on every tick, Enter forces a refetch ───
    let mut ticker = tokio::time::interval(interval);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(_)) => {
                    info!("manual refresh");
                    cache.invalidate_all();
                }
                Ok(None) => {
                    debug!("stdin closed; manual refresh disabled");
                    stdin_open = false;
                    continue;
                }
                Err(e) => {
                    warn!("reading stdin: {}", e);
                    stdin_open = false;
                    continue;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown");
                return Ok(());
            }
        }

        if let Err(e) = run_once(&cli, &source, &client, &creds, &cache).await {
            error!("{:#}", e);
        }
    }
}

/// Load (or reuse) the roster, rebuild the report and print it.
async fn run_once(
    cli: &Cli,
    source: &Source,
    client: &Client,
    creds: &SheetCredentials,
    cache: &SourceCache,
) -> Result<()> {
    let key = source.key();
    let table = match cache.get(&key) {
        Some(table) => {
            debug!(key = %key, "using cached roster");
            table
        }
        None => {
            let table = source
                .load(client, creds)
                .await
                .with_context(|| format!("Could not read {}", source))?;
            cache.insert(&key, table)
        }
    };

    let as_of = cli.as_of();
    let roster = normalize_partners(&table, as_of)
        .with_context(|| format!("normalizing roster from {}", source))?;
    let report = RenewalReport::build(&roster, &cli.filters());

    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if cli.list_filters {
            write_filter_options(&mut out, &roster.partners).context("writing filter options")?;
        } else if cli.json {
            serde_json::to_writer_pretty(&mut out, &report).context("serializing report")?;
            writeln!(out)?;
        } else {
            write_report(&mut out, &report).context("writing report")?;
        }
        out.flush()?;
    }

    if let Some(dir) = &cli.export_dir {
        let files = export_report(&report, dir)?;
        info!(files = files.len(), dir = %dir.display(), "exported CSV tables");
    }
    Ok(())
}
