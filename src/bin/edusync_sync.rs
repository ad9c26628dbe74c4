use anyhow::{Context, Result, bail};
use edusync::application::services::SyncMetricsSnapshot;
use edusync::domain::{SyncSnapshot, SyncTrigger};
use edusync::{AppConfig, AppState, HeadlessHost, SyncOutcome};
use std::env;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Debug, Clone, Default)]
struct CliOptions {
    pretty: bool,
    offline: bool,
    retry_failed: bool,
    database_url: Option<String>,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport {
    requeued: u64,
    outcome: SyncOutcome,
    snapshot: SyncSnapshot,
    metrics: SyncMetricsSnapshot,
}

fn usage() -> &'static str {
    "Usage: edusync-sync [--pretty] [--offline] [--retry-failed] [--database-url <url>]"
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(args)?;

    edusync::init_logging();

    let mut config = AppConfig::from_env();
    if let Some(url) = &options.database_url {
        config.database.url = url.clone();
    }

    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    let report = rt.block_on(run(config, &options))?;

    let payload = if options.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{payload}");
    Ok(())
}

async fn run(config: AppConfig, options: &CliOptions) -> Result<RunReport> {
    let database_url = config.database.url.clone();
    let state = AppState::initialize(config, Arc::new(HeadlessHost), !options.offline)
        .await
        .with_context(|| format!("Failed to open local store at {database_url}"))?;

    state
        .sync
        .recover_interrupted()
        .await
        .context("Failed to recover interrupted sync items")?;
    let requeued = if options.retry_failed {
        state
            .sync
            .retry_failed()
            .await
            .context("Failed to requeue failed sync items")?
    } else {
        0
    };

    let outcome = state.sync.sync_now(SyncTrigger::Manual).await;
    let snapshot = state
        .sync
        .snapshot()
        .await
        .context("Failed to read sync status")?;
    let metrics = state.sync.metrics();
    state.shutdown().await;

    Ok(RunReport {
        requeued,
        outcome,
        snapshot,
        metrics,
    })
}

fn parse_args<I>(args: I) -> Result<CliOptions>
where
    I: IntoIterator<Item = String>,
{
    let mut options = CliOptions::default();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--pretty" => options.pretty = true,
            "--offline" => options.offline = true,
            "--retry-failed" => options.retry_failed = true,
            "--database-url" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!("--database-url requires a value\n{}", usage())
                })?;
                options.database_url = Some(value);
            }
            "-h" | "--help" => {
                println!("{}", usage());
                std::process::exit(0);
            }
            other => bail!("Unknown argument: {other}\n{}", usage()),
        }
    }

    Ok(options)
}
