//! Feed monitor — binary entrypoint.
//! Wires config, the shared HTTP client, the source set and the
//! scheduler, then runs until killed.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use jobwatch::config::{self, MonitorConfig};
use jobwatch::notify::EmailSender;
use jobwatch::scheduler::{self, SchedulerCfg};
use jobwatch::sources::{
    eleduck::EleduckSource, github::GithubIssuesSource, v2ex::V2exSource, Source,
};
use jobwatch::store::FileStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Built-in source set. Keyword overrides come from the optional
/// keywords config file, keyed by source name.
fn default_sources(client: &reqwest::Client, overrides: &config::KeywordOverrides) -> Vec<Box<dyn Source>> {
    let keywords = |key: &str, defaults: &[&str]| -> Vec<String> {
        overrides
            .get(key)
            .cloned()
            .unwrap_or_else(|| defaults.iter().map(|s| s.to_string()).collect())
    };

    vec![
        Box::new(EleduckSource::new(
            client.clone(),
            keywords("eleduck", &["前端", "全栈"]),
        )),
        Box::new(V2exSource::new(client.clone(), keywords("v2ex", &["前端"]))),
        Box::new(GithubIssuesSource::new(
            client.clone(),
            keywords("github", &["前端", "全栈"]),
        )),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = MonitorConfig::from_env().context("loading monitor config")?;
    let overrides = config::load_keywords_default().context("loading keyword overrides")?;

    let client = reqwest::Client::builder()
        .user_agent(concat!("jobwatch/", env!("CARGO_PKG_VERSION")))
        .timeout(cfg.http_timeout)
        .build()
        .context("building http client")?;

    let notifier = Arc::new(EmailSender::new(&cfg.smtp).context("building smtp transport")?);
    let store = Arc::new(FileStore::new(&cfg.data_dir));
    let sources = default_sources(&client, &overrides);

    tracing::info!(
        sources = sources.len(),
        interval_secs = cfg.poll_interval.as_secs(),
        "monitor started"
    );

    let handle = scheduler::spawn(
        sources,
        store,
        notifier,
        SchedulerCfg {
            interval: cfg.poll_interval,
        },
    );
    handle.await.context("scheduler task ended")?;
    Ok(())
}
