//! sentry-query - Run Sentry issue, event and usage-stats queries.
//!
//! Reads a JSON array of query descriptions, runs them against the
//! configured Sentry organization and prints the responses as JSON.
//!
//! ```text
//! sentry-query --from 2024-01-01T00:00:00Z --to 2024-01-02T00:00:00Z queries.json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use secrecy::SecretString;
use sentry_client::{ClientOptions, SentryClient};
use sentry_config::Config;
use sentry_datasource::Datasource;
use sentry_protocol::{QueryDataRequest, TimeRange};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Run Sentry queries and print the results as JSON.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file (defaults to ./sentry-query.json5 or the user config).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start of the time range, RFC 3339 (defaults to 24 hours before --to).
    #[arg(long)]
    from: Option<DateTime<Utc>>,

    /// End of the time range, RFC 3339 (defaults to now).
    #[arg(long)]
    to: Option<DateTime<Utc>>,

    /// JSON file holding an array of query descriptions.
    queries: PathBuf,
}

impl Args {
    fn time_range(&self) -> anyhow::Result<TimeRange> {
        let to = self.to.unwrap_or_else(Utc::now);
        let from = self.from.unwrap_or(to - Duration::hours(24));
        anyhow::ensure!(from <= to, "--from ({from}) is after --to ({to})");
        Ok(TimeRange::new(from, to))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().context("loading config")?,
    };
    debug!(url = %config.base_url(), org = %config.org_slug, "loaded config");

    let token = sentry_config::auth::resolve_token(config.auth_token.as_deref()).map(SecretString::from);
    let options = ClientOptions::new(config.base_url(), &config.org_slug)
        .with_max_pages(config.pagination.max_pages);
    let client = SentryClient::new(options, token, config.tls_skip_verify)?;
    let datasource = Datasource::new(client);

    let content = std::fs::read_to_string(&args.queries)
        .with_context(|| format!("reading {}", args.queries.display()))?;
    let descriptions: Vec<serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of queries", args.queries.display()))?;

    let request = QueryDataRequest::from_descriptions(descriptions, args.time_range()?);
    info!(queries = request.queries.len(), "running queries");
    let response = datasource.query_data(&request).await;

    let stdout = std::io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), &response)?;
    println!();

    Ok(())
}
