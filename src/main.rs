//! Runs a batch of mock API calls through the wave dispatcher and prints a summary.
//!
//! Run with: `cargo run -- 100 20 2` (calls, concurrency, retries)

use clap::Parser;
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use wave_dispatch::{
    Arguments, DispatchConfig, LogCrateSink, Logger, MockApi, RetryableTask, WaveDispatcher,
    predicate,
};

#[derive(Debug, Parser)]
#[command(name = "wave-dispatch", version, about)]
struct Cli {
    /// Number of calls to dispatch
    calls: Option<usize>,

    /// Maximum number of calls running at once
    concurrency: Option<usize>,

    /// Retry budget for every call
    retries: Option<u32>,

    /// Probability that a mock call fails
    #[arg(long)]
    fail_rate: Option<f64>,

    /// Delay before the first retry, in seconds
    #[arg(long)]
    initial_delay: Option<f64>,

    /// Minimum simulated latency of a call, in seconds
    #[arg(long, default_value_t = 1.0)]
    min_latency: f64,

    /// Maximum simulated latency of a call, in seconds
    #[arg(long, default_value_t = 2.0)]
    max_latency: f64,

    /// Suppress progress lines
    #[arg(long = "no-logs", alias = "noLogs")]
    no_logs: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Load settings from a JSON file; positional arguments and flags override it
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> wave_dispatch::Result<DispatchConfig> {
        let mut config = match &self.config {
            Some(path) => DispatchConfig::from_file(path)?,
            None => DispatchConfig::default(),
        };
        if let Some(calls) = self.calls {
            config.calls = calls;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        if let Some(fail_rate) = self.fail_rate {
            config.fail_rate = fail_rate;
        }
        if let Some(initial_delay) = self.initial_delay {
            config.initial_delay_secs = initial_delay;
        }
        if self.no_logs {
            config.verbose = false;
        }
        config.validate()?;
        Ok(config)
    }
}

fn latency(seconds: f64) -> Result<Duration, String> {
    Duration::try_from_secs_f64(seconds).map_err(|e| format!("invalid latency {seconds}: {e}"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let print_json = cli.json;
    let (min_latency, max_latency) = (latency(cli.min_latency)?, latency(cli.max_latency)?);
    let config = cli.into_config()?;

    let default_filter = if config.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    debug!("Starting with {config:?}");

    let logger = Logger::new(config.verbose, Arc::new(LogCrateSink));
    let api = Arc::new(
        MockApi::new(config.fail_rate)
            .with_latency(min_latency, max_latency)
            .with_logger(logger.clone()),
    );
    let retry = config.retry_config();

    let tasks = (0..config.calls)
        .map(|i| {
            RetryableTask::from_config(
                api.clone(),
                Arguments::list([i]),
                &retry,
                predicate::on_null_or_error(),
            )
        })
        .collect::<wave_dispatch::Result<Vec<_>>>()?;

    let report = WaveDispatcher::new(config.concurrency)?
        .with_logger(logger)
        .run(tasks)
        .await;

    println!("{report}");
    if print_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if config.verbose {
        println!("Result: {}", serde_json::to_string(&report.results)?);
    }

    Ok(())
}
