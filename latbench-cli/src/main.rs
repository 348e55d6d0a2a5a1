use anyhow::Context;
use clap::Parser;
use latbench::prelude::*;
use latbench_core::{
    DEFAULT_BEANSTALKD_ADDR, DEFAULT_ITERATIONS, DEFAULT_REDIS_URL, DEFAULT_SNAPSHOT_CADENCE,
    DEFAULT_TOKEN_LEN,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Measure round-trip latency of beanstalkd PUT/RESERVE and Redis SET under both
/// persistence modes.
#[derive(Parser, Debug)]
#[command(name = "latbench", version, about)]
struct Cli {
    /// Timed calls per scenario.
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_ITERATIONS as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    iterations: u64,

    #[arg(long, default_value = DEFAULT_REDIS_URL)]
    redis_url: String,

    /// beanstalkd address as HOST:PORT.
    #[arg(long, default_value = DEFAULT_BEANSTALKD_ADDR)]
    beanstalkd: String,

    /// Redis `save` value used by the snapshot scenario.
    #[arg(long, default_value = DEFAULT_SNAPSHOT_CADENCE)]
    snapshot_cadence: String,

    /// Seed for key generation. Defaults to the current time.
    #[arg(long)]
    seed: Option<u64>,

    /// Run only these scenarios (repeatable). They still run in the fixed order.
    #[arg(short, long = "scenario")]
    scenarios: Vec<ScenarioKind>,

    /// Serve Prometheus metrics on this address while the benchmark runs.
    #[arg(long)]
    prometheus: Option<SocketAddr>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<BenchConfig> {
        let scenarios = if self.scenarios.is_empty() {
            ScenarioKind::ALL.to_vec()
        } else {
            self.scenarios
        };

        Ok(BenchConfig {
            iterations: usize::try_from(self.iterations).context("iteration count too large")?,
            token_len: DEFAULT_TOKEN_LEN,
            redis_url: self.redis_url,
            beanstalkd_addr: self.beanstalkd,
            snapshot_cadence: self.snapshot_cadence,
            seed: self.seed,
            scenarios,
        })
    }
}

fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("latbench=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Installed before the runtime exists so the exporter gets its own thread and keeps
    // serving while a blocking queue call holds the benchmark thread.
    if let Some(addr) = cli.prometheus {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to install Prometheus exporter")?;
        info!(%addr, "Serving metrics");
    }

    let config = cli.into_config()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: BenchConfig) -> anyhow::Result<()> {
    let mut bench = Benchmark::new(config);
    let mut stdout = std::io::stdout().lock();

    if let Err(err) = bench.run(&mut stdout).await {
        error!("Benchmark aborted: {err}");
        let context = abort_context(&err);
        return Err(err).context(context);
    }

    info!("All scenarios completed");
    Ok(())
}

fn abort_context(err: &BenchError) -> String {
    match err.scenario() {
        Some(kind) => format!("scenario {kind} aborted the benchmark"),
        None => "benchmark aborted".to_string(),
    }
}
