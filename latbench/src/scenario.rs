//! Scenario orchestration and reporting
use crate::error::BenchError;
use crate::report::{write_progress, write_summary};
use crate::sampler::Sampler;
use crate::service::{
    BeanstalkdClient, DurabilityControl, Operation, QueuePut, QueueReserve, RedisStore,
};
use crate::token::TokenGenerator;
use crate::transaction;
use latbench_core::{BenchConfig, Durability, ScenarioConfig, ScenarioKind, Summary};
use std::io::Write;
use std::time::{Duration, Instant};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// A full benchmark run: every selected scenario, one after another, in the fixed order.
///
/// # Example
/// ```no_run
/// use latbench::prelude::*;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), BenchError> {
///     let mut bench = Benchmark::new(BenchConfig::default());
///     bench.run(&mut std::io::stdout()).await?;
///     Ok(())
/// }
/// ```
pub struct Benchmark {
    config: BenchConfig,
    tokens: TokenGenerator,
}

impl Benchmark {
    pub fn new(config: BenchConfig) -> Self {
        let tokens = match config.seed {
            Some(seed) => TokenGenerator::with_seed(seed),
            None => TokenGenerator::from_time(),
        };
        Self { config, tokens }
    }

    /// Run all scenarios, writing a progress line and a report block for each to `out`.
    ///
    /// The first failure aborts the run. Reports already written stay written; the failing
    /// scenario gets none.
    pub async fn run<W: Write>(
        &mut self,
        out: &mut W,
    ) -> Result<Vec<(ScenarioKind, Summary)>, BenchError> {
        info!(
            seed = self.tokens.seed(),
            iterations = self.config.iterations,
            "Starting benchmark"
        );

        let mut results = vec![];
        for kind in self.config.scenario_order() {
            let scenario = self.config.scenario(kind);
            write_progress(out, kind, scenario.iterations).map_err(BenchError::Report)?;

            let start = Instant::now();
            let summary = run_scenario(&scenario, &self.config, &mut self.tokens).await?;
            info!(
                elapsed = %humantime::format_duration(round_to_millis(start.elapsed())),
                min = summary.min,
                max = summary.max,
                "{kind} finished"
            );

            write_summary(out, &summary).map_err(BenchError::Report)?;
            results.push((kind, summary));
        }

        Ok(results)
    }
}

/// Connect to the scenario's service, configure it, sample and summarize.
#[instrument(name = "scenario", skip_all, fields(name = config.kind.name()))]
pub async fn run_scenario(
    config: &ScenarioConfig,
    bench: &BenchConfig,
    tokens: &mut TokenGenerator,
) -> Result<Summary, BenchError> {
    transaction::describe(config.kind.labels());

    match config.kind {
        ScenarioKind::QueuePut => {
            let mut client = connect_queue(config.kind, &bench.beanstalkd_addr)?;
            sample_target(config, tokens, &mut QueuePut::new(&mut client)).await
        }
        ScenarioKind::QueueReserve => {
            let mut client = connect_queue(config.kind, &bench.beanstalkd_addr)?;
            sample_target(config, tokens, &mut QueueReserve::new(&mut client)).await
        }
        ScenarioKind::StoreSetSnapshot | ScenarioKind::StoreSetWriteLog => {
            let mut store = connect_store(config.kind, &bench.redis_url).await?;
            if let Some(durability) = &config.durability {
                apply_durability(config.kind, &mut store, durability).await?;
            }
            sample_target(config, tokens, &mut store).await
        }
    }
}

/// Sample an already connected and configured target, then summarize.
pub async fn sample_target<T: Operation>(
    config: &ScenarioConfig,
    tokens: &mut TokenGenerator,
    target: &mut T,
) -> Result<Summary, BenchError> {
    let mut sampler = Sampler::new(tokens, config);
    debug!(iterations = config.iterations, "Sampling");
    sampler.sample(target, config.iterations).await?;

    let summary = sampler.into_samples().summarize()?;
    debug!(?summary, "Summarized");
    Ok(summary)
}

/// Apply both durability settings, write log first, exactly once.
pub async fn apply_durability<D: DurabilityControl>(
    scenario: ScenarioKind,
    store: &mut D,
    durability: &Durability,
) -> Result<(), BenchError> {
    debug!(?durability, "Configuring durability");

    store
        .set_write_log(durability.write_log)
        .await
        .map_err(|source| BenchError::Configuration {
            scenario,
            setting: format!("write-log={}", durability.write_log),
            source,
        })?;

    store
        .set_snapshot_cadence(&durability.snapshot_cadence)
        .await
        .map_err(|source| BenchError::Configuration {
            scenario,
            setting: format!("snapshot-cadence={:?}", durability.snapshot_cadence),
            source,
        })
}

fn connect_queue(scenario: ScenarioKind, addr: &str) -> Result<BeanstalkdClient, BenchError> {
    BeanstalkdClient::connect(addr).map_err(|source| BenchError::Connection {
        scenario,
        service: "beanstalkd",
        addr: addr.to_string(),
        source,
    })
}

async fn connect_store(scenario: ScenarioKind, url: &str) -> Result<RedisStore, BenchError> {
    RedisStore::connect(url)
        .await
        .map_err(|source| BenchError::Connection {
            scenario,
            service: "redis",
            addr: url.to_string(),
            source,
        })
}

fn round_to_millis(elapsed: Duration) -> Duration {
    Duration::from_millis(elapsed.as_millis() as u64)
}
