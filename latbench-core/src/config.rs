use crate::{
    generate_labels, OperationLabels, DEFAULT_BEANSTALKD_ADDR, DEFAULT_ITERATIONS,
    DEFAULT_REDIS_URL, DEFAULT_SNAPSHOT_CADENCE, DEFAULT_TOKEN_LEN, SNAPSHOTS_DISABLED,
};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The benchmarked operations, in the order a full run executes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScenarioKind {
    QueuePut,
    QueueReserve,
    StoreSetSnapshot,
    StoreSetWriteLog,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::QueuePut,
        ScenarioKind::QueueReserve,
        ScenarioKind::StoreSetSnapshot,
        ScenarioKind::StoreSetWriteLog,
    ];

    /// Short name used on the command line and in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::QueuePut => "queue-put",
            ScenarioKind::QueueReserve => "queue-reserve",
            ScenarioKind::StoreSetSnapshot => "store-set-snapshot",
            ScenarioKind::StoreSetWriteLog => "store-set-write-log",
        }
    }

    /// Human readable title for the progress line.
    pub fn title(&self) -> &'static str {
        match self {
            ScenarioKind::QueuePut => "Beanstalkd PUT",
            ScenarioKind::QueueReserve => "Beanstalkd RESERVE",
            ScenarioKind::StoreSetSnapshot => "Redis SET with RDB",
            ScenarioKind::StoreSetWriteLog => "Redis SET with AOF",
        }
    }

    pub fn labels(&self) -> OperationLabels {
        match self {
            ScenarioKind::QueuePut => generate_labels!("queue_put"),
            ScenarioKind::QueueReserve => generate_labels!("queue_reserve"),
            ScenarioKind::StoreSetSnapshot => generate_labels!("store_set_snapshot"),
            ScenarioKind::StoreSetWriteLog => generate_labels!("store_set_write_log"),
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error(
    "Unknown scenario `{0}`, expected one of: \
     queue-put, queue-reserve, store-set-snapshot, store-set-write-log"
)]
pub struct ParseScenarioError(String);

impl FromStr for ScenarioKind {
    type Err = ParseScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ParseScenarioError(s.to_string()))
    }
}

/// Server-side persistence settings applied to the store before a scenario starts timing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Durability {
    /// Append-only write log on or off.
    pub write_log: bool,
    /// Snapshot cadence in the store's own syntax; empty disables snapshots.
    pub snapshot_cadence: String,
}

impl Durability {
    pub fn snapshot(cadence: &str) -> Self {
        Self {
            write_log: false,
            snapshot_cadence: cadence.to_string(),
        }
    }

    pub fn write_log() -> Self {
        Self {
            write_log: true,
            snapshot_cadence: SNAPSHOTS_DISABLED.to_string(),
        }
    }
}

/// Settings for a whole process run.
#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub iterations: usize,
    pub token_len: usize,
    pub redis_url: String,
    pub beanstalkd_addr: String,
    pub snapshot_cadence: String,
    /// Fixed seed for token generation. `None` seeds from the clock.
    pub seed: Option<u64>,
    /// Scenarios to run. Always executed in [`ScenarioKind::ALL`] order.
    pub scenarios: Vec<ScenarioKind>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            token_len: DEFAULT_TOKEN_LEN,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            beanstalkd_addr: DEFAULT_BEANSTALKD_ADDR.to_string(),
            snapshot_cadence: DEFAULT_SNAPSHOT_CADENCE.to_string(),
            seed: None,
            scenarios: ScenarioKind::ALL.to_vec(),
        }
    }
}

impl BenchConfig {
    /// Selected scenarios, deduplicated and in the fixed run order.
    pub fn scenario_order(&self) -> Vec<ScenarioKind> {
        ScenarioKind::ALL
            .into_iter()
            .filter(|kind| self.scenarios.contains(kind))
            .collect()
    }

    pub fn scenario(&self, kind: ScenarioKind) -> ScenarioConfig {
        let durability = match kind {
            ScenarioKind::StoreSetSnapshot => Some(Durability::snapshot(&self.snapshot_cadence)),
            ScenarioKind::StoreSetWriteLog => Some(Durability::write_log()),
            ScenarioKind::QueuePut | ScenarioKind::QueueReserve => None,
        };

        ScenarioConfig {
            kind,
            iterations: self.iterations,
            token_len: self.token_len,
            durability,
        }
    }
}

/// Immutable description of one scenario run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioConfig {
    pub kind: ScenarioKind,
    pub iterations: usize,
    pub token_len: usize,
    /// Only store scenarios carry durability settings.
    pub durability: Option<Durability>,
}
