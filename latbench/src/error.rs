use latbench_core::{ScenarioKind, StatsError};
use thiserror::Error;

/// Failure of a single call to an external service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Beanstalkd error: {0}")]
    Beanstalkd(String),

    #[error("Invalid service address `{0}`, expected HOST:PORT")]
    Address(String),
}

impl From<beanstalkc::BeanstalkcError> for ServiceError {
    fn from(err: beanstalkc::BeanstalkcError) -> Self {
        ServiceError::Beanstalkd(err.to_string())
    }
}

/// Every way a benchmark run can abort. None of these are retried.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("{scenario}: failed to connect to {service} at {addr}: {source}")]
    Connection {
        scenario: ScenarioKind,
        service: &'static str,
        addr: String,
        source: ServiceError,
    },

    #[error("{scenario}: durability setting `{setting}` was rejected: {source}")]
    Configuration {
        scenario: ScenarioKind,
        setting: String,
        source: ServiceError,
    },

    #[error("{scenario} failed on iteration {iteration}: {source}")]
    Operation {
        scenario: ScenarioKind,
        iteration: usize,
        source: ServiceError,
    },

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error("Failed to write report: {0}")]
    Report(#[source] std::io::Error),
}

impl BenchError {
    /// The scenario that was running when the benchmark aborted, if the failure belongs to one.
    pub fn scenario(&self) -> Option<ScenarioKind> {
        match self {
            BenchError::Connection { scenario, .. }
            | BenchError::Configuration { scenario, .. }
            | BenchError::Operation { scenario, .. } => Some(*scenario),
            BenchError::Stats(_) | BenchError::Report(_) => None,
        }
    }
}
