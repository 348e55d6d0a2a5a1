//! Round-trip latency harness for a key-value store and a job queue.
//!
//! Each scenario opens its own connection, applies any durability settings, times a fixed
//! number of sequential calls and prints the mean and tail percentiles in nanoseconds.
pub mod error;
pub mod report;
pub mod sampler;
pub mod scenario;
pub mod service;
pub mod token;
#[doc(hidden)]
pub mod transaction;

pub use scenario::Benchmark;

pub mod prelude {
    pub use crate::error::{BenchError, ServiceError};
    pub use crate::scenario::Benchmark;
    pub use crate::token::TokenGenerator;
    pub use latbench_core::{BenchConfig, ScenarioKind, Summary};
}
