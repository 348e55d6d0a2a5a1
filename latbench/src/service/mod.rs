//! Clients for the benchmarked services and the capabilities the scenarios need from them.
use crate::error::ServiceError;

mod queue;
mod store;

pub use self::queue::{BeanstalkdClient, Job, QueuePut, QueueReserve};
pub use self::store::RedisStore;

/// One benchmarked call. Invoked once per iteration with a freshly generated token.
#[allow(async_fn_in_trait)]
pub trait Operation {
    async fn call(&mut self, token: &str) -> Result<(), ServiceError>;
}

/// Persistence knobs of a key-value store.
#[allow(async_fn_in_trait)]
pub trait DurabilityControl {
    async fn set_write_log(&mut self, on: bool) -> Result<(), ServiceError>;

    /// `spec` is in the store's own cadence syntax. An empty string disables snapshots.
    async fn set_snapshot_cadence(&mut self, spec: &str) -> Result<(), ServiceError>;
}
