use std::time::Duration;

/// Iterations run by every scenario unless overridden.
pub const DEFAULT_ITERATIONS: usize = 1_000_000;

/// Length of the random key/payload generated for each iteration.
pub const DEFAULT_TOKEN_LEN: usize = 5;

pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379/";
pub const DEFAULT_BEANSTALKD_ADDR: &str = "localhost:11300";

/// Snapshot cadence for the durable-snapshot scenario: save after 1 second if at least
/// 10 keys changed.
pub const DEFAULT_SNAPSHOT_CADENCE: &str = "1 10";

/// An empty cadence turns snapshots off entirely.
pub const SNAPSHOTS_DISABLED: &str = "";

/// Value written by every store `SET`.
pub const STORE_VALUE: &str = "value";

pub const QUEUE_PRIORITY: u32 = 1;
pub const QUEUE_DELAY: Duration = Duration::ZERO;
pub const QUEUE_TIME_TO_RUN: Duration = Duration::from_secs(120);

/// Wait timeout handed to `reserve-with-timeout`. Zero means the server answers
/// immediately, either with a job or `TIMED_OUT`.
pub const QUEUE_RESERVE_TIMEOUT: Duration = Duration::ZERO;
