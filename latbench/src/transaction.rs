use latbench_core::OperationLabels;
use std::future::Future;
use std::time::{Duration, Instant};

/// Time a single operation.
///
/// The clock starts right before `op` is polled for the first time and stops as soon as it
/// resolves, whether it succeeded or not. A failed operation yields its error and no
/// duration.
pub async fn timed<F, R, E>(labels: OperationLabels, op: F) -> Result<Duration, E>
where
    F: Future<Output = Result<R, E>>,
{
    let start = Instant::now();
    let res = op.await;
    let elapsed = start.elapsed();

    #[cfg(feature = "metrics")]
    {
        metrics::histogram!(labels.latency).record(elapsed.as_nanos() as f64);
        if res.is_ok() {
            metrics::counter!(labels.success).increment(1);
        } else {
            metrics::counter!(labels.error).increment(1);
        }
    }
    #[cfg(not(feature = "metrics"))]
    let _ = labels;

    res.map(|_| elapsed)
}

/// Register units and descriptions for a scenario's metrics.
pub fn describe(labels: OperationLabels) {
    #[cfg(feature = "metrics")]
    {
        metrics::describe_histogram!(
            labels.latency,
            metrics::Unit::Nanoseconds,
            "Round-trip latency of one operation"
        );
        metrics::describe_counter!(labels.success, "Operations that succeeded");
        metrics::describe_counter!(labels.error, "Operations that failed");
    }
    #[cfg(not(feature = "metrics"))]
    let _ = labels;
}
