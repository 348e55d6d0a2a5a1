mod utils;
#[allow(unused)]
use utils::*;

#[cfg(feature = "integration")]
mod tests {
    use super::*;
    use latbench::prelude::*;

    // Requires Redis on localhost:6379 and beanstalkd on localhost:11300.
    #[tokio::test]
    async fn local_servers() {
        init();

        let config = BenchConfig {
            iterations: 1_000,
            ..Default::default()
        };
        let mut out = Vec::new();
        let results = Benchmark::new(config).run(&mut out).await.unwrap();

        assert_eq!(results.len(), 4);
        for (kind, summary) in results {
            assert!(summary.mean > 0., "{kind}: {summary:?}");
            assert!(summary.p90 <= summary.p99, "{kind}: {summary:?}");
        }
    }
}
