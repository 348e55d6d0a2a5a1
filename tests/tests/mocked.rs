//! The queue client blocks its thread, so these run on a multi-threaded runtime: the test
//! body drives the benchmark while the mocks are served by the worker threads.
mod utils;
#[allow(unused)]
use utils::*;

use latbench::prelude::*;
use mock_service::prelude::*;

struct Services {
    redis: MockHandle,
    beanstalkd: MockHandle,
}

async fn services(redis: MockConfig, beanstalkd: MockConfig) -> Services {
    init();
    Services {
        redis: spawn_redis(redis).await.unwrap(),
        beanstalkd: spawn_beanstalkd(beanstalkd).await.unwrap(),
    }
}

fn config(services: &Services, iterations: usize) -> BenchConfig {
    BenchConfig {
        iterations,
        redis_url: services.redis.redis_url(),
        beanstalkd_addr: services.beanstalkd.addr.to_string(),
        seed: Some(5),
        ..Default::default()
    }
}

fn count_lines(out: &[u8], prefix: &str) -> usize {
    String::from_utf8_lossy(out)
        .lines()
        .filter(|line| line.starts_with(prefix))
        .count()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ntest::timeout(30000)]
async fn full_run() {
    let services = services(MockConfig::default(), MockConfig::default()).await;
    let mut out = Vec::new();

    let results = Benchmark::new(config(&services, 200))
        .run(&mut out)
        .await
        .unwrap();

    let kinds: Vec<_> = results.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(kinds, ScenarioKind::ALL.to_vec());
    for (_, summary) in &results {
        assert_eq!(summary.count, 200);
        assert!(summary.p90 <= summary.p99);
        assert!(summary.min <= summary.p90 && summary.p99 <= summary.max);
    }

    let text = String::from_utf8(out.clone()).unwrap();
    let progress: Vec<_> = text
        .lines()
        .filter(|line| line.starts_with("Benchmarking"))
        .collect();
    assert_eq!(
        progress,
        vec![
            "Benchmarking Beanstalkd PUT -- 200(iterations)",
            "Benchmarking Beanstalkd RESERVE -- 200(iterations)",
            "Benchmarking Redis SET with RDB -- 200(iterations)",
            "Benchmarking Redis SET with AOF -- 200(iterations)",
        ]
    );
    assert_eq!(count_lines(&out, "====="), 4);
    assert_eq!(count_lines(&out, "Mean ----->  "), 4);
    assert_eq!(count_lines(&out, "(99 Percentile) ----->  "), 4);

    {
        let queue = services.beanstalkd.state();
        assert_eq!(queue.puts, 200);
        assert_eq!(queue.reserves, 200);
        assert!(queue.ready.is_empty());
        assert_eq!(queue.connections, 2);
    }

    let store = services.redis.state();
    assert!(store.pings >= 2);
    assert_eq!(
        store.config_sets,
        vec![
            ("appendonly".to_string(), "no".to_string()),
            ("save".to_string(), "1 10".to_string()),
            ("appendonly".to_string(), "yes".to_string()),
            ("save".to_string(), "".to_string()),
        ]
    );
    assert!(store.keys.keys().all(|key| key.len() == 5));
    assert!(store.keys.values().all(|value| value == "value"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ntest::timeout(30000)]
async fn store_failure_keeps_earlier_reports() {
    let redis = MockConfig {
        fail_after: Some(1),
        ..Default::default()
    };
    let services = services(redis, MockConfig::default()).await;
    let mut out = Vec::new();

    let err = Benchmark::new(config(&services, 1000))
        .run(&mut out)
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            BenchError::Operation {
                scenario: ScenarioKind::StoreSetSnapshot,
                iteration: 2,
                source: ServiceError::Redis(_),
            }
        ),
        "{err:?}"
    );
    assert_eq!(count_lines(&out, "Benchmarking"), 3);
    assert_eq!(count_lines(&out, "====="), 2);
    assert_eq!(services.redis.state().keys.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ntest::timeout(30000)]
async fn rejected_durability_setting_aborts() {
    let redis = MockConfig {
        reject_config: true,
        ..Default::default()
    };
    let services = services(redis, MockConfig::default()).await;
    let mut bench_config = config(&services, 10);
    bench_config.scenarios = vec![ScenarioKind::StoreSetWriteLog];
    let mut out = Vec::new();

    let err = Benchmark::new(bench_config).run(&mut out).await.unwrap_err();

    assert!(
        matches!(
            err,
            BenchError::Configuration {
                scenario: ScenarioKind::StoreSetWriteLog,
                ..
            }
        ),
        "{err:?}"
    );
    assert_eq!(count_lines(&out, "====="), 0);
    assert_eq!(services.redis.state().ops, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ntest::timeout(30000)]
async fn reserve_on_empty_queue_times_out() {
    let services = services(MockConfig::default(), MockConfig::default()).await;
    let mut bench_config = config(&services, 10);
    bench_config.scenarios = vec![ScenarioKind::QueueReserve];
    let mut out = Vec::new();

    let err = Benchmark::new(bench_config).run(&mut out).await.unwrap_err();

    assert!(
        matches!(
            err,
            BenchError::Operation {
                scenario: ScenarioKind::QueueReserve,
                iteration: 1,
                source: ServiceError::Beanstalkd(_),
            }
        ),
        "{err:?}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ntest::timeout(30000)]
async fn added_latency_shows_in_percentiles() {
    let slow = MockConfig {
        delay: Some(std::time::Duration::from_millis(2)),
        ..Default::default()
    };
    let services = services(MockConfig::default(), slow).await;
    let mut bench_config = config(&services, 50);
    bench_config.scenarios = vec![ScenarioKind::QueuePut];
    let mut out = Vec::new();

    let results = Benchmark::new(bench_config).run(&mut out).await.unwrap();

    let (_, summary) = &results[0];
    // tokio timers never fire early, so every call takes at least ~1ms
    assert!(summary.mean >= 1_000_000., "{summary:?}");
    assert!(summary.p99 >= summary.p90);
}
