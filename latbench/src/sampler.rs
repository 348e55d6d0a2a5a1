use crate::error::BenchError;
use crate::service::Operation;
use crate::token::TokenGenerator;
use crate::transaction::timed;
use latbench_core::{OperationLabels, SampleCollector, ScenarioConfig, ScenarioKind};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

const PROGRESS_INTERVAL: usize = 100_000;

/// Drives one operation repeatedly and collects one latency sample per successful call.
pub struct Sampler<'a> {
    tokens: &'a mut TokenGenerator,
    kind: ScenarioKind,
    labels: OperationLabels,
    token_len: usize,
    samples: SampleCollector,
}

impl<'a> Sampler<'a> {
    pub fn new(tokens: &'a mut TokenGenerator, config: &ScenarioConfig) -> Self {
        Self {
            tokens,
            kind: config.kind,
            labels: config.kind.labels(),
            token_len: config.token_len,
            samples: SampleCollector::with_capacity(config.iterations),
        }
    }

    /// Run `iterations` timed calls against `target`.
    ///
    /// Stops at the first failure. Samples taken before the failure stay in the collector.
    pub async fn sample<T: Operation>(
        &mut self,
        target: &mut T,
        iterations: usize,
    ) -> Result<(), BenchError> {
        for iteration in 1..=iterations {
            let token = self.tokens.token(self.token_len);
            let elapsed = timed(self.labels, target.call(&token))
                .await
                .map_err(|source| BenchError::Operation {
                    scenario: self.kind,
                    iteration,
                    source,
                })?;
            self.samples.push_elapsed(elapsed);

            if iteration % PROGRESS_INTERVAL == 0 {
                debug!(iteration, "sampling");
            }
        }
        Ok(())
    }

    pub fn samples(&self) -> &SampleCollector {
        &self.samples
    }

    pub fn into_samples(self) -> SampleCollector {
        self.samples
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ServiceError;
    use latbench_core::{BenchConfig, ScenarioKind};
    use std::time::Duration;

    /// Sleeps a little on every call and fails on `fail_on`, if set.
    pub(crate) struct MockOperation {
        pub calls: usize,
        pub fail_on: Option<usize>,
        pub tokens: Vec<String>,
    }

    impl MockOperation {
        pub fn new(fail_on: Option<usize>) -> Self {
            Self {
                calls: 0,
                fail_on,
                tokens: vec![],
            }
        }
    }

    impl Operation for MockOperation {
        async fn call(&mut self, token: &str) -> Result<(), ServiceError> {
            self.calls += 1;
            self.tokens.push(token.to_string());
            if Some(self.calls) == self.fail_on {
                return Err(ServiceError::Beanstalkd("INTERNAL_ERROR".into()));
            }
            tokio::time::sleep(Duration::from_micros(10)).await;
            Ok(())
        }
    }

    fn config(iterations: usize) -> ScenarioConfig {
        BenchConfig {
            iterations,
            ..Default::default()
        }
        .scenario(ScenarioKind::QueuePut)
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn one_sample_per_iteration() {
        let mut tokens = TokenGenerator::with_seed(3);
        let config = config(50);
        let mut sampler = Sampler::new(&mut tokens, &config);
        let mut op = MockOperation::new(None);

        sampler.sample(&mut op, config.iterations).await.unwrap();

        assert_eq!(sampler.samples().len(), 50);
        assert!(sampler
            .samples()
            .as_slice()
            .iter()
            .all(|ns| *ns >= 10_000.));
        assert_eq!(op.calls, 50);
        assert!(op.tokens.iter().all(|t| t.len() == 5));
    }

    #[tokio::test]
    async fn failure_on_second_iteration_keeps_first_sample() {
        let mut tokens = TokenGenerator::with_seed(3);
        let config = config(1000);
        let mut sampler = Sampler::new(&mut tokens, &config);
        let mut op = MockOperation::new(Some(2));

        let err = sampler.sample(&mut op, config.iterations).await.unwrap_err();

        assert!(matches!(
            err,
            BenchError::Operation {
                scenario: ScenarioKind::QueuePut,
                iteration: 2,
                ..
            }
        ));
        assert_eq!(sampler.samples().len(), 1);
        assert_eq!(op.calls, 2);
    }
}
