use super::Operation;
use crate::error::ServiceError;
use beanstalkc::Beanstalkc;
use latbench_core::{QUEUE_DELAY, QUEUE_PRIORITY, QUEUE_RESERVE_TIMEOUT, QUEUE_TIME_TO_RUN};
use std::time::Duration;
#[allow(unused)]
use tracing::{debug, trace};

/// One blocking beanstalkd connection. All jobs go to the `default` tube.
///
/// Calls block the current thread until the server answers, so at most one is in flight.
pub struct BeanstalkdClient {
    conn: Beanstalkc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: u64,
    pub body: Vec<u8>,
}

impl BeanstalkdClient {
    /// Connect to `addr`, given as `HOST:PORT`.
    pub fn connect(addr: &str) -> Result<Self, ServiceError> {
        let (host, port) = split_addr(addr)?;
        let conn = Beanstalkc::new().host(host).port(port).connect()?;
        debug!(addr, "connected to beanstalkd");
        Ok(Self { conn })
    }

    /// Enqueue `body`, returning the new job id.
    pub fn put(
        &mut self,
        body: &[u8],
        priority: u32,
        delay: Duration,
        time_to_run: Duration,
    ) -> Result<u64, ServiceError> {
        Ok(self.conn.put(body, priority, delay, time_to_run)?)
    }

    /// Reserve the next ready job, waiting at most `timeout` for one.
    ///
    /// With a zero timeout an empty tube answers `TIMED_OUT` immediately, which surfaces as
    /// an error.
    pub fn reserve_with_timeout(&mut self, timeout: Duration) -> Result<Job, ServiceError> {
        let job = self.conn.reserve_with_timeout(timeout)?;
        Ok(Job {
            id: job.id(),
            body: job.body().to_vec(),
        })
    }
}

fn split_addr(addr: &str) -> Result<(&str, u16), ServiceError> {
    let invalid = || ServiceError::Address(addr.to_string());
    let (host, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() {
        return Err(invalid());
    }
    let port = port.parse().map_err(|_| invalid())?;
    Ok((host, port))
}

/// Enqueue the token as the job body.
pub struct QueuePut<'a> {
    client: &'a mut BeanstalkdClient,
}

impl<'a> QueuePut<'a> {
    pub fn new(client: &'a mut BeanstalkdClient) -> Self {
        Self { client }
    }
}

impl Operation for QueuePut<'_> {
    async fn call(&mut self, token: &str) -> Result<(), ServiceError> {
        self.client
            .put(token.as_bytes(), QUEUE_PRIORITY, QUEUE_DELAY, QUEUE_TIME_TO_RUN)?;
        Ok(())
    }
}

/// Reserve whatever job is next. The token is unused; reserved jobs are left to expire.
pub struct QueueReserve<'a> {
    client: &'a mut BeanstalkdClient,
}

impl<'a> QueueReserve<'a> {
    pub fn new(client: &'a mut BeanstalkdClient) -> Self {
        Self { client }
    }
}

impl Operation for QueueReserve<'_> {
    async fn call(&mut self, _token: &str) -> Result<(), ServiceError> {
        let job = self.client.reserve_with_timeout(QUEUE_RESERVE_TIMEOUT)?;
        trace!(id = job.id, "reserved job");
        Ok(())
    }
}
