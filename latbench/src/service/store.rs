use super::{DurabilityControl, Operation};
use crate::error::ServiceError;
use latbench_core::STORE_VALUE;
use redis::aio::MultiplexedConnection;
use redis::Client;
#[allow(unused)]
use tracing::{debug, trace};

/// A connection to a Redis server.
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Open a connection and make sure the server answers `PING`.
    pub async fn connect(url: &str) -> Result<Self, ServiceError> {
        let client = Client::open(url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!(url, reply = %pong, "connected to redis");
        Ok(Self { conn })
    }

    pub async fn set(&mut self, key: &str, value: &str) -> Result<(), ServiceError> {
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async::<_, ()>(&mut self.conn)
            .await?;
        Ok(())
    }

    async fn config_set(&mut self, parameter: &str, value: &str) -> Result<(), ServiceError> {
        trace!(parameter, value, "CONFIG SET");
        redis::cmd("CONFIG")
            .arg("SET")
            .arg(parameter)
            .arg(value)
            .query_async::<_, ()>(&mut self.conn)
            .await?;
        Ok(())
    }
}

impl DurabilityControl for RedisStore {
    async fn set_write_log(&mut self, on: bool) -> Result<(), ServiceError> {
        self.config_set("appendonly", if on { "yes" } else { "no" })
            .await
    }

    async fn set_snapshot_cadence(&mut self, spec: &str) -> Result<(), ServiceError> {
        self.config_set("save", spec).await
    }
}

impl Operation for RedisStore {
    async fn call(&mut self, token: &str) -> Result<(), ServiceError> {
        self.set(token, STORE_VALUE).await
    }
}
