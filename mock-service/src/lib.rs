//! In-process stand-ins for Redis and beanstalkd.
//!
//! Both speak just enough of their wire protocol for the latbench scenarios and can be told
//! to reject configuration, fail after a number of operations, or add latency.
use anyhow::{bail, Context};
use rand_distr::{Distribution, Normal};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::{debug, error};

pub mod prelude {
    pub use crate::{
        bind_beanstalkd, bind_redis, spawn_beanstalkd, spawn_redis, MockConfig, MockHandle,
        MockState,
    };
}

#[derive(Clone, Debug, Default)]
pub struct MockConfig {
    /// Every operation after the first `n` (SET, put, reserve) fails.
    pub fail_after: Option<u64>,
    /// Answer every `CONFIG SET` with an error.
    pub reject_config: bool,
    /// Mean added latency per operation, with 25% standard deviation.
    pub delay: Option<Duration>,
}

/// What the mock has seen so far, shared by all its connections.
#[derive(Debug, Default)]
pub struct MockState {
    pub connections: u64,
    pub pings: u64,
    pub config_sets: Vec<(String, String)>,
    pub keys: HashMap<String, String>,
    pub puts: u64,
    pub reserves: u64,
    pub ready: VecDeque<(u64, Vec<u8>)>,
    /// Successful plus failed operations.
    pub ops: u64,
    next_id: u64,
}

impl MockState {
    fn next_op_fails(&mut self, config: &MockConfig) -> bool {
        self.ops += 1;
        config.fail_after.is_some_and(|n| self.ops > n)
    }
}

type Shared = Arc<Mutex<MockState>>;

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running mock server. The server stops when the handle is dropped.
pub struct MockHandle {
    pub addr: SocketAddr,
    state: Shared,
    task: JoinHandle<()>,
}

impl MockHandle {
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        lock(&self.state)
    }

    /// Operations seen so far, successful or not.
    pub fn ops(&self) -> u64 {
        self.state().ops
    }

    pub fn redis_url(&self) -> String {
        format!("redis://{}/", self.addr)
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Fake Redis on an ephemeral localhost port.
pub async fn spawn_redis(config: MockConfig) -> anyhow::Result<MockHandle> {
    bind_redis(EPHEMERAL.parse()?, config).await
}

/// Fake beanstalkd on an ephemeral localhost port.
pub async fn spawn_beanstalkd(config: MockConfig) -> anyhow::Result<MockHandle> {
    bind_beanstalkd(EPHEMERAL.parse()?, config).await
}

pub async fn bind_redis(addr: SocketAddr, config: MockConfig) -> anyhow::Result<MockHandle> {
    spawn(addr, config, Protocol::Redis).await
}

pub async fn bind_beanstalkd(addr: SocketAddr, config: MockConfig) -> anyhow::Result<MockHandle> {
    spawn(addr, config, Protocol::Beanstalkd).await
}

const EPHEMERAL: &str = "127.0.0.1:0";

#[derive(Clone, Copy, Debug)]
enum Protocol {
    Redis,
    Beanstalkd,
}

async fn spawn(
    addr: SocketAddr,
    config: MockConfig,
    protocol: Protocol,
) -> anyhow::Result<MockHandle> {
    let listener = TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;
    let state = Shared::default();
    let task = tokio::spawn(serve(listener, state.clone(), config, protocol));
    debug!(%addr, ?protocol, "mock listening");
    Ok(MockHandle { addr, state, task })
}

async fn serve(listener: TcpListener, state: Shared, config: MockConfig, protocol: Protocol) {
    loop {
        let stream = match listener.accept().await {
            Ok((stream, _)) => stream,
            Err(err) => {
                error!("accept failed: {err}");
                continue;
            }
        };
        lock(&state).connections += 1;

        let state = state.clone();
        let config = config.clone();
        tokio::spawn(async move {
            let res = match protocol {
                Protocol::Redis => redis_connection(stream, state, config).await,
                Protocol::Beanstalkd => beanstalkd_connection(stream, state, config).await,
            };
            if let Err(err) = res {
                debug!("connection ended: {err:#}");
            }
        });
    }
}

async fn add_latency(config: &MockConfig) {
    let Some(mean) = config.delay else {
        return;
    };
    let secs = match Normal::new(mean.as_secs_f64(), mean.as_secs_f64() / 4.) {
        Ok(normal) => normal.sample(&mut rand::thread_rng()).max(0.),
        Err(_) => mean.as_secs_f64(),
    };
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}

/** Redis **/

async fn redis_connection(
    stream: TcpStream,
    state: Shared,
    config: MockConfig,
) -> anyhow::Result<()> {
    let mut stream = BufReader::new(stream);
    while let Some(args) = read_resp_command(&mut stream).await? {
        if args.first().is_some_and(|cmd| cmd.eq_ignore_ascii_case("SET")) {
            add_latency(&config).await;
        }
        let reply = redis_reply(&args, &state, &config);
        stream.get_mut().write_all(reply.as_bytes()).await?;
    }
    Ok(())
}

fn redis_reply(args: &[String], state: &Shared, config: &MockConfig) -> String {
    let mut state = lock(state);
    let Some(cmd) = args.first() else {
        return "-ERR empty command\r\n".to_string();
    };

    match cmd.to_ascii_uppercase().as_str() {
        "PING" => {
            state.pings += 1;
            "+PONG\r\n".to_string()
        }
        "CONFIG" if args.len() == 4 && args[1].eq_ignore_ascii_case("SET") => {
            if config.reject_config {
                return format!(
                    "-ERR Unknown option or number of arguments for CONFIG SET - '{}'\r\n",
                    args[2]
                );
            }
            state.config_sets.push((args[2].clone(), args[3].clone()));
            "+OK\r\n".to_string()
        }
        "SET" if args.len() >= 3 => {
            if state.next_op_fails(config) {
                return "-ERR injected failure\r\n".to_string();
            }
            state.keys.insert(args[1].clone(), args[2].clone());
            "+OK\r\n".to_string()
        }
        // CLIENT SETINFO and friends sent during the handshake.
        _ => "+OK\r\n".to_string(),
    }
}

/// Read one RESP array of bulk strings. `None` on a clean EOF.
pub async fn read_resp_command<R>(reader: &mut R) -> anyhow::Result<Option<Vec<String>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    let count: usize = line
        .trim_end()
        .strip_prefix('*')
        .context("expected RESP array")?
        .parse()?;

    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        reader.read_line(&mut line).await?;
        let len: usize = line
            .trim_end()
            .strip_prefix('$')
            .context("expected RESP bulk string")?
            .parse()?;
        let mut buf = vec![0u8; len + 2];
        reader.read_exact(&mut buf).await?;
        buf.truncate(len);
        args.push(String::from_utf8(buf)?);
    }
    Ok(Some(args))
}

/** Beanstalkd **/

async fn beanstalkd_connection(
    stream: TcpStream,
    state: Shared,
    config: MockConfig,
) -> anyhow::Result<()> {
    let mut stream = BufReader::new(stream);
    let mut line = String::new();
    loop {
        line.clear();
        if stream.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let parts: Vec<&str> = line.split_whitespace().collect();

        let reply: Vec<u8> = match parts.as_slice() {
            ["put", _pri, _delay, _ttr, len] => {
                let len: usize = len.parse()?;
                let mut body = vec![0u8; len + 2];
                stream.read_exact(&mut body).await?;
                if !body.ends_with(b"\r\n") {
                    bail!("job body not terminated by CRLF");
                }
                body.truncate(len);
                add_latency(&config).await;

                let mut state = lock(&state);
                if state.next_op_fails(&config) {
                    b"INTERNAL_ERROR\r\n".to_vec()
                } else {
                    state.puts += 1;
                    state.next_id += 1;
                    let id = state.next_id;
                    state.ready.push_back((id, body));
                    format!("INSERTED {id}\r\n").into_bytes()
                }
            }
            ["reserve"] | ["reserve-with-timeout", _] => {
                add_latency(&config).await;

                let mut state = lock(&state);
                if state.next_op_fails(&config) {
                    b"INTERNAL_ERROR\r\n".to_vec()
                } else if let Some((id, body)) = state.ready.pop_front() {
                    state.reserves += 1;
                    let mut reply = format!("RESERVED {id} {}\r\n", body.len()).into_bytes();
                    reply.extend_from_slice(&body);
                    reply.extend_from_slice(b"\r\n");
                    reply
                } else {
                    b"TIMED_OUT\r\n".to_vec()
                }
            }
            ["use", tube] => format!("USING {tube}\r\n").into_bytes(),
            ["watch", _] | ["ignore", _] => b"WATCHING 1\r\n".to_vec(),
            _ => b"UNKNOWN_COMMAND\r\n".to_vec(),
        };

        stream.get_mut().write_all(&reply).await?;
    }
}
