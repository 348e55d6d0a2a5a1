use mock_service::prelude::*;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter("mock_service=debug")
        .init();

    let config = MockConfig {
        delay: Some(Duration::from_micros(200)),
        ..Default::default()
    };
    let redis = bind_redis("127.0.0.1:16379".parse::<SocketAddr>()?, config.clone()).await?;
    let beanstalkd = bind_beanstalkd("127.0.0.1:11301".parse::<SocketAddr>()?, config).await?;

    println!("redis on {}, beanstalkd on {}", redis.addr, beanstalkd.addr);
    ops_measure_task(&[&redis, &beanstalkd]).await;
    Ok(())
}

async fn ops_measure_task(handles: &[&MockHandle]) {
    let mut last = 0;
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let total: u64 = handles.iter().map(|h| h.ops()).sum();
        println!("{} OPS", total - last);
        last = total;
    }
}
