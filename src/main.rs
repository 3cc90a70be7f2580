use tracing_subscriber::{fmt, EnvFilter};

use hft_system::transport::UdpTransport;
use hft_system::{Config, Engine, Shutdown};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (.env carries CLIENT_IN_PORT / EXCHANGE_IN_PORT)
    dotenv::dotenv().ok();

    // 2. Logger
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hft_system=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    tracing::info!("hft-system starting...");

    // 3. Config
    let config = Config::load_default()?;
    tracing::info!(
        "symbol={} warmup={} alpha={} band={}",
        config.book.symbol,
        config.strategy.warmup_window,
        config.strategy.smoothing_factor,
        config.strategy.deviation_threshold
    );

    // 4. Transport; a bind failure is fatal
    let mut transport = UdpTransport::from_config(&config.network).await?;

    // 5. Stop on SIGINT/SIGTERM
    let shutdown = Shutdown::new();
    let stopper = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = hft_system::shutdown::wait_for_signal().await {
            tracing::error!("Signal handler error: {}", e);
            return;
        }
        tracing::info!("Requesting shutdown...");
        stopper.trigger();
    });

    // 6. Main loop
    let mut engine = Engine::new(&config);
    engine.run(&mut transport, &shutdown).await?;

    tracing::info!("Shut down cleanly");
    Ok(())
}
