use relay_data::{
    exchange::binance::BinanceFeed, shared::subscription_models::Symbol,
    streams::listener::PriceFeedListener,
};

#[tokio::main]
pub async fn main() {
    // Initialise logging
    init_logging();

    let listener = PriceFeedListener::<BinanceFeed>::new();
    let handle = listener.subscribe(
        vec![Symbol::new("btcusdt"), Symbol::new("ethusdt")],
        |event| println!("{:?}", event),
    );

    tokio::time::sleep(std::time::Duration::from_secs(60)).await;
    handle.unsubscribe();
}

/*----- */
// Logging config
/*----- */
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        // Disable colours on release builds
        .with_ansi(cfg!(debug_assertions))
        // Enable Json formatting
        .json()
        // Install this Tracing subscriber as global default
        .init()
}
