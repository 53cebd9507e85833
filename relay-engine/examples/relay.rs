use std::sync::Arc;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use tokio::sync::mpsc;

use relay_data::{
    exchange::binance::BinanceFeed, shared::subscription_models::Symbol,
    streams::listener::PriceFeedListener,
};
use relay_engine::{
    chain::{CallPayload, CallStatus, CallStatusStream, ChainClient},
    error::ChainError,
    nonce::NonceTracker,
    signer::{SignerAccount, SignerId},
    submitter::{OrderSubmitter, SubmitterConfig},
};

/*----- */
// Stub chain client - logs submissions instead of hitting a node
/*----- */
struct LoggingChain;

#[async_trait]
impl ChainClient for LoggingChain {
    async fn submit_signed_call(
        &self,
        signer: &SignerAccount,
        nonce: u64,
        payload: CallPayload,
    ) -> Result<CallStatusStream, ChainError> {
        println!(
            "submit: signer={} nonce={} payload={} bytes",
            signer.id,
            nonce,
            payload.0.len()
        );
        Ok(stream::iter(vec![
            CallStatus::Ready,
            CallStatus::InBlock("0x0".to_owned()),
        ])
        .boxed())
    }

    async fn query_nonce(&self, _signer: &SignerId) -> Result<u64, ChainError> {
        Ok(0)
    }
}

#[tokio::main]
pub async fn main() {
    // Initialise logging
    init_logging();

    let submitter = Arc::new(OrderSubmitter::new(
        Arc::new(LoggingChain),
        Arc::new(NonceTracker::new()),
        SignerAccount::from_seed("maker", "//Alice"),
        SignerAccount::from_seed("taker", "//Bob"),
        SubmitterConfig::default(),
    ));

    // Feed handler runs inside the stream consumer loop, so it only forwards;
    // the submission work happens on its own task
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    {
        let submitter = Arc::clone(&submitter);
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                submitter.handle(event).await;
            }
        });
    }

    let listener = PriceFeedListener::<BinanceFeed>::new();
    let handle = listener.subscribe(
        vec![Symbol::new("btcusdt"), Symbol::new("ethusdt")],
        move |event| {
            let _ = event_tx.send(event);
        },
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
