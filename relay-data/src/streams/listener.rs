use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::{
    exchange::FeedConnector,
    model::trade_event::TradeEvent,
    shared::subscription_models::{FeedId, Symbol},
    streams::consumer::consume,
};

/*----- */
// Price feed listener
/*----- */
/// Owns feed subscriptions for one connector. Each `subscribe` call spawns its
/// own consume loop, so symbols subscribed together share a connection and are
/// delivered in upstream order.
#[derive(Debug, Default)]
pub struct PriceFeedListener<Feed> {
    phantom: PhantomData<Feed>,
}

impl<Feed> PriceFeedListener<Feed>
where
    Feed: FeedConnector + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            phantom: PhantomData,
        }
    }

    /// Begin delivering normalized events for `symbols` to `handler`. The
    /// handler runs on the feed task: keep it cheap and hand heavy work off
    /// over a channel.
    pub fn subscribe<Handler>(&self, mut symbols: Vec<Symbol>, handler: Handler) -> SubscriptionHandle
    where
        Handler: FnMut(TradeEvent) + Send + 'static,
    {
        // Remove duplicates
        symbols.sort();
        symbols.dedup();

        let task = tokio::spawn(consume::<Feed, Handler>(symbols, handler));

        SubscriptionHandle {
            feed: Feed::ID,
            released: AtomicBool::new(false),
            task,
        }
    }
}

/*----- */
// Subscription handle
/*----- */
#[derive(Debug)]
pub struct SubscriptionHandle {
    feed: FeedId,
    released: AtomicBool,
    task: tokio::task::JoinHandle<()>,
}

impl SubscriptionHandle {
    /// Stop delivery and release the connection. Calling this a second time
    /// is a no-op.
    pub fn unsubscribe(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }

        self.task.abort();
        info!(feed = %self.feed, action = "unsubscribed from feed");
    }

    pub fn is_active(&self) -> bool {
        !self.released.load(Ordering::SeqCst) && !self.task.is_finished()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn unsubscribe_twice_is_noop() {
        let handle = SubscriptionHandle {
            feed: FeedId::BinanceSpot,
            released: AtomicBool::new(false),
            task: tokio::spawn(async {
                loop {
                    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                }
            }),
        };

        assert!(handle.is_active());

        handle.unsubscribe();
        assert!(!handle.is_active());

        // Second release must not panic or double-abort
        handle.unsubscribe();
        assert!(!handle.is_active());
    }
}
