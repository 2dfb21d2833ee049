//! Feed module - price snapshot sources
//!
//! A feed pushes full "all assets" snapshots into a channel until the
//! receiving side detaches.

mod synthetic;

pub use synthetic::{SyntheticFeed, DEFAULT_INTERVAL_MS, DEFAULT_NOISE};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

use crate::types::PriceSnapshot;

/// Trait for snapshot producers
#[async_trait]
pub trait PriceFeed: Send {
    /// Get the feed name
    fn name(&self) -> &'static str;

    /// Stream snapshots into `tx` until the receiver is dropped.
    /// A feed that has finished cannot be run again.
    async fn run(&mut self, tx: Sender<PriceSnapshot>) -> Result<()>;
}

/// Spawn a feed on its own task and hand back the receiving end
pub fn spawn_feed<F>(mut feed: F, capacity: usize) -> (Receiver<PriceSnapshot>, JoinHandle<()>)
where
    F: PriceFeed + 'static,
{
    let (tx, rx) = mpsc::channel(capacity);
    let handle = tokio::spawn(async move {
        let name = feed.name();
        if let Err(e) = feed.run(tx).await {
            tracing::error!(feed = name, error = %e, "Price feed failed");
        }
    });
    (rx, handle)
}

/// Same as [`spawn_feed`] but as a `Stream` of snapshots
pub fn snapshot_stream<F>(feed: F, capacity: usize) -> ReceiverStream<PriceSnapshot>
where
    F: PriceFeed + 'static,
{
    let (rx, _handle) = spawn_feed(feed, capacity);
    ReceiverStream::new(rx)
}
