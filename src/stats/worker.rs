//! Background statistics worker
//!
//! Requests go in over an unbounded channel so posting never waits; replies
//! come back on a second channel in whatever order the task produced them.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::{StatsDispatch, StatsReply, StatsRequest};

/// Sending side of the worker
#[derive(Debug, Clone)]
pub struct StatsWorkerHandle {
    tx: UnboundedSender<StatsRequest>,
}

impl StatsWorkerHandle {
    pub fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }
}

impl StatsDispatch for StatsWorkerHandle {
    fn submit(&self, request: StatsRequest) {
        if let Err(e) = self.tx.send(request) {
            tracing::debug!(asset = %e.0.id, "Stats worker gone, dropping request");
        }
    }
}

pub struct StatsWorker;

impl StatsWorker {
    /// Spawn the worker task. It exits once every handle is dropped or the
    /// reply receiver goes away.
    pub fn spawn() -> (StatsWorkerHandle, UnboundedReceiver<StatsReply>, JoinHandle<()>) {
        let (req_tx, mut req_rx) = mpsc::unbounded_channel::<StatsRequest>();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel::<StatsReply>();

        let task = tokio::spawn(async move {
            tracing::debug!("🧮 Stats worker started");
            while let Some(request) = req_rx.recv().await {
                let reply = request.evaluate();
                if reply_tx.send(reply).is_err() {
                    break;
                }
            }
            tracing::debug!("Stats worker stopped");
        });

        (StatsWorkerHandle { tx: req_tx }, reply_rx, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn worker_answers_each_request() {
        let (handle, mut replies, _task) = StatsWorker::spawn();

        handle.submit(StatsRequest {
            id: "1".to_string(),
            history: vec![1.0, 2.0, 3.0, 4.0],
        });
        handle.submit(StatsRequest {
            id: "2".to_string(),
            history: vec![5.0, 5.0],
        });

        let first = replies.recv().await.expect("reply for asset 1");
        assert_eq!(first.id, "1");
        assert!((first.moving_average - 2.5).abs() < 1e-12);

        let second = replies.recv().await.expect("reply for asset 2");
        assert_eq!(second.id, "2");
        assert_eq!(second.volatility, 0.0);
    }

    #[tokio::test]
    async fn worker_stops_when_handles_dropped() {
        let (handle, mut replies, task) = StatsWorker::spawn();
        drop(handle);
        task.await.expect("worker task should exit cleanly");
        assert!(replies.recv().await.is_none());
    }

    #[tokio::test]
    async fn submit_after_shutdown_is_silent() {
        let (handle, replies, task) = StatsWorker::spawn();
        drop(replies);
        handle.submit(StatsRequest {
            id: "1".to_string(),
            history: vec![1.0, 2.0],
        });
        task.await.expect("worker task should exit after reply channel closes");
        assert!(!handle.is_alive());
        handle.submit(StatsRequest {
            id: "1".to_string(),
            history: vec![1.0, 2.0],
        });
    }
}
