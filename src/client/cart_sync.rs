//! Debounced mirroring of signed-in carts to the server.
//!
//! Every cart change is queued on a [`CartMirrorHandle`]. The
//! [`CartMirror`] task keeps only the newest snapshot per user and pushes
//! it once no change has arrived for the configured delay. Pending
//! snapshots are flushed when every handle has been dropped.

use std::{collections::HashMap, sync::Arc, time::Duration};

use futures::future::BoxFuture;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::{
    sync::mpsc,
    time::{Instant, sleep_until},
};

use crate::{client::ClientError, models::CartItem};

pub const DEFAULT_MIRROR_DELAY: Duration = Duration::from_millis(500);

/// Destination of mirrored carts.
pub trait CartSink: Send + Sync + 'static {
    fn push<'a>(
        &'a self,
        user_id: &'a str,
        items: &'a [CartItem],
    ) -> BoxFuture<'a, Result<(), ClientError>>;
}

#[derive(Serialize)]
struct CartBody<'a> {
    items: &'a [CartItem],
}

/// PUTs the whole cart to `/api/cart/{user_id}`.
pub struct HttpCartSink {
    http: reqwest::Client,
    base_url: String,
    token: SecretString,
}

impl HttpCartSink {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, token: SecretString) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }
}

impl CartSink for HttpCartSink {
    fn push<'a>(
        &'a self,
        user_id: &'a str,
        items: &'a [CartItem],
    ) -> BoxFuture<'a, Result<(), ClientError>> {
        Box::pin(async move {
            let response = self
                .http
                .put(format!("{}/api/cart/{}", self.base_url, user_id))
                .bearer_auth(self.token.expose_secret())
                .json(&CartBody { items })
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ClientError::Status(status.as_u16()));
            }
            Ok(())
        })
    }
}

#[derive(Debug)]
struct CartUpdate {
    user_id: String,
    items: Vec<CartItem>,
}

#[derive(Debug, Clone)]
pub struct CartMirrorHandle {
    tx: mpsc::UnboundedSender<CartUpdate>,
}

impl CartMirrorHandle {
    /// Queue a snapshot. Returns false once the mirror task has stopped.
    pub fn push(&self, user_id: &str, items: &[CartItem]) -> bool {
        self.tx
            .send(CartUpdate {
                user_id: user_id.to_string(),
                items: items.to_vec(),
            })
            .is_ok()
    }
}

pub struct CartMirror {
    sink: Arc<dyn CartSink>,
    delay: Duration,
    rx: mpsc::UnboundedReceiver<CartUpdate>,
    pending: HashMap<String, Vec<CartItem>>,
}

impl CartMirror {
    pub fn new(sink: Arc<dyn CartSink>, delay: Duration) -> (Self, CartMirrorHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mirror = CartMirror {
            sink,
            delay,
            rx,
            pending: HashMap::new(),
        };
        (mirror, CartMirrorHandle { tx })
    }

    /// Runs until every handle is dropped. Spawn as a background task.
    pub async fn run(mut self) {
        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "cart mirror started");
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                update = self.rx.recv() => match update {
                    Some(update) => {
                        self.pending.insert(update.user_id, update.items);
                        deadline = Some(Instant::now() + self.delay);
                    }
                    None => {
                        self.flush().await;
                        break;
                    }
                },
                _ = wait_until(deadline) => {
                    self.flush().await;
                    deadline = None;
                }
            }
        }

        tracing::debug!("cart mirror stopped");
    }

    async fn flush(&mut self) {
        for (user_id, items) in self.pending.drain() {
            match self.sink.push(&user_id, &items).await {
                Ok(()) => tracing::debug!(user_id = %user_id, lines = items.len(), "cart mirrored"),
                Err(err) => {
                    tracing::warn!(user_id = %user_id, error = %err, "cart mirror push failed")
                }
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        pushes: Mutex<Vec<(String, Vec<CartItem>)>>,
    }

    impl CartSink for RecordingSink {
        fn push<'a>(
            &'a self,
            user_id: &'a str,
            items: &'a [CartItem],
        ) -> BoxFuture<'a, Result<(), ClientError>> {
            self.pushes
                .lock()
                .unwrap()
                .push((user_id.to_string(), items.to_vec()));
            Box::pin(async { Ok(()) })
        }
    }

    fn line(id: &str, quantity: i64) -> CartItem {
        CartItem {
            id: id.into(),
            name: id.into(),
            price: 1.0,
            image: None,
            quantity,
            color: None,
            size: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_collapse_to_last_snapshot() {
        let sink = Arc::new(RecordingSink::default());
        let (mirror, handle) = CartMirror::new(sink.clone(), Duration::from_millis(500));
        let task = tokio::spawn(mirror.run());

        handle.push("u1", &[line("a", 1)]);
        handle.push("u1", &[line("a", 2)]);
        handle.push("u1", &[line("a", 3)]);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(sink.pushes.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_secs(1)).await;
        {
            let pushes = sink.pushes.lock().unwrap();
            assert_eq!(pushes.len(), 1);
            assert_eq!(pushes[0].0, "u1");
            assert_eq!(pushes[0].1, vec![line("a", 3)]);
        }

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn pending_snapshot_is_flushed_on_close() {
        let sink = Arc::new(RecordingSink::default());
        let (mirror, handle) = CartMirror::new(sink.clone(), Duration::from_secs(60));
        let task = tokio::spawn(mirror.run());

        handle.push("u2", &[line("b", 1)]);
        drop(handle);
        task.await.unwrap();

        assert_eq!(sink.pushes.lock().unwrap().len(), 1);
    }
}
