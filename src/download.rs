//! Background "save to device": fetch, decode, then hand the bitmap to the
//! active [`SaveStrategy`]. Downloads are independent; nothing deduplicates or
//! orders them, so two saves to the same path race and the last one wins.

use crate::api::fetch_image_async;
use crate::error::{MemeError, MemeResult};
use crate::imaging::decode_image;
use crate::storage::{SaveStrategy, SavedImage};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Result of one download, posted back to the UI thread
#[derive(Debug)]
pub struct DownloadOutcome {
    pub url: String,
    pub result: MemeResult<SavedImage>,
}

/// Fetch the image at `url`, decode it and save it
pub async fn download_and_save(
    client: &reqwest::Client,
    strategy: Arc<SaveStrategy>,
    url: &str,
) -> MemeResult<SavedImage> {
    let bytes = fetch_image_async(client, url).await?;

    tokio::task::spawn_blocking(move || -> MemeResult<SavedImage> {
        let image = decode_image(&bytes)?;
        strategy.save(&image)
    })
    .await
    .map_err(|e| MemeError::Io(std::io::Error::other(e)))?
}

pub struct Downloader {
    handle: Handle,
    client: reqwest::Client,
    strategy: Arc<SaveStrategy>,
    sender: UnboundedSender<DownloadOutcome>,
    receiver: UnboundedReceiver<DownloadOutcome>,
    in_flight: usize,
}

impl Downloader {
    pub fn new(handle: Handle, client: reqwest::Client, strategy: SaveStrategy) -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            handle,
            client,
            strategy: Arc::new(strategy),
            sender,
            receiver,
            in_flight: 0,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start a download. `on_done` runs on the worker after the outcome is posted.
    pub fn spawn<F>(&mut self, url: String, on_done: F)
    where
        F: FnOnce() + Send + 'static,
    {
        log::info!("Starting download of {}", url);
        self.in_flight += 1;

        let client = self.client.clone();
        let strategy = self.strategy.clone();
        let sender = self.sender.clone();

        self.handle.spawn(async move {
            let result = download_and_save(&client, strategy, &url).await;
            if let Err(ref e) = result {
                log::error!("Download of {} failed: {}", url, e);
            }
            if sender.send(DownloadOutcome { url, result }).is_err() {
                log::debug!("Download finished after the UI went away");
            }
            on_done();
        });
    }

    /// Drain finished downloads without blocking
    pub fn poll(&mut self) -> Vec<DownloadOutcome> {
        let mut finished = Vec::new();
        while let Ok(outcome) = self.receiver.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            finished.push(outcome);
        }
        finished
    }

    /// Wait for the next finished download
    pub async fn next_outcome(&mut self) -> Option<DownloadOutcome> {
        let outcome = self.receiver.recv().await;
        if outcome.is_some() {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        outcome
    }
}
