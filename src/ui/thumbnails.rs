//! Asynchronous image loading for grid thumbnails and the detail image.
//!
//! Fetch and decode run on the tokio runtime; decoded pixels come back over a
//! channel and are turned into textures on the UI thread.

use crate::api::fetch_image_async;
use crate::error::{MemeError, MemeResult};
use crate::imaging::decode_image;
use eframe::egui;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Semaphore;

/// Message sent from background image loader tasks
struct LoadedImage {
    url: String,
    image: MemeResult<egui::ColorImage>,
}

/// Display state of one image
pub enum ImageSlot {
    Loading,
    Ready(egui::TextureHandle),
    Failed,
}

pub struct ImageLoader {
    handle: Handle,
    client: reqwest::Client,
    slots: HashMap<String, ImageSlot>,
    sender: UnboundedSender<LoadedImage>,
    receiver: UnboundedReceiver<LoadedImage>,
    /// Limits concurrent image requests
    request_semaphore: Arc<Semaphore>,
}

impl ImageLoader {
    pub fn new(handle: Handle, client: reqwest::Client, max_concurrent: usize) -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            handle,
            client,
            slots: HashMap::new(),
            sender,
            receiver,
            request_semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Current state for `url`, starting a load on first request
    pub fn get(&mut self, ctx: &egui::Context, url: &str) -> &ImageSlot {
        if !self.slots.contains_key(url) {
            self.spawn_load(ctx, url);
        }
        self.slots
            .entry(url.to_string())
            .or_insert(ImageSlot::Loading)
    }

    fn spawn_load(&mut self, ctx: &egui::Context, url: &str) {
        debug!("Starting async image load for {}", url);
        self.slots.insert(url.to_string(), ImageSlot::Loading);

        let client = self.client.clone();
        let sender = self.sender.clone();
        let semaphore = self.request_semaphore.clone();
        let ctx = ctx.clone();
        let url = url.to_string();

        self.handle.spawn(async move {
            let image = match semaphore.acquire().await {
                Ok(_permit) => load_color_image(&client, &url).await,
                Err(e) => Err(MemeError::Io(std::io::Error::other(e))),
            };
            let _ = sender.send(LoadedImage { url, image });
            ctx.request_repaint();
        });
    }

    /// Forget failed loads so the next `get` fetches them again
    pub fn retry_failed(&mut self) {
        self.slots
            .retain(|_, slot| !matches!(slot, ImageSlot::Failed));
    }

    /// Turn finished loads into textures (non-blocking)
    pub fn poll(&mut self, ctx: &egui::Context) {
        while let Ok(loaded) = self.receiver.try_recv() {
            let slot = match loaded.image {
                Ok(color_image) => {
                    let texture = ctx.load_texture(
                        format!("meme_{}", loaded.url),
                        color_image,
                        egui::TextureOptions::LINEAR,
                    );
                    ImageSlot::Ready(texture)
                }
                Err(e) => {
                    warn!("Failed to load image {}: {}", loaded.url, e);
                    ImageSlot::Failed
                }
            };
            self.slots.insert(loaded.url, slot);
        }
    }
}

async fn load_color_image(client: &reqwest::Client, url: &str) -> MemeResult<egui::ColorImage> {
    let bytes = fetch_image_async(client, url).await?;
    tokio::task::spawn_blocking(move || -> MemeResult<egui::ColorImage> {
        let rgba = decode_image(&bytes)?.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
    })
    .await
    .map_err(|e| MemeError::Io(std::io::Error::other(e)))?
}

/// Fit `texture` into `max` keeping its aspect ratio
pub fn fit_size(texture: &egui::TextureHandle, max: egui::Vec2) -> egui::Vec2 {
    let [w, h] = texture.size();
    if w == 0 || h == 0 {
        return max;
    }
    let scale = (max.x / w as f32).min(max.y / h as f32);
    egui::vec2(w as f32 * scale, h as f32 * scale)
}
