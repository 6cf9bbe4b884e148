use eframe::{self, egui};
use egui::ViewportBuilder;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use super::{
    screens::{CatalogAction, CatalogScreen, DetailsAction, DetailsScreen},
    state::AppState,
    thumbnails::ImageLoader,
};
use crate::api::{fetch_catalog_async, http_client};
use crate::config::AppConfig;
use crate::download::Downloader;
use crate::error::MemeResult;
use crate::models::Catalog;
use crate::navigation::Route;
use crate::storage::SaveStrategy;

const APP_TITLE: &str = "Meme Gallery";

pub struct MemeGalleryApp {
    config: AppConfig,
    /// Tokio runtime for network and decode work
    runtime: Runtime,
    client: reqwest::Client,
    state: AppState,
    images: ImageLoader,
    downloader: Downloader,
    catalog_sender: UnboundedSender<MemeResult<Catalog>>,
    catalog_receiver: UnboundedReceiver<MemeResult<Catalog>>,
}

impl MemeGalleryApp {
    /// Build the app and start the initial catalog fetch
    pub fn new(ctx: &egui::Context, config: AppConfig) -> MemeResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let client = http_client(&config)?;
        let strategy = SaveStrategy::detect(&config);

        let images = ImageLoader::new(
            runtime.handle().clone(),
            client.clone(),
            config.max_concurrent_thumbnails,
        );
        let downloader = Downloader::new(runtime.handle().clone(), client.clone(), strategy);
        let (catalog_sender, catalog_receiver) = unbounded_channel();

        let mut app = Self {
            config,
            runtime,
            client,
            state: AppState::default(),
            images,
            downloader,
            catalog_sender,
            catalog_receiver,
        };
        app.load_catalog(ctx);
        Ok(app)
    }

    fn load_catalog(&mut self, ctx: &egui::Context) {
        log::info!("Loading meme catalog");
        self.state.catalog.begin_load();

        let client = self.client.clone();
        let config = self.config.clone();
        let sender = self.catalog_sender.clone();
        let ctx = ctx.clone();

        self.runtime.spawn(async move {
            let result = fetch_catalog_async(&client, &config).await;
            let _ = sender.send(result);
            ctx.request_repaint();
        });
    }

    /// Apply finished background work on the UI thread
    fn poll_background(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.catalog_receiver.try_recv() {
            if let Some(err) = self.state.catalog.apply(result) {
                self.state.toasts.error(err.to_string());
            }
        }

        self.images.poll(ctx);

        for outcome in self.downloader.poll() {
            match outcome.result {
                Ok(saved) => self
                    .state
                    .toasts
                    .info(format!("Saved {}", saved.path.display())),
                Err(e) => self
                    .state
                    .toasts
                    .error(format!("Download failed: {}", e)),
            }
        }
    }

    fn show_top_bar(ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(4.0);
                ui.label(egui::RichText::new(APP_TITLE).size(32.0).strong());
                ui.add_space(4.0);
            });
        });
    }
}

impl eframe::App for MemeGalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_background(ctx);
        Self::show_top_bar(ctx);

        match self.state.navigator.current() {
            Route::Catalog => {
                match CatalogScreen::show(ctx, &mut self.state.catalog, &mut self.images) {
                    Some(CatalogAction::Open(route)) => self.state.navigator.navigate(&route),
                    Some(CatalogAction::Refresh) => {
                        self.images.retry_failed();
                        self.load_catalog(ctx);
                    }
                    None => {}
                }
            }
            Route::Details(selected) => {
                if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
                    self.state.navigator.back();
                }
                match DetailsScreen::show(
                    ctx,
                    &selected,
                    &mut self.images,
                    self.downloader.in_flight(),
                ) {
                    Some(DetailsAction::Back) => {
                        self.state.navigator.back();
                    }
                    Some(DetailsAction::Download(url)) => {
                        let ctx = ctx.clone();
                        self.downloader.spawn(url, move || ctx.request_repaint());
                    }
                    None => {}
                }
            }
        }

        self.state.toasts.show(ctx);
    }
}

fn create_app(
    cc: &eframe::CreationContext<'_>,
    config: AppConfig,
) -> Result<Box<dyn eframe::App>, Box<dyn std::error::Error + Send + Sync>> {
    Ok(Box::new(MemeGalleryApp::new(&cc.egui_ctx, config)?))
}

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size(config.window_size),
        ..Default::default()
    }
}

pub fn launch_gui() -> Result<(), eframe::Error> {
    let config = AppConfig::default();
    let options = native_options(&config);

    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(|cc| create_app(cc, config)),
    )
}

#[cfg(target_os = "android")]
pub fn launch_gui_android(app: android_activity::AndroidApp) {
    let mut config = AppConfig::default();
    match u32::try_from(app.config().sdk_version()) {
        Ok(level) => config = config.with_platform_api_level(level),
        Err(e) => log::warn!("Unusable SDK version, assuming managed storage: {e}"),
    }
    if let Some(dir) = app.internal_data_path() {
        config = config.with_data_dir(dir);
    }

    let options = eframe::NativeOptions {
        android_app: Some(app),
        ..native_options(&config)
    };

    if let Err(e) = eframe::run_native(
        APP_TITLE,
        options,
        Box::new(|cc| create_app(cc, config)),
    ) {
        log::error!("Application error: {e}");
    }
}
