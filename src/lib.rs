pub mod api;
pub mod catalog;
pub mod config;
pub mod download;
pub mod error;
pub mod imaging;
pub mod models;
pub mod navigation;
pub mod storage;
pub mod ui;

// Re-export commonly used items
pub use api::{fetch_catalog, fetch_catalog_async, fetch_catalog_from};
pub use catalog::{filter_catalog, CatalogState};
pub use config::AppConfig;
pub use download::{download_and_save, DownloadOutcome, Downloader};
pub use error::{FailureKind, MemeError, MemeResult};
pub use models::{Catalog, MemeRecord};
pub use navigation::{Navigator, Route, SelectedMeme};
pub use storage::{CapabilityTier, SaveStrategy, SavedImage};

/// Android entry point. Called by the NativeActivity runtime instead of main().
/// The `android-native-activity` feature in eframe wires this into the Android
/// activity lifecycle automatically.
#[cfg(target_os = "android")]
#[no_mangle]
fn android_main(app: android_activity::AndroidApp) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    ui::launch_gui_android(app);
}
