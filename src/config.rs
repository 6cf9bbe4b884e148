//! Compiled-in application settings

use std::path::PathBuf;
use std::time::Duration;

/// Imgflip API root; `get_memes` is resolved against it
pub const BASE_URL: &str = "https://api.imgflip.com";
pub const USER_AGENT: &str = "MemeGallery/1.0";
/// File name every download is written under
pub const DOWNLOAD_FILE_NAME: &str = "downloaded_image.png";
pub const DOWNLOAD_MIME_TYPE: &str = "image/png";
/// Relative path recorded for managed picture entries
pub const PICTURES_RELATIVE_PATH: &str = "Pictures";
/// Subdirectory of the platform data dir holding app-private state
pub const APP_DATA_DIR_NAME: &str = "meme_gallery";

const REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_CONCURRENT_THUMBNAILS: usize = 6;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub max_concurrent_thumbnails: usize,
    /// Overrides the detected pictures directory (used by tests)
    pub pictures_dir: Option<PathBuf>,
    /// App-private directory for bookkeeping such as the picture index
    pub data_dir: Option<PathBuf>,
    /// Android API level of the running device; `None` on desktop
    pub platform_api_level: Option<u32>,
    pub window_size: [f32; 2],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            max_concurrent_thumbnails: MAX_CONCURRENT_THUMBNAILS,
            pictures_dir: None,
            data_dir: None,
            platform_api_level: None,
            window_size: [800.0, 900.0],
        }
    }
}

impl AppConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_pictures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pictures_dir = Some(dir.into());
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_platform_api_level(mut self, level: u32) -> Self {
        self.platform_api_level = Some(level);
        self
    }

    /// Full URL of the meme listing endpoint
    pub fn catalog_url(&self) -> String {
        format!("{}/get_memes", self.base_url.trim_end_matches('/'))
    }

    /// Directory downloads land in: override, platform pictures dir, or `./Pictures`
    pub fn resolve_pictures_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.pictures_dir {
            return dir.clone();
        }
        default_pictures_dir()
    }

    /// Directory for app-private files, never the shared pictures location
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.data_dir {
            return dir.clone();
        }
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DATA_DIR_NAME)
    }
}

#[cfg(not(target_os = "android"))]
fn default_pictures_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(PICTURES_RELATIVE_PATH)))
        .unwrap_or_else(|| PathBuf::from(".").join(PICTURES_RELATIVE_PATH))
}

#[cfg(target_os = "android")]
fn default_pictures_dir() -> PathBuf {
    // Shared external storage; the app-private data dir is not visible to the gallery
    PathBuf::from("/storage/emulated/0").join(PICTURES_RELATIVE_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_url_default() {
        let config = AppConfig::default();
        assert_eq!(config.catalog_url(), "https://api.imgflip.com/get_memes");
    }

    #[test]
    fn test_catalog_url_trims_trailing_slash() {
        let config = AppConfig::default().with_base_url("http://127.0.0.1:8080/");
        assert_eq!(config.catalog_url(), "http://127.0.0.1:8080/get_memes");
    }

    #[test]
    fn test_pictures_dir_override() {
        let config = AppConfig::default().with_pictures_dir("/tmp/pics");
        assert_eq!(config.resolve_pictures_dir(), PathBuf::from("/tmp/pics"));
    }

    #[test]
    fn test_data_dir_override() {
        let config = AppConfig::default()
            .with_pictures_dir("/tmp/pics")
            .with_data_dir("/tmp/app");
        assert_eq!(config.resolve_data_dir(), PathBuf::from("/tmp/app"));
    }

    #[test]
    fn test_default_data_dir_is_not_pictures_dir() {
        let config = AppConfig::default();
        let data_dir = config.resolve_data_dir();
        assert!(data_dir.ends_with(APP_DATA_DIR_NAME));
        assert_ne!(data_dir, config.resolve_pictures_dir());
    }

    #[test]
    fn test_desktop_has_no_api_level() {
        assert_eq!(AppConfig::default().platform_api_level, None);
        assert_eq!(
            AppConfig::default()
                .with_platform_api_level(28)
                .platform_api_level,
            Some(28)
        );
    }
}
