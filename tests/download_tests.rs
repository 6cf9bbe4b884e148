use image::{DynamicImage, Rgb, RgbImage};
use meme_gallery::imaging::{decode_image, encode_png};
use meme_gallery::storage::{
    CapabilityTier, MediaIndex, PermissionGate, PermissionOutcome, SaveStrategy,
};
use meme_gallery::{download_and_save, AppConfig, Downloader, FailureKind};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Test fixtures

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 20, 30])));
    encode_png(&image).unwrap()
}

async fn serve_image(server: &MockServer, image_path: &str, body: Vec<u8>) -> String {
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
    format!("{}{}", server.uri(), image_path)
}

fn client() -> reqwest::Client {
    meme_gallery::api::http_client(&AppConfig::default()).unwrap()
}

fn dimensions_of(file: &Path) -> (u32, u32) {
    let decoded = decode_image(&std::fs::read(file).unwrap()).unwrap();
    (decoded.width(), decoded.height())
}

/// Shared pictures directory plus the app-private directory beside it
struct Storage {
    pictures: TempDir,
    data: TempDir,
}

impl Storage {
    fn new() -> Self {
        Self {
            pictures: TempDir::new().unwrap(),
            data: TempDir::new().unwrap(),
        }
    }

    fn strategy(&self, tier: CapabilityTier) -> SaveStrategy {
        SaveStrategy::for_tier(
            tier,
            self.pictures.path().to_path_buf(),
            self.data.path().to_path_buf(),
        )
    }

    fn index(&self) -> MediaIndex {
        MediaIndex::new(self.pictures.path(), self.data.path())
    }

    fn fixed_path(&self) -> std::path::PathBuf {
        self.pictures.path().join("downloaded_image.png")
    }
}

struct FixedGate(PermissionOutcome);

impl PermissionGate for FixedGate {
    fn request_write(&self, _target: &Path) -> PermissionOutcome {
        self.0
    }
}

// Tier A

#[tokio::test]
async fn test_tier_a_download_creates_one_png_index_entry() {
    let server = MockServer::start().await;
    let url = serve_image(&server, "/memes/a.png", png_bytes(40, 30)).await;
    let storage = Storage::new();
    let strategy = Arc::new(storage.strategy(CapabilityTier::A));

    let saved = assert_ok!(download_and_save(&client(), strategy, &url).await);

    let entries = storage.index().entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].display_name, "downloaded_image.png");
    assert_eq!(entries[0].mime_type, "image/png");
    assert_eq!(saved.tier, CapabilityTier::A);
    assert_eq!(dimensions_of(&saved.path), (40, 30));
    assert!(!storage
        .pictures
        .path()
        .join(".meme_gallery_index.json")
        .exists());
}

// Tier B

#[tokio::test]
async fn test_tier_b_download_writes_fixed_path_with_same_dimensions() {
    let server = MockServer::start().await;
    let url = serve_image(&server, "/memes/b.png", png_bytes(64, 48)).await;
    let storage = Storage::new();
    let strategy = Arc::new(storage.strategy(CapabilityTier::B));

    let saved = assert_ok!(download_and_save(&client(), strategy, &url).await);

    let expected = storage.fixed_path();
    assert_eq!(saved.path, expected);
    assert_eq!(dimensions_of(&expected), (64, 48));
}

// Tier C

#[tokio::test]
async fn test_tier_c_denied_reports_permission_denied() {
    let server = MockServer::start().await;
    let url = serve_image(&server, "/memes/c.png", png_bytes(8, 8)).await;
    let temp_dir = TempDir::new().unwrap();
    let strategy = Arc::new(SaveStrategy::PermissionGated {
        dir: temp_dir.path().to_path_buf(),
        gate: Arc::new(FixedGate(PermissionOutcome::Denied)),
    });

    let err = assert_err!(download_and_save(&client(), strategy, &url).await);

    assert_eq!(err.kind(), FailureKind::PermissionDenied);
    assert!(!temp_dir.path().join("downloaded_image.png").exists());
}

#[tokio::test]
async fn test_tier_c_granted_writes_file() {
    let server = MockServer::start().await;
    let url = serve_image(&server, "/memes/c.png", png_bytes(8, 5)).await;
    let temp_dir = TempDir::new().unwrap();
    let strategy = Arc::new(SaveStrategy::PermissionGated {
        dir: temp_dir.path().to_path_buf(),
        gate: Arc::new(FixedGate(PermissionOutcome::Granted)),
    });

    let saved = assert_ok!(download_and_save(&client(), strategy, &url).await);

    assert_eq!(saved.tier, CapabilityTier::C);
    assert_eq!(dimensions_of(&saved.path), (8, 5));
}

// Failure paths

#[tokio::test]
async fn test_undecodable_image_is_decode_failure_and_writes_nothing() {
    let server = MockServer::start().await;
    let url = serve_image(&server, "/memes/broken.png", b"<html>nope</html>".to_vec()).await;
    let storage = Storage::new();
    let strategy = Arc::new(storage.strategy(CapabilityTier::B));

    let err = assert_err!(download_and_save(&client(), strategy, &url).await);

    assert_eq!(err.kind(), FailureKind::DecodeFailure);
    assert!(!storage.fixed_path().exists());
}

#[tokio::test]
async fn test_missing_image_is_protocol_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/memes/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let storage = Storage::new();
    let strategy = Arc::new(storage.strategy(CapabilityTier::A));
    let url = format!("{}/memes/gone.png", server.uri());

    let err = assert_err!(download_and_save(&client(), strategy, &url).await);

    assert_eq!(err.kind(), FailureKind::Protocol);
    assert!(storage.index().entries().unwrap().is_empty());
}

// Downloader

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_downloads_last_writer_wins() {
    let server = MockServer::start().await;
    let first = serve_image(&server, "/memes/first.png", png_bytes(20, 10)).await;
    let second = serve_image(&server, "/memes/second.png", png_bytes(11, 33)).await;
    let storage = Storage::new();

    let mut downloader = Downloader::new(
        tokio::runtime::Handle::current(),
        client(),
        storage.strategy(CapabilityTier::B),
    );
    downloader.spawn(first, || {});
    downloader.spawn(second, || {});
    assert_eq!(downloader.in_flight(), 2);

    let a = downloader.next_outcome().await.unwrap();
    let b = downloader.next_outcome().await.unwrap();
    assert!(a.result.is_ok(), "{:?}", a.result);
    assert!(b.result.is_ok(), "{:?}", b.result);
    assert_eq!(downloader.in_flight(), 0);

    // Completion order is not guaranteed; the file holds one complete image.
    let dims = dimensions_of(&storage.fixed_path());
    assert!(
        dims == (20, 10) || dims == (11, 33),
        "unexpected dimensions {dims:?}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_downloader_poll_reports_failures() {
    let server = MockServer::start().await;
    let url = serve_image(&server, "/memes/bad.png", vec![1, 2, 3]).await;
    let storage = Storage::new();

    let mut downloader = Downloader::new(
        tokio::runtime::Handle::current(),
        client(),
        storage.strategy(CapabilityTier::A),
    );
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    downloader.spawn(url.clone(), move || {
        let _ = done_tx.send(());
    });
    done_rx.await.unwrap();

    let outcomes = downloader.poll();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].url, url);
    assert_eq!(
        outcomes[0].result.as_ref().unwrap_err().kind(),
        FailureKind::DecodeFailure
    );
    assert!(downloader.poll().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tier_a_concurrent_downloads_keep_both_entries() {
    let server = MockServer::start().await;
    let first = serve_image(&server, "/memes/one.png", png_bytes(5, 5)).await;
    let second = serve_image(&server, "/memes/two.png", png_bytes(6, 6)).await;
    let storage = Storage::new();

    let mut downloader = Downloader::new(
        tokio::runtime::Handle::current(),
        client(),
        storage.strategy(CapabilityTier::A),
    );
    downloader.spawn(first, || {});
    downloader.spawn(second, || {});

    for _ in 0..2 {
        let outcome = downloader.next_outcome().await.unwrap();
        assert!(outcome.result.is_ok(), "{:?}", outcome.result);
    }

    let entries = storage.index().entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| !e.pending));
    assert_ne!(entries[0].file_name, entries[1].file_name);
}
