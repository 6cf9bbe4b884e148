//! Saving downloaded memes to shared picture storage.
//!
//! The write path depends on what the platform offers, classified once at
//! startup into a [`CapabilityTier`]. Each tier maps to one [`SaveStrategy`]
//! variant with the same `save` contract.

#[cfg(target_os = "android")]
mod android;
pub mod media_index;
pub mod permission;

pub use media_index::{MediaEntry, MediaIndex};
pub use permission::{platform_gate, PermissionGate, PermissionOutcome, ProbePermissionGate};

use crate::config::{AppConfig, DOWNLOAD_FILE_NAME, DOWNLOAD_MIME_TYPE, PICTURES_RELATIVE_PATH};
use crate::error::{MemeError, MemeResult};
#[cfg(target_os = "android")]
use crate::imaging::encode_png;
use crate::imaging::write_png;
use image::DynamicImage;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// First Android API level with scoped storage (MediaStore RELATIVE_PATH)
const MANAGED_STORAGE_API_LEVEL: u32 = 29;
/// First Android API level with runtime permission prompts
const RUNTIME_PERMISSION_API_LEVEL: u32 = 23;

/// Platform capability levels for writing to shared storage, newest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityTier {
    /// Managed picture index, no permission needed
    A,
    /// Direct write into the public pictures directory, permission granted up front
    B,
    /// Direct write, permission must be requested at runtime
    C,
}

impl CapabilityTier {
    pub fn from_api_level(level: u32) -> Self {
        if level >= MANAGED_STORAGE_API_LEVEL {
            CapabilityTier::A
        } else if level >= RUNTIME_PERMISSION_API_LEVEL {
            CapabilityTier::C
        } else {
            CapabilityTier::B
        }
    }

    /// Classify the running platform from its API level; desktop (`None`)
    /// uses the managed index
    pub fn detect(api_level: Option<u32>) -> Self {
        match api_level {
            Some(level) => Self::from_api_level(level),
            None => CapabilityTier::A,
        }
    }
}

/// Where a saved image ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    pub path: PathBuf,
    pub display_name: String,
    pub tier: CapabilityTier,
}

pub enum SaveStrategy {
    ManagedIndex(MediaIndex),
    /// The platform's own media collection (Android MediaStore)
    #[cfg(target_os = "android")]
    MediaStore,
    PublicDirectory {
        dir: PathBuf,
    },
    PermissionGated {
        dir: PathBuf,
        gate: Arc<dyn PermissionGate>,
    },
}

impl std::fmt::Debug for SaveStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveStrategy::ManagedIndex(index) => {
                f.debug_tuple("ManagedIndex").field(&index.root()).finish()
            }
            #[cfg(target_os = "android")]
            SaveStrategy::MediaStore => f.write_str("MediaStore"),
            SaveStrategy::PublicDirectory { dir } => {
                f.debug_struct("PublicDirectory").field("dir", dir).finish()
            }
            SaveStrategy::PermissionGated { dir, .. } => {
                f.debug_struct("PermissionGated").field("dir", dir).finish()
            }
        }
    }
}

impl SaveStrategy {
    /// Filesystem-backed strategy for `tier`. The managed index keeps its
    /// bookkeeping in `data_dir`, never among the pictures.
    pub fn for_tier(tier: CapabilityTier, pictures_dir: PathBuf, data_dir: PathBuf) -> Self {
        match tier {
            CapabilityTier::A => SaveStrategy::ManagedIndex(MediaIndex::new(pictures_dir, data_dir)),
            CapabilityTier::B => SaveStrategy::PublicDirectory { dir: pictures_dir },
            CapabilityTier::C => SaveStrategy::PermissionGated {
                dir: pictures_dir,
                gate: platform_gate(),
            },
        }
    }

    /// Detect the platform tier and build its strategy
    pub fn detect(config: &AppConfig) -> Self {
        let tier = CapabilityTier::detect(config.platform_api_level);
        let strategy = match tier {
            CapabilityTier::A => Self::managed(config),
            _ => Self::for_tier(tier, config.resolve_pictures_dir(), config.resolve_data_dir()),
        };
        log::info!("Saving pictures with tier {:?}: {:?}", tier, strategy);
        strategy
    }

    #[cfg(target_os = "android")]
    fn managed(_config: &AppConfig) -> Self {
        SaveStrategy::MediaStore
    }

    #[cfg(not(target_os = "android"))]
    fn managed(config: &AppConfig) -> Self {
        Self::for_tier(
            CapabilityTier::A,
            config.resolve_pictures_dir(),
            config.resolve_data_dir(),
        )
    }

    pub fn tier(&self) -> CapabilityTier {
        match self {
            SaveStrategy::ManagedIndex(_) => CapabilityTier::A,
            #[cfg(target_os = "android")]
            SaveStrategy::MediaStore => CapabilityTier::A,
            SaveStrategy::PublicDirectory { .. } => CapabilityTier::B,
            SaveStrategy::PermissionGated { .. } => CapabilityTier::C,
        }
    }

    /// Persist a bitmap as `downloaded_image.png`
    pub fn save(&self, image: &DynamicImage) -> MemeResult<SavedImage> {
        let saved = match self {
            SaveStrategy::ManagedIndex(index) => save_to_index(index, image)?,
            #[cfg(target_os = "android")]
            SaveStrategy::MediaStore => save_to_media_store(image)?,
            SaveStrategy::PublicDirectory { dir } => save_to_directory(dir, image)?,
            SaveStrategy::PermissionGated { dir, gate } => match gate.request_write(dir) {
                PermissionOutcome::Granted => save_to_directory(dir, image)?,
                PermissionOutcome::Denied => {
                    log::warn!("Write permission denied for {:?}", dir);
                    return Err(MemeError::PermissionDenied(dir.display().to_string()));
                }
            },
        };
        let saved = SavedImage {
            tier: self.tier(),
            ..saved
        };
        log::info!("Saved image to {:?}", saved.path);
        Ok(saved)
    }
}

fn save_to_index(index: &MediaIndex, image: &DynamicImage) -> MemeResult<SavedImage> {
    let (entry, file) = index.insert(DOWNLOAD_FILE_NAME, DOWNLOAD_MIME_TYPE, PICTURES_RELATIVE_PATH)?;
    let mut writer = std::io::BufWriter::new(file);

    let written = write_png(image, &mut writer).and_then(|()| Ok(writer.flush()?));
    if let Err(e) = written {
        if let Err(discard_err) = index.discard(entry.id) {
            log::warn!("Failed to discard entry {}: {}", entry.id, discard_err);
        }
        return Err(e);
    }
    drop(writer);

    index.publish(entry.id)?;
    Ok(SavedImage {
        path: index.path_of(&entry),
        display_name: entry.display_name,
        tier: CapabilityTier::A,
    })
}

#[cfg(target_os = "android")]
fn save_to_media_store(image: &DynamicImage) -> MemeResult<SavedImage> {
    let bytes = encode_png(image)?;
    let uri = android::insert_image(
        DOWNLOAD_FILE_NAME,
        DOWNLOAD_MIME_TYPE,
        PICTURES_RELATIVE_PATH,
        &bytes,
    )?;
    log::debug!("MediaStore entry {}", uri);
    Ok(SavedImage {
        path: Path::new(PICTURES_RELATIVE_PATH).join(DOWNLOAD_FILE_NAME),
        display_name: DOWNLOAD_FILE_NAME.to_string(),
        tier: CapabilityTier::A,
    })
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write to a scratch file and rename over the target, so concurrent saves
/// never interleave bytes; the last rename wins.
fn save_to_directory(dir: &Path, image: &DynamicImage) -> MemeResult<SavedImage> {
    std::fs::create_dir_all(dir)?;

    let target = dir.join(DOWNLOAD_FILE_NAME);
    let tmp = dir.join(format!(
        ".{}.{}.{}.tmp",
        DOWNLOAD_FILE_NAME,
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let result = std::fs::File::create(&tmp)
        .map_err(MemeError::from)
        .and_then(|file| {
            let mut writer = std::io::BufWriter::new(file);
            write_png(image, &mut writer)?;
            writer.flush()?;
            Ok(())
        })
        .and_then(|()| Ok(std::fs::rename(&tmp, &target)?));

    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }

    Ok(SavedImage {
        path: target,
        display_name: DOWNLOAD_FILE_NAME.to_string(),
        tier: CapabilityTier::B,
    })
}
