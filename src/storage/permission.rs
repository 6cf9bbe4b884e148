use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    Granted,
    Denied,
}

/// Grants or refuses write access to shared picture storage.
/// `request_write` blocks until the outcome is known.
pub trait PermissionGate: Send + Sync {
    fn request_write(&self, target: &Path) -> PermissionOutcome;
}

/// Gate used by the permission-gated strategy on this platform: the runtime
/// prompt on Android, a write probe elsewhere
#[cfg(target_os = "android")]
pub fn platform_gate() -> Arc<dyn PermissionGate> {
    Arc::new(super::android::RuntimePermissionGate)
}

#[cfg(not(target_os = "android"))]
pub fn platform_gate() -> Arc<dyn PermissionGate> {
    Arc::new(ProbePermissionGate)
}

/// Answers the request by probing the target directory with a scratch file.
/// Desktop systems have no permission prompt; filesystem access is the grant.
#[derive(Debug, Default)]
pub struct ProbePermissionGate;

const PROBE_FILE_NAME: &str = ".meme_gallery_write_probe";

impl PermissionGate for ProbePermissionGate {
    fn request_write(&self, target: &Path) -> PermissionOutcome {
        if let Err(e) = std::fs::create_dir_all(target) {
            log::warn!("Cannot create {:?}: {}", target, e);
            return PermissionOutcome::Denied;
        }

        let probe = target.join(PROBE_FILE_NAME);
        match std::fs::write(&probe, b"") {
            Ok(()) => {
                if let Err(e) = std::fs::remove_file(&probe) {
                    log::debug!("Failed to remove write probe: {}", e);
                }
                PermissionOutcome::Granted
            }
            Err(e) => {
                log::warn!("Write access to {:?} refused: {}", target, e);
                PermissionOutcome::Denied
            }
        }
    }
}
