use std::fmt;

/// Coarse failure classes surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No connectivity, DNS failure, timeout, broken body stream
    Transport,
    /// Bad HTTP status or a response body we could not make sense of
    Protocol,
    /// Image bytes are not a decodable image
    DecodeFailure,
    /// Storage write permission was refused
    PermissionDenied,
    /// Writing to local storage failed
    Storage,
}

/// Unified error type for network, decode and storage operations
#[derive(Debug)]
pub enum MemeError {
    /// HTTP request failed before a response was read (network error, timeout, etc.)
    Network(reqwest::Error),
    /// HTTP error status code
    HttpStatus(reqwest::StatusCode),
    /// Failed to parse JSON response
    Parse(serde_json::Error),
    /// API answered but reported a failure in its envelope
    ApiResponse(String),
    /// Image decoding or encoding error
    Image(image::ImageError),
    /// Write permission refused for the given location
    PermissionDenied(String),
    /// File I/O error
    Io(std::io::Error),
    /// Picture index could not be read or written
    Index(String),
    /// Call into the Android framework failed
    Platform(String),
}

impl MemeError {
    /// Classify the error for user-facing reporting
    pub fn kind(&self) -> FailureKind {
        match self {
            MemeError::Network(e) if e.is_status() => FailureKind::Protocol,
            MemeError::Network(e) if e.is_decode() => FailureKind::Protocol,
            MemeError::Network(_) => FailureKind::Transport,
            MemeError::HttpStatus(_) | MemeError::Parse(_) | MemeError::ApiResponse(_) => {
                FailureKind::Protocol
            }
            MemeError::Image(_) => FailureKind::DecodeFailure,
            MemeError::PermissionDenied(_) => FailureKind::PermissionDenied,
            MemeError::Io(_) | MemeError::Index(_) | MemeError::Platform(_) => {
                FailureKind::Storage
            }
        }
    }
}

impl fmt::Display for MemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemeError::Network(e) => write!(f, "Network error: {}", e),
            MemeError::HttpStatus(status) => write!(f, "HTTP error: {}", status),
            MemeError::Parse(e) => write!(f, "Parse error: {}", e),
            MemeError::ApiResponse(msg) => write!(f, "API error: {}", msg),
            MemeError::Image(e) => write!(f, "Image error: {}", e),
            MemeError::PermissionDenied(target) => {
                write!(f, "Permission denied: cannot write to {}", target)
            }
            MemeError::Io(e) => write!(f, "I/O error: {}", e),
            MemeError::Index(msg) => write!(f, "Picture index error: {}", msg),
            MemeError::Platform(msg) => write!(f, "Platform error: {}", msg),
        }
    }
}

impl std::error::Error for MemeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MemeError::Network(e) => Some(e),
            MemeError::Parse(e) => Some(e),
            MemeError::Image(e) => Some(e),
            MemeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MemeError {
    fn from(err: reqwest::Error) -> Self {
        MemeError::Network(err)
    }
}

impl From<serde_json::Error> for MemeError {
    fn from(err: serde_json::Error) -> Self {
        MemeError::Parse(err)
    }
}

impl From<image::ImageError> for MemeError {
    fn from(err: image::ImageError) -> Self {
        MemeError::Image(err)
    }
}

impl From<std::io::Error> for MemeError {
    fn from(err: std::io::Error) -> Self {
        MemeError::Io(err)
    }
}

#[cfg(target_os = "android")]
impl From<jni::errors::Error> for MemeError {
    fn from(err: jni::errors::Error) -> Self {
        MemeError::Platform(err.to_string())
    }
}

/// Result type alias for meme gallery operations
pub type MemeResult<T> = Result<T, MemeError>;
