use serde::{Deserialize, Serialize};

/// One catalog entry as returned by the Imgflip API
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct MemeRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Number of caption boxes the template has
    #[serde(default)]
    pub box_count: Option<u32>,
}

impl MemeRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            width: None,
            height: None,
            box_count: None,
        }
    }
}

/// Ordered list of memes, in API response order
pub type Catalog = Vec<MemeRecord>;

/// `get_memes` response envelope
#[derive(Debug, Deserialize)]
pub struct MemesResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub data: Option<MemesData>,
    #[serde(default)]
    pub error_message: Option<String>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct MemesData {
    pub memes: Vec<MemeRecord>,
}
