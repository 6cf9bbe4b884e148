use crate::config::AppConfig;
use crate::error::{MemeError, MemeResult};
use crate::models::{Catalog, MemesResponse};

/// Build the async HTTP client shared by catalog, thumbnail and download tasks
pub fn http_client(config: &AppConfig) -> MemeResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout)
        .build()?)
}

/// Turn a decoded envelope into a catalog, rejecting API-level failures
fn catalog_from_response(response: MemesResponse) -> MemeResult<Catalog> {
    if !response.success {
        return Err(MemeError::ApiResponse(
            response
                .error_message
                .unwrap_or_else(|| "request was not successful".to_string()),
        ));
    }
    match response.data {
        Some(data) => Ok(data.memes),
        None => Err(MemeError::ApiResponse(
            "response is missing the meme list".to_string(),
        )),
    }
}

/// Fetch the meme catalog (blocking)
pub fn fetch_catalog(config: &AppConfig) -> MemeResult<Catalog> {
    let url = config.catalog_url();
    log::info!("Fetching meme catalog: {}", url);

    let response = reqwest::blocking::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout)
        .build()?
        .get(&url)
        .send()?;

    let status = response.status();
    if !status.is_success() {
        log::warn!("Catalog request returned {}", status);
        return Err(MemeError::HttpStatus(status));
    }

    let body = response.text()?;
    let catalog = catalog_from_response(serde_json::from_str(&body)?)?;
    log::info!("Loaded {} memes", catalog.len());
    Ok(catalog)
}

/// Fetch the meme catalog from a specific base URL (blocking)
pub fn fetch_catalog_from(base_url: &str) -> MemeResult<Catalog> {
    fetch_catalog(&AppConfig::default().with_base_url(base_url))
}

/// Fetch the meme catalog on the async runtime
pub async fn fetch_catalog_async(
    client: &reqwest::Client,
    config: &AppConfig,
) -> MemeResult<Catalog> {
    let url = config.catalog_url();
    log::info!("Fetching meme catalog: {}", url);

    let response = client.get(&url).send().await?;

    let status = response.status();
    if !status.is_success() {
        log::warn!("Catalog request returned {}", status);
        return Err(MemeError::HttpStatus(status));
    }

    let body = response.text().await?;
    let catalog = catalog_from_response(serde_json::from_str(&body)?)?;
    log::info!("Loaded {} memes", catalog.len());
    Ok(catalog)
}

/// Fetch the meme catalog from a specific base URL on the async runtime
pub async fn fetch_catalog_from_async(base_url: &str) -> MemeResult<Catalog> {
    let config = AppConfig::default().with_base_url(base_url);
    let client = http_client(&config)?;
    fetch_catalog_async(&client, &config).await
}

/// Fetch raw image bytes
pub async fn fetch_image_async(client: &reqwest::Client, url: &str) -> MemeResult<Vec<u8>> {
    log::debug!("Fetching image: {}", url);

    let response = client.get(url).send().await?;

    if response.status().is_success() {
        Ok(response.bytes().await?.to_vec())
    } else {
        Err(MemeError::HttpStatus(response.status()))
    }
}
