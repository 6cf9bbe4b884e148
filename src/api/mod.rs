//! Client for the remote meme source (Imgflip)

pub mod imgflip;


pub use imgflip::{
    fetch_catalog, fetch_catalog_async, fetch_catalog_from, fetch_catalog_from_async, fetch_image_async,
    http_client,
};
