mod catalog;
mod details;

pub use catalog::{CatalogAction, CatalogScreen};
pub use details::{DetailsAction, DetailsScreen};
