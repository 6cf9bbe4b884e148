mod app;
mod components;
mod screens;
mod state;
mod thumbnails;

pub use app::{launch_gui, MemeGalleryApp};

#[cfg(target_os = "android")]
pub use app::launch_gui_android;
