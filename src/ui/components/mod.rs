mod toast;

pub use toast::Toasts;
