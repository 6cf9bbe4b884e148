use super::components::Toasts;
use crate::catalog::CatalogState;
use crate::navigation::Navigator;

/// UI-thread state. Background results are applied here, never from workers.
#[derive(Default)]
pub struct AppState {
    pub navigator: Navigator,
    pub catalog: CatalogState,
    pub toasts: Toasts,
}
