//! Screen routes and the navigation back stack.
//!
//! Every transition is serialized to a location string such as
//! `DetailsScreen?name=Cat%20Meme&url=https%3A%2F%2Fx%2F1.png` and parsed back
//! when the screen is shown. Parameters are percent-encoded, so names and URLs
//! containing `&`, `=` or `?` survive the trip.

pub const CATALOG_ROUTE: &str = "MainScreen";
pub const DETAILS_ROUTE: &str = "DetailsScreen";

/// Parameters handed to the detail screen. Either may be missing if the
/// location was malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedMeme {
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Catalog,
    Details(SelectedMeme),
}

impl Route {
    pub fn details(name: &str, url: &str) -> Self {
        Route::Details(SelectedMeme {
            name: Some(name.to_string()),
            url: Some(url.to_string()),
        })
    }

    pub fn to_location(&self) -> String {
        match self {
            Route::Catalog => CATALOG_ROUTE.to_string(),
            Route::Details(selected) => {
                let mut params = Vec::new();
                if let Some(ref name) = selected.name {
                    params.push(format!("name={}", urlencoding::encode(name)));
                }
                if let Some(ref url) = selected.url {
                    params.push(format!("url={}", urlencoding::encode(url)));
                }
                if params.is_empty() {
                    DETAILS_ROUTE.to_string()
                } else {
                    format!("{}?{}", DETAILS_ROUTE, params.join("&"))
                }
            }
        }
    }

    /// Parse a location string. Returns `None` for unknown screens.
    pub fn parse(location: &str) -> Option<Route> {
        let (screen, query) = match location.split_once('?') {
            Some((screen, query)) => (screen, query),
            None => (location, ""),
        };

        match screen {
            CATALOG_ROUTE => Some(Route::Catalog),
            DETAILS_ROUTE => {
                let mut selected = SelectedMeme::default();
                for pair in query.split('&').filter(|p| !p.is_empty()) {
                    let Some((key, value)) = pair.split_once('=') else {
                        log::warn!("Ignoring malformed navigation parameter: {}", pair);
                        continue;
                    };
                    let value = match urlencoding::decode(value) {
                        Ok(v) => v.into_owned(),
                        Err(e) => {
                            log::warn!("Ignoring undecodable parameter {}: {}", key, e);
                            continue;
                        }
                    };
                    match key {
                        "name" => selected.name = Some(value),
                        "url" => selected.url = Some(value),
                        other => log::debug!("Ignoring unknown navigation parameter: {}", other),
                    }
                }
                Some(Route::Details(selected))
            }
            _ => None,
        }
    }
}

/// Stack of visited locations; the bottom entry is always the catalog
#[derive(Debug)]
pub struct Navigator {
    stack: Vec<String>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            stack: vec![Route::Catalog.to_location()],
        }
    }
}

impl Navigator {
    pub fn navigate(&mut self, route: &Route) {
        let location = route.to_location();
        log::debug!("Navigating to {}", location);
        self.stack.push(location);
    }

    /// Pop the current screen. Returns false when already at the root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Route for the top of the stack; unknown locations fall back to the catalog
    pub fn current(&self) -> Route {
        self.stack
            .last()
            .and_then(|location| Route::parse(location))
            .unwrap_or(Route::Catalog)
    }
}
