//! Catalog state and search filtering

use crate::error::{MemeError, MemeResult};
use crate::models::{Catalog, MemeRecord};

/// Memes whose name contains `query`, ignoring case, in catalog order.
/// An empty query returns the whole catalog.
pub fn filter_catalog<'a>(catalog: &'a [MemeRecord], query: &str) -> Vec<&'a MemeRecord> {
    if query.is_empty() {
        return catalog.iter().collect();
    }
    let needle = query.to_lowercase();
    catalog
        .iter()
        .filter(|meme| meme.name.to_lowercase().contains(&needle))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Holds the loaded catalog and the current search query.
/// Only the UI thread writes to it; fetch results are applied via [`CatalogState::apply`].
#[derive(Debug)]
pub struct CatalogState {
    memes: Catalog,
    status: LoadStatus,
    pub query: String,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            memes: Vec::new(),
            status: LoadStatus::Idle,
            query: String::new(),
        }
    }
}

impl CatalogState {
    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn memes(&self) -> &[MemeRecord] {
        &self.memes
    }

    /// Mark a fetch as in flight. The current catalog stays visible until the result arrives.
    pub fn begin_load(&mut self) {
        self.status = LoadStatus::Loading;
    }

    /// Apply a fetch result. A success replaces the catalog wholesale; a failure
    /// empties it and returns the error for notification.
    pub fn apply(&mut self, result: MemeResult<Catalog>) -> Option<MemeError> {
        match result {
            Ok(memes) => {
                log::info!("Catalog replaced with {} memes", memes.len());
                self.memes = memes;
                self.status = LoadStatus::Loaded;
                None
            }
            Err(e) => {
                log::error!("Catalog load failed: {}", e);
                self.memes.clear();
                self.status = LoadStatus::Failed;
                Some(e)
            }
        }
    }

    /// The catalog filtered by the current query
    pub fn visible(&self) -> Vec<&MemeRecord> {
        filter_catalog(&self.memes, &self.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_catalog() -> Catalog {
        vec![
            MemeRecord::new("1", "Funny Cat", "u1"),
            MemeRecord::new("2", "Serious Dog", "u2"),
            MemeRecord::new("3", "Catapult Fail", "u3"),
        ]
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let catalog = sample_catalog();
        let ids: Vec<_> = filter_catalog(&catalog, "").iter().map(|m| &m.id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let catalog = sample_catalog();
        let ids: Vec<_> = filter_catalog(&catalog, "CAT").iter().map(|m| &m.id).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_query_matches_inside_words() {
        let catalog = sample_catalog();
        let result = filter_catalog(&catalog, "rious");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Serious Dog");
    }

    #[test]
    fn test_no_match_returns_empty() {
        let catalog = sample_catalog();
        assert!(filter_catalog(&catalog, "parrot").is_empty());
    }

    #[test]
    fn test_non_ascii_case_folding() {
        let catalog = vec![MemeRecord::new("1", "ÜBER Meme", "u1")];
        assert_eq!(filter_catalog(&catalog, "über").len(), 1);
    }

    #[test]
    fn test_duplicate_ids_are_kept() {
        let catalog = vec![
            MemeRecord::new("1", "Cat", "u1"),
            MemeRecord::new("1", "Cat", "u1"),
        ];
        assert_eq!(filter_catalog(&catalog, "cat").len(), 2);
    }

    #[test]
    fn test_state_apply_success_replaces_catalog() {
        let mut state = CatalogState::default();
        state.begin_load();
        assert!(state.is_loading());

        assert!(state.apply(Ok(sample_catalog())).is_none());
        assert_eq!(state.status(), LoadStatus::Loaded);
        assert_eq!(state.memes().len(), 3);

        state.begin_load();
        state.apply(Ok(vec![MemeRecord::new("9", "Other", "u9")]));
        assert_eq!(state.memes().len(), 1);
        assert_eq!(state.memes()[0].id, "9");
    }

    #[test]
    fn test_state_apply_failure_leaves_catalog_empty() {
        let mut state = CatalogState::default();
        state.apply(Ok(sample_catalog()));

        state.begin_load();
        let err = state
            .apply(Err(MemeError::HttpStatus(reqwest::StatusCode::BAD_GATEWAY)))
            .unwrap();

        assert!(err.to_string().contains("502"));
        assert_eq!(state.status(), LoadStatus::Failed);
        assert!(state.memes().is_empty());
        assert!(state.visible().is_empty());
    }

    #[test]
    fn test_state_visible_follows_query() {
        let mut state = CatalogState::default();
        state.apply(Ok(sample_catalog()));

        state.query = "dog".to_string();
        assert_eq!(state.visible().len(), 1);

        state.query.clear();
        assert_eq!(state.visible().len(), 3);
    }

    fn arb_catalog() -> impl Strategy<Value = Catalog> {
        prop::collection::vec("[a-zA-Z ]{0,12}", 0..20).prop_map(|names| {
            names
                .into_iter()
                .enumerate()
                .map(|(i, name)| MemeRecord::new(i.to_string(), name, format!("u{i}")))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_filter_is_ordered_matching_subsequence(
            catalog in arb_catalog(),
            query in "[a-zA-Z]{0,3}",
        ) {
            let result = filter_catalog(&catalog, &query);

            // every kept element matches
            for meme in &result {
                prop_assert!(meme.name.to_lowercase().contains(&query.to_lowercase()));
            }

            // kept elements appear in catalog order (ids are indices)
            let positions: Vec<usize> = result.iter().map(|m| m.id.parse().unwrap()).collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));

            // nothing matching was dropped
            let expected = catalog
                .iter()
                .filter(|m| m.name.to_lowercase().contains(&query.to_lowercase()))
                .count();
            prop_assert_eq!(result.len(), expected);
        }

        #[test]
        fn prop_empty_query_is_identity(catalog in arb_catalog()) {
            let result: Vec<MemeRecord> = filter_catalog(&catalog, "").into_iter().cloned().collect();
            prop_assert_eq!(result, catalog);
        }
    }
}
