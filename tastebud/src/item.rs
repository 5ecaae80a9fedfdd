//! Catalogue items as handed to the engine by the catalogue.

use std::{collections::HashMap, hash::BuildHasher};

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// Stable identifier of an [`Item`].
#[derive(
    Clone, Debug, Display, From, Into, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ItemId(String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A hydrated movie or tv title.
///
/// Only the `id` and the `features` take part in the learning, the remaining fields are passed
/// through to the recommendations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    /// Absent features are treated as the all-zero vector.
    #[serde(default)]
    pub features: Option<FeatureVector>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub trailer_key: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, features: impl Into<FeatureVector>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            features: Some(features.into()),
            poster_url: None,
            trailer_key: None,
        }
    }
}

/// Lookup of the feature vectors by item id.
pub trait FeatureLookup {
    fn features(&self, id: &ItemId) -> Option<&FeatureVector>;
}

impl<S: BuildHasher> FeatureLookup for HashMap<ItemId, FeatureVector, S> {
    fn features(&self, id: &ItemId) -> Option<&FeatureVector> {
        self.get(id)
    }
}

impl<'a, S: BuildHasher> FeatureLookup for HashMap<&'a ItemId, &'a FeatureVector, S> {
    fn features(&self, id: &ItemId) -> Option<&FeatureVector> {
        self.get(id).copied()
    }
}

/// Indexes the feature vectors of the pool by id.
pub(crate) fn index_features(pool: &[Item]) -> HashMap<&ItemId, &FeatureVector> {
    pool.iter()
        .filter_map(|item| item.features.as_ref().map(|features| (&item.id, features)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_conversions() {
        let id = ItemId::from("tt0133093");
        assert_eq!(id.as_str(), "tt0133093");
        assert_eq!(id.to_string(), "tt0133093");
        assert_eq!(String::from(id.clone()), "tt0133093");
        assert_eq!(ItemId::from("tt0133093".to_string()), id);
    }

    #[test]
    fn test_index_features_skips_missing_features() {
        let mut without = Item::new("b", vec![0., 1.]);
        without.features = None;
        let pool = vec![Item::new("a", vec![1., 0.]), without];

        let index = index_features(&pool);

        assert!(index.features(&"a".into()).is_some());
        assert!(index.features(&"b".into()).is_none());
    }

    #[test]
    fn test_item_deserializes_without_optional_fields() {
        let item: Item = serde_json::from_str(r#"{"id": "tt1", "features": [1.0, 0.5]}"#).unwrap();

        assert_eq!(item.id, ItemId::from("tt1"));
        assert!(item.title.is_empty());
        assert_eq!(item.features.map(|features| features.len()), Some(2));
        assert!(item.poster_url.is_none());
    }
}
