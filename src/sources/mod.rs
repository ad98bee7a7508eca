//! Place search and encyclopedia lookups.

pub mod places;
pub mod wikipedia;

pub use places::GooglePlaces;
pub use wikipedia::Wikipedia;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Returned by encyclopedia lookups whose search had no hits.
pub const NO_INFORMATION: &str = "No information found on Wikipedia";

/// One place search result. Only `name` is interpreted; every other field is
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Place {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: Map::new(),
        }
    }
}

/// Black-box place search.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Ordered results for a free-text query within `radius` meters.
    async fn search(&self, query: &str, radius: u32) -> Result<Vec<Place>>;
}

/// Black-box encyclopedia lookup.
#[async_trait]
pub trait Encyclopedia: Send + Sync {
    /// Plain-text extract of the best match for `term`, or [`NO_INFORMATION`].
    async fn search_and_fetch(&self, term: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_keeps_extra_fields() {
        let place: Place = serde_json::from_str(
            r#"{"name":"Louvre Museum","place_id":"ChIJ123","rating":4.7}"#,
        )
        .unwrap();
        assert_eq!(place.name, "Louvre Museum");
        assert_eq!(place.details["place_id"], "ChIJ123");

        let back = serde_json::to_value(&place).unwrap();
        assert_eq!(back["rating"], 4.7);
        assert_eq!(back["name"], "Louvre Museum");
    }
}
