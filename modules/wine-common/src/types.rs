use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

// --- Collection names ---

pub const TASTINGS: &str = "tastings";
pub const TASTERS: &str = "tasters";
pub const VARIETIES: &str = "varieties";
pub const COUNTRIES: &str = "countries";
pub const PROVINCES: &str = "provinces";
pub const REGIONS: &str = "regions";

// --- Tasting field names ---

pub const TASTER_NAME: &str = "taster_name";
pub const TASTER_TWITTER: &str = "taster_twitter_handle";
pub const TASTER_ID: &str = "taster_id";
pub const REGION_1: &str = "region_1";
pub const REGION_2: &str = "region_2";
pub const REGIONS_FIELD: &str = "regions";
pub const POINTS: &str = "points";

/// A taster entity derived from the tastings that name them.
///
/// `id` is generated when the taster is created and is the value written to
/// `taster_id` on every linked tasting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taster {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub twitter: Option<String>,
    pub tastings: i64,
}

/// A deduplicated lookup row: `{ name }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
    pub name: String,
}

/// A categorical dimension of the tastings collection that gets its own
/// lookup collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupDimension {
    Variety,
    Country,
    Province,
    Region,
}

impl LookupDimension {
    pub const ALL: [LookupDimension; 4] = [
        LookupDimension::Variety,
        LookupDimension::Country,
        LookupDimension::Province,
        LookupDimension::Region,
    ];

    /// Field on the tasting document the values are read from.
    pub fn source_field(self) -> &'static str {
        match self {
            Self::Variety => "variety",
            Self::Country => "country",
            Self::Province => "province",
            Self::Region => REGIONS_FIELD,
        }
    }

    /// Collection the deduplicated values are written to.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Variety => VARIETIES,
            Self::Country => COUNTRIES,
            Self::Province => PROVINCES,
            Self::Region => REGIONS,
        }
    }

    /// List-valued fields are unwound so each element counts on its own.
    pub fn is_list(self) -> bool {
        matches!(self, Self::Region)
    }
}

impl std::fmt::Display for LookupDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn taster_serializes_id_as_underscore_id_and_keeps_null_twitter() {
        let taster = Taster {
            id: ObjectId::new(),
            name: "Ana".into(),
            twitter: None,
            tastings: 2,
        };
        let doc = bson::to_document(&taster).unwrap();
        assert_eq!(doc.get_object_id("_id").unwrap(), taster.id);
        assert!(doc.get("twitter").unwrap().as_null().is_some());
        assert!(!doc.contains_key("id"));
    }

    #[test]
    fn lookup_dimensions_target_distinct_collections() {
        let mut names: Vec<_> = LookupDimension::ALL.iter().map(|d| d.collection()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 4);
        assert!(LookupDimension::Region.is_list());
        assert_eq!(LookupDimension::Region.source_field(), "regions");
    }
}
