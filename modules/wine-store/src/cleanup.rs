use mongodb::bson::{doc, Document};
use tracing::info;

use wine_common::error::Result;
use wine_common::{RegionCleanup, REGIONS_FIELD, REGION_1, REGION_2};

use crate::WineStore;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupStats {
    pub raw_regions_removed: u64,
    pub region_lists_sanitized: u64,
}

/// Drop the raw region fields, then sanitize null entries in `regions`.
/// Must only run after every link update has completed.
pub async fn clean_fields(store: &WineStore, mode: RegionCleanup) -> Result<CleanupStats> {
    let tastings = store.tastings();

    let removed = tastings
        .update_many(
            doc! {},
            doc! { "$unset": { REGION_1: "", REGION_2: "" } },
        )
        .await?;

    let sanitized = tastings
        .update_many(sanitize_filter(mode), sanitize_update(mode))
        .await?;

    let stats = CleanupStats {
        raw_regions_removed: removed.modified_count,
        region_lists_sanitized: sanitized.modified_count,
    };
    info!(
        %mode,
        raw_regions_removed = stats.raw_regions_removed,
        region_lists_sanitized = stats.region_lists_sanitized,
        "Field cleanup complete"
    );
    Ok(stats)
}

/// Tastings holding a null inside `regions`.
///
/// `FirstElement` keeps the broader `$all: [null]` match, which also picks up
/// tastings with no `regions` at all and gives them `[null]`.
pub fn sanitize_filter(mode: RegionCleanup) -> Document {
    match mode {
        RegionCleanup::Full => doc! {
            "$and": [
                { REGIONS_FIELD: { "$type": "array" } },
                { REGIONS_FIELD: null },
            ]
        },
        RegionCleanup::FirstElement => doc! { REGIONS_FIELD: { "$all": [null] } },
    }
}

pub fn sanitize_update(mode: RegionCleanup) -> Vec<Document> {
    let path = format!("${REGIONS_FIELD}");
    let set = match mode {
        RegionCleanup::Full => doc! {
            REGIONS_FIELD: {
                "$filter": {
                    "input": path,
                    "as": "region",
                    "cond": { "$ne": ["$$region", null] },
                }
            }
        },
        RegionCleanup::FirstElement => doc! {
            REGIONS_FIELD: [{ "$arrayElemAt": [path, 0] }]
        },
    };
    vec![doc! { "$set": set }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mode_filters_nulls_out_of_arrays_only() {
        let filter = sanitize_filter(RegionCleanup::Full);
        let clauses = filter.get_array("$and").unwrap();
        assert_eq!(clauses.len(), 2);

        let update = sanitize_update(RegionCleanup::Full);
        let regions = update[0]
            .get_document("$set")
            .unwrap()
            .get_document("regions")
            .unwrap();
        assert!(regions.contains_key("$filter"));
    }

    #[test]
    fn first_element_mode_collapses_to_head() {
        let filter = sanitize_filter(RegionCleanup::FirstElement);
        let all = filter.get_document("regions").unwrap().get_array("$all").unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].as_null().is_some());

        let update = sanitize_update(RegionCleanup::FirstElement);
        let regions = update[0]
            .get_document("$set")
            .unwrap()
            .get_array("regions")
            .unwrap();
        assert_eq!(regions.len(), 1);
        let head = regions[0].as_document().unwrap().get_array("$arrayElemAt").unwrap();
        assert_eq!(head[1].as_i32(), Some(0));
    }
}
