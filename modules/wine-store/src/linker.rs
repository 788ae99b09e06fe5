//! Back-fills each tasting with its taster's id.
//!
//! One `update_many` per taster, keyed on `taster_name`. The same update
//! folds `region_1`/`region_2` into `regions` and coerces `points` to an
//! integer. Unparseable points become null instead of failing the update.
//!
//! Updates fan out with bounded concurrency. They touch disjoint subsets of
//! tastings, and every one of them is awaited before the linker returns.

use futures::{stream, StreamExt, TryStreamExt};
use mongodb::bson::{doc, Document};
use tracing::{debug, info};

use wine_common::error::Result;
use wine_common::{Taster, POINTS, REGIONS_FIELD, REGION_1, REGION_2, TASTER_ID, TASTER_NAME};

use crate::WineStore;

/// Counts from a full linking pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkStats {
    pub tasters: u64,
    pub matched: u64,
    pub modified: u64,
    /// Unlinked tastings normalized without a taster (only when enabled).
    pub unlinked_normalized: u64,
}

/// `$convert` expression turning text points into an int, null on failure.
pub fn points_to_int() -> Document {
    doc! {
        "$convert": {
            "input": format!("${POINTS}"),
            "to": "int",
            "onError": null,
            "onNull": null,
        }
    }
}

/// Fields set on every normalized tasting, linked or not.
fn normalized_fields() -> Document {
    doc! {
        REGIONS_FIELD: [format!("${REGION_1}"), format!("${REGION_2}")],
        POINTS: points_to_int(),
    }
}

/// Update pipeline applied to every tasting of one taster.
pub fn link_update(taster: &Taster) -> Vec<Document> {
    let mut set = doc! { TASTER_ID: taster.id };
    set.extend(normalized_fields());
    vec![doc! { "$set": set }]
}

/// Read every taster back and link its tastings.
pub async fn link_tastings(store: &WineStore, concurrency: usize) -> Result<LinkStats> {
    let tasters: Vec<Taster> = store.tasters().find(doc! {}).await?.try_collect().await?;

    let results: Vec<(u64, u64)> = stream::iter(tasters.iter())
        .map(|taster| link_one(store, taster))
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await?;

    let stats = results.into_iter().fold(
        LinkStats {
            tasters: tasters.len() as u64,
            ..LinkStats::default()
        },
        |mut acc, (matched, modified)| {
            acc.matched += matched;
            acc.modified += modified;
            acc
        },
    );

    info!(
        tasters = stats.tasters,
        matched = stats.matched,
        modified = stats.modified,
        "Tastings linked to tasters"
    );
    Ok(stats)
}

async fn link_one(store: &WineStore, taster: &Taster) -> Result<(u64, u64)> {
    let result = store
        .tastings()
        .update_many(doc! { TASTER_NAME: taster.name.as_str() }, link_update(taster))
        .await?;
    debug!(
        taster = %taster.name,
        matched = result.matched_count,
        "Linked taster"
    );
    Ok((result.matched_count, result.modified_count))
}

/// Fold regions and coerce points on tastings the linker never reached.
/// Leaves `taster_id` unset.
pub async fn normalize_unlinked(store: &WineStore) -> Result<u64> {
    let result = store
        .tastings()
        .update_many(
            doc! { TASTER_ID: { "$exists": false } },
            vec![doc! { "$set": normalized_fields() }],
        )
        .await?;
    info!(
        normalized = result.modified_count,
        "Unlinked tastings normalized"
    );
    Ok(result.modified_count)
}
