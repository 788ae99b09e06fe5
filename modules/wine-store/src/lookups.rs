//! Builds one deduplicated `{ name }` collection per categorical dimension.
//!
//! Each extraction is a full scan of `tastings` ending in `$out`, which
//! replaces the target collection. The four extractions only read the
//! finished tastings, so they run concurrently and are joined before
//! returning.

use std::collections::BTreeMap;

use futures::future::try_join_all;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use tracing::info;

use wine_common::error::Result;
use wine_common::LookupDimension;

use crate::WineStore;

/// Distinct-value pipeline for one dimension.
pub fn lookup_pipeline(dimension: LookupDimension) -> Vec<Document> {
    let field = dimension.source_field();
    let path = format!("${field}");

    let mut pipeline = Vec::with_capacity(6);
    if dimension.is_list() {
        pipeline.push(doc! { "$unwind": path.as_str() });
    }

    let mut not_null = Document::new();
    not_null.insert(field, doc! { "$ne": null });
    pipeline.push(doc! { "$match": not_null });

    pipeline.push(doc! { "$group": { "_id": path } });
    pipeline.push(doc! { "$project": { "_id": 0, "name": "$_id" } });
    pipeline.push(doc! { "$sort": { "name": 1 } });
    pipeline.push(doc! { "$out": dimension.collection() });
    pipeline
}

/// Materialize one lookup collection and return its size.
pub async fn extract_lookup(store: &WineStore, dimension: LookupDimension) -> Result<u64> {
    // $out runs as part of the aggregate command; the cursor comes back empty.
    let _: Vec<Document> = store
        .tastings()
        .aggregate(lookup_pipeline(dimension))
        .await?
        .try_collect()
        .await?;

    let count = store.count(dimension.collection()).await?;
    info!(lookup = %dimension, count, "Lookup collection written");
    Ok(count)
}

/// Run all four extractions concurrently. Returns counts keyed by collection.
pub async fn extract_lookups(store: &WineStore) -> Result<BTreeMap<String, u64>> {
    let counts = try_join_all(
        LookupDimension::ALL
            .into_iter()
            .map(|dimension| async move {
                extract_lookup(store, dimension)
                    .await
                    .map(|count| (dimension.collection().to_string(), count))
            }),
    )
    .await?;

    Ok(counts.into_iter().collect())
}
