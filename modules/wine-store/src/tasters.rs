//! Derives one `tasters` record per distinct taster name.
//!
//! Grouping happens server-side. Identity is assigned here, after the rows
//! come back, so the group count is never reused as an `_id`.

use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use serde::Deserialize;
use tracing::info;

use wine_common::error::Result;
use wine_common::{Taster, TASTER_NAME, TASTER_TWITTER};

use crate::WineStore;

/// One aggregated group before it receives an identity.
#[derive(Debug, Deserialize)]
struct TasterGroup {
    name: String,
    twitter: Option<String>,
    tastings: i64,
}

/// Match named tastings, group by name, keep the first handle seen and the
/// group size.
pub fn taster_pipeline() -> Vec<Document> {
    vec![
        doc! { "$match": { TASTER_NAME: { "$ne": null } } },
        doc! {
            "$group": {
                "_id": format!("${TASTER_NAME}"),
                "social": { "$push": format!("${TASTER_TWITTER}") },
                "total_tastings": { "$sum": 1 },
            }
        },
        doc! {
            "$project": {
                "_id": 0,
                "name": "$_id",
                "twitter": { "$arrayElemAt": ["$social", 0] },
                "tastings": "$total_tastings",
            }
        },
    ]
}

/// Build the `tasters` collection. Returns the created tasters.
pub async fn create_tasters(store: &WineStore) -> Result<Vec<Taster>> {
    let rows: Vec<Document> = store
        .tastings()
        .aggregate(taster_pipeline())
        .await?
        .try_collect()
        .await?;

    let tasters = rows
        .into_iter()
        .map(into_taster)
        .collect::<Result<Vec<_>>>()?;

    if tasters.is_empty() {
        info!("No named tastings, tasters collection left empty");
        return Ok(tasters);
    }

    store.tasters().insert_many(&tasters).await?;
    info!(tasters = tasters.len(), "Tasters created");
    Ok(tasters)
}

fn into_taster(row: Document) -> Result<Taster> {
    let group: TasterGroup = bson::from_document(row)?;
    Ok(Taster {
        id: ObjectId::new(),
        name: group.name,
        twitter: group.twitter,
        tastings: group.tastings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_excludes_null_names_before_grouping() {
        let pipeline = taster_pipeline();
        let stage = pipeline[0].get_document("$match").unwrap();
        let cond = stage.get_document("taster_name").unwrap();
        assert!(cond.get("$ne").unwrap().as_null().is_some());
        assert!(pipeline[1].contains_key("$group"));
    }

    #[test]
    fn group_without_handle_keeps_null_twitter() {
        let taster = into_taster(doc! { "name": "Kerin", "twitter": null, "tastings": 3 }).unwrap();
        assert_eq!(taster.name, "Kerin");
        assert_eq!(taster.twitter, None);
        assert_eq!(taster.tastings, 3);
    }

    #[test]
    fn group_missing_twitter_field_decodes_as_none() {
        // $arrayElemAt on an empty list yields a missing field.
        let taster = into_taster(doc! { "name": "Kerin", "tastings": 1 }).unwrap();
        assert_eq!(taster.twitter, None);
    }

    #[test]
    fn each_taster_gets_a_fresh_identity() {
        let a = into_taster(doc! { "name": "A", "twitter": "@a", "tastings": 1 }).unwrap();
        let b = into_taster(doc! { "name": "B", "twitter": "@b", "tastings": 1 }).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.twitter.as_deref(), Some("@a"));
    }
}
