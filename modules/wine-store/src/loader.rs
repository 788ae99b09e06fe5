use tracing::info;

use wine_common::error::Result;

use crate::{SourceBatch, WineStore};

/// Insert every raw record into `tastings` in one bulk operation.
///
/// Records are written verbatim. An empty batch writes nothing.
pub async fn load_tastings(store: &WineStore, batch: &SourceBatch) -> Result<u64> {
    if batch.is_empty() {
        info!("Source batch is empty, nothing to load");
        return Ok(0);
    }

    let result = store.tastings().insert_many(batch.records()).await?;
    let inserted = result.inserted_ids.len() as u64;

    info!(inserted, "Tastings loaded");
    Ok(inserted)
}
