use tracing::{info, warn};

use wine_common::error::Result;
use wine_common::TASTINGS;

use crate::WineStore;

/// Drop the whole database if a previous run left tastings behind.
///
/// Returns `true` when a reset happened. A failed drop is returned as an
/// error so no stage writes on top of stale collections.
pub async fn reset_if_populated(store: &WineStore) -> Result<bool> {
    let existing = store.count(TASTINGS).await?;
    if existing == 0 {
        info!("No previous tastings found, skipping reset");
        return Ok(false);
    }

    warn!(
        existing,
        database = store.database().name(),
        "Existing tastings found, dropping database"
    );
    store.database().drop().await?;
    info!("Database dropped");
    Ok(true)
}
