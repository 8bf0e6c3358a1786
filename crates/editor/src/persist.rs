use tracing::{info, instrument, warn};

use guides_core::GuideUpdate;
use guides_store::GuideStore;

use crate::error::EditError;

/// Write the update to the guide identified by `id`.
///
/// An update that matches no row is logged and treated as success.
#[instrument(skip(store, update), fields(steps = update.steps.len()))]
pub async fn persist_guide(
    store: &dyn GuideStore,
    id: &str,
    update: &GuideUpdate,
) -> Result<(), EditError> {
    let matched = store.update(id, update).await.map_err(EditError::Persist)?;
    if matched {
        info!("guide updated");
    } else {
        warn!("guide update matched no row");
    }
    Ok(())
}
