use guides_core::{GuideUpdate, Step};

use crate::error::StoreError;
use crate::store::GuideStore;

/// Run the guide store conformance test suite.
///
/// Call this from your backend's test module with a store that already holds
/// a guide with identifier `seeded_id` and at least one step. The suite
/// overwrites that guide.
///
/// # Errors
///
/// Returns an error if any store operation fails unexpectedly.
pub async fn run_store_conformance_tests(
    store: &dyn GuideStore,
    seeded_id: &str,
) -> Result<(), StoreError> {
    test_fetch_existing(store, seeded_id).await?;
    test_fetch_missing(store).await?;
    test_update_existing(store, seeded_id).await?;
    test_update_preserves_step_order(store, seeded_id).await?;
    test_update_missing(store).await?;
    Ok(())
}

fn sample_update(user_id: &str, steps: Vec<Step>) -> GuideUpdate {
    GuideUpdate {
        user_id: user_id.to_owned(),
        title: "Updated title".to_owned(),
        description: "Updated description".to_owned(),
        image: format!("{user_id}_cover.png"),
        steps,
    }
}

async fn test_fetch_existing(store: &dyn GuideStore, id: &str) -> Result<(), StoreError> {
    let guide = store.fetch(id).await?;
    assert_eq!(guide.id, id);
    assert!(!guide.steps.is_empty(), "seeded guide should have steps");
    Ok(())
}

async fn test_fetch_missing(store: &dyn GuideStore) -> Result<(), StoreError> {
    let result = store.fetch("conformance-missing-guide").await;
    assert!(
        matches!(result, Err(StoreError::NotFound(_))),
        "fetch on missing guide should return NotFound, got {result:?}"
    );
    Ok(())
}

async fn test_update_existing(store: &dyn GuideStore, id: &str) -> Result<(), StoreError> {
    let update = sample_update("conformance-user", vec![Step::new("Only", "One step", "")]);
    let matched = store.update(id, &update).await?;
    assert!(matched, "update on existing guide should match a row");

    let guide = store.fetch(id).await?;
    assert_eq!(guide.id, id, "update must not change the identifier");
    assert_eq!(guide.user_id, "conformance-user");
    assert_eq!(guide.title, "Updated title");
    assert_eq!(guide.description, "Updated description");
    assert_eq!(guide.image, "conformance-user_cover.png");
    assert_eq!(guide.steps, update.steps);
    Ok(())
}

async fn test_update_preserves_step_order(
    store: &dyn GuideStore,
    id: &str,
) -> Result<(), StoreError> {
    let steps: Vec<Step> = (1..=5)
        .rev()
        .map(|n| Step::new(format!("step {n}"), format!("do {n}"), format!("step-{n}_k.png")))
        .collect();
    store.update(id, &sample_update("owner", steps.clone())).await?;

    let guide = store.fetch(id).await?;
    let names: Vec<&str> = guide.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["step 5", "step 4", "step 3", "step 2", "step 1"]);
    assert_eq!(guide.steps, steps);
    Ok(())
}

async fn test_update_missing(store: &dyn GuideStore) -> Result<(), StoreError> {
    let matched = store
        .update("conformance-missing-guide", &sample_update("u", Vec::new()))
        .await?;
    assert!(!matched, "update on missing guide should match no row");

    let result = store.fetch("conformance-missing-guide").await;
    assert!(
        matches!(result, Err(StoreError::NotFound(_))),
        "update must not create rows"
    );
    Ok(())
}
