use futures::stream::{self, StreamExt};
use tracing::{debug, instrument};

use guides_blob::url::validate_key;
use guides_blob::{BlobError, ObjectStore};
use guides_core::{
    GuideForm, GuideUpdate, ImageField, KeyScope, Step, key_from_url, new_object_key,
};

use crate::error::EditError;

/// Turn one form image into the key persisted on the record.
///
/// New files are uploaded under a fresh key. Existing URLs are mapped back
/// to their key without touching the store and must yield a key the store
/// can address. No image maps to an empty key.
async fn resolve_image(
    objects: &dyn ObjectStore,
    scope: KeyScope<'_>,
    image: &ImageField,
) -> Result<String, BlobError> {
    match image {
        ImageField::None => Ok(String::new()),
        ImageField::Existing { url } => {
            let key = key_from_url(url);
            validate_key(&key)?;
            Ok(key)
        }
        ImageField::Upload(file) => {
            let key = new_object_key(scope, &file.file_name);
            let stored = objects
                .upload(&key, &file.content_type, file.data.clone())
                .await?;
            debug!(key = %stored.path, size = stored.size_bytes, "image uploaded");
            Ok(stored.path)
        }
    }
}

/// Resolve every image of a validated form into stored keys and build the
/// record update.
///
/// The cover is resolved first and a failure there aborts before any step
/// upload starts. Step images are then resolved concurrently with at most
/// `max_concurrent` uploads in flight. Every step upload runs to completion
/// even when a sibling fails, and the lowest failing step is reported.
/// Objects uploaded before a failure stay in the bucket.
#[instrument(
    skip(objects, form),
    fields(uploads = form.upload_count(), steps = form.steps.len())
)]
pub async fn resolve_images(
    objects: &dyn ObjectStore,
    user_id: &str,
    form: &GuideForm,
    max_concurrent: usize,
) -> Result<GuideUpdate, EditError> {
    let image = resolve_image(objects, KeyScope::Owner(user_id), &form.image)
        .await
        .map_err(EditError::CoverUpload)?;

    // `buffered` keeps input order regardless of completion order.
    let uploads: Vec<_> = form
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| async move {
            let image = resolve_image(objects, KeyScope::Step(index + 1), &step.image).await;
            (index, step, image)
        })
        .collect();
    let resolved = stream::iter(uploads)
        .buffered(max_concurrent.max(1))
        .collect::<Vec<_>>()
        .await;

    let steps = resolved
        .into_iter()
        .map(|(index, step, image)| match image {
            Ok(key) => Ok(Step::new(step.name.trim(), step.description.trim(), key)),
            Err(source) => Err(EditError::StepUpload {
                position: index + 1,
                source,
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GuideUpdate {
        user_id: user_id.to_owned(),
        title: form.title.trim().to_owned(),
        description: form.description.trim().to_owned(),
        image,
        steps,
    })
}
