use serde::Serialize;
use tracing::{debug, instrument, warn};

use guides_blob::{BlobError, ObjectStore};
use guides_core::{FormState, Guide, GuideForm, GuideView, StepView};

use crate::context::EditContext;
use crate::error::EditError;

/// Page data for the guide edit page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPage {
    pub guide: GuideView,
    pub update_form: FormState<GuideForm>,
}

/// Turn a stored key into a public URL. An empty key means no image.
fn resolve_key(objects: &dyn ObjectStore, key: &str) -> Result<Option<String>, BlobError> {
    if key.is_empty() {
        return Ok(None);
    }
    objects.public_url(key).map(Some)
}

/// Shape a stored guide for display: every stored key becomes a URL.
pub fn to_view(objects: &dyn ObjectStore, guide: Guide) -> Result<GuideView, BlobError> {
    let image_url = resolve_key(objects, &guide.image)?;
    let steps = guide
        .steps
        .into_iter()
        .map(|step| {
            Ok(StepView {
                image_url: resolve_key(objects, &step.image)?,
                name: step.name,
                description: step.description,
            })
        })
        .collect::<Result<Vec<_>, BlobError>>()?;

    Ok(GuideView {
        id: guide.id,
        user_id: guide.user_id,
        title: guide.title,
        description: guide.description,
        image_url,
        steps,
    })
}

/// Fetch a guide and resolve its images for display.
///
/// On failure an error flash is queued on the context.
#[instrument(skip(ctx), fields(user_id = %ctx.user_id))]
pub async fn load_guide(ctx: &mut EditContext, id: &str) -> Result<GuideView, EditError> {
    let result = match ctx.services.guides.fetch(id).await {
        Ok(guide) => to_view(ctx.services.objects.as_ref(), guide).map_err(EditError::ResolveImage),
        Err(e) => Err(EditError::Fetch(e)),
    };

    match result {
        Ok(view) => {
            debug!(steps = view.steps.len(), "guide loaded");
            Ok(view)
        }
        Err(e) => {
            warn!(error = %e, "failed to load guide");
            ctx.flash_error(e.user_message());
            Err(e)
        }
    }
}

/// Load a guide and prefill the update form from it.
pub async fn edit_page(ctx: &mut EditContext, id: &str) -> Result<EditPage, EditError> {
    let guide = load_guide(ctx, id).await?;
    let update_form = FormState::prefill(&guide, &ctx.services.limits);
    Ok(EditPage { guide, update_form })
}
