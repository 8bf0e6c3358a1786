use tracing::{debug, instrument, warn};

use guides_core::{FormState, GuideForm, encode_key_segment};

use crate::context::EditContext;
use crate::error::EditError;
use crate::persist::persist_guide;
use crate::upload::resolve_images;

/// What the page action answers to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved; send the client to this location.
    Redirect(String),
    /// The form failed validation. Uploaded files are dropped.
    Invalid(FormState<GuideForm>),
    /// Uploading or saving failed. The form keeps its files so it can be
    /// resubmitted as-is.
    Failed {
        message: String,
        form: FormState<GuideForm>,
    },
}

/// Path of the guide detail page.
pub fn guide_path(id: &str) -> String {
    format!("/guides/{}", encode_key_segment(id))
}

/// Handle a parsed submission of the guide update form.
///
/// Invalid forms are returned untouched by any store. Valid forms have their
/// images resolved and the guide record overwritten; on failure an error
/// flash is queued on the context.
#[instrument(skip(ctx, form), fields(user_id = %ctx.user_id, valid = form.valid))]
pub async fn submit(ctx: &mut EditContext, id: &str, form: FormState<GuideForm>) -> SubmitOutcome {
    if !form.valid {
        debug!(errors = form.errors.len(), "submission failed validation");
        return SubmitOutcome::Invalid(form.without_files());
    }

    match write(ctx, id, &form.data).await {
        Ok(()) => SubmitOutcome::Redirect(guide_path(id)),
        Err(e) => {
            warn!(error = %e, "guide update failed");
            let message = e.user_message();
            ctx.flash_error(message.clone());
            SubmitOutcome::Failed {
                form: form.with_message(message.clone()),
                message,
            }
        }
    }
}

async fn write(ctx: &EditContext, id: &str, data: &GuideForm) -> Result<(), EditError> {
    let services = &ctx.services;
    let update = resolve_images(
        services.objects.as_ref(),
        &ctx.user_id,
        data,
        services.max_concurrent_uploads,
    )
    .await?;
    persist_guide(services.guides.as_ref(), id, &update).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use guides_core::{
        FieldErrors, FormFields, FormLimits, ImageField, UPDATE_GUIDE_FORM_ID, parse_guide_form,
    };
    use guides_store::GuideStore;

    use super::*;
    use crate::testing::{
        RecordingGuideStore, ScriptedObjectStore, context_with, png, seeded_guide,
    };

    fn fields() -> FormFields {
        let mut fields = FormFields::new();
        fields.push_text("title", "Sourdough");
        fields.push_text("description", "A slower bread");
        fields.push_file("image", png("cover.png"));
        fields.push_text("steps[0].name", "Feed starter");
        fields.push_text("steps[0].description", "Feed it the night before");
        fields.push_text(
            "steps[0].imageUrl",
            "https://cdn.example.com/guides/step-1_a.png",
        );
        fields.push_text("steps[1].name", "Bake");
        fields.push_text("steps[1].description", "Bake for 45 minutes");
        fields
    }

    fn form() -> FormState<GuideForm> {
        parse_guide_form(fields(), &FormLimits::default())
    }

    #[tokio::test]
    async fn valid_submission_redirects_to_guide() {
        let guides = Arc::new(RecordingGuideStore::new(seeded_guide()));
        let objects = Arc::new(ScriptedObjectStore::new());
        let mut ctx = context_with(guides.clone(), objects.clone());
        ctx.user_id = "bob".into();

        let outcome = submit(&mut ctx, "g-1", form()).await;

        assert_eq!(outcome, SubmitOutcome::Redirect("/guides/g-1".into()));
        assert_eq!(guides.updates.load(Ordering::SeqCst), 1);
        assert_eq!(objects.uploads.load(Ordering::SeqCst), 1);
        let saved = guides.fetch("g-1").await.unwrap();
        assert_eq!(saved.user_id, "bob");
        assert_eq!(saved.title, "Sourdough");
        assert!(saved.image.starts_with("bob_"));
        assert_eq!(saved.steps[0].image, "step-1_a.png");
        assert!(saved.steps[1].image.is_empty());
        assert!(ctx.flash().is_empty());
    }

    #[tokio::test]
    async fn invalid_submission_touches_no_store() {
        let guides = Arc::new(RecordingGuideStore::new(seeded_guide()));
        let objects = Arc::new(ScriptedObjectStore::new());
        let mut ctx = context_with(guides.clone(), objects.clone());

        let mut fields = fields();
        fields.push_text("title", "");
        let form = parse_guide_form(fields, &FormLimits::default());
        let outcome = submit(&mut ctx, "g-1", form).await;

        let SubmitOutcome::Invalid(form) = outcome else {
            panic!("expected invalid outcome, got {outcome:?}");
        };
        assert!(form.errors.contains("title"));
        assert_eq!(form.data.image, ImageField::None);
        assert_eq!(guides.updates.load(Ordering::SeqCst), 0);
        assert_eq!(objects.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cover_upload_failure_skips_the_update() {
        let guides = Arc::new(RecordingGuideStore::new(seeded_guide()));
        let objects =
            Arc::new(ScriptedObjectStore::new().failing_keys(|key| key.starts_with("alice_")));
        let mut ctx = context_with(guides.clone(), objects);

        let outcome = submit(&mut ctx, "g-1", form()).await;

        let SubmitOutcome::Failed { message, form } = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(message, "object storage error: upload rejected");
        assert!(form.data.image.is_upload());
        assert_eq!(guides.updates.load(Ordering::SeqCst), 0);
        assert_eq!(ctx.flash()[0].message, message);
    }

    #[tokio::test]
    async fn step_upload_failure_skips_the_update() {
        let guides = Arc::new(RecordingGuideStore::new(seeded_guide()));
        let objects =
            Arc::new(ScriptedObjectStore::new().failing_keys(|key| key.starts_with("step-")));
        let mut ctx = context_with(guides.clone(), objects.clone());
        let mut fields = fields();
        fields.push_file("steps[1].image", png("crust.png"));

        let form = parse_guide_form(fields, &FormLimits::default());
        let outcome = submit(&mut ctx, "g-1", form).await;

        let SubmitOutcome::Failed { message, form } = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(message, "object storage error: upload rejected");
        assert!(form.data.steps[1].image.is_upload());
        assert!(form.data.image.is_upload());
        assert_eq!(objects.uploads.load(Ordering::SeqCst), 2);
        assert_eq!(guides.updates.load(Ordering::SeqCst), 0);
        assert_eq!(ctx.flash()[0].message, message);
        assert_eq!(guides.fetch("g-1").await.unwrap().title, "Bread");
    }

    #[tokio::test]
    async fn persist_failure_returns_resubmittable_form() {
        let guides = Arc::new(RecordingGuideStore::failing(
            seeded_guide(),
            "connection reset",
        ));
        let objects = Arc::new(ScriptedObjectStore::new());
        let mut ctx = context_with(guides.clone(), objects);
        let submitted = form();

        let outcome = submit(&mut ctx, "g-1", submitted.clone()).await;

        let SubmitOutcome::Failed { message, form } = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(message, "backend error: connection reset");
        assert_eq!(form.message.as_deref(), Some(message.as_str()));
        assert_eq!(form.id, UPDATE_GUIDE_FORM_ID);

        // The payload carries the files and parses back into the same form.
        let json = serde_json::to_string(&form).unwrap();
        let back: FormState<GuideForm> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data, submitted.data);
        assert_eq!(back.errors, FieldErrors::new());
    }

    #[tokio::test]
    async fn url_without_a_usable_key_is_invalid() {
        let guides = Arc::new(RecordingGuideStore::new(seeded_guide()));
        let objects = Arc::new(ScriptedObjectStore::new());
        let mut ctx = context_with(guides.clone(), objects.clone());
        let mut fields = fields();
        fields.push_text(
            "steps[0].imageUrl",
            "https://cdn.example.com/guides/a%2Fb.png",
        );

        let form = parse_guide_form(fields, &FormLimits::default());
        let outcome = submit(&mut ctx, "g-1", form).await;

        let SubmitOutcome::Invalid(form) = outcome else {
            panic!("expected invalid outcome, got {outcome:?}");
        };
        assert!(form.errors.contains("steps[0].imageUrl"));
        assert_eq!(guides.updates.load(Ordering::SeqCst), 0);
        assert_eq!(objects.uploads.load(Ordering::SeqCst), 0);
        assert_eq!(
            guides.fetch("g-1").await.unwrap().steps[0].image,
            "step-1_a.png"
        );
    }

    #[tokio::test]
    async fn unmatched_update_still_redirects() {
        let guides = Arc::new(RecordingGuideStore::new(seeded_guide()));
        let mut ctx = context_with(guides.clone(), Arc::new(ScriptedObjectStore::new()));

        let outcome = submit(&mut ctx, "other", form()).await;

        assert_eq!(outcome, SubmitOutcome::Redirect("/guides/other".into()));
        assert_eq!(guides.updates.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn guide_path_encodes_the_id() {
        assert_eq!(guide_path("g 1/2"), "/guides/g%201%2F2");
    }
}
