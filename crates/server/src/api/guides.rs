use axum::Json;
use axum::extract::{Extension, Multipart, Path, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::info;

use guides_core::{FormState, GuideForm, parse_guide_form};
use guides_editor::{EditContext, EditPage, FlashMessage, SubmitOutcome};

use super::AppState;
use crate::auth::CurrentUser;
use crate::error::ServerError;
use crate::flash::{clear_flash, read_flash, set_flash};
use crate::multipart::read_form_fields;

/// Page data of the guide edit page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPageResponse {
    #[serde(flatten)]
    pub page: EditPage,
    /// Flash message left by a previous request.
    pub flash: Option<FlashMessage>,
}

/// Body of a rejected submission.
#[derive(Debug, Serialize)]
pub struct InvalidFormResponse {
    pub form: FormState<GuideForm>,
}

/// Body of a submission that failed while saving. `form` keeps the
/// submitted files so it can be sent again.
#[derive(Debug, Serialize)]
pub struct FailedUpdateResponse {
    pub message: String,
    pub form: FormState<GuideForm>,
}

/// `GET /guides/{id}/edit` -- the guide with image URLs and the prefilled
/// update form.
pub async fn edit_page(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let pending = read_flash(&headers);
    let mut ctx = EditContext::new(state.services.clone(), user.0);

    match guides_editor::edit_page(&mut ctx, &id).await {
        Ok(page) => {
            let had_flash = pending.is_some();
            let mut response = Json(EditPageResponse {
                page,
                flash: pending,
            })
            .into_response();
            if had_flash {
                clear_flash(&mut response);
            }
            response
        }
        Err(e) => {
            let mut response = ServerError::from(e).into_response();
            set_flash(&mut response, ctx.take_flash());
            response
        }
    }
}

/// `POST /guides/{id}/edit` -- validate a multipart submission, upload new
/// images and save the guide.
pub async fn update_guide(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let fields = read_form_fields(multipart).await?;
    let form = parse_guide_form(fields, &state.services.limits);
    let user_id = user.0;
    let mut ctx = EditContext::new(state.services.clone(), user_id.clone());

    let response = match guides_editor::submit(&mut ctx, &id, form).await {
        SubmitOutcome::Redirect(location) => {
            info!(user_id = %user_id, location = %location, "guide saved");
            (StatusCode::SEE_OTHER, [(LOCATION, location)]).into_response()
        }
        SubmitOutcome::Invalid(form) => {
            (StatusCode::BAD_REQUEST, Json(InvalidFormResponse { form })).into_response()
        }
        SubmitOutcome::Failed { message, form } => {
            let mut response = (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(FailedUpdateResponse { message, form }),
            )
                .into_response();
            set_flash(&mut response, ctx.take_flash());
            response
        }
    };
    Ok(response)
}
