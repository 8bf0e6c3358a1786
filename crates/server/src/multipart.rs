use axum::extract::Multipart;
use axum::extract::multipart::Field;

use guides_core::{FieldValue, FormFields, UploadedFile};

use crate::error::ServerError;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Read every part of a multipart submission, in order.
///
/// Parts sent with a file name become files; everything else is text.
pub async fn read_form_fields(mut multipart: Multipart) -> Result<FormFields, ServerError> {
    let mut fields = FormFields::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let value = read_value(field).await?;
        fields.push(name, value);
    }
    Ok(fields)
}

async fn read_value(field: Field<'_>) -> Result<FieldValue, ServerError> {
    match field.file_name().map(str::to_owned) {
        Some(file_name) => {
            let content_type = field
                .content_type()
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_owned();
            let data = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(e.body_text()))?;
            Ok(FieldValue::File(UploadedFile::new(
                file_name,
                content_type,
                data,
            )))
        }
        None => field
            .text()
            .await
            .map(FieldValue::Text)
            .map_err(|e| ServerError::BadRequest(e.body_text())),
    }
}
