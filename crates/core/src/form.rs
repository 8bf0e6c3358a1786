use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::image::ImageField;
use crate::view::GuideView;

/// Identifier of the guide update form, echoed back to clients so they can
/// tell forms on the same page apart.
pub const UPDATE_GUIDE_FORM_ID: &str = "update-guide";

/// Validation errors keyed by field path (`title`, `steps[1].name`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error message for a field path.
    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.entry(path.into()).or_default().push(message.into());
    }

    /// Messages recorded for a field path.
    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.0.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(path, messages)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Limits applied by the guide form schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormLimits {
    /// Largest accepted image upload, in bytes.
    pub max_image_bytes: usize,
    /// Largest accepted number of steps.
    pub max_steps: usize,
}

impl Default for FormLimits {
    fn default() -> Self {
        Self {
            max_image_bytes: 5 * 1024 * 1024,
            max_steps: 50,
        }
    }
}

/// Per-request form wrapper: the values, whether they passed the schema, and
/// the field errors when they did not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState<T> {
    /// Form identifier.
    pub id: String,
    /// `true` when `errors` is empty.
    pub valid: bool,
    /// Field values.
    pub data: T,
    /// Field errors keyed by path.
    #[serde(default)]
    pub errors: FieldErrors,
    /// Optional form-level message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> FormState<T> {
    /// Wrap validated data. The form is valid iff `errors` is empty.
    pub fn new(id: impl Into<String>, data: T, errors: FieldErrors) -> Self {
        Self {
            id: id.into(),
            valid: errors.is_empty(),
            data,
            errors,
            message: None,
        }
    }

    /// Attach a form-level message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// The guide edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideForm {
    pub title: String,
    pub description: String,
    pub image: ImageField,
    pub steps: Vec<StepForm>,
}

/// One step of the guide edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepForm {
    pub name: String,
    pub description: String,
    pub image: ImageField,
}

impl GuideForm {
    /// Shape a display guide into form values. Images become references to
    /// their public URLs.
    pub fn from_view(view: &GuideView) -> Self {
        Self {
            title: view.title.clone(),
            description: view.description.clone(),
            image: ImageField::from_url(view.image_url.clone()),
            steps: view
                .steps
                .iter()
                .map(|step| StepForm {
                    name: step.name.clone(),
                    description: step.description.clone(),
                    image: ImageField::from_url(step.image_url.clone()),
                })
                .collect(),
        }
    }

    /// Number of image fields carrying a new file.
    pub fn upload_count(&self) -> usize {
        usize::from(self.image.is_upload())
            + self.steps.iter().filter(|s| s.image.is_upload()).count()
    }

    /// Drop every uploaded file, keeping URLs and text.
    #[must_use]
    pub fn without_files(self) -> Self {
        Self {
            image: self.image.without_file(),
            steps: self
                .steps
                .into_iter()
                .map(|step| StepForm {
                    image: step.image.without_file(),
                    ..step
                })
                .collect(),
            ..self
        }
    }
}

impl FormState<GuideForm> {
    /// Prefill the update form from a display guide, validating it against
    /// the same schema used for submissions.
    pub fn prefill(view: &GuideView, limits: &FormLimits) -> Self {
        let data = GuideForm::from_view(view);
        let errors = data.validate(limits);
        Self::new(UPDATE_GUIDE_FORM_ID, data, errors)
    }

    /// Drop uploaded files from the form data. Used for responses that do not
    /// need to hand files back to the client.
    #[must_use]
    pub fn without_files(self) -> Self {
        Self {
            data: self.data.without_files(),
            ..self
        }
    }
}
