//! The guide form schema.
//!
//! One set of rules is applied both to prefilled data and to submissions. A
//! submission arrives as a flat list of named parts ([`FormFields`]); field
//! names use the `steps[<index>].<field>` convention for the step list.

use std::collections::BTreeMap;

use crate::form::{FieldErrors, FormLimits, FormState, GuideForm, StepForm, UPDATE_GUIDE_FORM_ID};
use crate::image::{ImageField, UploadedFile, is_valid_key, key_from_url};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;
pub const STEP_NAME_MAX_CHARS: usize = 100;

const REQUIRED: &str = "Required";
const EXPECTED_TEXT: &str = "Expected text";
const EXPECTED_FILE: &str = "Expected a file";
const UNKNOWN_FIELD: &str = "Unknown field";

/// A single submitted part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File(UploadedFile),
}

/// The raw parts of a submission, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    entries: Vec<(String, FieldValue)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: FieldValue) {
        self.entries.push((name.into(), value));
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.push(name, FieldValue::Text(value.into()));
    }

    pub fn push_file(&mut self, name: impl Into<String>, file: UploadedFile) {
        self.push(name, FieldValue::File(file));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which field of a guide (or of one of its steps) a part targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Title,
    Description,
    Image,
    ImageUrl,
    StepName(usize),
    StepDescription(usize),
    StepImage(usize),
    StepImageUrl(usize),
}

fn parse_target(name: &str) -> Option<Target> {
    match name {
        "title" => return Some(Target::Title),
        "description" => return Some(Target::Description),
        "image" => return Some(Target::Image),
        "imageUrl" => return Some(Target::ImageUrl),
        _ => {}
    }
    let rest = name.strip_prefix("steps[")?;
    let (index, field) = rest.split_once("].")?;
    let index: usize = index.parse().ok()?;
    match field {
        "name" => Some(Target::StepName(index)),
        "description" => Some(Target::StepDescription(index)),
        "image" => Some(Target::StepImage(index)),
        "imageUrl" => Some(Target::StepImageUrl(index)),
        _ => None,
    }
}

/// Image parts collected for one guide or step before precedence is applied.
#[derive(Debug, Default)]
struct ImageParts {
    file: Option<UploadedFile>,
    url: Option<String>,
}

impl ImageParts {
    /// A non-empty file wins over a URL.
    fn into_field(self) -> ImageField {
        match self.file {
            Some(file) => ImageField::Upload(file),
            None => ImageField::from_url(self.url),
        }
    }
}

#[derive(Debug, Default)]
struct StepParts {
    name: Option<String>,
    description: Option<String>,
    image: ImageParts,
}

/// Files with no name and no content are what browsers send for an empty
/// file input.
fn is_empty_file(file: &UploadedFile) -> bool {
    file.file_name.is_empty() && file.data.is_empty()
}

fn take_text(value: FieldValue, path: &str, errors: &mut FieldErrors) -> Option<String> {
    match value {
        FieldValue::Text(text) => Some(text),
        FieldValue::File(_) => {
            errors.add(path, EXPECTED_TEXT);
            None
        }
    }
}

fn take_file(value: FieldValue, path: &str, errors: &mut FieldErrors) -> Option<UploadedFile> {
    match value {
        FieldValue::File(file) if is_empty_file(&file) => None,
        FieldValue::File(file) => Some(file),
        FieldValue::Text(text) if text.is_empty() => None,
        FieldValue::Text(_) => {
            errors.add(path, EXPECTED_FILE);
            None
        }
    }
}

/// Assemble and validate a submission against the guide form schema.
///
/// Unknown part names are field errors on that name. When a part name
/// repeats, the last one wins.
pub fn parse_guide_form(fields: FormFields, limits: &FormLimits) -> FormState<GuideForm> {
    let mut errors = FieldErrors::new();
    let mut title = None;
    let mut description = None;
    let mut image = ImageParts::default();
    let mut steps: BTreeMap<usize, StepParts> = BTreeMap::new();

    for (name, value) in fields.entries {
        let Some(target) = parse_target(&name) else {
            errors.add(name, UNKNOWN_FIELD);
            continue;
        };
        match target {
            Target::Title => title = take_text(value, &name, &mut errors),
            Target::Description => description = take_text(value, &name, &mut errors),
            Target::Image => image.file = take_file(value, &name, &mut errors),
            Target::ImageUrl => image.url = take_text(value, &name, &mut errors),
            Target::StepName(i) => {
                steps.entry(i).or_default().name = take_text(value, &name, &mut errors);
            }
            Target::StepDescription(i) => {
                steps.entry(i).or_default().description = take_text(value, &name, &mut errors);
            }
            Target::StepImage(i) => {
                steps.entry(i).or_default().image.file = take_file(value, &name, &mut errors);
            }
            Target::StepImageUrl(i) => {
                steps.entry(i).or_default().image.url = take_text(value, &name, &mut errors);
            }
        }
    }

    if steps.keys().enumerate().any(|(expected, &index)| expected != index) {
        errors.add("steps", "Steps must be numbered from 0 without gaps");
    }

    let data = GuideForm {
        title: title.unwrap_or_default(),
        description: description.unwrap_or_default(),
        image: image.into_field(),
        steps: steps
            .into_values()
            .map(|parts| StepForm {
                name: parts.name.unwrap_or_default(),
                description: parts.description.unwrap_or_default(),
                image: parts.image.into_field(),
            })
            .collect(),
    };

    // Type errors come first; schema errors are appended to the same map.
    for (path, messages) in data.validate(limits).iter() {
        for message in messages {
            if !errors.get(path).is_some_and(|m| m.contains(message)) {
                errors.add(path, message.clone());
            }
        }
    }

    FormState::new(UPDATE_GUIDE_FORM_ID, data, errors)
}

fn check_text(value: &str, path: &str, max_chars: usize, errors: &mut FieldErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(path, REQUIRED);
    } else if trimmed.chars().count() > max_chars {
        errors.add(path, format!("Must be at most {max_chars} characters"));
    }
}

fn check_image(image: &ImageField, path: &str, limits: &FormLimits, errors: &mut FieldErrors) {
    match image {
        ImageField::None => {}
        ImageField::Upload(file) => {
            if !file.content_type.starts_with("image/") {
                errors.add(path, "File must be an image");
            }
            if file.size() > limits.max_image_bytes {
                errors.add(
                    path,
                    format!("File must be at most {} bytes", limits.max_image_bytes),
                );
            }
        }
        ImageField::Existing { url } => {
            if !is_http_url(url) {
                errors.add(url_path(path), "Must be a valid URL");
            } else if !is_valid_key(&key_from_url(url)) {
                errors.add(url_path(path), "Must link to a stored image");
            }
        }
    }
}

/// Errors about an existing image are reported on the `...Url` field the
/// client sent.
fn url_path(image_path: &str) -> String {
    format!("{image_path}Url")
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    rest.is_some_and(|r| {
        let host = r.split(['/', '?', '#']).next().unwrap_or_default();
        !host.is_empty() && !r.chars().any(char::is_whitespace)
    })
}

impl GuideForm {
    /// Check typed form values against the schema.
    pub fn validate(&self, limits: &FormLimits) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_text(&self.title, "title", TITLE_MAX_CHARS, &mut errors);
        check_text(&self.description, "description", DESCRIPTION_MAX_CHARS, &mut errors);
        check_image(&self.image, "image", limits, &mut errors);

        if self.steps.is_empty() {
            errors.add("steps", "At least one step is required");
        } else if self.steps.len() > limits.max_steps {
            errors.add(
                "steps",
                format!("At most {} steps are allowed", limits.max_steps),
            );
        }

        for (i, step) in self.steps.iter().enumerate() {
            check_text(
                &step.name,
                &format!("steps[{i}].name"),
                STEP_NAME_MAX_CHARS,
                &mut errors,
            );
            check_text(
                &step.description,
                &format!("steps[{i}].description"),
                DESCRIPTION_MAX_CHARS,
                &mut errors,
            );
            check_image(&step.image, &format!("steps[{i}].image"), limits, &mut errors);
        }

        errors
    }
}
