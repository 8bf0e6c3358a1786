pub mod form;
pub mod guide;
pub mod image;
pub mod schema;
pub mod view;

pub use form::{FieldErrors, FormLimits, FormState, GuideForm, StepForm, UPDATE_GUIDE_FORM_ID};
pub use guide::{Guide, GuideUpdate, Step};
pub use image::{
    ImageField, KeyScope, UploadedFile, encode_key_segment, file_extension, is_valid_key,
    key_from_url, new_object_key, object_key,
};
pub use schema::{FieldValue, FormFields, parse_guide_form};
pub use view::{GuideView, StepView};
