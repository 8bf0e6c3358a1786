use serde::{Deserialize, Serialize};

/// A guide shaped for display: every image is a public URL, never a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideView {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    /// Public URL of the cover image, if the guide has one.
    pub image_url: Option<String>,
    pub steps: Vec<StepView>,
}

/// A step shaped for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
}
