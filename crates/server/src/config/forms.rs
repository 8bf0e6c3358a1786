use guides_core::FormLimits;
use serde::Deserialize;

/// Limits of the guide form.
#[derive(Debug, Deserialize)]
pub struct FormsConfig {
    /// Largest accepted image upload, in bytes.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
    /// Largest accepted number of steps.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: default_max_image_bytes(),
            max_steps: default_max_steps(),
        }
    }
}

impl FormsConfig {
    pub fn limits(&self) -> FormLimits {
        FormLimits {
            max_image_bytes: self.max_image_bytes,
            max_steps: self.max_steps,
        }
    }
}

fn default_max_image_bytes() -> usize {
    FormLimits::default().max_image_bytes
}

fn default_max_steps() -> usize {
    FormLimits::default().max_steps
}
