use std::sync::Arc;

use guides_blob::ObjectStore;
use guides_core::FormLimits;
use guides_store::GuideStore;

use crate::flash::FlashMessage;

/// Default number of step images uploaded at once.
pub const DEFAULT_MAX_CONCURRENT_UPLOADS: usize = 4;

/// Long-lived collaborators shared by every request.
#[derive(Clone)]
pub struct EditorServices {
    pub guides: Arc<dyn GuideStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub limits: FormLimits,
    pub max_concurrent_uploads: usize,
}

impl std::fmt::Debug for EditorServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorServices")
            .field("limits", &self.limits)
            .field("max_concurrent_uploads", &self.max_concurrent_uploads)
            .finish_non_exhaustive()
    }
}

impl EditorServices {
    pub fn new(guides: Arc<dyn GuideStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            guides,
            objects,
            limits: FormLimits::default(),
            max_concurrent_uploads: DEFAULT_MAX_CONCURRENT_UPLOADS,
        }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: FormLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the step upload parallelism. Zero is treated as one.
    #[must_use]
    pub fn with_max_concurrent_uploads(mut self, max: usize) -> Self {
        self.max_concurrent_uploads = max.max(1);
        self
    }
}

/// Per-request state: the acting user and the flash messages raised while
/// handling the request.
#[derive(Debug)]
pub struct EditContext {
    pub services: EditorServices,
    pub user_id: String,
    flash: Vec<FlashMessage>,
}

impl EditContext {
    pub fn new(services: EditorServices, user_id: impl Into<String>) -> Self {
        Self {
            services,
            user_id: user_id.into(),
            flash: Vec::new(),
        }
    }

    /// Queue an error flash for the next page render.
    pub fn flash_error(&mut self, message: impl Into<String>) {
        self.flash.push(FlashMessage::error(message));
    }

    pub fn flash(&self) -> &[FlashMessage] {
        &self.flash
    }

    /// Drain queued flash messages.
    pub fn take_flash(&mut self) -> Vec<FlashMessage> {
        std::mem::take(&mut self.flash)
    }
}
