use serde::{Deserialize, Serialize};

/// A guide as persisted in the record store.
///
/// Image fields hold object-store keys only. An empty string means the guide
/// (or step) has no image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guide {
    /// Store-assigned identifier.
    pub id: String,
    /// Owner of the guide.
    pub user_id: String,
    /// Guide title.
    pub title: String,
    /// Guide description.
    pub description: String,
    /// Stored key of the cover image.
    #[serde(default)]
    pub image: String,
    /// Ordered steps. Position is the index in this list.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One ordered step of a [`Guide`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Step name.
    pub name: String,
    /// Step description.
    pub description: String,
    /// Stored key of the step image (empty when absent).
    #[serde(default)]
    pub image: String,
}

impl Step {
    /// Create a step.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: image.into(),
        }
    }
}

/// The fields merged into an existing guide row by an edit.
///
/// The guide id is not part of the update; it comes from the route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideUpdate {
    /// The acting user, recorded as the owner.
    pub user_id: String,
    /// New title.
    pub title: String,
    /// New description.
    pub description: String,
    /// Resolved cover image key.
    pub image: String,
    /// Resolved steps, in submitted order.
    pub steps: Vec<Step>,
}

impl Guide {
    /// Apply an update in place, keeping the identifier.
    pub fn apply(&mut self, update: GuideUpdate) {
        self.user_id = update.user_id;
        self.title = update.title;
        self.description = update.description;
        self.image = update.image;
        self.steps = update.steps;
    }
}
