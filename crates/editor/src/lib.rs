//! The guide edit workflow.
//!
//! A request builds an [`EditContext`] from shared [`EditorServices`] and the
//! acting user. The read path goes through [`load_guide`]; the write path
//! through [`submit`], which validates, resolves images through
//! [`resolve_images`] and writes with [`persist_guide`].

pub mod context;
pub mod error;
pub mod flash;
pub mod load;
pub mod persist;
pub mod submit;
pub mod upload;

pub use context::{EditContext, EditorServices};
pub use error::EditError;
pub use flash::{FlashKind, FlashMessage};
pub use load::{EditPage, edit_page, load_guide};
pub use persist::persist_guide;
pub use submit::{SubmitOutcome, guide_path, submit};
pub use upload::resolve_images;

#[cfg(test)]
mod testing;
