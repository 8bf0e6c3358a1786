pub mod error;
pub mod store;
pub mod types;
pub mod url;

pub use error::BlobError;
pub use store::ObjectStore;
pub use types::StoredObject;
pub use url::PublicUrls;
