mod store;

pub use store::{DEFAULT_BASE_URL, MemoryObject, MemoryObjectStore};
