mod store;

pub use store::MemoryGuideStore;
