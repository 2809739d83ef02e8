//! Document store backends

mod factory;
mod in_memory;
mod json_file;

pub use factory::{DocumentStoreBackend, DocumentStoreFactory};
pub use in_memory::InMemoryDocumentStore;
pub use json_file::{read_seed_file, JsonFileDocumentStore, SeedFile};
