// Local storage backends.
// - `json_file_store.rs` keeps every key in one JSON file on disk.
// - `in_memory.rs` forgets everything when the process exits.

pub mod in_memory;
pub mod json_file_store;

pub use in_memory::InMemoryStore;
pub use json_file_store::JsonFileStore;
