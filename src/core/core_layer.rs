// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "github/mod.rs"]
pub mod github;

#[path = "storage/mod.rs"]
pub mod storage;
