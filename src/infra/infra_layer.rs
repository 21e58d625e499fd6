// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "github/mod.rs"]
pub mod github;

#[path = "storage/mod.rs"]
pub mod storage;
