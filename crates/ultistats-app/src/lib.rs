// Library root: re-exports all modules so integration tests and the binary
// can access the crate's public API.

pub mod config;
pub mod discover;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod roster;
