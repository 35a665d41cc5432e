//! Test infrastructure
//!
//! In-memory stand-ins for the table source and the uploader, plus helpers
//! for tests that run against a live MySQL server.

pub mod memory;
pub mod mysql_cleanup;
pub mod recording;
pub mod test_helpers;

pub use memory::{MemorySource, MemoryTable};
pub use recording::{InjectedFailure, RecordingUploader};
pub use test_helpers::{generate_test_id, test_export_config, TestConfig};
