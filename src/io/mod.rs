//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - classifier artifact files (`model_file`)

pub mod ingest;
pub mod model_file;

pub use ingest::*;
pub use model_file::*;
