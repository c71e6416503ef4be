//! Domain types used throughout the pipeline.
//!
//! - the static threshold schema (`schema`)
//! - input records and their builder (`record`)
//! - the three closed label spaces (`labels`)
//! - prediction output (`prediction`)
//! - training/run configuration (`config`)

pub mod config;
pub mod labels;
pub mod prediction;
pub mod record;
pub mod schema;

pub use config::*;
pub use labels::*;
pub use prediction::*;
pub use record::*;
pub use schema::*;
