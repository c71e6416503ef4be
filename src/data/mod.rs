//! Built-in data: synthetic training sets and named fixtures.

pub mod fixtures;
pub mod sample;

pub use sample::{SampleConfig, generate_training_set};
