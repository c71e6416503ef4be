//! `audiometry-classifier` library crate.
//!
//! Classifies an audiogram (24 air/bone conduction thresholds) into hearing
//! loss Type, Degree and Configuration with learned softmax heads.
//!
//! The binary (`audiogram`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the encode / train / predict core is usable without the CLI

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod eval;
pub mod features;
pub mod io;
pub mod math;
pub mod model;
pub mod predict;
pub mod report;
pub mod train;

pub use error::{AppError, ClassifyError};
pub use features::{FeatureVector, encode};
pub use model::{Classifier, ClassifierArtifact};
pub use predict::predict;
pub use train::train;
