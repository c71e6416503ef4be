//! Mathematical utilities: softmax and feature standardization.

pub mod softmax;
pub mod standardize;

pub use softmax::*;
pub use standardize::*;
