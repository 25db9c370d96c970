//! Common utilities for integration tests

#![allow(dead_code)]

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_models::ConstantKernelOracle;
pub use test_helpers::{
    assert_vectors_close,
    random_concentration,
    relative_error,
    relative_norm_error,
};
