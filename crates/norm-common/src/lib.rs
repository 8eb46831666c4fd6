//! Common utilities for norm
//!
//! This crate provides the error taxonomy shared across all norm crates.

pub mod error;

pub use error::{NormError, Result};
