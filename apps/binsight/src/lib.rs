//! # Binsight Library
//!
//! This library exposes the Binsight modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod estimator;
pub mod upstream;

// Re-export binsight_core for convenience
pub use binsight_core;
