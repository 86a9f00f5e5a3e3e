//! # Trilha Common Library
//!
//! Shared code for the Trilha course progression engine:
//! - Domain models (course hierarchy, enrollment, completion records)
//! - Wire request/response types with boundary validation
//! - Error taxonomy
//! - Configuration loading

pub mod api;
pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
