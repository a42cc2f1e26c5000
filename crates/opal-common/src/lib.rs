//! OpalDB common types, errors, and utilities.
//!
//! This crate provides shared definitions used across all OpalDB components.

pub mod config;
pub mod error;
pub mod types;
pub mod value;

pub use config::EngineConfig;
pub use error::{OpalError, Result};
pub use types::DataType;
pub use value::Value;
