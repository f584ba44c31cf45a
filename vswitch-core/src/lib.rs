//! vswitch core library
//!
//! This crate provides the error type and the decode policy shared by the
//! vswitch packet codecs and the tools built on top of them.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{CodecConfig, OptionsPolicy};
pub use error::{Error, Result};
