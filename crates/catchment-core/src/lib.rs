//! Catchment Core - Domain models, configuration, and file formats
//!
//! This crate holds the record types shared by every catchment crate, the
//! layered configuration, and the readers/writers for property tables and
//! centre point datasets.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;

pub use error::{CatchmentError, Result};
