//! Infrastructure layer module
//!
//! This module contains the infrastructure shared by every command:
//! - Configuration management
//! - Logging infrastructure
//! - Chunking and the in-process vector index

pub mod config;
pub mod logging;
pub mod vector;
