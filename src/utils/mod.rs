//! Utility modules for the exporter
//!
//! This module contains various utility functions organized by functionality:
//! - `files`: Writing the output file safely
//! - `http`: Authenticated API client and timeout retries

pub mod files;
pub mod http;
