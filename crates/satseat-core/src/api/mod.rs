//! REST API client module for the College Board admissions services.
//!
//! This module provides the `ApiClient` for querying upcoming SAT test
//! dates and the test centers that have seats on each date.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
