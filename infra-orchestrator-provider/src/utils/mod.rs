//! Utility modules.

/// RFC3339 timestamp (de)serialization for optional fields.
pub mod datetime;

/// Truncation of response bodies and masking of credentials in logs.
pub mod log_sanitizer;
