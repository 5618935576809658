//! Utility modules.

/// Re-entry guard for long-running operations.
pub mod busy;

/// Input validation shared by the services.
pub mod validation;
