//! Conventional classification tokens.
//!
//! Codes are opaque strings and nothing restricts callers to this set;
//! these are the tokens shared across the Strata services so that
//! programmatic branching stays consistent.

/// Catch-all for failures with no better classification.
pub const UNEXPECTED: &str = "unexpected_error";

/// Storage-layer failure.
pub const DATABASE: &str = "database_error";

/// Failure internal to the service; safe default for reclassifying
/// lower-level causes at a boundary.
pub const INTERNAL: &str = "internal_error";

/// The referenced entity does not exist.
pub const NOT_EXISTS: &str = "not_exists";

/// The input failed validation.
pub const VALIDATION: &str = "validation_error";
