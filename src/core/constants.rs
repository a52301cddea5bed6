//! Shared string constants
//!
//! Message roles, error type identifiers used in JSON error bodies, and
//! route paths.

/// Message role constants
pub mod role {
    /// User role identifier
    pub const USER: &str = "user";
}

/// Error type identifiers for the `error.type` field of error bodies
pub mod error_type {
    /// Inbound body could not be decoded
    pub const INVALID_REQUEST: &str = "invalid_request_error";

    /// Inbound body exceeded the configured size limit
    pub const REQUEST_TOO_LARGE: &str = "request_too_large";

    /// Upstream completion service failed
    pub const API: &str = "api_error";

    /// Upstream completion service did not answer in time
    pub const TIMEOUT: &str = "timeout_error";

    /// No route matched
    pub const NOT_FOUND: &str = "not_found_error";
}

/// Route paths
pub mod route {
    pub const ROOT: &str = "/";
    pub const ASK: &str = "/ask";
    pub const HEALTH: &str = "/health";
}
