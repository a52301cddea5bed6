//! HTTP layer: router, handlers and error rendering

pub mod endpoints;
pub mod error;
