//! `/ask` request and response bodies

use serde::{Deserialize, Serialize};

/// Inbound request body
#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub query: String,
}

/// Successful reply body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskResponse {
    pub response: String,
}
