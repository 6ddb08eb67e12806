//! OpenAI API types for the Models endpoint.
//!
//! - **Endpoint:** `GET /v1/models`
//! - **Response Type:** [`OpenAIModelList`]
//!
//! Listing models is the cheapest authenticated call the API offers, which is
//! why it doubles as the credential probe in [`crate::key_check`].

use serde::{Deserialize, Serialize};

/// A model entry returned by `GET /v1/models`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIModel {
    /// Model identifier, e.g. `gpt-4o`
    pub id: String,
    /// Object type, always `model`
    #[serde(default)]
    pub object: String,
    /// Unix timestamp of creation
    #[serde(default)]
    pub created: Option<i64>,
    /// Owning organization
    #[serde(default)]
    pub owned_by: Option<String>,
}

/// Response body of `GET /v1/models`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIModelList {
    /// Object type, always `list`
    #[serde(default)]
    pub object: String,
    /// Models available to the authenticated key
    pub data: Vec<OpenAIModel>,
}

impl OpenAIModelList {
    /// Check whether a model id is present in the list
    pub fn contains(&self, model_id: &str) -> bool {
        self.data.iter().any(|model| model.id == model_id)
    }
}

/// OpenAI API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIErrorResponse {
    /// Error details
    pub error: OpenAIError,
}

/// OpenAI API error details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIError {
    /// Error message
    pub message: String,
    /// Error type
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
