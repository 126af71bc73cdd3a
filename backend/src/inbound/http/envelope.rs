//! Success envelopes shared by every resource.
//!
//! Single resources and collections are wrapped as `{"data": ...}`;
//! deletions and logout answer `{"message": ...}`.

use serde::Serialize;
use utoipa::ToSchema;

/// `{"data": T}` wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Confirmation for operations that return no resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Project deleted successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
