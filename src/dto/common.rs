use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Acknowledgement returned by teardown routes.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Session the action applied to.
    pub id: Uuid,
    /// Short description of what happened.
    pub message: String,
}

impl ActionResponse {
    pub fn new(id: Uuid, message: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
        }
    }
}
