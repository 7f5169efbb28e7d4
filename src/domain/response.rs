use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Service record of an accepted message.
pub struct MessageResponse {
    /// Opaque message id assigned by Textfully.
    pub id: String,
    /// Delivery status as reported by the service (`queued`, `sent`, `delivered`, `failed`, ...).
    pub status: String,
    pub created_at: DateTime<Utc>,
}
