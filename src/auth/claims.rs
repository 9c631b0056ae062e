use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session token payload: the user id and the token lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: Uuid, // the single identity claim
    pub iat: usize,    // issued at (unix timestamp)
    pub exp: usize,    // expires at (unix timestamp)
}
