use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session token payload. Stateless: nothing here is persisted and there
/// is no server-side revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,     // user ID
    pub email: String, // login key at issuance time
    pub iat: usize,    // issued at (unix timestamp)
    pub exp: usize,    // expires at (unix timestamp)
}
