use serde::{Deserialize, Serialize};

use fc_core::domain::entities::identity::{Identity, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub balance: f64,
}

impl From<Identity> for UserProfileResponse {
    fn from(identity: Identity) -> Self {
        Self {
            balance: identity.balance(),
            id: identity.id,
            email: identity.email,
            first_name: identity.first_name,
            last_name: identity.last_name,
        }
    }
}
