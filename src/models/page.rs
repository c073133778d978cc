use crate::models::user::UserId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page {
    /// Page identifier, may change over the page's lifetime
    pub id: String,
    /// Address of the measured page
    pub address: String,
    /// Owning user
    pub owner: UserId,
    pub created_at: i64,
}

impl Page {
    pub fn new(id: String, address: String, owner: UserId, created_at: i64) -> Self {
        Self {
            id,
            address,
            owner,
            created_at,
        }
    }
}
