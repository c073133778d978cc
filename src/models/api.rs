use crate::models::measurement::Measurement;
use crate::models::page::Page;
use crate::models::user::User;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ApiKeyQuery {
    pub api_key: String,
}

/// Email and password pair used for registration and authentication
#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PageCreateBody {
    pub email: String,
    pub password: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct PageRenameBody {
    pub email: String,
    pub password: String,
    pub page_id: String,
    pub new_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PageDeleteBody {
    pub email: String,
    pub password: String,
    pub page_id: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphQuery {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MeasurementBody {
    pub address: String,
    pub score: f64,
}

/// Public view of a user, never includes the password hash
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub page_ids: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            page_ids: user.page_ids.to_vec(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageResponse {
    pub success: bool,
    pub page: Page,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GraphPoint {
    pub score: f64,
    pub recorded_at: i64,
}

impl From<&Measurement> for GraphPoint {
    fn from(m: &Measurement) -> Self {
        Self {
            score: m.score,
            recorded_at: m.recorded_at,
        }
    }
}

/// Latest readings for one address, oldest first
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphResponse {
    pub address: String,
    pub points: Vec<GraphPoint>,
}

#[derive(Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}
