// Registration and authentication endpoints

use crate::core::error::{ApiError, DirectoryError};
use crate::core::state::AppState;
use crate::models::api::{CredentialsBody, UserResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

/// POST /users
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsBody>,
) -> Result<Response, ApiError> {
    let user = state.directory.register(&body.email, &body.password).await?;
    state.metrics.increment_registrations();

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))).into_response())
}

/// POST /auth
pub async fn auth_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsBody>,
) -> Result<Response, ApiError> {
    let result = state.directory.authenticate(&body.email, &body.password).await;

    match &result {
        Ok(_) => state.metrics.record_login(true),
        Err(DirectoryError::InvalidCredentials) => state.metrics.record_login(false),
        Err(_) => {}
    }

    let user = result?;
    Ok((StatusCode::OK, Json(UserResponse::from(&user))).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::test_state;
    use http_body_util::BodyExt;
    use std::sync::atomic::Ordering;

    fn body(email: &str, password: &str) -> Json<CredentialsBody> {
        Json(CredentialsBody {
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    async fn read_user(response: Response) -> UserResponse {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_register_returns_created_user() {
        let (state, _dir) = test_state();

        let response = register_handler(State(state.clone()), body("New@Example.com", "a-long-password"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let user = read_user(response).await;
        assert_eq!(user.email, "new@example.com");
        assert!(user.page_ids.is_empty());
        assert_eq!(state.metrics.registrations.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_register_response_hides_hash() {
        let (state, _dir) = test_state();

        let response = register_handler(State(state), body("a@example.com", "a-long-password"))
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(!text.contains("argon2"));
        assert!(!text.contains("password"));
    }

    #[tokio::test]
    async fn test_register_duplicate_is_conflict() {
        let (state, _dir) = test_state();

        register_handler(State(state.clone()), body("a@example.com", "a-long-password"))
            .await
            .unwrap();
        let err = register_handler(State(state), body("A@example.com", "another-password"))
            .await
            .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let (state, _dir) = test_state();

        let err = register_handler(State(state.clone()), body("not-an-email", "a-long-password"))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = register_handler(State(state), body("a@example.com", "short"))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_auth_success_and_failure_counted() {
        let (state, _dir) = test_state();
        register_handler(State(state.clone()), body("a@example.com", "a-long-password"))
            .await
            .unwrap();

        let response = auth_handler(State(state.clone()), body("a@example.com", "a-long-password"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_user(response).await.email, "a@example.com");

        let wrong = auth_handler(State(state.clone()), body("a@example.com", "wrong-password"))
            .await
            .unwrap_err();
        let unknown = auth_handler(State(state.clone()), body("b@example.com", "a-long-password"))
            .await
            .unwrap_err();

        let wrong = wrong.into_response();
        let unknown = unknown.into_response();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

        // Unknown email and wrong password are indistinguishable
        let wrong = wrong.into_body().collect().await.unwrap().to_bytes();
        let unknown = unknown.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(wrong, unknown);

        assert_eq!(state.metrics.successful_logins.load(Ordering::Relaxed), 1);
        assert_eq!(state.metrics.failed_logins.load(Ordering::Relaxed), 2);
    }
}
