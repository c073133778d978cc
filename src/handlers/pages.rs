// Page lifecycle endpoints
//
// Every call authenticates with email and password, then keeps the owner's
// page ids in step with the page store through the directory.

use crate::core::error::{ApiError, PageError, ValidationError};
use crate::core::state::AppState;
use crate::directory::DeletePolicy;
use crate::models::api::{PageCreateBody, PageDeleteBody, PageRenameBody, PageResponse, SuccessResponse};
use crate::models::page::Page;
use crate::models::user::User;
use crate::utils::time::current_timestamp;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Resolve a page the caller owns. Pages owned by someone else look missing.
fn owned_page(state: &AppState, user: &User, page_id: &str) -> Result<Arc<Page>, ApiError> {
    match state.pages.get_page(page_id) {
        Some(page) if page.owner == user.id => Ok(page),
        Some(_) => {
            warn!(user_id = %user.id, page_id, "Page owned by another user");
            Err(PageError::NotFound(page_id.to_string()).into())
        }
        None => Err(PageError::NotFound(page_id.to_string()).into()),
    }
}

fn required(value: &str, name: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingParameter(name.to_string()).into());
    }
    Ok(())
}

/// POST /pages
pub async fn create_page_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PageCreateBody>,
) -> Result<Response, ApiError> {
    required(&body.address, "address")?;

    let user = state.directory.authenticate(&body.email, &body.password).await?;

    let page = Page::new(
        Uuid::new_v4().to_string(),
        body.address.trim().to_string(),
        user.id,
        current_timestamp(),
    );
    let page = state.pages.add_page(page)?;

    if let Err(e) = state.directory.add_page_id(&user, &page.id).await {
        error!(user_id = %user.id, page_id = %page.id, error = %e, "Failed to attach page, rolling back");
        if let Err(undo) = state.pages.remove_page(&page.id) {
            error!(page_id = %page.id, error = %undo, "Create rollback failed");
        }
        return Err(e.into());
    }

    info!(user_id = %user.id, page_id = %page.id, address = %page.address, "Page created");

    Ok((
        StatusCode::CREATED,
        Json(PageResponse {
            success: true,
            page: (*page).clone(),
        }),
    )
        .into_response())
}

/// POST /pages/rename
pub async fn rename_page_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PageRenameBody>,
) -> Result<Response, ApiError> {
    required(&body.page_id, "page_id")?;
    required(&body.new_id, "new_id")?;

    let user = state.directory.authenticate(&body.email, &body.password).await?;
    owned_page(&state, &user, &body.page_id)?;

    let renamed = state.pages.rename_page(&body.page_id, &body.new_id)?;

    if let Err(e) = state
        .directory
        .update_page_id(&user, &body.page_id, &body.new_id)
        .await
    {
        error!(user_id = %user.id, page_id = %body.page_id, error = %e, "Failed to reconcile rename, rolling back");
        if let Err(undo) = state.pages.rename_page(&body.new_id, &body.page_id) {
            error!(page_id = %body.new_id, error = %undo, "Rename rollback failed");
        }
        return Err(e.into());
    }

    state.metrics.increment_page_renames();
    info!(user_id = %user.id, from = %body.page_id, to = %body.new_id, "Page renamed");

    Ok((
        StatusCode::OK,
        Json(PageResponse {
            success: true,
            page: (*renamed).clone(),
        }),
    )
        .into_response())
}

/// POST /pages/delete
///
/// The page record and the owner's id are removed in the order the delete
/// policy needs to observe: while the page exists for `WhenPageExists`,
/// after it is gone for `WhenPageMissing`.
pub async fn delete_page_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PageDeleteBody>,
) -> Result<Response, ApiError> {
    required(&body.page_id, "page_id")?;

    let user = state.directory.authenticate(&body.email, &body.password).await?;

    if state.pages.get_page(&body.page_id).is_none() && user.page_ids.contains(&body.page_id) {
        // Dangling id, let the policy decide whether it goes
        state.directory.delete_page_id(&user, &body.page_id).await?;
        return Err(PageError::NotFound(body.page_id).into());
    }

    owned_page(&state, &user, &body.page_id)?;

    match state.directory.delete_policy() {
        DeletePolicy::WhenPageExists => {
            state.directory.delete_page_id(&user, &body.page_id).await?;
            state.pages.remove_page(&body.page_id)?;
        }
        DeletePolicy::WhenPageMissing => {
            state.pages.remove_page(&body.page_id)?;
            state.directory.delete_page_id(&user, &body.page_id).await?;
        }
    }

    state.metrics.increment_page_deletes();
    info!(user_id = %user.id, page_id = %body.page_id, "Page deleted");

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: format!("Page {} deleted", body.page_id),
        }),
    )
        .into_response())
}
