/// User directory endpoints
///
/// - `GET  /v1/users` - every user
/// - `POST /v1/users/organization` - users of one organization
/// - `POST /v1/users/register` - create a user (admin/org_admin)
/// - `POST /v1/users/role` - change a user's role (admin/org_admin)
/// - `POST /v1/users/get` - fetch a user by username (admin/org_admin)
/// - `POST /v1/users/delete` - delete a user (admin/org_admin)
///
/// Authenticated endpoints read the caller's `api_key` from the request body. When
/// listing is authenticated, `GET /v1/users` reads it from the `X-Api-Key` header.
/// Responses never include password or API key hashes; the plaintext API key
/// appears only in the registration response.

use crate::{
    app::AppState,
    error::{ApiJson, ApiResult},
};
use axum::{extract::State, http::HeaderMap, Json};
use userdir_shared::directory::{
    Acknowledgement, DeleteUserRequest, EditUserRoleRequest, GetUserRequest,
    ListOrganizationUsersRequest, ListUsersRequest, RegisterUserRequest, RegisteredUser,
};
use userdir_shared::models::User;

/// Header carrying the caller's key on body-less requests
pub const API_KEY_HEADER: &str = "x-api-key";

pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<User>>> {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    Ok(Json(state.directory.list_users(ListUsersRequest { api_key }).await?))
}

pub async fn list_organization_users(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ListOrganizationUsersRequest>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.directory.list_organization_users(req).await?))
}

pub async fn register_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterUserRequest>,
) -> ApiResult<Json<RegisteredUser>> {
    Ok(Json(state.directory.register_user(req).await?))
}

pub async fn edit_user_role(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EditUserRoleRequest>,
) -> ApiResult<Json<Acknowledgement>> {
    Ok(Json(state.directory.edit_user_role(req).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GetUserRequest>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.directory.get_user(req).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<DeleteUserRequest>,
) -> ApiResult<Json<Acknowledgement>> {
    Ok(Json(state.directory.delete_user(req).await?))
}
