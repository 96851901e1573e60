/// Login endpoint
///
/// `POST /v1/auth/login` with `{username, password}`.
///
/// On success returns the user record with its organization embedded under `org`.
/// An unknown username and a wrong password produce the same 400 response.

use crate::{
    app::AppState,
    error::{ApiJson, ApiResult},
};
use axum::{extract::State, Json};
use userdir_shared::directory::{LoginRequest, LoginResponse};

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let response = state.directory.login(req).await?;
    Ok(Json(response))
}
