//! Login, tokens and the caller's own profile.

use axum::{extract::State, Json};

use super::HandlerResult;
use crate::http::dto::{
    LoginRequest, LoginResponse, MessageResponse, PasswordChangeRequest, RefreshRequest,
};
use crate::http::extract::{ApiJson, CurrentUser};
use crate::http::state::AppState;
use crate::models::{CompanySettings, EmployeeProfile, ProfileChanges, User};
use crate::services::auth::{self, TokenPair};
use crate::services::{organization, users};

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> HandlerResult<LoginResponse> {
    let (user, tokens) =
        auth::login(state.repo(), &state.tokens, &request.email, &request.password).await?;
    Ok(Json(LoginResponse { tokens, user }))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> HandlerResult<TokenPair> {
    let pair = auth::refresh(state.repo(), &state.tokens, &request.refresh_token).await?;
    Ok(Json(pair))
}

/// GET /auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> HandlerResult<User> {
    Ok(Json(user))
}

/// POST /auth/logout
///
/// Tokens are stateless; the client drops them.
pub async fn logout(CurrentUser(user): CurrentUser) -> HandlerResult<MessageResponse> {
    log::info!("User {} logged out", user.id);
    Ok(Json(MessageResponse::new("Successfully logged out")))
}

/// GET /auth/settings
///
/// Public so the login page can show the logo and icons.
pub async fn public_settings(State(state): State<AppState>) -> HandlerResult<CompanySettings> {
    Ok(Json(organization::company_settings(state.repo()).await?))
}

/// GET /users/profile
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> HandlerResult<EmployeeProfile> {
    Ok(Json(users::get_profile(state.repo(), user.id).await?))
}

/// PUT /users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(changes): ApiJson<ProfileChanges>,
) -> HandlerResult<EmployeeProfile> {
    Ok(Json(users::update_profile(state.repo(), user.id, changes).await?))
}

/// PUT /users/password
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<PasswordChangeRequest>,
) -> HandlerResult<MessageResponse> {
    users::change_password(
        state.repo(),
        &user,
        &request.current_password,
        &request.new_password,
    )
    .await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}
