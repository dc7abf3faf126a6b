//! Registration, login and session handlers.

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use common::{AppError, AppResult};
use identity_service_lib::dto::{
    AuthenticateUserRequest, AuthenticateUserResponse, CreateUserRequest, CreateUserResponse,
    RefreshTokenRequest, RefreshTokenResponse, UserProfileView,
};

use crate::extractors::{ClientInfo, ValidatedJson};
use crate::middleware::{auth_middleware, CurrentUser};
use crate::state::AppState;

/// Login body. Client address and agent come from the request, not the payload.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(alias = "email_or_username")]
    #[validate(length(min = 1, message = "email or username is required"))]
    pub identifier: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub email: Option<String>,
    pub username: Option<String>,
}

/// Only the fields that were asked about are present.
#[derive(Debug, Default, Serialize)]
pub struct AvailabilityResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<bool>,
}

/// Create auth routes. `/me` requires a bearer access token.
pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/availability", get(availability))
        .route(
            "/me",
            get(me).route_layer(middleware::from_fn_with_state(state, auth_middleware)),
        )
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<CreateUserResponse>)> {
    let response = state.create_user.execute(request, state.deadline()).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Verify credentials and open a session
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AuthenticateUserResponse>> {
    let request = AuthenticateUserRequest {
        identifier: body.identifier,
        password: body.password,
        ip_address: client.ip_address,
        user_agent: client.user_agent,
    };
    let response = state
        .authenticate_user
        .execute(request, state.deadline())
        .await?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new access token
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RefreshTokenRequest>,
) -> AppResult<Json<RefreshTokenResponse>> {
    let deadline = state.deadline();
    let access_token = deadline
        .run(
            "refresh_access_token",
            state.tokens.refresh_access_token(&request.refresh_token),
        )
        .await?;

    Ok(Json(RefreshTokenResponse::bearer(
        access_token,
        state.tokens.access_token_expiry_seconds(),
    )))
}

pub async fn availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    if query.email.is_none() && query.username.is_none() {
        return Err(AppError::validation("email or username is required"));
    }

    let mut response = AvailabilityResponse::default();
    if let Some(email) = query.email.as_deref() {
        response.email = Some(
            state
                .create_user
                .is_email_available(email, state.deadline())
                .await?,
        );
    }
    if let Some(username) = query.username.as_deref() {
        response.username = Some(
            state
                .create_user
                .is_username_available(username, state.deadline())
                .await?,
        );
    }
    Ok(Json(response))
}

/// Profile of the authenticated caller
pub async fn me(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<UserProfileView>> {
    let user = state
        .deadline()
        .run("get_user", state.users.get_by_id(current_user.id))
        .await?;
    Ok(Json(UserProfileView::from_user(&user)?))
}
