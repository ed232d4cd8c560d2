//! User API endpoints.

use api_types::user::{UserList, UserNew, UserOutput, UserUpdate};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{NewUser, UpdateUser};

use crate::{ServerError, server::ServerState, validation};

/// Handle requests for creating a new user. The email must be unused.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserOutput>), ServerError> {
    validation::email(&payload.email)?;
    validation::required("user_name", &payload.user_name)?;
    validation::required("name", &payload.name)?;

    let user = state
        .engine
        .create_user(NewUser {
            email: payload.email,
            user_name: payload.user_name,
            name: payload.name,
            user_type: payload.user_type.into(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Handle requests for patching a user. Absent fields keep their value.
pub async fn update(
    Path(user_id): Path<String>,
    State(state): State<ServerState>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserOutput>, ServerError> {
    if let Some(email) = &payload.email {
        validation::email(email)?;
    }
    validation::required_opt("user_name", payload.user_name.as_deref())?;
    validation::required_opt("name", payload.name.as_deref())?;

    let user = state
        .engine
        .update_user(UpdateUser {
            user_id,
            email: payload.email,
            user_name: payload.user_name,
            name: payload.name,
            user_type: payload.user_type.map(Into::into),
        })
        .await?;
    Ok(Json(user))
}

pub async fn get(
    Path(user_id): Path<String>,
    State(state): State<ServerState>,
) -> Result<Json<UserOutput>, ServerError> {
    Ok(Json(state.engine.get_user(&user_id).await?))
}

/// Refused while a baseline still names the user as manager or estimator.
pub async fn delete(
    Path(user_id): Path<String>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<UserList>, ServerError> {
    Ok(Json(state.engine.list_users().await?))
}
