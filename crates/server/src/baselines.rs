//! Baseline API endpoints

use api_types::baseline::{BaselineList, BaselineNew, BaselineOutput, BaselineUpdate};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{NewBaseline, UpdateBaseline};

use crate::{ServerError, server::ServerState, validation};

/// Handle requests for creating a new baseline. New baselines start at review 1.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<BaselineNew>,
) -> Result<(StatusCode, Json<BaselineOutput>), ServerError> {
    validation::required("code", &payload.code)?;
    validation::required("title", &payload.title)?;
    validation::required("manager_id", &payload.manager_id)?;
    validation::required("estimator_id", &payload.estimator_id)?;
    validation::non_negative_int("duration", payload.duration)?;

    let baseline = state
        .engine
        .create_baseline(NewBaseline {
            code: payload.code,
            title: payload.title,
            description: payload.description,
            start_date: payload.start_date,
            duration: payload.duration,
            manager_id: payload.manager_id,
            estimator_id: payload.estimator_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(baseline)))
}

pub async fn update(
    Path(baseline_id): Path<String>,
    State(state): State<ServerState>,
    Json(payload): Json<BaselineUpdate>,
) -> Result<Json<BaselineOutput>, ServerError> {
    validation::required_opt("code", payload.code.as_deref())?;
    validation::required_opt("title", payload.title.as_deref())?;
    validation::required_opt("manager_id", payload.manager_id.as_deref())?;
    validation::required_opt("estimator_id", payload.estimator_id.as_deref())?;
    if let Some(duration) = payload.duration {
        validation::non_negative_int("duration", duration)?;
    }
    if let Some(review) = payload.review {
        validation::non_negative_int("review", review)?;
    }

    let baseline = state
        .engine
        .update_baseline(UpdateBaseline {
            baseline_id,
            code: payload.code,
            review: payload.review,
            title: payload.title,
            description: payload.description,
            start_date: payload.start_date,
            duration: payload.duration,
            manager_id: payload.manager_id,
            estimator_id: payload.estimator_id,
        })
        .await?;
    Ok(Json(baseline))
}

pub async fn get(
    Path(baseline_id): Path<String>,
    State(state): State<ServerState>,
) -> Result<Json<BaselineOutput>, ServerError> {
    Ok(Json(state.engine.get_baseline(&baseline_id).await?))
}

pub async fn delete(
    Path(baseline_id): Path<String>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_baseline(&baseline_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle requests for listing baselines, ordered by code and review.
pub async fn list(State(state): State<ServerState>) -> Result<Json<BaselineList>, ServerError> {
    Ok(Json(state.engine.list_baselines().await?))
}
