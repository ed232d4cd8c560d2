//! Plans API endpoints.

use api_types::plan::{Assumption, PlanList, PlanNew, PlanOutput, PlanUpdate};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{NewPlan, UpdatePlan};

use crate::{ServerError, server::ServerState, validation};

fn check_assumptions(assumptions: &[Assumption]) -> validation::ResultValidation<()> {
    for assumption in assumptions {
        for currency in &assumption.currencies {
            validation::non_negative("exchange", currency.exchange)?;
        }
    }
    Ok(())
}

/// Handle requests for creating a new `Plan` with its yearly assumptions.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PlanNew>,
) -> Result<(StatusCode, Json<PlanOutput>), ServerError> {
    validation::required("code", &payload.code)?;
    validation::required("name", &payload.name)?;
    check_assumptions(&payload.assumptions)?;

    let plan = state
        .engine
        .create_plan(NewPlan {
            code: payload.code,
            name: payload.name,
            assumptions: payload.assumptions.into_iter().map(Into::into).collect(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// `assumptions`, when sent, replaces the whole list.
pub async fn update(
    Path(plan_id): Path<String>,
    State(state): State<ServerState>,
    Json(payload): Json<PlanUpdate>,
) -> Result<Json<PlanOutput>, ServerError> {
    validation::required_opt("code", payload.code.as_deref())?;
    validation::required_opt("name", payload.name.as_deref())?;
    if let Some(assumptions) = &payload.assumptions {
        check_assumptions(assumptions)?;
    }

    let plan = state
        .engine
        .update_plan(UpdatePlan {
            plan_id,
            code: payload.code,
            name: payload.name,
            assumptions: payload
                .assumptions
                .map(|list| list.into_iter().map(Into::into).collect()),
        })
        .await?;
    Ok(Json(plan))
}

pub async fn get(
    Path(plan_id): Path<String>,
    State(state): State<ServerState>,
) -> Result<Json<PlanOutput>, ServerError> {
    Ok(Json(state.engine.get_plan(&plan_id).await?))
}

pub async fn delete(
    Path(plan_id): Path<String>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_plan(&plan_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<PlanList>, ServerError> {
    Ok(Json(state.engine.list_plans().await?))
}
