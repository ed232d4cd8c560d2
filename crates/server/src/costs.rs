//! Costs live under a baseline: they are created and listed through
//! `/baselines/{id}/costs` and addressed on their own afterwards.

use api_types::cost::{CostList, CostNew, CostOutput, CostUpdate};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{NewCost, UpdateCost};

use crate::{ServerError, server::ServerState, validation};

pub async fn create(
    Path(baseline_id): Path<String>,
    State(state): State<ServerState>,
    Json(payload): Json<CostNew>,
) -> Result<(StatusCode, Json<CostOutput>), ServerError> {
    validation::required("description", &payload.description)?;
    validation::non_negative("amount", payload.amount)?;
    validation::non_negative("tax", payload.tax)?;
    let allocations = validation::allocations("cost_allocations", payload.cost_allocations)?;

    let cost = state
        .engine
        .create_cost(NewCost {
            baseline_id,
            cost_type: payload.cost_type.into(),
            description: payload.description,
            comment: payload.comment,
            amount: payload.amount,
            currency: payload.currency.into(),
            tax: payload.tax,
            allocations,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(cost)))
}

/// Handle requests for patching a cost. `cost_allocations`, when sent,
/// replaces the whole schedule.
pub async fn update(
    Path(cost_id): Path<String>,
    State(state): State<ServerState>,
    Json(payload): Json<CostUpdate>,
) -> Result<Json<CostOutput>, ServerError> {
    validation::required_opt("description", payload.description.as_deref())?;
    if let Some(amount) = payload.amount {
        validation::non_negative("amount", amount)?;
    }
    if let Some(tax) = payload.tax {
        validation::non_negative("tax", tax)?;
    }
    let allocations = payload
        .cost_allocations
        .map(|entries| validation::allocations("cost_allocations", entries))
        .transpose()?;

    let cost = state
        .engine
        .update_cost(UpdateCost {
            cost_id,
            cost_type: payload.cost_type.map(Into::into),
            description: payload.description,
            comment: payload.comment,
            amount: payload.amount,
            currency: payload.currency.map(Into::into),
            tax: payload.tax,
            allocations,
        })
        .await?;
    Ok(Json(cost))
}

pub async fn get(
    Path(cost_id): Path<String>,
    State(state): State<ServerState>,
) -> Result<Json<CostOutput>, ServerError> {
    Ok(Json(state.engine.get_cost(&cost_id).await?))
}

pub async fn delete(
    Path(cost_id): Path<String>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_cost(&cost_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    Path(baseline_id): Path<String>,
    State(state): State<ServerState>,
) -> Result<Json<CostList>, ServerError> {
    Ok(Json(state.engine.list_costs(&baseline_id).await?))
}
