//! Budget API endpoints. Budgets are created and listed under
//! `/portfolios/{id}/budgets` and addressed by their own id afterwards.

use api_types::budget::{BudgetList, BudgetNew, BudgetOutput, BudgetUpdate};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{BudgetDraft, NewBudget, UpdateBudget};

use crate::{ServerError, server::ServerState, validation};

/// Check a budget body and turn it into an engine draft. Shared with
/// portfolio creation, which carries its initial budgets inline.
pub(crate) fn draft(payload: BudgetNew) -> validation::ResultValidation<BudgetDraft> {
    validation::required("cost_id", &payload.cost_id)?;
    validation::non_negative("amount", payload.amount)?;
    let allocations = validation::allocations("budget_allocations", payload.budget_allocations)?;
    Ok(BudgetDraft {
        cost_id: payload.cost_id,
        amount: payload.amount,
        allocations,
    })
}

pub async fn create(
    Path(portfolio_id): Path<String>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<BudgetOutput>), ServerError> {
    let budget = state
        .engine
        .create_budget(NewBudget {
            portfolio_id,
            draft: draft(payload)?,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

/// `budget_allocations`, when sent, replaces the whole schedule.
pub async fn update(
    Path(budget_id): Path<String>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<Json<BudgetOutput>, ServerError> {
    if let Some(amount) = payload.amount {
        validation::non_negative("amount", amount)?;
    }
    let allocations = payload
        .budget_allocations
        .map(|entries| validation::allocations("budget_allocations", entries))
        .transpose()?;

    let budget = state
        .engine
        .update_budget(UpdateBudget {
            budget_id,
            amount: payload.amount,
            allocations,
        })
        .await?;
    Ok(Json(budget))
}

pub async fn get(
    Path(budget_id): Path<String>,
    State(state): State<ServerState>,
) -> Result<Json<BudgetOutput>, ServerError> {
    Ok(Json(state.engine.get_budget(&budget_id).await?))
}

pub async fn delete(
    Path(budget_id): Path<String>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_budget(&budget_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    Path(portfolio_id): Path<String>,
    State(state): State<ServerState>,
) -> Result<Json<BudgetList>, ServerError> {
    Ok(Json(state.engine.list_budgets(&portfolio_id).await?))
}
