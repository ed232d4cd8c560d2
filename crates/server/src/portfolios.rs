//! Portfolios API endpoints.

use api_types::portfolio::{PortfolioList, PortfolioNew, PortfolioOutput, PortfolioUpdate};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{NewPortfolio, UpdatePortfolio};

use crate::{ServerError, budgets, server::ServerState, validation};

/// Handle requests for creating a portfolio, optionally with its initial
/// budgets. Nothing is stored if any budget is rejected.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PortfolioNew>,
) -> Result<(StatusCode, Json<PortfolioOutput>), ServerError> {
    validation::required("baseline_id", &payload.baseline_id)?;
    validation::required("plan_id", &payload.plan_id)?;
    let budgets = payload
        .budgets
        .into_iter()
        .map(budgets::draft)
        .collect::<Result<Vec<_>, _>>()?;

    let portfolio = state
        .engine
        .create_portfolio(NewPortfolio {
            baseline_id: payload.baseline_id,
            plan_id: payload.plan_id,
            start_date: payload.start_date,
            budgets,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(portfolio)))
}

pub async fn update(
    Path(portfolio_id): Path<String>,
    State(state): State<ServerState>,
    Json(payload): Json<PortfolioUpdate>,
) -> Result<Json<PortfolioOutput>, ServerError> {
    validation::required_opt("plan_id", payload.plan_id.as_deref())?;

    let portfolio = state
        .engine
        .update_portfolio(UpdatePortfolio {
            portfolio_id,
            plan_id: payload.plan_id,
            start_date: payload.start_date,
        })
        .await?;
    Ok(Json(portfolio))
}

/// A portfolio with all of its budgets.
pub async fn get(
    Path(portfolio_id): Path<String>,
    State(state): State<ServerState>,
) -> Result<Json<PortfolioOutput>, ServerError> {
    Ok(Json(state.engine.get_portfolio(&portfolio_id).await?))
}

/// Handle requests for deleting a portfolio. Its budgets go with it.
pub async fn delete(
    Path(portfolio_id): Path<String>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_portfolio(&portfolio_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<PortfolioList>, ServerError> {
    Ok(Json(state.engine.list_portfolios().await?))
}
