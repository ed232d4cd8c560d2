use axum::{
    Router,
    routing::{get, post},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{baselines, budgets, costs, plans, portfolios, users};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    Router::new()
        .route("/users", post(users::create).get(users::list))
        .route(
            "/users/{id}",
            get(users::get).patch(users::update).delete(users::delete),
        )
        .route("/plans", post(plans::create).get(plans::list))
        .route(
            "/plans/{id}",
            get(plans::get).patch(plans::update).delete(plans::delete),
        )
        .route("/baselines", post(baselines::create).get(baselines::list))
        .route(
            "/baselines/{id}",
            get(baselines::get)
                .patch(baselines::update)
                .delete(baselines::delete),
        )
        .route(
            "/baselines/{id}/costs",
            post(costs::create).get(costs::list),
        )
        .route(
            "/costs/{id}",
            get(costs::get).patch(costs::update).delete(costs::delete),
        )
        .route(
            "/portfolios",
            post(portfolios::create).get(portfolios::list),
        )
        .route(
            "/portfolios/{id}",
            get(portfolios::get)
                .patch(portfolios::update)
                .delete(portfolios::delete),
        )
        .route(
            "/portfolios/{id}/budgets",
            post(budgets::create).get(budgets::list),
        )
        .route(
            "/budgets/{id}",
            get(budgets::get)
                .patch(budgets::update)
                .delete(budgets::delete),
        )
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
