use api_types::portfolio::{PortfolioList, PortfolioOutput};
use sea_orm::{
    ActiveValue, IntoActiveModel, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    Action, EntityKind, Merge, NewPortfolio, OperationContext, ResultEngine, StorageError, ToWire,
    UpdatePortfolio, baselines, output::PortfolioRow, plans, portfolios,
};

use super::{
    Engine, ResultStorage, baselines::find_baseline_row, budgets::budget_rows,
    budgets::insert_draft, new_id, now, plans::find_plan, require, with_tx,
};

impl Engine {
    /// Price a baseline against a plan, optionally with initial budgets.
    /// The portfolio and its budgets are written together or not at all.
    pub async fn create_portfolio(&self, cmd: NewPortfolio) -> ResultEngine<PortfolioOutput> {
        let mut ctx = OperationContext::new(EntityKind::Portfolio, Action::Create)
            .key("baseline_id", &cmd.baseline_id)
            .key("plan_id", &cmd.plan_id);
        let inserted = self.insert_portfolio(cmd, &mut ctx).await;
        let row = inserted.map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(
            portfolio_id = %row.portfolio.portfolio_id,
            baseline_id = %row.portfolio.baseline_id,
            budgets = row.budgets.len(),
            "portfolio created"
        );
        Ok(row.to_wire())
    }

    pub async fn update_portfolio(&self, cmd: UpdatePortfolio) -> ResultEngine<PortfolioOutput> {
        let mut ctx =
            OperationContext::new(EntityKind::Portfolio, Action::Update).id(&cmd.portfolio_id);
        let patched = self.patch_portfolio(cmd, &mut ctx).await;
        let row = patched.map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(portfolio_id = %row.portfolio.portfolio_id, "portfolio updated");
        Ok(row.to_wire())
    }

    /// A portfolio with all of its budgets.
    pub async fn get_portfolio(&self, portfolio_id: &str) -> ResultEngine<PortfolioOutput> {
        let ctx = OperationContext::new(EntityKind::Portfolio, Action::Get).id(portfolio_id);
        let row = find_portfolio_row(&self.database, portfolio_id)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        Ok(row.to_wire())
    }

    /// Delete a portfolio. Its budgets and their allocations go with it.
    pub async fn delete_portfolio(&self, portfolio_id: &str) -> ResultEngine<()> {
        let ctx = OperationContext::new(EntityKind::Portfolio, Action::Delete).id(portfolio_id);
        let deleted = portfolios::Entity::delete_by_id(portfolio_id.to_string())
            .exec(&self.database)
            .await
            .map_err(|err| self.classify(err.into(), &ctx))?;
        if deleted.rows_affected == 0 {
            return Err(self.classify(StorageError::RowNotFound, &ctx));
        }
        tracing::info!(portfolio_id, "portfolio deleted");
        Ok(())
    }

    pub async fn list_portfolios(&self) -> ResultEngine<PortfolioList> {
        let ctx = OperationContext::new(EntityKind::Portfolio, Action::List);
        let rows = self
            .portfolio_rows()
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        Ok(PortfolioList {
            portfolios: rows.iter().map(ToWire::to_wire).collect(),
        })
    }

    async fn insert_portfolio(
        &self,
        cmd: NewPortfolio,
        ctx: &mut OperationContext,
    ) -> ResultStorage<PortfolioRow> {
        with_tx!(self, |db_tx| {
            require::<baselines::Entity, _>(
                &db_tx,
                &cmd.baseline_id,
                "portfolios_baseline_id_fkey",
            )
            .await?;
            require::<plans::Entity, _>(&db_tx, &cmd.plan_id, "portfolios_plan_id_fkey").await?;
            ensure_pair_free(&db_tx, &cmd.baseline_id, &cmd.plan_id, None).await?;

            let portfolio_id = new_id();
            let active = portfolios::ActiveModel {
                portfolio_id: ActiveValue::Set(portfolio_id.clone()),
                baseline_id: ActiveValue::Set(cmd.baseline_id.clone()),
                plan_id: ActiveValue::Set(cmd.plan_id.clone()),
                start_date: ActiveValue::Set(cmd.start_date),
                created_at: ActiveValue::Set(now()),
                updated_at: ActiveValue::Set(None),
            };
            portfolios::Entity::insert(active)
                .exec_without_returning(&db_tx)
                .await?;
            for draft in &cmd.budgets {
                ctx.set_key("cost_id", &draft.cost_id);
                insert_draft(&db_tx, &portfolio_id, draft).await?;
            }

            find_portfolio_row(&db_tx, &portfolio_id).await
        })
    }

    async fn patch_portfolio(
        &self,
        cmd: UpdatePortfolio,
        ctx: &mut OperationContext,
    ) -> ResultStorage<PortfolioRow> {
        let db = &self.database;
        let current = find_portfolio(db, &cmd.portfolio_id).await?;
        let merged = cmd.merge(&current);
        ctx.set_key("baseline_id", &merged.baseline_id);
        ctx.set_key("plan_id", &merged.plan_id);

        if merged.plan_id != current.plan_id {
            require::<plans::Entity, _>(db, &merged.plan_id, "portfolios_plan_id_fkey").await?;
            ensure_pair_free(
                db,
                &merged.baseline_id,
                &merged.plan_id,
                Some(&current.portfolio_id),
            )
            .await?;
        }
        merged.into_active_model().reset_all().update(db).await?;

        find_portfolio_row(db, &current.portfolio_id).await
    }

    async fn portfolio_rows(&self) -> ResultStorage<Vec<PortfolioRow>> {
        let portfolios = portfolios::Entity::find()
            .order_by_asc(portfolios::Column::CreatedAt)
            .order_by_asc(portfolios::Column::PortfolioId)
            .all(&self.database)
            .await?;
        let mut rows = Vec::with_capacity(portfolios.len());
        for portfolio in portfolios {
            rows.push(portfolio_row(&self.database, portfolio).await?);
        }
        Ok(rows)
    }
}

pub(super) async fn find_portfolio<C: ConnectionTrait>(
    db: &C,
    portfolio_id: &str,
) -> ResultStorage<portfolios::Model> {
    portfolios::Entity::find_by_id(portfolio_id.to_string())
        .one(db)
        .await?
        .ok_or(StorageError::RowNotFound)
}

async fn find_portfolio_row<C: ConnectionTrait>(
    db: &C,
    portfolio_id: &str,
) -> ResultStorage<PortfolioRow> {
    let portfolio = find_portfolio(db, portfolio_id).await?;
    portfolio_row(db, portfolio).await
}

async fn portfolio_row<C: ConnectionTrait>(
    db: &C,
    portfolio: portfolios::Model,
) -> ResultStorage<PortfolioRow> {
    let baseline = find_baseline_row(db, &portfolio.baseline_id).await?;
    let plan = find_plan(db, &portfolio.plan_id).await?;
    let budgets = budget_rows(db, &portfolio.portfolio_id).await?;
    Ok(PortfolioRow {
        portfolio,
        baseline,
        plan_code: plan.code,
        budgets,
    })
}

async fn ensure_pair_free<C: ConnectionTrait>(
    db: &C,
    baseline_id: &str,
    plan_id: &str,
    owner: Option<&str>,
) -> ResultStorage<()> {
    let holder = portfolios::Entity::find()
        .filter(portfolios::Column::BaselineId.eq(baseline_id))
        .filter(portfolios::Column::PlanId.eq(plan_id))
        .one(db)
        .await?;
    match holder {
        Some(portfolio) if Some(portfolio.portfolio_id.as_str()) != owner => {
            Err(StorageError::duplicate("portfolios_baseline_id_plan_id_key"))
        }
        _ => Ok(()),
    }
}
