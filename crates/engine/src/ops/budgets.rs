use std::collections::HashMap;

use api_types::budget::{BudgetList, BudgetOutput};
use sea_orm::{
    ActiveValue, IntoActiveModel, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    Action, Allocation, BudgetDraft, EntityKind, Merge, NewBudget, OperationContext, ResultEngine,
    StorageError, ToWire, UpdateBudget, budget_allocations, budgets, costs, output::BudgetRow,
    portfolios,
};

use super::{
    Engine, ResultStorage, allocation_rows, costs::find_cost, new_id, now,
    portfolios::find_portfolio, require, with_tx,
};

impl Engine {
    /// Assign part of a cost to an existing portfolio.
    pub async fn create_budget(&self, cmd: NewBudget) -> ResultEngine<BudgetOutput> {
        let ctx = OperationContext::new(EntityKind::Budget, Action::Create)
            .key("portfolio_id", &cmd.portfolio_id)
            .key("cost_id", &cmd.draft.cost_id);
        let row = self
            .insert_budget(cmd)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(
            budget_id = %row.budget.budget_id,
            portfolio_id = %row.budget.portfolio_id,
            "budget created"
        );
        Ok(row.to_wire())
    }

    /// Patch a budget. A supplied allocation list replaces the whole schedule.
    pub async fn update_budget(&self, cmd: UpdateBudget) -> ResultEngine<BudgetOutput> {
        let ctx = OperationContext::new(EntityKind::Budget, Action::Update).id(&cmd.budget_id);
        let row = self
            .patch_budget(cmd)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(budget_id = %row.budget.budget_id, "budget updated");
        Ok(row.to_wire())
    }

    pub async fn get_budget(&self, budget_id: &str) -> ResultEngine<BudgetOutput> {
        let ctx = OperationContext::new(EntityKind::Budget, Action::Get).id(budget_id);
        let row = find_budget_row(&self.database, budget_id)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        Ok(row.to_wire())
    }

    pub async fn delete_budget(&self, budget_id: &str) -> ResultEngine<()> {
        let ctx = OperationContext::new(EntityKind::Budget, Action::Delete).id(budget_id);
        let deleted = budgets::Entity::delete_by_id(budget_id.to_string())
            .exec(&self.database)
            .await
            .map_err(|err| self.classify(err.into(), &ctx))?;
        if deleted.rows_affected == 0 {
            return Err(self.classify(StorageError::RowNotFound, &ctx));
        }
        tracing::info!(budget_id, "budget deleted");
        Ok(())
    }

    /// Budgets of one portfolio.
    pub async fn list_budgets(&self, portfolio_id: &str) -> ResultEngine<BudgetList> {
        let owner = OperationContext::new(EntityKind::Portfolio, Action::Get).id(portfolio_id);
        find_portfolio(&self.database, portfolio_id)
            .await
            .map_err(|err| self.classify(err, &owner))?;

        let ctx = OperationContext::new(EntityKind::Budget, Action::List);
        let rows = budget_rows(&self.database, portfolio_id)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        Ok(BudgetList {
            budgets: rows.iter().map(ToWire::to_wire).collect(),
        })
    }

    async fn insert_budget(&self, cmd: NewBudget) -> ResultStorage<BudgetRow> {
        with_tx!(self, |db_tx| {
            require::<portfolios::Entity, _>(&db_tx, &cmd.portfolio_id, "budgets_portfolio_id_fkey")
                .await?;
            let budget_id = insert_draft(&db_tx, &cmd.portfolio_id, &cmd.draft).await?;
            find_budget_row(&db_tx, &budget_id).await
        })
    }

    async fn patch_budget(&self, mut cmd: UpdateBudget) -> ResultStorage<BudgetRow> {
        let allocations = cmd.allocations.take();
        with_tx!(self, |db_tx| {
            let current = find_budget(&db_tx, &cmd.budget_id).await?;
            cmd.merge(&current)
                .into_active_model()
                .reset_all()
                .update(&db_tx)
                .await?;

            if let Some(allocations) = &allocations {
                budget_allocations::Entity::delete_many()
                    .filter(budget_allocations::Column::BudgetId.eq(current.budget_id.as_str()))
                    .exec(&db_tx)
                    .await?;
                write_allocations(&db_tx, &current.budget_id, allocations).await?;
            }

            find_budget_row(&db_tx, &current.budget_id).await
        })
    }
}

/// Insert one budget and its schedule under `portfolio_id`; the caller owns
/// the transaction.
pub(super) async fn insert_draft<C: ConnectionTrait>(
    db: &C,
    portfolio_id: &str,
    draft: &BudgetDraft,
) -> ResultStorage<String> {
    require::<costs::Entity, _>(db, &draft.cost_id, "budgets_cost_id_fkey").await?;

    let budget_id = new_id();
    let active = budgets::ActiveModel {
        budget_id: ActiveValue::Set(budget_id.clone()),
        portfolio_id: ActiveValue::Set(portfolio_id.to_string()),
        cost_id: ActiveValue::Set(draft.cost_id.clone()),
        amount: ActiveValue::Set(draft.amount),
        created_at: ActiveValue::Set(now()),
        updated_at: ActiveValue::Set(None),
    };
    budgets::Entity::insert(active)
        .exec_without_returning(db)
        .await?;
    write_allocations(db, &budget_id, &draft.allocations).await?;
    Ok(budget_id)
}

async fn find_budget<C: ConnectionTrait>(db: &C, budget_id: &str) -> ResultStorage<budgets::Model> {
    budgets::Entity::find_by_id(budget_id.to_string())
        .one(db)
        .await?
        .ok_or(StorageError::RowNotFound)
}

async fn find_budget_row<C: ConnectionTrait>(db: &C, budget_id: &str) -> ResultStorage<BudgetRow> {
    let budget = find_budget(db, budget_id).await?;
    let cost = find_cost(db, &budget.cost_id).await?;
    let allocations = budget_allocations::Entity::find()
        .filter(budget_allocations::Column::BudgetId.eq(budget_id))
        .order_by_asc(budget_allocations::Column::Position)
        .all(db)
        .await?;
    Ok(BudgetRow {
        budget,
        cost,
        allocations,
    })
}

/// Budgets of a portfolio joined with their costs and schedules, oldest
/// first.
pub(super) async fn budget_rows<C: ConnectionTrait>(
    db: &C,
    portfolio_id: &str,
) -> ResultStorage<Vec<BudgetRow>> {
    let budgets = budgets::Entity::find()
        .filter(budgets::Column::PortfolioId.eq(portfolio_id))
        .order_by_asc(budgets::Column::CreatedAt)
        .order_by_asc(budgets::Column::BudgetId)
        .all(db)
        .await?;
    if budgets.is_empty() {
        return Ok(Vec::new());
    }

    let cost_ids: Vec<String> = budgets.iter().map(|budget| budget.cost_id.clone()).collect();
    let cost_by_id: HashMap<String, costs::Model> = costs::Entity::find()
        .filter(costs::Column::CostId.is_in(cost_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|cost| (cost.cost_id.clone(), cost))
        .collect();

    let budget_ids: Vec<String> = budgets.iter().map(|budget| budget.budget_id.clone()).collect();
    let mut by_budget: HashMap<String, Vec<budget_allocations::Model>> = HashMap::new();
    for allocation in budget_allocations::Entity::find()
        .filter(budget_allocations::Column::BudgetId.is_in(budget_ids))
        .order_by_asc(budget_allocations::Column::Position)
        .all(db)
        .await?
    {
        by_budget
            .entry(allocation.budget_id.clone())
            .or_default()
            .push(allocation);
    }

    budgets
        .into_iter()
        .map(|budget| {
            let allocations = by_budget.remove(&budget.budget_id).unwrap_or_default();
            cost_by_id
                .get(&budget.cost_id)
                .cloned()
                .map(|cost| BudgetRow {
                    budget,
                    cost,
                    allocations,
                })
                .ok_or(StorageError::RowNotFound)
        })
        .collect()
}

async fn write_allocations<C: ConnectionTrait>(
    db: &C,
    budget_id: &str,
    allocations: &[Allocation],
) -> ResultStorage<()> {
    let rows = allocation_rows(allocations, |allocation, position, created_at| {
        budget_allocations::ActiveModel {
            budget_allocation_id: ActiveValue::Set(new_id()),
            budget_id: ActiveValue::Set(budget_id.to_string()),
            allocation_date: ActiveValue::Set(allocation.date),
            position: ActiveValue::Set(position),
            amount: ActiveValue::Set(allocation.amount),
            created_at: ActiveValue::Set(created_at),
            updated_at: ActiveValue::Set(None),
        }
    });
    if rows.is_empty() {
        return Ok(());
    }
    budget_allocations::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}
