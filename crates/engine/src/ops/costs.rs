use std::collections::HashMap;

use api_types::cost::{CostList, CostOutput};
use sea_orm::{
    ActiveValue, Condition, IntoActiveModel, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{
    Action, Allocation, EntityKind, Merge, NewCost, OperationContext, ResultEngine, StorageError,
    ToWire, UpdateCost, baselines, budgets, cost_allocations, costs, output::CostRow,
};

use super::{
    Engine, ResultStorage, allocation_rows, baselines::find_baseline, new_id, now,
    refuse_if_referenced, require, with_tx,
};

impl Engine {
    /// Add a cost, with its allocation schedule, to a baseline.
    pub async fn create_cost(&self, cmd: NewCost) -> ResultEngine<CostOutput> {
        let ctx = OperationContext::new(EntityKind::Cost, Action::Create)
            .key("baseline_id", &cmd.baseline_id);
        let row = self
            .insert_cost(cmd)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(
            cost_id = %row.cost.cost_id,
            baseline_id = %row.cost.baseline_id,
            allocations = row.allocations.len(),
            "cost created"
        );
        Ok(row.to_wire())
    }

    /// Patch a cost. A supplied allocation list replaces the whole schedule.
    pub async fn update_cost(&self, cmd: UpdateCost) -> ResultEngine<CostOutput> {
        let ctx = OperationContext::new(EntityKind::Cost, Action::Update).id(&cmd.cost_id);
        let row = self
            .patch_cost(cmd)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(cost_id = %row.cost.cost_id, "cost updated");
        Ok(row.to_wire())
    }

    pub async fn get_cost(&self, cost_id: &str) -> ResultEngine<CostOutput> {
        let ctx = OperationContext::new(EntityKind::Cost, Action::Get).id(cost_id);
        let row = find_cost_row(&self.database, cost_id)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        Ok(row.to_wire())
    }

    /// Delete a cost no budget draws from. Its allocations go with it.
    pub async fn delete_cost(&self, cost_id: &str) -> ResultEngine<()> {
        let ctx = OperationContext::new(EntityKind::Cost, Action::Delete).id(cost_id);
        self.remove_cost(cost_id)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(cost_id, "cost deleted");
        Ok(())
    }

    /// Costs of one baseline, oldest first.
    pub async fn list_costs(&self, baseline_id: &str) -> ResultEngine<CostList> {
        let owner = OperationContext::new(EntityKind::Baseline, Action::Get).id(baseline_id);
        find_baseline(&self.database, baseline_id)
            .await
            .map_err(|err| self.classify(err, &owner))?;

        let ctx = OperationContext::new(EntityKind::Cost, Action::List);
        let rows = cost_rows(&self.database, baseline_id)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        Ok(CostList {
            costs: rows.iter().map(ToWire::to_wire).collect(),
        })
    }

    async fn insert_cost(&self, cmd: NewCost) -> ResultStorage<CostRow> {
        with_tx!(self, |db_tx| {
            require::<baselines::Entity, _>(&db_tx, &cmd.baseline_id, "costs_baseline_id_fkey")
                .await?;

            let cost_id = new_id();
            let active = costs::ActiveModel {
                cost_id: ActiveValue::Set(cost_id.clone()),
                baseline_id: ActiveValue::Set(cmd.baseline_id),
                cost_type: ActiveValue::Set(cmd.cost_type),
                description: ActiveValue::Set(cmd.description),
                comment: ActiveValue::Set(cmd.comment),
                amount: ActiveValue::Set(cmd.amount),
                currency: ActiveValue::Set(cmd.currency),
                tax: ActiveValue::Set(cmd.tax),
                created_at: ActiveValue::Set(now()),
                updated_at: ActiveValue::Set(None),
            };
            costs::Entity::insert(active)
                .exec_without_returning(&db_tx)
                .await?;
            write_allocations(&db_tx, &cost_id, &cmd.allocations).await?;

            find_cost_row(&db_tx, &cost_id).await
        })
    }

    async fn patch_cost(&self, mut cmd: UpdateCost) -> ResultStorage<CostRow> {
        let allocations = cmd.allocations.take();
        with_tx!(self, |db_tx| {
            let current = find_cost(&db_tx, &cmd.cost_id).await?;
            cmd.merge(&current)
                .into_active_model()
                .reset_all()
                .update(&db_tx)
                .await?;

            if let Some(allocations) = &allocations {
                cost_allocations::Entity::delete_many()
                    .filter(cost_allocations::Column::CostId.eq(current.cost_id.as_str()))
                    .exec(&db_tx)
                    .await?;
                write_allocations(&db_tx, &current.cost_id, allocations).await?;
            }

            find_cost_row(&db_tx, &current.cost_id).await
        })
    }

    async fn remove_cost(&self, cost_id: &str) -> ResultStorage<()> {
        let db = &self.database;
        refuse_if_referenced::<budgets::Entity, _>(
            db,
            Condition::all().add(budgets::Column::CostId.eq(cost_id)),
            "budgets_cost_id_fkey",
        )
        .await?;

        let result = costs::Entity::delete_by_id(cost_id.to_string())
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(StorageError::RowNotFound);
        }
        Ok(())
    }
}

pub(super) async fn find_cost<C: ConnectionTrait>(
    db: &C,
    cost_id: &str,
) -> ResultStorage<costs::Model> {
    costs::Entity::find_by_id(cost_id.to_string())
        .one(db)
        .await?
        .ok_or(StorageError::RowNotFound)
}

async fn find_cost_row<C: ConnectionTrait>(db: &C, cost_id: &str) -> ResultStorage<CostRow> {
    let cost = find_cost(db, cost_id).await?;
    let allocations = cost_allocations::Entity::find()
        .filter(cost_allocations::Column::CostId.eq(cost_id))
        .order_by_asc(cost_allocations::Column::Position)
        .all(db)
        .await?;
    Ok(CostRow { cost, allocations })
}

async fn cost_rows<C: ConnectionTrait>(db: &C, baseline_id: &str) -> ResultStorage<Vec<CostRow>> {
    let costs = costs::Entity::find()
        .filter(costs::Column::BaselineId.eq(baseline_id))
        .order_by_asc(costs::Column::CreatedAt)
        .order_by_asc(costs::Column::CostId)
        .all(db)
        .await?;
    let cost_ids: Vec<String> = costs.iter().map(|cost| cost.cost_id.clone()).collect();

    let mut by_cost: HashMap<String, Vec<cost_allocations::Model>> = HashMap::new();
    if !cost_ids.is_empty() {
        let allocations = cost_allocations::Entity::find()
            .filter(cost_allocations::Column::CostId.is_in(cost_ids))
            .order_by_asc(cost_allocations::Column::Position)
            .all(db)
            .await?;
        for allocation in allocations {
            by_cost
                .entry(allocation.cost_id.clone())
                .or_default()
                .push(allocation);
        }
    }

    Ok(costs
        .into_iter()
        .map(|cost| CostRow {
            allocations: by_cost.remove(&cost.cost_id).unwrap_or_default(),
            cost,
        })
        .collect())
}

async fn write_allocations<C: ConnectionTrait>(
    db: &C,
    cost_id: &str,
    allocations: &[Allocation],
) -> ResultStorage<()> {
    let rows = allocation_rows(allocations, |allocation, position, created_at| {
        cost_allocations::ActiveModel {
            cost_allocation_id: ActiveValue::Set(new_id()),
            cost_id: ActiveValue::Set(cost_id.to_string()),
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
    cost_allocations::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}
