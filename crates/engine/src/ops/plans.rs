use api_types::plan::{PlanList, PlanOutput};
use sea_orm::{
    ActiveValue, Condition, IntoActiveModel, QueryFilter, QueryOrder, prelude::*,
};

use crate::{
    Action, EntityKind, Merge, NewPlan, OperationContext, ResultEngine, StorageError, ToWire,
    UpdatePlan, plans, portfolios,
};

use super::{Engine, ResultStorage, new_id, now, refuse_if_referenced};

impl Engine {
    pub async fn create_plan(&self, cmd: NewPlan) -> ResultEngine<PlanOutput> {
        let ctx = OperationContext::new(EntityKind::Plan, Action::Create).key("code", &cmd.code);
        let plan = self
            .insert_plan(cmd)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(plan_id = %plan.plan_id, code = %plan.code, "plan created");
        Ok(plan.to_wire())
    }

    /// Patch a plan. Supplied assumptions replace the stored list.
    pub async fn update_plan(&self, cmd: UpdatePlan) -> ResultEngine<PlanOutput> {
        let mut ctx = OperationContext::new(EntityKind::Plan, Action::Update).id(&cmd.plan_id);
        if let Some(code) = &cmd.code {
            ctx = ctx.key("code", code);
        }
        let plan = self
            .patch_plan(cmd)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(plan_id = %plan.plan_id, "plan updated");
        Ok(plan.to_wire())
    }

    pub async fn get_plan(&self, plan_id: &str) -> ResultEngine<PlanOutput> {
        let ctx = OperationContext::new(EntityKind::Plan, Action::Get).id(plan_id);
        let plan = find_plan(&self.database, plan_id)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        Ok(plan.to_wire())
    }

    /// Delete a plan no portfolio is priced against.
    pub async fn delete_plan(&self, plan_id: &str) -> ResultEngine<()> {
        let ctx = OperationContext::new(EntityKind::Plan, Action::Delete).id(plan_id);
        self.remove_plan(plan_id)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(plan_id, "plan deleted");
        Ok(())
    }

    /// All plans ordered by code.
    pub async fn list_plans(&self) -> ResultEngine<PlanList> {
        let ctx = OperationContext::new(EntityKind::Plan, Action::List);
        let plans = plans::Entity::find()
            .order_by_asc(plans::Column::Code)
            .all(&self.database)
            .await
            .map_err(|err| self.classify(err.into(), &ctx))?;
        Ok(PlanList {
            plans: plans.iter().map(ToWire::to_wire).collect(),
        })
    }

    async fn insert_plan(&self, cmd: NewPlan) -> ResultStorage<plans::Model> {
        ensure_code_free(&self.database, &cmd.code, None).await?;

        let plan_id = new_id();
        let active = plans::ActiveModel {
            plan_id: ActiveValue::Set(plan_id.clone()),
            code: ActiveValue::Set(cmd.code),
            name: ActiveValue::Set(cmd.name),
            assumptions: ActiveValue::Set(plans::Assumptions(cmd.assumptions)),
            created_at: ActiveValue::Set(now()),
            updated_at: ActiveValue::Set(None),
        };
        plans::Entity::insert(active)
            .exec_without_returning(&self.database)
            .await?;

        find_plan(&self.database, &plan_id).await
    }

    async fn patch_plan(&self, cmd: UpdatePlan) -> ResultStorage<plans::Model> {
        let current = find_plan(&self.database, &cmd.plan_id).await?;
        if let Some(code) = &cmd.code {
            ensure_code_free(&self.database, code, Some(&current.plan_id)).await?;
        }

        cmd.merge(&current)
            .into_active_model()
            .reset_all()
            .update(&self.database)
            .await?;

        find_plan(&self.database, &current.plan_id).await
    }

    async fn remove_plan(&self, plan_id: &str) -> ResultStorage<()> {
        refuse_if_referenced::<portfolios::Entity, _>(
            &self.database,
            Condition::all().add(portfolios::Column::PlanId.eq(plan_id)),
            "portfolios_plan_id_fkey",
        )
        .await?;

        let result = plans::Entity::delete_by_id(plan_id.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(StorageError::RowNotFound);
        }
        Ok(())
    }
}

pub(super) async fn find_plan<C: ConnectionTrait>(
    db: &C,
    plan_id: &str,
) -> ResultStorage<plans::Model> {
    plans::Entity::find_by_id(plan_id.to_string())
        .one(db)
        .await?
        .ok_or(StorageError::RowNotFound)
}

async fn ensure_code_free<C: ConnectionTrait>(
    db: &C,
    code: &str,
    owner: Option<&str>,
) -> ResultStorage<()> {
    let holder = plans::Entity::find()
        .filter(plans::Column::Code.eq(code))
        .one(db)
        .await?;
    match holder {
        Some(plan) if Some(plan.plan_id.as_str()) != owner => {
            Err(StorageError::duplicate("plans_code_key"))
        }
        _ => Ok(()),
    }
}
