use std::collections::HashMap;

use api_types::baseline::{BaselineList, BaselineOutput};
use sea_orm::{
    ActiveValue, Condition, IntoActiveModel, QueryFilter, QueryOrder, prelude::*,
};

use crate::{
    Action, EntityKind, Merge, NewBaseline, OperationContext, ResultEngine, StorageError, ToWire,
    UpdateBaseline, baselines, costs, output::BaselineRow, portfolios, users,
};

use super::{Engine, ResultStorage, new_id, now, refuse_if_referenced, require};

/// Every new baseline starts at its first review.
const FIRST_REVIEW: i32 = 1;

impl Engine {
    /// Create the first review of a baseline.
    pub async fn create_baseline(&self, cmd: NewBaseline) -> ResultEngine<BaselineOutput> {
        let ctx = OperationContext::new(EntityKind::Baseline, Action::Create)
            .key("code", &cmd.code)
            .key("review", FIRST_REVIEW)
            .key("manager_id", &cmd.manager_id)
            .key("estimator_id", &cmd.estimator_id);
        let row = self
            .insert_baseline(cmd)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(
            baseline_id = %row.baseline.baseline_id,
            code = %row.baseline.code,
            "baseline created"
        );
        Ok(row.to_wire())
    }

    pub async fn update_baseline(&self, cmd: UpdateBaseline) -> ResultEngine<BaselineOutput> {
        let mut ctx =
            OperationContext::new(EntityKind::Baseline, Action::Update).id(&cmd.baseline_id);
        if let Some(manager_id) = &cmd.manager_id {
            ctx = ctx.key("manager_id", manager_id);
        }
        if let Some(estimator_id) = &cmd.estimator_id {
            ctx = ctx.key("estimator_id", estimator_id);
        }
        let patched = self.patch_baseline(cmd, &mut ctx).await;
        let row = patched.map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(baseline_id = %row.baseline.baseline_id, "baseline updated");
        Ok(row.to_wire())
    }

    pub async fn get_baseline(&self, baseline_id: &str) -> ResultEngine<BaselineOutput> {
        let ctx = OperationContext::new(EntityKind::Baseline, Action::Get).id(baseline_id);
        let row = find_baseline_row(&self.database, baseline_id)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        Ok(row.to_wire())
    }

    /// Delete a baseline that has neither costs nor portfolios.
    pub async fn delete_baseline(&self, baseline_id: &str) -> ResultEngine<()> {
        let ctx = OperationContext::new(EntityKind::Baseline, Action::Delete).id(baseline_id);
        self.remove_baseline(baseline_id)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(baseline_id, "baseline deleted");
        Ok(())
    }

    /// All baselines ordered by code and review.
    pub async fn list_baselines(&self) -> ResultEngine<BaselineList> {
        let ctx = OperationContext::new(EntityKind::Baseline, Action::List);
        let rows = self
            .baseline_rows()
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        Ok(BaselineList {
            baselines: rows.iter().map(ToWire::to_wire).collect(),
        })
    }

    async fn insert_baseline(&self, cmd: NewBaseline) -> ResultStorage<BaselineRow> {
        let db = &self.database;
        require::<users::Entity, _>(db, &cmd.manager_id, "baselines_manager_id_fkey").await?;
        require::<users::Entity, _>(db, &cmd.estimator_id, "baselines_estimator_id_fkey").await?;
        ensure_review_free(db, &cmd.code, FIRST_REVIEW, None).await?;

        let baseline_id = new_id();
        let active = baselines::ActiveModel {
            baseline_id: ActiveValue::Set(baseline_id.clone()),
            code: ActiveValue::Set(cmd.code),
            review: ActiveValue::Set(FIRST_REVIEW),
            title: ActiveValue::Set(cmd.title),
            description: ActiveValue::Set(cmd.description),
            start_date: ActiveValue::Set(cmd.start_date),
            duration: ActiveValue::Set(cmd.duration),
            manager_id: ActiveValue::Set(cmd.manager_id),
            estimator_id: ActiveValue::Set(cmd.estimator_id),
            created_at: ActiveValue::Set(now()),
            updated_at: ActiveValue::Set(None),
        };
        baselines::Entity::insert(active)
            .exec_without_returning(db)
            .await?;

        find_baseline_row(db, &baseline_id).await
    }

    async fn patch_baseline(
        &self,
        cmd: UpdateBaseline,
        ctx: &mut OperationContext,
    ) -> ResultStorage<BaselineRow> {
        let db = &self.database;
        let current = find_baseline(db, &cmd.baseline_id).await?;
        if let Some(manager_id) = &cmd.manager_id {
            require::<users::Entity, _>(db, manager_id, "baselines_manager_id_fkey").await?;
        }
        if let Some(estimator_id) = &cmd.estimator_id {
            require::<users::Entity, _>(db, estimator_id, "baselines_estimator_id_fkey").await?;
        }

        let merged = cmd.merge(&current);
        ctx.set_key("code", &merged.code);
        ctx.set_key("review", merged.review);
        if merged.code != current.code || merged.review != current.review {
            ensure_review_free(db, &merged.code, merged.review, Some(&current.baseline_id))
                .await?;
        }
        merged.into_active_model().reset_all().update(db).await?;

        find_baseline_row(db, &current.baseline_id).await
    }

    async fn remove_baseline(&self, baseline_id: &str) -> ResultStorage<()> {
        let db = &self.database;
        refuse_if_referenced::<costs::Entity, _>(
            db,
            Condition::all().add(costs::Column::BaselineId.eq(baseline_id)),
            "costs_baseline_id_fkey",
        )
        .await?;
        refuse_if_referenced::<portfolios::Entity, _>(
            db,
            Condition::all().add(portfolios::Column::BaselineId.eq(baseline_id)),
            "portfolios_baseline_id_fkey",
        )
        .await?;

        let result = baselines::Entity::delete_by_id(baseline_id.to_string())
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(StorageError::RowNotFound);
        }
        Ok(())
    }

    async fn baseline_rows(&self) -> ResultStorage<Vec<BaselineRow>> {
        let baselines = baselines::Entity::find()
            .order_by_asc(baselines::Column::Code)
            .order_by_asc(baselines::Column::Review)
            .all(&self.database)
            .await?;

        let mut user_ids: Vec<String> = baselines
            .iter()
            .flat_map(|b| [b.manager_id.clone(), b.estimator_id.clone()])
            .collect();
        user_ids.sort();
        user_ids.dedup();
        let names = user_names(&self.database, user_ids).await?;

        Ok(baselines
            .into_iter()
            .map(|baseline| with_names(baseline, &names))
            .collect())
    }
}

pub(super) async fn find_baseline<C: ConnectionTrait>(
    db: &C,
    baseline_id: &str,
) -> ResultStorage<baselines::Model> {
    baselines::Entity::find_by_id(baseline_id.to_string())
        .one(db)
        .await?
        .ok_or(StorageError::RowNotFound)
}

/// A baseline together with the names of the users it points at.
pub(super) async fn find_baseline_row<C: ConnectionTrait>(
    db: &C,
    baseline_id: &str,
) -> ResultStorage<BaselineRow> {
    let baseline = find_baseline(db, baseline_id).await?;
    let names = user_names(
        db,
        vec![baseline.manager_id.clone(), baseline.estimator_id.clone()],
    )
    .await?;
    Ok(with_names(baseline, &names))
}

async fn user_names<C: ConnectionTrait>(
    db: &C,
    user_ids: Vec<String>,
) -> ResultStorage<HashMap<String, String>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = users::Entity::find()
        .filter(users::Column::UserId.is_in(user_ids))
        .all(db)
        .await?;
    Ok(users
        .into_iter()
        .map(|user| (user.user_id, user.name))
        .collect())
}

fn with_names(baseline: baselines::Model, names: &HashMap<String, String>) -> BaselineRow {
    let name_of = |id: &str| names.get(id).cloned().unwrap_or_default();
    BaselineRow {
        manager: name_of(&baseline.manager_id),
        estimator: name_of(&baseline.estimator_id),
        baseline,
    }
}

async fn ensure_review_free<C: ConnectionTrait>(
    db: &C,
    code: &str,
    review: i32,
    owner: Option<&str>,
) -> ResultStorage<()> {
    let holder = baselines::Entity::find()
        .filter(baselines::Column::Code.eq(code))
        .filter(baselines::Column::Review.eq(review))
        .one(db)
        .await?;
    match holder {
        Some(baseline) if Some(baseline.baseline_id.as_str()) != owner => {
            Err(StorageError::duplicate("baselines_code_review_key"))
        }
        _ => Ok(()),
    }
}
