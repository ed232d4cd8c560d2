use api_types::user::{UserList, UserOutput};
use sea_orm::{
    ActiveValue, Condition, IntoActiveModel, QueryFilter, QueryOrder, prelude::*,
};

use crate::{
    Action, EntityKind, Merge, NewUser, OperationContext, ResultEngine, StorageError, ToWire,
    UpdateUser, baselines, users,
};

use super::{Engine, ResultStorage, new_id, now, refuse_if_referenced};

impl Engine {
    /// Create a user. Email and user name must both be free.
    pub async fn create_user(&self, cmd: NewUser) -> ResultEngine<UserOutput> {
        let ctx = OperationContext::new(EntityKind::User, Action::Create)
            .key("email", &cmd.email)
            .key("user_name", &cmd.user_name);
        let user = self
            .insert_user(cmd)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(user_id = %user.user_id, "user created");
        Ok(user.to_wire())
    }

    /// Patch a user. Absent fields keep their stored value.
    pub async fn update_user(&self, cmd: UpdateUser) -> ResultEngine<UserOutput> {
        let mut ctx = OperationContext::new(EntityKind::User, Action::Update).id(&cmd.user_id);
        if let Some(email) = &cmd.email {
            ctx = ctx.key("email", email);
        }
        if let Some(user_name) = &cmd.user_name {
            ctx = ctx.key("user_name", user_name);
        }
        let user = self
            .patch_user(cmd)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(user_id = %user.user_id, "user updated");
        Ok(user.to_wire())
    }

    pub async fn get_user(&self, user_id: &str) -> ResultEngine<UserOutput> {
        let ctx = OperationContext::new(EntityKind::User, Action::Get).id(user_id);
        let user = find_user(&self.database, user_id)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        Ok(user.to_wire())
    }

    /// Delete a user. Fails with `Conflict` while a baseline still names the
    /// user as manager or estimator.
    pub async fn delete_user(&self, user_id: &str) -> ResultEngine<()> {
        let ctx = OperationContext::new(EntityKind::User, Action::Delete).id(user_id);
        self.remove_user(user_id)
            .await
            .map_err(|err| self.classify(err, &ctx))?;
        tracing::info!(user_id, "user deleted");
        Ok(())
    }

    /// All users ordered by name.
    pub async fn list_users(&self) -> ResultEngine<UserList> {
        let ctx = OperationContext::new(EntityKind::User, Action::List);
        let users = users::Entity::find()
            .order_by_asc(users::Column::Name)
            .all(&self.database)
            .await
            .map_err(|err| self.classify(err.into(), &ctx))?;
        Ok(UserList {
            users: users.iter().map(ToWire::to_wire).collect(),
        })
    }

    async fn insert_user(&self, cmd: NewUser) -> ResultStorage<users::Model> {
        ensure_email_free(&self.database, &cmd.email, None).await?;

        let user_id = new_id();
        let active = users::ActiveModel {
            user_id: ActiveValue::Set(user_id.clone()),
            email: ActiveValue::Set(cmd.email),
            user_name: ActiveValue::Set(cmd.user_name),
            name: ActiveValue::Set(cmd.name),
            user_type: ActiveValue::Set(cmd.user_type),
            created_at: ActiveValue::Set(now()),
            updated_at: ActiveValue::Set(None),
        };
        users::Entity::insert(active)
            .exec_without_returning(&self.database)
            .await?;

        find_user(&self.database, &user_id).await
    }

    async fn patch_user(&self, cmd: UpdateUser) -> ResultStorage<users::Model> {
        let current = find_user(&self.database, &cmd.user_id).await?;
        if let Some(email) = &cmd.email {
            ensure_email_free(&self.database, email, Some(&current.user_id)).await?;
        }

        let merged = cmd.merge(&current);
        merged
            .into_active_model()
            .reset_all()
            .update(&self.database)
            .await?;

        find_user(&self.database, &current.user_id).await
    }

    async fn remove_user(&self, user_id: &str) -> ResultStorage<()> {
        refuse_if_referenced::<baselines::Entity, _>(
            &self.database,
            Condition::all().add(baselines::Column::ManagerId.eq(user_id)),
            "baselines_manager_id_fkey",
        )
        .await?;
        refuse_if_referenced::<baselines::Entity, _>(
            &self.database,
            Condition::all().add(baselines::Column::EstimatorId.eq(user_id)),
            "baselines_estimator_id_fkey",
        )
        .await?;

        let result = users::Entity::delete_by_id(user_id.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(StorageError::RowNotFound);
        }
        Ok(())
    }
}

pub(super) async fn find_user<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
) -> ResultStorage<users::Model> {
    users::Entity::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .ok_or(StorageError::RowNotFound)
}

/// Pre-existence check on the email key; `owner` is the user allowed to
/// hold it already.
async fn ensure_email_free<C: ConnectionTrait>(
    db: &C,
    email: &str,
    owner: Option<&str>,
) -> ResultStorage<()> {
    let holder = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await?;
    match holder {
        Some(user) if Some(user.user_id.as_str()) != owner => {
            Err(StorageError::duplicate("users_email_key"))
        }
        _ => Ok(()),
    }
}
