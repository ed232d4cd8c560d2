//! Baselines table.
//!
//! A baseline is one reviewed estimate of a project: code and review together
//! identify it, and it is owned by a manager and an estimator.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "baselines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub baseline_id: String,
    pub code: String,
    pub review: i32,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Date,
    /// Months.
    pub duration: i32,
    pub manager_id: String,
    pub estimator_id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ManagerId",
        to = "super::users::Column::UserId",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Manager,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::EstimatorId",
        to = "super::users::Column::UserId",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Estimator,
    #[sea_orm(has_many = "super::costs::Entity")]
    Costs,
    #[sea_orm(has_many = "super::portfolios::Entity")]
    Portfolios,
}

impl Related<super::costs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Costs.def()
    }
}

impl Related<super::portfolios::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Portfolios.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
