//! Portfolios table.
//!
//! A portfolio prices one baseline against one plan; most of its wire record
//! comes from the baseline it points at.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "portfolios")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub portfolio_id: String,
    pub baseline_id: String,
    pub plan_id: String,
    pub start_date: Date,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::baselines::Entity",
        from = "Column::BaselineId",
        to = "super::baselines::Column::BaselineId",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Baseline,
    #[sea_orm(
        belongs_to = "super::plans::Entity",
        from = "Column::PlanId",
        to = "super::plans::Column::PlanId",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Plan,
    #[sea_orm(has_many = "super::budgets::Entity")]
    Budgets,
}

impl Related<super::baselines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Baseline.def()
    }
}

impl Related<super::plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
