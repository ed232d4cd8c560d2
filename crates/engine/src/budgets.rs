//! Budgets table: the share of one cost assigned to a portfolio.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub budget_id: String,
    pub portfolio_id: String,
    pub cost_id: String,
    pub amount: f64,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::portfolios::Entity",
        from = "Column::PortfolioId",
        to = "super::portfolios::Column::PortfolioId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Portfolio,
    #[sea_orm(
        belongs_to = "super::costs::Entity",
        from = "Column::CostId",
        to = "super::costs::Column::CostId",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Cost,
    #[sea_orm(has_many = "super::budget_allocations::Entity")]
    Allocations,
}

impl Related<super::portfolios::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Portfolio.def()
    }
}

impl Related<super::costs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cost.def()
    }
}

impl Related<super::budget_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Allocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
