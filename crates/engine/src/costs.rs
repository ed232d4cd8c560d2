//! Costs table.

use sea_orm::entity::prelude::*;

use crate::Currency;

/// How a cost recurs over the baseline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum CostType {
    #[sea_orm(string_value = "one_time")]
    OneTime,
    #[sea_orm(string_value = "running")]
    Running,
    #[sea_orm(string_value = "investment")]
    Investment,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "costs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub cost_id: String,
    pub baseline_id: String,
    pub cost_type: CostType,
    pub description: String,
    pub comment: Option<String>,
    pub amount: f64,
    pub currency: Currency,
    pub tax: f64,
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
    #[sea_orm(has_many = "super::cost_allocations::Entity")]
    Allocations,
}

impl Related<super::baselines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Baseline.def()
    }
}

impl Related<super::cost_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Allocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
