//! Monthly buckets of a cost. Deleted together with their cost.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cost_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub cost_allocation_id: String,
    pub cost_id: String,
    /// Always the first day of the month.
    pub allocation_date: Date,
    /// Index in the schedule as the caller sent it.
    pub position: i32,
    pub amount: f64,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::costs::Entity",
        from = "Column::CostId",
        to = "super::costs::Column::CostId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Cost,
}

impl Related<super::costs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cost.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
