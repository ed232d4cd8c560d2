//! Plans table.
//!
//! A plan carries the yearly economic assumptions (inflation, exchange rates)
//! a portfolio is priced against.

use sea_orm::{FromJsonQueryResult, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::Currency;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrencyExchange {
    pub currency: Currency,
    pub exchange: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assumption {
    pub year: i32,
    pub inflation: f64,
    #[serde(default)]
    pub currencies: Vec<CurrencyExchange>,
}

/// Assumptions are stored as one JSON document per plan.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Assumptions(pub Vec<Assumption>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub plan_id: String,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub assumptions: Assumptions,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::portfolios::Entity")]
    Portfolios,
}

impl Related<super::portfolios::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Portfolios.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
