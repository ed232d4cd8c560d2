use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// ISO currency code of a cost amount or a plan exchange rate.
///
/// Stored as its upper-case code, so the column stays readable for ad-hoc
/// queries and reports.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[sea_orm(string_value = "BRL")]
    Brl,
    #[sea_orm(string_value = "USD")]
    Usd,
    #[sea_orm(string_value = "EUR")]
    Eur,
}
