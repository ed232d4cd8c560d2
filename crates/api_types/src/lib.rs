use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Serde helpers shared by every wire record.
///
/// Each output type picks its timestamp and date policy by pointing its
/// fields at one of these modules instead of hand-writing a serializer.
pub mod wire {
    use super::*;

    /// Optional instant rendered as RFC3339 UTC (`2024-01-31T10:00:00Z`).
    ///
    /// Pair with `skip_serializing_if = "Option::is_none"` so unset instants
    /// drop the key entirely instead of emitting `null`.
    pub mod rfc3339 {
        use chrono::{DateTime, SecondsFormat, Utc};
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(ts) => {
                    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
                }
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            raw.map(|value| {
                DateTime::parse_from_rfc3339(&value)
                    .map(|ts| ts.with_timezone(&Utc))
                    .map_err(D::Error::custom)
            })
            .transpose()
        }
    }

    /// Calendar-only date rendered as `YYYY-MM-DD`.
    pub mod date {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub const FORMAT: &str = "%Y-%m-%d";

        pub fn serialize<S>(value: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&value.format(FORMAT).to_string())
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = String::deserialize(deserializer)?;
            NaiveDate::parse_from_str(&raw, FORMAT).map_err(D::Error::custom)
        }
    }

    /// Same as [`date`], for patch fields.
    pub mod optional_date {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(date) => {
                    serializer.serialize_str(&date.format(super::date::FORMAT).to_string())
                }
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            raw.map(|value| {
                NaiveDate::parse_from_str(&value, super::date::FORMAT).map_err(D::Error::custom)
            })
            .transpose()
        }
    }

    /// One monetary bucket for one calendar month.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Allocation {
        pub year: i32,
        pub month: u32,
        pub amount: f64,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Manager,
    Estimator,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostType {
    OneTime,
    Running,
    Investment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Brl,
    Usd,
    Eur,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub email: String,
        pub user_name: String,
        pub name: String,
        pub user_type: UserType,
    }

    /// Partial update: absent fields keep their stored value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub email: Option<String>,
        pub user_name: Option<String>,
        pub name: Option<String>,
        pub user_type: Option<UserType>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserOutput {
        pub user_id: String,
        pub email: String,
        pub user_name: String,
        pub name: String,
        pub user_type: UserType,
        #[serde(default, with = "wire::rfc3339", skip_serializing_if = "Option::is_none")]
        pub created_at: Option<DateTime<Utc>>,
        #[serde(default, with = "wire::rfc3339", skip_serializing_if = "Option::is_none")]
        pub updated_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserList {
        pub users: Vec<UserOutput>,
    }
}

pub mod plan {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CurrencyExchange {
        pub currency: Currency,
        pub exchange: f64,
    }

    /// Yearly economic assumptions attached to a plan.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Assumption {
        pub year: i32,
        pub inflation: f64,
        #[serde(default)]
        pub currencies: Vec<CurrencyExchange>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlanNew {
        pub code: String,
        pub name: String,
        #[serde(default)]
        pub assumptions: Vec<Assumption>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PlanUpdate {
        pub code: Option<String>,
        pub name: Option<String>,
        pub assumptions: Option<Vec<Assumption>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlanOutput {
        pub plan_id: String,
        pub code: String,
        pub name: String,
        pub assumptions: Vec<Assumption>,
        #[serde(default, with = "wire::rfc3339", skip_serializing_if = "Option::is_none")]
        pub created_at: Option<DateTime<Utc>>,
        #[serde(default, with = "wire::rfc3339", skip_serializing_if = "Option::is_none")]
        pub updated_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlanList {
        pub plans: Vec<PlanOutput>,
    }
}

pub mod baseline {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BaselineNew {
        pub code: String,
        pub title: String,
        pub description: Option<String>,
        #[serde(with = "wire::date")]
        pub start_date: NaiveDate,
        /// Length of the baseline in months.
        pub duration: i32,
        pub manager_id: String,
        pub estimator_id: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BaselineUpdate {
        pub code: Option<String>,
        pub review: Option<i32>,
        pub title: Option<String>,
        pub description: Option<String>,
        #[serde(default, with = "wire::optional_date")]
        pub start_date: Option<NaiveDate>,
        pub duration: Option<i32>,
        pub manager_id: Option<String>,
        pub estimator_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BaselineOutput {
        pub baseline_id: String,
        pub code: String,
        pub review: i32,
        pub title: String,
        pub description: String,
        #[serde(with = "wire::date")]
        pub start_date: NaiveDate,
        pub duration: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub manager_id: Option<String>,
        /// Manager display name, omitted when the relationship does not resolve.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub manager: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub estimator_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub estimator: Option<String>,
        #[serde(default, with = "wire::rfc3339", skip_serializing_if = "Option::is_none")]
        pub created_at: Option<DateTime<Utc>>,
        #[serde(default, with = "wire::rfc3339", skip_serializing_if = "Option::is_none")]
        pub updated_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BaselineList {
        pub baselines: Vec<BaselineOutput>,
    }
}

pub mod cost {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CostNew {
        pub cost_type: CostType,
        pub description: String,
        pub comment: Option<String>,
        pub amount: f64,
        pub currency: Currency,
        #[serde(default)]
        pub tax: f64,
        #[serde(default)]
        pub cost_allocations: Vec<wire::Allocation>,
    }

    /// Partial update. `cost_allocations`, when present, replaces the whole
    /// schedule.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CostUpdate {
        pub cost_type: Option<CostType>,
        pub description: Option<String>,
        pub comment: Option<String>,
        pub amount: Option<f64>,
        pub currency: Option<Currency>,
        pub tax: Option<f64>,
        pub cost_allocations: Option<Vec<wire::Allocation>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CostOutput {
        pub cost_id: String,
        pub baseline_id: String,
        pub cost_type: CostType,
        pub description: String,
        pub comment: String,
        pub amount: f64,
        pub currency: Currency,
        pub tax: f64,
        pub cost_allocations: Vec<wire::Allocation>,
        #[serde(default, with = "wire::rfc3339", skip_serializing_if = "Option::is_none")]
        pub created_at: Option<DateTime<Utc>>,
        #[serde(default, with = "wire::rfc3339", skip_serializing_if = "Option::is_none")]
        pub updated_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CostList {
        pub costs: Vec<CostOutput>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub cost_id: String,
        pub amount: f64,
        #[serde(default)]
        pub budget_allocations: Vec<wire::Allocation>,
    }

    /// Partial update. `budget_allocations`, when present, replaces the whole
    /// schedule.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub amount: Option<f64>,
        pub budget_allocations: Option<Vec<wire::Allocation>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetOutput {
        pub budget_id: String,
        pub portfolio_id: String,
        pub cost_type: CostType,
        pub description: String,
        pub comment: String,
        pub cost_amount: f64,
        pub cost_currency: Currency,
        pub cost_tax: f64,
        pub amount: f64,
        pub budget_allocations: Vec<wire::Allocation>,
        #[serde(default, with = "wire::rfc3339", skip_serializing_if = "Option::is_none")]
        pub created_at: Option<DateTime<Utc>>,
        #[serde(default, with = "wire::rfc3339", skip_serializing_if = "Option::is_none")]
        pub updated_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetList {
        pub budgets: Vec<BudgetOutput>,
    }
}

pub mod portfolio {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PortfolioNew {
        pub baseline_id: String,
        pub plan_id: String,
        #[serde(with = "wire::date")]
        pub start_date: NaiveDate,
        /// Initial budgets, already computed by the caller.
        #[serde(default)]
        pub budgets: Vec<budget::BudgetNew>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PortfolioUpdate {
        pub plan_id: Option<String>,
        #[serde(default, with = "wire::optional_date")]
        pub start_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PortfolioOutput {
        pub portfolio_id: String,
        pub code: String,
        pub review: i32,
        pub plan_code: String,
        pub title: String,
        pub description: String,
        #[serde(with = "wire::date")]
        pub start_date: NaiveDate,
        pub duration: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub manager: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub estimator: Option<String>,
        #[serde(default, with = "wire::rfc3339", skip_serializing_if = "Option::is_none")]
        pub created_at: Option<DateTime<Utc>>,
        #[serde(default, with = "wire::rfc3339", skip_serializing_if = "Option::is_none")]
        pub updated_at: Option<DateTime<Utc>>,
        pub budgets: Vec<budget::BudgetOutput>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PortfolioList {
        pub portfolios: Vec<PortfolioOutput>,
    }
}
