//! Rendering of stored rows as wire records.
//!
//! Every entity kind goes through [`ToWire`] and the same three rules:
//!
//! - timestamps are omitted when unset (`None` or the zero instant);
//! - calendar dates are always present;
//! - allocations keep the order they were given in, one `{year, month,
//!   amount}` entry per bucket.
//!
//! Relationship names resolved through a join are omitted when empty.

use api_types::{
    baseline::BaselineOutput,
    budget::BudgetOutput,
    cost::CostOutput,
    plan::{self, PlanOutput},
    portfolio::PortfolioOutput,
    user::UserOutput,
    wire,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::{
    Allocation, Currency, baselines, budget_allocations, budgets, cost_allocations, costs, plans,
    portfolios, users,
};

pub trait ToWire {
    type Output;

    fn to_wire(&self) -> Self::Output;
}

/// A stored timestamp as it appears on the wire.
pub fn instant(value: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    value.filter(|at| *at != DateTime::<Utc>::UNIX_EPOCH)
}

fn relation(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Anything that can be rendered as one allocation bucket.
pub trait AllocationEntry {
    fn date(&self) -> NaiveDate;
    fn amount(&self) -> f64;
}

impl AllocationEntry for Allocation {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn amount(&self) -> f64 {
        self.amount
    }
}

impl AllocationEntry for cost_allocations::Model {
    fn date(&self) -> NaiveDate {
        self.allocation_date
    }

    fn amount(&self) -> f64 {
        self.amount
    }
}

impl AllocationEntry for budget_allocations::Model {
    fn date(&self) -> NaiveDate {
        self.allocation_date
    }

    fn amount(&self) -> f64 {
        self.amount
    }
}

pub fn allocations<A: AllocationEntry>(entries: &[A]) -> Vec<wire::Allocation> {
    entries
        .iter()
        .map(|entry| {
            let date = entry.date();
            wire::Allocation {
                year: date.year(),
                month: date.month(),
                amount: entry.amount(),
            }
        })
        .collect()
}

impl From<users::UserType> for api_types::UserType {
    fn from(value: users::UserType) -> Self {
        match value {
            users::UserType::Manager => Self::Manager,
            users::UserType::Estimator => Self::Estimator,
        }
    }
}

impl From<api_types::UserType> for users::UserType {
    fn from(value: api_types::UserType) -> Self {
        match value {
            api_types::UserType::Manager => Self::Manager,
            api_types::UserType::Estimator => Self::Estimator,
        }
    }
}

impl From<costs::CostType> for api_types::CostType {
    fn from(value: costs::CostType) -> Self {
        match value {
            costs::CostType::OneTime => Self::OneTime,
            costs::CostType::Running => Self::Running,
            costs::CostType::Investment => Self::Investment,
        }
    }
}

impl From<api_types::CostType> for costs::CostType {
    fn from(value: api_types::CostType) -> Self {
        match value {
            api_types::CostType::OneTime => Self::OneTime,
            api_types::CostType::Running => Self::Running,
            api_types::CostType::Investment => Self::Investment,
        }
    }
}

impl From<Currency> for api_types::Currency {
    fn from(value: Currency) -> Self {
        match value {
            Currency::Brl => Self::Brl,
            Currency::Usd => Self::Usd,
            Currency::Eur => Self::Eur,
        }
    }
}

impl From<api_types::Currency> for Currency {
    fn from(value: api_types::Currency) -> Self {
        match value {
            api_types::Currency::Brl => Self::Brl,
            api_types::Currency::Usd => Self::Usd,
            api_types::Currency::Eur => Self::Eur,
        }
    }
}

impl From<plan::Assumption> for plans::Assumption {
    fn from(value: plan::Assumption) -> Self {
        Self {
            year: value.year,
            inflation: value.inflation,
            currencies: value
                .currencies
                .into_iter()
                .map(|rate| plans::CurrencyExchange {
                    currency: rate.currency.into(),
                    exchange: rate.exchange,
                })
                .collect(),
        }
    }
}

impl From<&plans::Assumption> for plan::Assumption {
    fn from(value: &plans::Assumption) -> Self {
        Self {
            year: value.year,
            inflation: value.inflation,
            currencies: value
                .currencies
                .iter()
                .map(|rate| plan::CurrencyExchange {
                    currency: rate.currency.into(),
                    exchange: rate.exchange,
                })
                .collect(),
        }
    }
}

impl ToWire for users::Model {
    type Output = UserOutput;

    fn to_wire(&self) -> UserOutput {
        UserOutput {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            user_name: self.user_name.clone(),
            name: self.name.clone(),
            user_type: self.user_type.into(),
            created_at: instant(Some(self.created_at)),
            updated_at: instant(self.updated_at),
        }
    }
}

impl ToWire for plans::Model {
    type Output = PlanOutput;

    fn to_wire(&self) -> PlanOutput {
        PlanOutput {
            plan_id: self.plan_id.clone(),
            code: self.code.clone(),
            name: self.name.clone(),
            assumptions: self.assumptions.0.iter().map(Into::into).collect(),
            created_at: instant(Some(self.created_at)),
            updated_at: instant(self.updated_at),
        }
    }
}

/// A baseline joined with the names of its manager and estimator.
#[derive(Clone, Debug)]
pub struct BaselineRow {
    pub baseline: baselines::Model,
    pub manager: String,
    pub estimator: String,
}

impl ToWire for BaselineRow {
    type Output = BaselineOutput;

    fn to_wire(&self) -> BaselineOutput {
        let baseline = &self.baseline;
        BaselineOutput {
            baseline_id: baseline.baseline_id.clone(),
            code: baseline.code.clone(),
            review: baseline.review,
            title: baseline.title.clone(),
            description: baseline.description.clone().unwrap_or_default(),
            start_date: baseline.start_date,
            duration: baseline.duration,
            manager_id: relation(&baseline.manager_id),
            manager: relation(&self.manager),
            estimator_id: relation(&baseline.estimator_id),
            estimator: relation(&self.estimator),
            created_at: instant(Some(baseline.created_at)),
            updated_at: instant(baseline.updated_at),
        }
    }
}

/// A cost with its allocation schedule, ordered by date.
#[derive(Clone, Debug)]
pub struct CostRow {
    pub cost: costs::Model,
    pub allocations: Vec<cost_allocations::Model>,
}

impl ToWire for CostRow {
    type Output = CostOutput;

    fn to_wire(&self) -> CostOutput {
        let cost = &self.cost;
        CostOutput {
            cost_id: cost.cost_id.clone(),
            baseline_id: cost.baseline_id.clone(),
            cost_type: cost.cost_type.into(),
            description: cost.description.clone(),
            comment: cost.comment.clone().unwrap_or_default(),
            amount: cost.amount,
            currency: cost.currency.into(),
            tax: cost.tax,
            cost_allocations: allocations(&self.allocations),
            created_at: instant(Some(cost.created_at)),
            updated_at: instant(cost.updated_at),
        }
    }
}

/// A budget joined with the cost it draws from.
#[derive(Clone, Debug)]
pub struct BudgetRow {
    pub budget: budgets::Model,
    pub cost: costs::Model,
    pub allocations: Vec<budget_allocations::Model>,
}

impl ToWire for BudgetRow {
    type Output = BudgetOutput;

    fn to_wire(&self) -> BudgetOutput {
        BudgetOutput {
            budget_id: self.budget.budget_id.clone(),
            portfolio_id: self.budget.portfolio_id.clone(),
            cost_type: self.cost.cost_type.into(),
            description: self.cost.description.clone(),
            comment: self.cost.comment.clone().unwrap_or_default(),
            cost_amount: self.cost.amount,
            cost_currency: self.cost.currency.into(),
            cost_tax: self.cost.tax,
            amount: self.budget.amount,
            budget_allocations: allocations(&self.allocations),
            created_at: instant(Some(self.budget.created_at)),
            updated_at: instant(self.budget.updated_at),
        }
    }
}

/// A portfolio with the baseline and plan it prices and all of its budgets.
#[derive(Clone, Debug)]
pub struct PortfolioRow {
    pub portfolio: portfolios::Model,
    pub baseline: BaselineRow,
    pub plan_code: String,
    pub budgets: Vec<BudgetRow>,
}

impl ToWire for PortfolioRow {
    type Output = PortfolioOutput;

    fn to_wire(&self) -> PortfolioOutput {
        let baseline = &self.baseline.baseline;
        PortfolioOutput {
            portfolio_id: self.portfolio.portfolio_id.clone(),
            code: baseline.code.clone(),
            review: baseline.review,
            plan_code: self.plan_code.clone(),
            title: baseline.title.clone(),
            description: baseline.description.clone().unwrap_or_default(),
            start_date: self.portfolio.start_date,
            duration: baseline.duration,
            manager: relation(&self.baseline.manager),
            estimator: relation(&self.baseline.estimator),
            created_at: instant(Some(self.portfolio.created_at)),
            updated_at: instant(self.portfolio.updated_at),
            budgets: self.budgets.iter().map(ToWire::to_wire).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::{Value, json};

    use super::*;
    use crate::costs::CostType;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 30, 0).unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn cost(updated_at: Option<DateTime<Utc>>) -> costs::Model {
        costs::Model {
            cost_id: "c-1".to_string(),
            baseline_id: "b-1".to_string(),
            cost_type: CostType::OneTime,
            description: "licenses".to_string(),
            comment: None,
            amount: 150.0,
            currency: Currency::Usd,
            tax: 0.0,
            created_at: at(1),
            updated_at,
        }
    }

    fn cost_allocation(
        id: &str,
        position: i32,
        allocation_date: NaiveDate,
        amount: f64,
    ) -> cost_allocations::Model {
        cost_allocations::Model {
            cost_allocation_id: id.to_string(),
            cost_id: "c-1".to_string(),
            allocation_date,
            position,
            amount,
            created_at: at(1),
            updated_at: None,
        }
    }

    fn baseline_row(manager: &str, estimator: &str) -> BaselineRow {
        BaselineRow {
            baseline: baselines::Model {
                baseline_id: "b-1".to_string(),
                code: "BL01".to_string(),
                review: 1,
                title: "Billing".to_string(),
                description: None,
                start_date: date(2024, 1, 1),
                duration: 12,
                manager_id: "u-1".to_string(),
                estimator_id: "u-2".to_string(),
                created_at: at(1),
                updated_at: Some(DateTime::<Utc>::UNIX_EPOCH),
            },
            manager: manager.to_string(),
            estimator: estimator.to_string(),
        }
    }

    #[test]
    fn cost_without_update_omits_updated_at_and_keeps_allocations() {
        let row = CostRow {
            cost: cost(None),
            allocations: vec![
                cost_allocation("a-1", 0, date(2024, 1, 1), 100.0),
                cost_allocation("a-2", 1, date(2024, 2, 1), 50.0),
            ],
        };

        let value = serde_json::to_value(row.to_wire()).unwrap();

        assert!(value.get("updated_at").is_none());
        assert_eq!(value["created_at"], "2024-03-01T12:30:00Z");
        assert_eq!(
            value["cost_allocations"],
            json!([
                {"year": 2024, "month": 1, "amount": 100.0},
                {"year": 2024, "month": 2, "amount": 50.0}
            ])
        );
        assert_eq!(value["cost_type"], "one_time");
        assert_eq!(value["currency"], "USD");
    }

    #[test]
    fn epoch_counts_as_unset() {
        assert_eq!(instant(Some(DateTime::<Utc>::UNIX_EPOCH)), None);
        assert_eq!(instant(Some(at(2))), Some(at(2)));
        assert_eq!(instant(None), None);
    }

    #[test]
    fn cost_allocations_key_is_always_present() {
        let row = CostRow {
            cost: cost(Some(at(2))),
            allocations: Vec::new(),
        };

        let value = serde_json::to_value(row.to_wire()).unwrap();

        assert_eq!(value["cost_allocations"], json!([]));
        assert_eq!(value["updated_at"], "2024-03-02T12:30:00Z");
    }

    #[test]
    fn allocations_keep_caller_order() {
        let entries = vec![
            Allocation::monthly(2025, 3, 10.0).unwrap(),
            Allocation::monthly(2024, 12, 20.5).unwrap(),
            Allocation::monthly(2025, 1, 0.25).unwrap(),
        ];

        let rendered = allocations(&entries);

        let triples: Vec<_> = rendered
            .iter()
            .map(|entry| (entry.year, entry.month, entry.amount))
            .collect();
        assert_eq!(
            triples,
            vec![(2025, 3, 10.0), (2024, 12, 20.5), (2025, 1, 0.25)]
        );
    }

    #[test]
    fn start_date_is_ten_characters() {
        let value = serde_json::to_value(baseline_row("Ann", "Bob").to_wire()).unwrap();

        let start_date = value["start_date"].as_str().unwrap();
        assert_eq!(start_date, "2024-01-01");
        assert_eq!(start_date.len(), 10);
        assert!(value.get("updated_at").is_none());
        assert_eq!(value["description"], "");
    }

    #[test]
    fn empty_relationship_names_are_omitted() {
        let value = serde_json::to_value(baseline_row("Ann", "").to_wire()).unwrap();

        assert_eq!(value["manager"], "Ann");
        assert!(value.get("estimator").is_none());
        assert_eq!(value["estimator_id"], "u-2");
    }

    #[test]
    fn portfolio_takes_its_header_from_the_baseline() {
        let row = PortfolioRow {
            portfolio: portfolios::Model {
                portfolio_id: "p-1".to_string(),
                baseline_id: "b-1".to_string(),
                plan_id: "pl-1".to_string(),
                start_date: date(2024, 6, 1),
                created_at: at(3),
                updated_at: None,
            },
            baseline: baseline_row("Ann", "Bob"),
            plan_code: "PP2024".to_string(),
            budgets: vec![BudgetRow {
                budget: budgets::Model {
                    budget_id: "bg-1".to_string(),
                    portfolio_id: "p-1".to_string(),
                    cost_id: "c-1".to_string(),
                    amount: 160.0,
                    created_at: at(3),
                    updated_at: None,
                },
                cost: cost(None),
                allocations: vec![budget_allocations::Model {
                    budget_allocation_id: "ba-1".to_string(),
                    budget_id: "bg-1".to_string(),
                    allocation_date: date(2024, 6, 1),
                    position: 0,
                    amount: 160.0,
                    created_at: at(3),
                    updated_at: None,
                }],
            }],
        };

        let value = serde_json::to_value(row.to_wire()).unwrap();

        assert_eq!(value["code"], "BL01");
        assert_eq!(value["plan_code"], "PP2024");
        assert_eq!(value["start_date"], "2024-06-01");
        assert_eq!(value["manager"], "Ann");
        let budget = &value["budgets"][0];
        assert_eq!(budget["cost_amount"], 150.0);
        assert_eq!(budget["amount"], 160.0);
        assert_eq!(
            budget["budget_allocations"],
            json!([{"year": 2024, "month": 6, "amount": 160.0}])
        );
        assert_eq!(budget.get("updated_at"), None::<&Value>);
    }
}
