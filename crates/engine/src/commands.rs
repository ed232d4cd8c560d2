//! Command structs for engine operations.
//!
//! `New*` commands carry everything a create needs. `Update*` commands are
//! patches: the target id plus one `Option` per mutable field, `None` meaning
//! "leave as stored". They never carry timestamps.

use chrono::NaiveDate;

use crate::{Currency, costs::CostType, plans::Assumption, users::UserType};

/// One monetary bucket. Only the year and month of `date` are meaningful.
#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    pub date: NaiveDate,
    pub amount: f64,
}

impl Allocation {
    /// Bucket for `year`/`month`, stored on the first day of the month.
    /// Returns `None` for an impossible month.
    pub fn monthly(year: i32, month: u32, amount: f64) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|date| Self { date, amount })
    }
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub user_name: String,
    pub name: String,
    pub user_type: UserType,
}

#[derive(Clone, Debug, Default)]
pub struct UpdateUser {
    pub user_id: String,
    pub email: Option<String>,
    pub user_name: Option<String>,
    pub name: Option<String>,
    pub user_type: Option<UserType>,
}

#[derive(Clone, Debug)]
pub struct NewPlan {
    pub code: String,
    pub name: String,
    pub assumptions: Vec<Assumption>,
}

#[derive(Clone, Debug, Default)]
pub struct UpdatePlan {
    pub plan_id: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub assumptions: Option<Vec<Assumption>>,
}

#[derive(Clone, Debug)]
pub struct NewBaseline {
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub duration: i32,
    pub manager_id: String,
    pub estimator_id: String,
}

#[derive(Clone, Debug, Default)]
pub struct UpdateBaseline {
    pub baseline_id: String,
    pub code: Option<String>,
    pub review: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub duration: Option<i32>,
    pub manager_id: Option<String>,
    pub estimator_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewCost {
    pub baseline_id: String,
    pub cost_type: CostType,
    pub description: String,
    pub comment: Option<String>,
    pub amount: f64,
    pub currency: Currency,
    pub tax: f64,
    pub allocations: Vec<Allocation>,
}

/// `allocations`, when present, replaces the whole schedule.
#[derive(Clone, Debug, Default)]
pub struct UpdateCost {
    pub cost_id: String,
    pub cost_type: Option<CostType>,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<Currency>,
    pub tax: Option<f64>,
    pub allocations: Option<Vec<Allocation>>,
}

/// A budget as part of a portfolio creation, before the portfolio exists.
#[derive(Clone, Debug)]
pub struct BudgetDraft {
    pub cost_id: String,
    pub amount: f64,
    pub allocations: Vec<Allocation>,
}

#[derive(Clone, Debug)]
pub struct NewPortfolio {
    pub baseline_id: String,
    pub plan_id: String,
    pub start_date: NaiveDate,
    pub budgets: Vec<BudgetDraft>,
}

#[derive(Clone, Debug, Default)]
pub struct UpdatePortfolio {
    pub portfolio_id: String,
    pub plan_id: Option<String>,
    pub start_date: Option<NaiveDate>,
}

#[derive(Clone, Debug)]
pub struct NewBudget {
    pub portfolio_id: String,
    pub draft: BudgetDraft,
}

/// `allocations`, when present, replaces the whole schedule.
#[derive(Clone, Debug, Default)]
pub struct UpdateBudget {
    pub budget_id: String,
    pub amount: Option<f64>,
    pub allocations: Option<Vec<Allocation>>,
}
