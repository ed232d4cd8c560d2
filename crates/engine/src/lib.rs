pub use classify::{
    Action, ClassifierSettings, ConstraintRule, EntityKind, ErrorClassifier, OperationContext,
    StorageError, default_rules,
};
pub use commands::{
    Allocation, BudgetDraft, NewBaseline, NewBudget, NewCost, NewPlan, NewPortfolio, NewUser,
    UpdateBaseline, UpdateBudget, UpdateCost, UpdatePlan, UpdatePortfolio, UpdateUser,
};
pub use costs::CostType;
pub use currency::Currency;
pub use error::{EngineError, ErrorKind};
pub use ops::{Engine, EngineBuilder};
pub use output::ToWire;
pub use patch::Merge;
pub use plans::{Assumption, CurrencyExchange};
pub use users::UserType;

pub mod baselines;
pub mod budget_allocations;
pub mod budgets;
mod classify;
mod commands;
pub mod cost_allocations;
pub mod costs;
mod currency;
mod error;
mod ops;
pub mod output;
mod patch;
pub mod plans;
pub mod portfolios;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
