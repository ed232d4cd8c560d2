//! Translation of storage failures into [`EngineError`]s.
//!
//! Storage engines report relationship problems through opaque constraint
//! identifiers (`baselines_estimator_id_fkey`, `users.email`, ...). This module
//! is the only place that knows about them: every storage call in the engine
//! hands its error to [`ErrorClassifier::classify`] together with an
//! [`OperationContext`] describing what was being attempted.
//!
//! Known constraints are described by a table of [`ConstraintRule`]s. The
//! built-in table can be extended or overridden from configuration, so a new
//! relationship is a data change.

use std::fmt;

use sea_orm::{DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{EngineError, ErrorKind};

/// The narrow set of signals the engine reads out of a storage failure.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("no matching row")]
    RowNotFound,
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },
    #[error("foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },
    #[error("storage rejected the operation: {0}")]
    Rejected(String),
    #[error(transparent)]
    Database(DbErr),
}

impl StorageError {
    /// A uniqueness violation detected before reaching storage, e.g. by a
    /// pre-existence lookup on a business key.
    pub(crate) fn duplicate(constraint: &str) -> Self {
        Self::UniqueViolation {
            constraint: constraint.to_string(),
        }
    }

    /// A relationship violation detected before reaching storage: a missing
    /// referenced row on writes, or a referencing row on deletes.
    pub(crate) fn foreign_key(constraint: &str) -> Self {
        Self::ForeignKeyViolation {
            constraint: constraint.to_string(),
        }
    }
}

impl From<DbErr> for StorageError {
    fn from(err: DbErr) -> Self {
        if matches!(err, DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated) {
            return Self::RowNotFound;
        }
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => Self::UniqueViolation {
                constraint: constraint_name(&message),
            },
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => Self::ForeignKeyViolation {
                constraint: constraint_name(&message),
            },
            _ => from_message(err),
        }
    }
}

/// Fallback for drivers that do not surface a structured SQL error (mock and
/// proxy connections): look at the message the engine produced.
fn from_message(err: DbErr) -> StorageError {
    let message = err.to_string();
    if message.contains("violates unique constraint")
        || message.contains("UNIQUE constraint failed")
    {
        return StorageError::UniqueViolation {
            constraint: constraint_name(&message),
        };
    }
    if message.contains("violates foreign key constraint")
        || message.contains("FOREIGN KEY constraint failed")
    {
        return StorageError::ForeignKeyViolation {
            constraint: constraint_name(&message),
        };
    }
    StorageError::Database(err)
}

/// Extract the constraint identifier from an engine message.
///
/// Postgres quotes the name (`... violates foreign key constraint "x" on
/// table ...`); SQLite lists the columns (`UNIQUE constraint failed:
/// users.email`) and names nothing for foreign keys, which yields `""`.
fn constraint_name(message: &str) -> String {
    if let Some((_, rest)) = message.split_once("constraint \"")
        && let Some((name, _)) = rest.split_once('"')
    {
        return name.to_string();
    }
    if let Some((_, columns)) = message.split_once("constraint failed: ") {
        return columns.trim().to_string();
    }
    String::new()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Plan,
    Baseline,
    Cost,
    Portfolio,
    Budget,
}

impl EntityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Plan => "plan",
            Self::Baseline => "baseline",
            Self::Cost => "cost",
            Self::Portfolio => "portfolio",
            Self::Budget => "budget",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
    Get,
    List,
    Delete,
}

/// What was being attempted when storage failed.
///
/// Business keys are recorded from the request, so messages can name the
/// value the caller sent instead of quoting storage text.
#[derive(Clone, Debug)]
pub struct OperationContext {
    pub entity: EntityKind,
    pub action: Action,
    pub id: Option<String>,
    keys: Vec<(&'static str, String)>,
}

impl OperationContext {
    pub fn new(entity: EntityKind, action: Action) -> Self {
        Self {
            entity,
            action,
            id: None,
            keys: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn key(mut self, name: &'static str, value: impl ToString) -> Self {
        self.keys.push((name, value.to_string()));
        self
    }

    /// Record a key learned while the operation runs, e.g. the merged value
    /// of a field the patch left out.
    pub(crate) fn set_key(&mut self, name: &'static str, value: impl ToString) {
        let value = value.to_string();
        match self.keys.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.keys.push((name, value)),
        }
    }

    /// Fill `{entity}`, `{id}` and `{<key>}` placeholders in one pass over
    /// the template. Substituted values are never scanned again, and unknown
    /// placeholders are kept as written.
    pub fn render(&self, template: &str) -> String {
        let mut rendered = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let tail = &rest[open..];
            let Some(close) = tail.find('}') else {
                rest = tail;
                break;
            };
            let placeholder = &tail[..=close];
            match self.placeholder(&placeholder[1..close]) {
                Some(value) => rendered.push_str(value),
                None => rendered.push_str(placeholder),
            }
            rest = &tail[close + 1..];
        }
        rendered.push_str(rest);
        rendered
    }

    fn placeholder(&self, name: &str) -> Option<&str> {
        match name {
            "entity" => Some(self.entity.as_str()),
            "id" => Some(self.id.as_deref().unwrap_or_default()),
            _ => self
                .keys
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.as_str()),
        }
    }

    /// The business key a uniqueness constraint most likely covers: the one
    /// whose name appears in the constraint identifier, else the first one.
    fn key_for(&self, constraint: &str) -> Option<&(&'static str, String)> {
        self.keys
            .iter()
            .find(|(name, _)| constraint.contains(name))
            .or_else(|| self.keys.first())
    }

    fn subject(&self) -> String {
        match &self.id {
            Some(id) => format!("{} id {id}", self.entity),
            None => self.entity.to_string(),
        }
    }

    fn subject_with(&self) -> String {
        match &self.id {
            Some(id) => format!("{} with id {id}", self.entity),
            None => self.entity.to_string(),
        }
    }
}

/// One entry of the constraint table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintRule {
    /// Constraint identifier as reported by the storage engine.
    pub constraint: String,
    /// Actions the rule applies to; empty means every action.
    #[serde(default)]
    pub actions: Vec<Action>,
    pub kind: ErrorKind,
    /// Message template, see [`OperationContext::render`].
    pub message: String,
}

impl ConstraintRule {
    pub fn new(constraint: &str, actions: &[Action], kind: ErrorKind, message: &str) -> Self {
        Self {
            constraint: constraint.to_string(),
            actions: actions.to_vec(),
            kind,
            message: message.to_string(),
        }
    }

    fn applies(&self, constraint: &str, action: Action) -> bool {
        self.constraint == constraint && (self.actions.is_empty() || self.actions.contains(&action))
    }
}

/// Classifier configuration, usually read from the `[classifier]` settings
/// section.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Report storage failures on delete that match no rule as `Conflict`
    /// instead of `Internal`.
    pub unclassified_delete_as_conflict: bool,
    /// Extra rules, checked before the built-in table.
    pub constraints: Vec<ConstraintRule>,
}

#[derive(Clone, Debug)]
pub struct ErrorClassifier {
    rules: Vec<ConstraintRule>,
    unclassified_delete_as_conflict: bool,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            unclassified_delete_as_conflict: false,
        }
    }
}

impl ErrorClassifier {
    pub fn from_settings(settings: ClassifierSettings) -> Self {
        let mut rules = settings.constraints;
        rules.extend(default_rules());
        Self {
            rules,
            unclassified_delete_as_conflict: settings.unclassified_delete_as_conflict,
        }
    }

    /// Map a storage failure to an [`EngineError`]. Never fails.
    pub fn classify(&self, err: impl Into<StorageError>, ctx: &OperationContext) -> EngineError {
        let err = err.into();
        let classified = match &err {
            StorageError::RowNotFound => {
                Some(EngineError::NotFound(format!("{} not found", ctx.subject_with())))
            }
            StorageError::UniqueViolation { constraint } => Some(
                self.rule_for(constraint, ctx)
                    .unwrap_or_else(|| EngineError::Conflict(duplicate_message(constraint, ctx))),
            ),
            StorageError::ForeignKeyViolation { constraint } => Some(
                self.rule_for(constraint, ctx)
                    .unwrap_or_else(|| EngineError::Conflict(relation_message(ctx))),
            ),
            StorageError::Rejected(_) | StorageError::Database(_) => {
                (ctx.action == Action::Delete && self.unclassified_delete_as_conflict)
                    .then(|| EngineError::Conflict(format!("cannot delete {}", ctx.subject())))
            }
        };

        match classified {
            Some(classified) => {
                tracing::debug!(
                    entity = %ctx.entity,
                    action = ?ctx.action,
                    error = %err,
                    "storage failure classified as {:?}",
                    classified.kind()
                );
                classified
            }
            None => {
                tracing::error!(
                    entity = %ctx.entity,
                    action = ?ctx.action,
                    id = ctx.id.as_deref().unwrap_or_default(),
                    error = %err,
                    "unclassified storage failure"
                );
                EngineError::Internal { source: err }
            }
        }
    }

    fn rule_for(&self, constraint: &str, ctx: &OperationContext) -> Option<EngineError> {
        self.rules
            .iter()
            .find(|rule| rule.applies(constraint, ctx.action))
            .map(|rule| EngineError::with_kind(rule.kind, ctx.render(&rule.message)))
    }
}

fn duplicate_message(constraint: &str, ctx: &OperationContext) -> String {
    match ctx.key_for(constraint) {
        Some((name, value)) => format!("{} with {name} {value} already exists", ctx.entity),
        None => format!("{} already exists", ctx.entity),
    }
}

fn relation_message(ctx: &OperationContext) -> String {
    match ctx.action {
        Action::Delete => format!(
            "cannot delete {}: referenced by related records",
            ctx.subject()
        ),
        _ => format!(
            "cannot modify {}: a related record is missing or still in use",
            ctx.subject()
        ),
    }
}

/// Constraints created by the schema migration and what they mean to a
/// caller.
pub fn default_rules() -> Vec<ConstraintRule> {
    use Action::{Create, Delete, Update};
    use ErrorKind::{Conflict, NotFound};

    vec![
        ConstraintRule::new(
            "users_email_key",
            &[],
            Conflict,
            "user with email {email} already exists",
        ),
        ConstraintRule::new(
            "users_user_name_key",
            &[],
            Conflict,
            "user with user_name {user_name} already exists",
        ),
        ConstraintRule::new(
            "plans_code_key",
            &[],
            Conflict,
            "plan with code {code} already exists",
        ),
        ConstraintRule::new(
            "baselines_code_review_key",
            &[],
            Conflict,
            "baseline with code {code} and review {review} already exists",
        ),
        ConstraintRule::new(
            "portfolios_baseline_id_plan_id_key",
            &[],
            Conflict,
            "portfolio for baseline {baseline_id} and plan {plan_id} already exists",
        ),
        ConstraintRule::new(
            "baselines_manager_id_fkey",
            &[Delete],
            Conflict,
            "cannot delete user id {id}: referenced as manager by a baseline",
        ),
        ConstraintRule::new(
            "baselines_estimator_id_fkey",
            &[Delete],
            Conflict,
            "cannot delete user id {id}: referenced as estimator by a baseline",
        ),
        ConstraintRule::new(
            "baselines_manager_id_fkey",
            &[Create, Update],
            NotFound,
            "manager with id {manager_id} not found",
        ),
        ConstraintRule::new(
            "baselines_estimator_id_fkey",
            &[Create, Update],
            NotFound,
            "estimator with id {estimator_id} not found",
        ),
        ConstraintRule::new(
            "costs_baseline_id_fkey",
            &[Delete],
            Conflict,
            "cannot delete baseline id {id}: referenced by costs",
        ),
        ConstraintRule::new(
            "costs_baseline_id_fkey",
            &[Create],
            NotFound,
            "baseline with id {baseline_id} not found",
        ),
        ConstraintRule::new(
            "portfolios_baseline_id_fkey",
            &[Delete],
            Conflict,
            "cannot delete baseline id {id}: referenced by a portfolio",
        ),
        ConstraintRule::new(
            "portfolios_baseline_id_fkey",
            &[Create],
            NotFound,
            "baseline with id {baseline_id} not found",
        ),
        ConstraintRule::new(
            "portfolios_plan_id_fkey",
            &[Delete],
            Conflict,
            "cannot delete plan id {id}: referenced by a portfolio",
        ),
        ConstraintRule::new(
            "portfolios_plan_id_fkey",
            &[Create, Update],
            NotFound,
            "plan with id {plan_id} not found",
        ),
        ConstraintRule::new(
            "budgets_cost_id_fkey",
            &[Delete],
            Conflict,
            "cannot delete cost id {id}: referenced by a budget",
        ),
        ConstraintRule::new(
            "budgets_cost_id_fkey",
            &[Create],
            NotFound,
            "cost with id {cost_id} not found",
        ),
        ConstraintRule::new(
            "budgets_portfolio_id_fkey",
            &[Create],
            NotFound,
            "portfolio with id {portfolio_id} not found",
        ),
    ]
}
