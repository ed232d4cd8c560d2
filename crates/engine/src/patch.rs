//! Patch semantics for updates.
//!
//! An `Update*` command is merged onto the stored row it targets. The result
//! is a complete row: every field is either the patched value or the stored
//! one, the identifier always comes from the stored row, and `updated_at` is
//! the merge instant. An empty patch is still a write ("touch").

use chrono::{DateTime, Utc};

use crate::{
    baselines, budgets, costs, plans, portfolios, users, UpdateBaseline, UpdateBudget,
    UpdateCost, UpdatePlan, UpdatePortfolio, UpdateUser,
};

pub trait Merge {
    type Row: Clone;

    /// Merge onto `current` as of `now`.
    fn merge_at(self, current: &Self::Row, now: DateTime<Utc>) -> Self::Row;

    /// Merge onto `current`, stamping `updated_at` with the current time.
    fn merge(self, current: &Self::Row) -> Self::Row
    where
        Self: Sized,
    {
        self.merge_at(current, Utc::now())
    }
}

fn pick<T: Clone>(patch: Option<T>, current: &T) -> T {
    patch.unwrap_or_else(|| current.clone())
}

fn pick_nullable<T: Clone>(patch: Option<T>, current: &Option<T>) -> Option<T> {
    patch.or_else(|| current.clone())
}

impl Merge for UpdateUser {
    type Row = users::Model;

    fn merge_at(self, current: &users::Model, now: DateTime<Utc>) -> users::Model {
        users::Model {
            email: pick(self.email, &current.email),
            user_name: pick(self.user_name, &current.user_name),
            name: pick(self.name, &current.name),
            user_type: pick(self.user_type, &current.user_type),
            updated_at: Some(now),
            ..current.clone()
        }
    }
}

impl Merge for UpdatePlan {
    type Row = plans::Model;

    fn merge_at(self, current: &plans::Model, now: DateTime<Utc>) -> plans::Model {
        plans::Model {
            code: pick(self.code, &current.code),
            name: pick(self.name, &current.name),
            assumptions: self
                .assumptions
                .map(plans::Assumptions)
                .unwrap_or_else(|| current.assumptions.clone()),
            updated_at: Some(now),
            ..current.clone()
        }
    }
}

impl Merge for UpdateBaseline {
    type Row = baselines::Model;

    fn merge_at(self, current: &baselines::Model, now: DateTime<Utc>) -> baselines::Model {
        baselines::Model {
            code: pick(self.code, &current.code),
            review: pick(self.review, &current.review),
            title: pick(self.title, &current.title),
            description: pick_nullable(self.description, &current.description),
            start_date: pick(self.start_date, &current.start_date),
            duration: pick(self.duration, &current.duration),
            manager_id: pick(self.manager_id, &current.manager_id),
            estimator_id: pick(self.estimator_id, &current.estimator_id),
            updated_at: Some(now),
            ..current.clone()
        }
    }
}

/// Scalar fields only; a new allocation schedule is written separately.
impl Merge for UpdateCost {
    type Row = costs::Model;

    fn merge_at(self, current: &costs::Model, now: DateTime<Utc>) -> costs::Model {
        costs::Model {
            cost_type: pick(self.cost_type, &current.cost_type),
            description: pick(self.description, &current.description),
            comment: pick_nullable(self.comment, &current.comment),
            amount: pick(self.amount, &current.amount),
            currency: pick(self.currency, &current.currency),
            tax: pick(self.tax, &current.tax),
            updated_at: Some(now),
            ..current.clone()
        }
    }
}

impl Merge for UpdatePortfolio {
    type Row = portfolios::Model;

    fn merge_at(self, current: &portfolios::Model, now: DateTime<Utc>) -> portfolios::Model {
        portfolios::Model {
            plan_id: pick(self.plan_id, &current.plan_id),
            start_date: pick(self.start_date, &current.start_date),
            updated_at: Some(now),
            ..current.clone()
        }
    }
}

impl Merge for UpdateBudget {
    type Row = budgets::Model;

    fn merge_at(self, current: &budgets::Model, now: DateTime<Utc>) -> budgets::Model {
        budgets::Model {
            amount: pick(self.amount, &current.amount),
            updated_at: Some(now),
            ..current.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, TimeZone};

    use super::*;
    use crate::{Currency, costs::CostType, users::UserType};

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap()
    }

    fn stored_user() -> users::Model {
        users::Model {
            user_id: "u-1".to_string(),
            email: "a@x.com".to_string(),
            user_name: "alice".to_string(),
            name: "Alice".to_string(),
            user_type: UserType::Manager,
            created_at: created(),
            updated_at: None,
        }
    }

    #[test]
    fn present_fields_win_absent_fields_keep_stored_value() {
        let now = created() + Duration::days(1);
        let patch = UpdateUser {
            user_id: "u-1".to_string(),
            name: Some("Alice Doe".to_string()),
            user_type: Some(UserType::Estimator),
            ..Default::default()
        };

        let merged = patch.merge_at(&stored_user(), now);

        assert_eq!(merged.name, "Alice Doe");
        assert_eq!(merged.user_type, UserType::Estimator);
        assert_eq!(merged.email, "a@x.com");
        assert_eq!(merged.user_name, "alice");
        assert_eq!(merged.created_at, created());
        assert_eq!(merged.updated_at, Some(now));
    }

    #[test]
    fn identifier_comes_from_stored_row() {
        let patch = UpdateUser {
            user_id: "someone-else".to_string(),
            email: Some("b@x.com".to_string()),
            ..Default::default()
        };

        let merged = patch.merge(&stored_user());

        assert_eq!(merged.user_id, "u-1");
        assert_eq!(merged.email, "b@x.com");
    }

    #[test]
    fn empty_patch_is_a_touch() {
        let stored = users::Model {
            updated_at: Some(created()),
            ..stored_user()
        };
        let before = Utc::now();

        let merged = UpdateUser::default().merge(&stored);

        let updated_at = merged.updated_at.unwrap();
        assert!(updated_at >= before);
        assert!(updated_at > created());
        assert_eq!(
            users::Model {
                updated_at: stored.updated_at,
                ..merged
            },
            stored
        );
    }

    #[test]
    fn nullable_fields_keep_stored_value_when_absent() {
        let stored = baselines::Model {
            baseline_id: "b-1".to_string(),
            code: "BL01".to_string(),
            review: 1,
            title: "Billing".to_string(),
            description: Some("first cut".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            duration: 12,
            manager_id: "u-1".to_string(),
            estimator_id: "u-2".to_string(),
            created_at: created(),
            updated_at: None,
        };
        let patch = UpdateBaseline {
            baseline_id: "b-1".to_string(),
            review: Some(2),
            ..Default::default()
        };

        let merged = patch.merge(&stored);

        assert_eq!(merged.review, 2);
        assert_eq!(merged.description.as_deref(), Some("first cut"));
        assert_eq!(merged.start_date, stored.start_date);
    }

    #[test]
    fn cost_patch_merges_amounts() {
        let stored = costs::Model {
            cost_id: "c-1".to_string(),
            baseline_id: "b-1".to_string(),
            cost_type: CostType::OneTime,
            description: "licenses".to_string(),
            comment: None,
            amount: 100.0,
            currency: Currency::Usd,
            tax: 0.0,
            created_at: created(),
            updated_at: None,
        };
        let patch = UpdateCost {
            cost_id: "c-1".to_string(),
            amount: Some(150.5),
            comment: Some("renegotiated".to_string()),
            ..Default::default()
        };

        let merged = patch.merge(&stored);

        assert_eq!(merged.amount, 150.5);
        assert_eq!(merged.comment.as_deref(), Some("renegotiated"));
        assert_eq!(merged.currency, Currency::Usd);
        assert_eq!(merged.baseline_id, "b-1");
    }
}
