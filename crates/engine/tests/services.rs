use chrono::{DateTime, NaiveDate};
use sea_orm::{Database, DatabaseBackend, DbErr, MockDatabase, RuntimeErr};

use engine::{
    Allocation, Assumption, BudgetDraft, ClassifierSettings, CostType, Currency, CurrencyExchange,
    Engine, EngineError, ErrorKind, NewBaseline, NewBudget, NewCost, NewPlan, NewPortfolio,
    NewUser, UpdateBaseline, UpdateBudget, UpdateCost, UpdatePlan, UpdatePortfolio, UpdateUser,
    UserType, baselines,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn new_user(email: &str, user_name: &str, user_type: UserType) -> NewUser {
    NewUser {
        email: email.to_string(),
        user_name: user_name.to_string(),
        name: format!("{user_name} name"),
        user_type,
    }
}

/// A manager, an estimator and a baseline owned by them.
async fn baseline_fixture(engine: &Engine) -> (String, String, String) {
    let manager = engine
        .create_user(new_user("m@x.com", "manager", UserType::Manager))
        .await
        .unwrap();
    let estimator = engine
        .create_user(new_user("e@x.com", "estimator", UserType::Estimator))
        .await
        .unwrap();
    let baseline = engine
        .create_baseline(NewBaseline {
            code: "BL01".to_string(),
            title: "Billing platform".to_string(),
            description: Some("first estimate".to_string()),
            start_date: date(2024, 1, 1),
            duration: 12,
            manager_id: manager.user_id.clone(),
            estimator_id: estimator.user_id.clone(),
        })
        .await
        .unwrap();
    (manager.user_id, estimator.user_id, baseline.baseline_id)
}

fn new_plan(code: &str) -> NewPlan {
    NewPlan {
        code: code.to_string(),
        name: format!("Plan {code}"),
        assumptions: vec![Assumption {
            year: 2024,
            inflation: 4.5,
            currencies: vec![CurrencyExchange {
                currency: Currency::Usd,
                exchange: 5.1,
            }],
        }],
    }
}

fn new_cost(baseline_id: &str) -> NewCost {
    NewCost {
        baseline_id: baseline_id.to_string(),
        cost_type: CostType::OneTime,
        description: "licenses".to_string(),
        comment: None,
        amount: 150.0,
        currency: Currency::Usd,
        tax: 0.0,
        allocations: vec![
            Allocation::monthly(2024, 1, 100.0).unwrap(),
            Allocation::monthly(2024, 2, 50.0).unwrap(),
        ],
    }
}

#[tokio::test]
async fn duplicate_email_is_conflict_naming_the_email() {
    let engine = engine_with_db().await;
    engine
        .create_user(new_user("a@x.com", "alice", UserType::Manager))
        .await
        .unwrap();

    let err = engine
        .create_user(new_user("a@x.com", "another", UserType::Estimator))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("a@x.com"), "{err}");
}

#[tokio::test]
async fn duplicate_user_name_is_caught_by_the_unique_index() {
    let engine = engine_with_db().await;
    engine
        .create_user(new_user("a@x.com", "alice", UserType::Manager))
        .await
        .unwrap();

    let err = engine
        .create_user(new_user("b@x.com", "alice", UserType::Manager))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("alice"), "{err}");
    assert!(!err.to_string().contains("UNIQUE"), "{err}");
}

#[tokio::test]
async fn new_user_has_no_updated_at() {
    let engine = engine_with_db().await;

    let user = engine
        .create_user(new_user("a@x.com", "alice", UserType::Manager))
        .await
        .unwrap();

    assert!(user.created_at.is_some());
    let value = serde_json::to_value(&user).unwrap();
    assert!(value.get("updated_at").is_none());
    assert_eq!(value["user_type"], "manager");
}

#[tokio::test]
async fn update_with_only_name_keeps_other_fields() {
    let engine = engine_with_db().await;
    let created = engine
        .create_user(new_user("a@x.com", "alice", UserType::Manager))
        .await
        .unwrap();

    let updated = engine
        .update_user(UpdateUser {
            user_id: created.user_id.clone(),
            name: Some("Alice Doe".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.name, "Alice Doe");
    assert_eq!(updated.email, "a@x.com");
    assert_eq!(updated.user_name, "alice");
    assert_eq!(updated.user_type, api_types::UserType::Manager);
    let updated_at = updated.updated_at.unwrap();
    assert!(updated_at >= created.created_at.unwrap());

    let value = serde_json::to_value(&updated).unwrap();
    let rendered = value["updated_at"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(rendered).is_ok(), "{rendered}");
}

#[tokio::test]
async fn empty_patch_still_touches_the_row() {
    let engine = engine_with_db().await;
    let created = engine
        .create_user(new_user("a@x.com", "alice", UserType::Manager))
        .await
        .unwrap();

    let touched = engine
        .update_user(UpdateUser {
            user_id: created.user_id.clone(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(touched.updated_at.is_some());
    assert_eq!(touched.email, created.email);
}

#[tokio::test]
async fn updating_email_to_a_taken_one_is_conflict() {
    let engine = engine_with_db().await;
    engine
        .create_user(new_user("a@x.com", "alice", UserType::Manager))
        .await
        .unwrap();
    let bob = engine
        .create_user(new_user("b@x.com", "bob", UserType::Manager))
        .await
        .unwrap();

    let err = engine
        .update_user(UpdateUser {
            user_id: bob.user_id,
            email: Some("a@x.com".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::Conflict("user with email a@x.com already exists".to_string())
    );
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let engine = engine_with_db().await;

    let err = engine.get_user("nope").await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("user with id nope not found".to_string()));

    let err = engine
        .update_user(UpdateUser {
            user_id: "nope".to_string(),
            name: Some("x".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = engine.delete_user("nope").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn deleting_an_estimator_with_a_baseline_is_conflict_naming_baseline() {
    let engine = engine_with_db().await;
    let (_, estimator_id, _) = baseline_fixture(&engine).await;

    let err = engine.delete_user(&estimator_id).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("baseline"), "{err}");
    assert!(err.to_string().contains("estimator"), "{err}");
    assert!(engine.get_user(&estimator_id).await.is_ok());
}

#[tokio::test]
async fn estimator_fk_reported_by_postgres_is_classified() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<baselines::Model>::new(), Vec::new()])
        .append_exec_errors([DbErr::Exec(RuntimeErr::Internal(
            "update or delete on table \"users\" violates foreign key constraint \
             \"baselines_estimator_id_fkey\" on table \"baselines\""
                .to_string(),
        ))])
        .into_connection();
    let engine = Engine::builder().database(db).build().await.unwrap();

    let err = engine.delete_user("u-1").await.unwrap_err();

    assert_eq!(
        err,
        EngineError::Conflict(
            "cannot delete user id u-1: referenced as estimator by a baseline".to_string()
        )
    );
}

#[tokio::test]
async fn unexpected_delete_failure_is_internal_unless_configured() {
    let failing = || {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<baselines::Model>::new(), Vec::new()])
            .append_exec_errors([DbErr::Exec(RuntimeErr::Internal(
                "canceling statement due to lock timeout".to_string(),
            ))])
            .into_connection()
    };

    let engine = Engine::builder().database(failing()).build().await.unwrap();
    let err = engine.delete_user("u-1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(!err.to_string().contains("lock timeout"));

    let engine = Engine::builder()
        .database(failing())
        .classifier_settings(ClassifierSettings {
            unclassified_delete_as_conflict: true,
            constraints: Vec::new(),
        })
        .build()
        .await
        .unwrap();
    let err = engine.delete_user("u-1").await.unwrap_err();
    assert_eq!(err, EngineError::Conflict("cannot delete user id u-1".to_string()));
}

#[tokio::test]
async fn users_are_listed_by_name() {
    let engine = engine_with_db().await;
    engine
        .create_user(new_user("z@x.com", "zed", UserType::Estimator))
        .await
        .unwrap();
    engine
        .create_user(new_user("a@x.com", "amy", UserType::Manager))
        .await
        .unwrap();

    let list = engine.list_users().await.unwrap();

    let names: Vec<_> = list.users.iter().map(|u| u.user_name.as_str()).collect();
    assert_eq!(names, vec!["amy", "zed"]);
}

#[tokio::test]
async fn plan_crud() {
    let engine = engine_with_db().await;
    let plan = engine.create_plan(new_plan("PP2024")).await.unwrap();
    assert_eq!(plan.assumptions.len(), 1);

    let err = engine.create_plan(new_plan("PP2024")).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Conflict("plan with code PP2024 already exists".to_string())
    );

    let updated = engine
        .update_plan(UpdatePlan {
            plan_id: plan.plan_id.clone(),
            name: Some("Budget 2024".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.name, "Budget 2024");
    assert_eq!(updated.code, "PP2024");
    assert_eq!(updated.assumptions, plan.assumptions);

    engine.delete_plan(&plan.plan_id).await.unwrap();
    assert_eq!(
        engine.get_plan(&plan.plan_id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn baseline_carries_user_names() {
    let engine = engine_with_db().await;
    let (manager_id, _, baseline_id) = baseline_fixture(&engine).await;

    let baseline = engine.get_baseline(&baseline_id).await.unwrap();

    assert_eq!(baseline.review, 1);
    assert_eq!(baseline.manager_id.as_deref(), Some(manager_id.as_str()));
    assert_eq!(baseline.manager.as_deref(), Some("manager name"));
    assert_eq!(baseline.estimator.as_deref(), Some("estimator name"));
    let value = serde_json::to_value(&baseline).unwrap();
    assert_eq!(value["start_date"], "2024-01-01");
}

#[tokio::test]
async fn baseline_with_unknown_manager_is_not_found() {
    let engine = engine_with_db().await;
    let estimator = engine
        .create_user(new_user("e@x.com", "estimator", UserType::Estimator))
        .await
        .unwrap();

    let err = engine
        .create_baseline(NewBaseline {
            code: "BL01".to_string(),
            title: "Billing".to_string(),
            description: None,
            start_date: date(2024, 1, 1),
            duration: 12,
            manager_id: "ghost".to_string(),
            estimator_id: estimator.user_id,
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::NotFound("manager with id ghost not found".to_string())
    );
}

#[tokio::test]
async fn baseline_review_clash_names_code_and_review() {
    let engine = engine_with_db().await;
    let (manager_id, estimator_id, first) = baseline_fixture(&engine).await;
    let second = engine
        .create_baseline(NewBaseline {
            code: "BL02".to_string(),
            title: "Other".to_string(),
            description: None,
            start_date: date(2024, 1, 1),
            duration: 6,
            manager_id,
            estimator_id,
        })
        .await
        .unwrap();

    let err = engine
        .update_baseline(UpdateBaseline {
            baseline_id: second.baseline_id,
            code: Some("BL01".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::Conflict("baseline with code BL01 and review 1 already exists".to_string())
    );

    let bumped = engine
        .update_baseline(UpdateBaseline {
            baseline_id: first,
            review: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(bumped.review, 2);
    assert_eq!(bumped.description, "first estimate");
}

#[tokio::test]
async fn cost_keeps_its_allocation_schedule() {
    let engine = engine_with_db().await;
    let (_, _, baseline_id) = baseline_fixture(&engine).await;

    let cost = engine.create_cost(new_cost(&baseline_id)).await.unwrap();

    let value = serde_json::to_value(&cost).unwrap();
    assert!(value.get("updated_at").is_none());
    assert_eq!(
        value["cost_allocations"],
        serde_json::json!([
            {"year": 2024, "month": 1, "amount": 100.0},
            {"year": 2024, "month": 2, "amount": 50.0}
        ])
    );
    assert_eq!(value["comment"], "");

    let listed = engine.list_costs(&baseline_id).await.unwrap();
    assert_eq!(listed.costs.len(), 1);
    assert_eq!(listed.costs[0].cost_allocations.len(), 2);
}

#[tokio::test]
async fn cost_update_replaces_schedule_only_when_given() {
    let engine = engine_with_db().await;
    let (_, _, baseline_id) = baseline_fixture(&engine).await;
    let cost = engine.create_cost(new_cost(&baseline_id)).await.unwrap();

    let patched = engine
        .update_cost(UpdateCost {
            cost_id: cost.cost_id.clone(),
            amount: Some(200.0),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(patched.amount, 200.0);
    assert_eq!(patched.cost_allocations.len(), 2);

    let rescheduled = engine
        .update_cost(UpdateCost {
            cost_id: cost.cost_id.clone(),
            allocations: Some(vec![Allocation::monthly(2024, 3, 200.0).unwrap()]),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(rescheduled.cost_allocations.len(), 1);
    assert_eq!(rescheduled.cost_allocations[0].month, 3);
    assert_eq!(rescheduled.amount, 200.0);
}

fn schedule(entries: &[api_types::wire::Allocation]) -> Vec<(i32, u32, f64)> {
    entries
        .iter()
        .map(|entry| (entry.year, entry.month, entry.amount))
        .collect()
}

fn out_of_order() -> Vec<Allocation> {
    vec![
        Allocation::monthly(2025, 3, 10.0).unwrap(),
        Allocation::monthly(2024, 12, 20.0).unwrap(),
        Allocation::monthly(2024, 12, 5.0).unwrap(),
    ]
}

#[tokio::test]
async fn allocation_schedules_keep_the_order_they_were_given_in() {
    let engine = engine_with_db().await;
    let (_, _, baseline_id) = baseline_fixture(&engine).await;
    let expected = vec![(2025, 3, 10.0), (2024, 12, 20.0), (2024, 12, 5.0)];

    let cost = engine
        .create_cost(NewCost {
            allocations: out_of_order(),
            ..new_cost(&baseline_id)
        })
        .await
        .unwrap();
    assert_eq!(schedule(&cost.cost_allocations), expected);
    let fetched = engine.get_cost(&cost.cost_id).await.unwrap();
    assert_eq!(schedule(&fetched.cost_allocations), expected);

    let rescheduled = engine
        .update_cost(UpdateCost {
            cost_id: cost.cost_id.clone(),
            allocations: Some(out_of_order().into_iter().rev().collect()),
            ..Default::default()
        })
        .await
        .unwrap();
    let reversed: Vec<_> = expected.iter().rev().copied().collect();
    assert_eq!(schedule(&rescheduled.cost_allocations), reversed);
    let listed = engine.list_costs(&baseline_id).await.unwrap();
    assert_eq!(schedule(&listed.costs[0].cost_allocations), reversed);

    let plan = engine.create_plan(new_plan("PP2024")).await.unwrap();
    let portfolio = engine
        .create_portfolio(NewPortfolio {
            baseline_id: baseline_id.clone(),
            plan_id: plan.plan_id.clone(),
            start_date: date(2024, 1, 1),
            budgets: Vec::new(),
        })
        .await
        .unwrap();
    let budget = engine
        .create_budget(NewBudget {
            portfolio_id: portfolio.portfolio_id.clone(),
            draft: BudgetDraft {
                cost_id: cost.cost_id.clone(),
                amount: 35.0,
                allocations: out_of_order(),
            },
        })
        .await
        .unwrap();
    assert_eq!(schedule(&budget.budget_allocations), expected);
    let listed = engine.list_budgets(&portfolio.portfolio_id).await.unwrap();
    assert_eq!(schedule(&listed.budgets[0].budget_allocations), expected);
}

#[tokio::test]
async fn cost_for_unknown_baseline_is_not_found() {
    let engine = engine_with_db().await;

    let err = engine.create_cost(new_cost("ghost")).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::NotFound("baseline with id ghost not found".to_string())
    );

    let err = engine.list_costs("ghost").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn baseline_with_costs_cannot_be_deleted() {
    let engine = engine_with_db().await;
    let (_, _, baseline_id) = baseline_fixture(&engine).await;
    let cost = engine.create_cost(new_cost(&baseline_id)).await.unwrap();

    let err = engine.delete_baseline(&baseline_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("costs"), "{err}");

    engine.delete_cost(&cost.cost_id).await.unwrap();
    engine.delete_baseline(&baseline_id).await.unwrap();
}

#[tokio::test]
async fn portfolio_with_budgets_round_trip() {
    let engine = engine_with_db().await;
    let (_, _, baseline_id) = baseline_fixture(&engine).await;
    let plan = engine.create_plan(new_plan("PP2024")).await.unwrap();
    let cost = engine.create_cost(new_cost(&baseline_id)).await.unwrap();

    let portfolio = engine
        .create_portfolio(NewPortfolio {
            baseline_id: baseline_id.clone(),
            plan_id: plan.plan_id.clone(),
            start_date: date(2024, 6, 1),
            budgets: vec![BudgetDraft {
                cost_id: cost.cost_id.clone(),
                amount: 160.0,
                allocations: vec![Allocation::monthly(2024, 6, 160.0).unwrap()],
            }],
        })
        .await
        .unwrap();

    assert_eq!(portfolio.code, "BL01");
    assert_eq!(portfolio.plan_code, "PP2024");
    assert_eq!(portfolio.manager.as_deref(), Some("manager name"));
    assert_eq!(portfolio.budgets.len(), 1);
    assert_eq!(portfolio.budgets[0].cost_amount, 150.0);
    assert_eq!(portfolio.budgets[0].budget_allocations.len(), 1);

    let fetched = engine.get_portfolio(&portfolio.portfolio_id).await.unwrap();
    assert_eq!(fetched.budgets.len(), 1);

    let err = engine.delete_cost(&cost.cost_id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Conflict(format!(
            "cannot delete cost id {}: referenced by a budget",
            cost.cost_id
        ))
    );

    let err = engine.delete_plan(&plan.plan_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    engine.delete_portfolio(&portfolio.portfolio_id).await.unwrap();
    let err = engine.get_budget(&portfolio.budgets[0].budget_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    engine.delete_cost(&cost.cost_id).await.unwrap();
}

#[tokio::test]
async fn failed_budget_rolls_back_the_portfolio() {
    let engine = engine_with_db().await;
    let (_, _, baseline_id) = baseline_fixture(&engine).await;
    let plan = engine.create_plan(new_plan("PP2024")).await.unwrap();

    let err = engine
        .create_portfolio(NewPortfolio {
            baseline_id,
            plan_id: plan.plan_id,
            start_date: date(2024, 6, 1),
            budgets: vec![BudgetDraft {
                cost_id: "ghost".to_string(),
                amount: 1.0,
                allocations: Vec::new(),
            }],
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::NotFound("cost with id ghost not found".to_string())
    );
    assert!(engine.list_portfolios().await.unwrap().portfolios.is_empty());
}

#[tokio::test]
async fn second_portfolio_for_same_pair_is_conflict() {
    let engine = engine_with_db().await;
    let (_, _, baseline_id) = baseline_fixture(&engine).await;
    let plan = engine.create_plan(new_plan("PP2024")).await.unwrap();
    let portfolio = NewPortfolio {
        baseline_id: baseline_id.clone(),
        plan_id: plan.plan_id.clone(),
        start_date: date(2024, 6, 1),
        budgets: Vec::new(),
    };
    engine.create_portfolio(portfolio.clone()).await.unwrap();

    let err = engine.create_portfolio(portfolio).await.unwrap_err();

    assert_eq!(
        err,
        EngineError::Conflict(format!(
            "portfolio for baseline {baseline_id} and plan {} already exists",
            plan.plan_id
        ))
    );
}

#[tokio::test]
async fn portfolio_update_and_budget_crud() {
    let engine = engine_with_db().await;
    let (_, _, baseline_id) = baseline_fixture(&engine).await;
    let plan = engine.create_plan(new_plan("PP2024")).await.unwrap();
    let other_plan = engine.create_plan(new_plan("PP2025")).await.unwrap();
    let cost = engine.create_cost(new_cost(&baseline_id)).await.unwrap();
    let portfolio = engine
        .create_portfolio(NewPortfolio {
            baseline_id,
            plan_id: plan.plan_id,
            start_date: date(2024, 6, 1),
            budgets: Vec::new(),
        })
        .await
        .unwrap();
    assert!(portfolio.budgets.is_empty());

    let moved = engine
        .update_portfolio(UpdatePortfolio {
            portfolio_id: portfolio.portfolio_id.clone(),
            plan_id: Some(other_plan.plan_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(moved.plan_code, "PP2025");
    assert_eq!(moved.start_date, date(2024, 6, 1));
    assert!(moved.updated_at.is_some());

    let budget = engine
        .create_budget(NewBudget {
            portfolio_id: portfolio.portfolio_id.clone(),
            draft: BudgetDraft {
                cost_id: cost.cost_id.clone(),
                amount: 75.0,
                allocations: vec![
                    Allocation::monthly(2024, 7, 25.0).unwrap(),
                    Allocation::monthly(2024, 8, 50.0).unwrap(),
                ],
            },
        })
        .await
        .unwrap();
    assert_eq!(budget.description, "licenses");

    let updated = engine
        .update_budget(UpdateBudget {
            budget_id: budget.budget_id.clone(),
            amount: Some(80.0),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.amount, 80.0);
    assert_eq!(updated.budget_allocations.len(), 2);

    let listed = engine.list_budgets(&portfolio.portfolio_id).await.unwrap();
    assert_eq!(listed.budgets.len(), 1);

    engine.delete_budget(&budget.budget_id).await.unwrap();
    let err = engine.delete_budget(&budget.budget_id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::NotFound(format!("budget with id {} not found", budget.budget_id))
    );
}

#[tokio::test]
async fn budget_for_unknown_portfolio_is_not_found() {
    let engine = engine_with_db().await;

    let err = engine
        .create_budget(NewBudget {
            portfolio_id: "ghost".to_string(),
            draft: BudgetDraft {
                cost_id: "c".to_string(),
                amount: 1.0,
                allocations: Vec::new(),
            },
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::NotFound("portfolio with id ghost not found".to_string())
    );
}
