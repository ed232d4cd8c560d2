//! Estimation schema.
//!
//! - `users`: managers and estimators
//! - `plans`: yearly inflation and exchange assumptions
//! - `baselines`: reviewed project estimates, owned by a manager and an estimator
//! - `costs` / `cost_allocations`: baseline line items and their monthly schedule
//! - `portfolios`: a baseline priced against a plan
//! - `budgets` / `budget_allocations`: the share of a cost assigned to a portfolio
//!
//! Unique indexes and foreign keys carry explicit names; the engine's error
//! classifier matches on them.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    UserId,
    Email,
    UserName,
    Name,
    UserType,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Plans {
    Table,
    PlanId,
    Code,
    Name,
    Assumptions,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Baselines {
    Table,
    BaselineId,
    Code,
    Review,
    Title,
    Description,
    StartDate,
    Duration,
    ManagerId,
    EstimatorId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Costs {
    Table,
    CostId,
    BaselineId,
    CostType,
    Description,
    Comment,
    Amount,
    Currency,
    Tax,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CostAllocations {
    Table,
    CostAllocationId,
    CostId,
    AllocationDate,
    Position,
    Amount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Portfolios {
    Table,
    PortfolioId,
    BaselineId,
    PlanId,
    StartDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Budgets {
    Table,
    BudgetId,
    PortfolioId,
    CostId,
    Amount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum BudgetAllocations {
    Table,
    BudgetAllocationId,
    BudgetId,
    AllocationDate,
    Position,
    Amount,
    CreatedAt,
    UpdatedAt,
}

fn created_at<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn updated_at<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column).timestamp_with_time_zone().to_owned()
}

fn id<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .string()
        .not_null()
        .primary_key()
        .to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut id(Users::UserId))
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::UserName).string().not_null())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::UserType).string().not_null())
                    .col(&mut created_at(Users::CreatedAt))
                    .col(&mut updated_at(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("users_email_key")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("users_user_name_key")
                    .table(Users::Table)
                    .col(Users::UserName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Plans
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Plans::Table)
                    .if_not_exists()
                    .col(&mut id(Plans::PlanId))
                    .col(ColumnDef::new(Plans::Code).string().not_null())
                    .col(ColumnDef::new(Plans::Name).string().not_null())
                    .col(ColumnDef::new(Plans::Assumptions).json().not_null())
                    .col(&mut created_at(Plans::CreatedAt))
                    .col(&mut updated_at(Plans::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("plans_code_key")
                    .table(Plans::Table)
                    .col(Plans::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Baselines
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Baselines::Table)
                    .if_not_exists()
                    .col(&mut id(Baselines::BaselineId))
                    .col(ColumnDef::new(Baselines::Code).string().not_null())
                    .col(ColumnDef::new(Baselines::Review).integer().not_null())
                    .col(ColumnDef::new(Baselines::Title).string().not_null())
                    .col(ColumnDef::new(Baselines::Description).string())
                    .col(ColumnDef::new(Baselines::StartDate).date().not_null())
                    .col(ColumnDef::new(Baselines::Duration).integer().not_null())
                    .col(ColumnDef::new(Baselines::ManagerId).string().not_null())
                    .col(ColumnDef::new(Baselines::EstimatorId).string().not_null())
                    .col(&mut created_at(Baselines::CreatedAt))
                    .col(&mut updated_at(Baselines::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("baselines_manager_id_fkey")
                            .from(Baselines::Table, Baselines::ManagerId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("baselines_estimator_id_fkey")
                            .from(Baselines::Table, Baselines::EstimatorId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("baselines_code_review_key")
                    .table(Baselines::Table)
                    .col(Baselines::Code)
                    .col(Baselines::Review)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Costs
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Costs::Table)
                    .if_not_exists()
                    .col(&mut id(Costs::CostId))
                    .col(ColumnDef::new(Costs::BaselineId).string().not_null())
                    .col(ColumnDef::new(Costs::CostType).string().not_null())
                    .col(ColumnDef::new(Costs::Description).string().not_null())
                    .col(ColumnDef::new(Costs::Comment).string())
                    .col(ColumnDef::new(Costs::Amount).double().not_null())
                    .col(ColumnDef::new(Costs::Currency).string().not_null())
                    .col(ColumnDef::new(Costs::Tax).double().not_null().default(0.0))
                    .col(&mut created_at(Costs::CreatedAt))
                    .col(&mut updated_at(Costs::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("costs_baseline_id_fkey")
                            .from(Costs::Table, Costs::BaselineId)
                            .to(Baselines::Table, Baselines::BaselineId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-costs-baseline_id")
                    .table(Costs::Table)
                    .col(Costs::BaselineId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CostAllocations::Table)
                    .if_not_exists()
                    .col(&mut id(CostAllocations::CostAllocationId))
                    .col(ColumnDef::new(CostAllocations::CostId).string().not_null())
                    .col(
                        ColumnDef::new(CostAllocations::AllocationDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CostAllocations::Position).integer().not_null())
                    .col(ColumnDef::new(CostAllocations::Amount).double().not_null())
                    .col(&mut created_at(CostAllocations::CreatedAt))
                    .col(&mut updated_at(CostAllocations::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("cost_allocations_cost_id_fkey")
                            .from(CostAllocations::Table, CostAllocations::CostId)
                            .to(Costs::Table, Costs::CostId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cost_allocations-cost_id")
                    .table(CostAllocations::Table)
                    .col(CostAllocations::CostId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Portfolios
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Portfolios::Table)
                    .if_not_exists()
                    .col(&mut id(Portfolios::PortfolioId))
                    .col(ColumnDef::new(Portfolios::BaselineId).string().not_null())
                    .col(ColumnDef::new(Portfolios::PlanId).string().not_null())
                    .col(ColumnDef::new(Portfolios::StartDate).date().not_null())
                    .col(&mut created_at(Portfolios::CreatedAt))
                    .col(&mut updated_at(Portfolios::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("portfolios_baseline_id_fkey")
                            .from(Portfolios::Table, Portfolios::BaselineId)
                            .to(Baselines::Table, Baselines::BaselineId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("portfolios_plan_id_fkey")
                            .from(Portfolios::Table, Portfolios::PlanId)
                            .to(Plans::Table, Plans::PlanId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("portfolios_baseline_id_plan_id_key")
                    .table(Portfolios::Table)
                    .col(Portfolios::BaselineId)
                    .col(Portfolios::PlanId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Budgets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(&mut id(Budgets::BudgetId))
                    .col(ColumnDef::new(Budgets::PortfolioId).string().not_null())
                    .col(ColumnDef::new(Budgets::CostId).string().not_null())
                    .col(ColumnDef::new(Budgets::Amount).double().not_null())
                    .col(&mut created_at(Budgets::CreatedAt))
                    .col(&mut updated_at(Budgets::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("budgets_portfolio_id_fkey")
                            .from(Budgets::Table, Budgets::PortfolioId)
                            .to(Portfolios::Table, Portfolios::PortfolioId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("budgets_cost_id_fkey")
                            .from(Budgets::Table, Budgets::CostId)
                            .to(Costs::Table, Costs::CostId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budgets-portfolio_id")
                    .table(Budgets::Table)
                    .col(Budgets::PortfolioId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BudgetAllocations::Table)
                    .if_not_exists()
                    .col(&mut id(BudgetAllocations::BudgetAllocationId))
                    .col(ColumnDef::new(BudgetAllocations::BudgetId).string().not_null())
                    .col(
                        ColumnDef::new(BudgetAllocations::AllocationDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BudgetAllocations::Position).integer().not_null())
                    .col(ColumnDef::new(BudgetAllocations::Amount).double().not_null())
                    .col(&mut created_at(BudgetAllocations::CreatedAt))
                    .col(&mut updated_at(BudgetAllocations::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("budget_allocations_budget_id_fkey")
                            .from(BudgetAllocations::Table, BudgetAllocations::BudgetId)
                            .to(Budgets::Table, Budgets::BudgetId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_allocations-budget_id")
                    .table(BudgetAllocations::Table)
                    .col(BudgetAllocations::BudgetId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(BudgetAllocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Portfolios::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CostAllocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Costs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Baselines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Plans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
