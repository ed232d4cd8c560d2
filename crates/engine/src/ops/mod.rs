use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    Allocation, ClassifierSettings, EngineError, ErrorClassifier, OperationContext, ResultEngine,
    StorageError,
};

mod baselines;
mod budgets;
mod costs;
mod plans;
mod portfolios;
mod users;

/// Result of the storage-facing half of an operation, before classification.
type ResultStorage<T> = Result<T, StorageError>;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Service entry point. Every public operation reads or writes storage,
/// classifies any failure with the configured [`ErrorClassifier`] and returns
/// wire records.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    classifier: ErrorClassifier,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn classify(&self, err: StorageError, ctx: &OperationContext) -> EngineError {
        self.classifier.classify(err, ctx)
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn now() -> DateTimeUtc {
    Utc::now()
}

/// `Ok(())` when the row a write points at exists, else a foreign key
/// violation on `constraint`.
async fn require<E, C>(db: &C, id: &str, constraint: &str) -> ResultStorage<()>
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<String>,
    C: ConnectionTrait,
{
    match E::find_by_id(id.to_string()).one(db).await? {
        Some(_) => Ok(()),
        None => Err(StorageError::foreign_key(constraint)),
    }
}

/// Fails with a foreign key violation on `constraint` when any row of `E`
/// matches `filter`.
async fn refuse_if_referenced<E, C>(
    db: &C,
    filter: sea_orm::Condition,
    constraint: &str,
) -> ResultStorage<()>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    match E::find().filter(filter).one(db).await? {
        Some(_) => Err(StorageError::foreign_key(constraint)),
        None => Ok(()),
    }
}

/// Allocation rows in the order the caller gave them.
fn allocation_rows<T>(
    allocations: &[Allocation],
    build: impl Fn(&Allocation, i32, DateTimeUtc) -> T,
) -> Vec<T> {
    let created_at = now();
    allocations
        .iter()
        .zip(0..)
        .map(|(allocation, position)| build(allocation, position, created_at))
        .collect()
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    classifier: ErrorClassifier,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Replace the built-in constraint table.
    pub fn classifier(mut self, classifier: ErrorClassifier) -> EngineBuilder {
        self.classifier = classifier;
        self
    }

    /// Build the classifier from the `[classifier]` settings section.
    pub fn classifier_settings(self, settings: ClassifierSettings) -> EngineBuilder {
        self.classifier(ErrorClassifier::from_settings(settings))
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            classifier: self.classifier,
        })
    }
}
