//! Units of work against the subscription store.
//!
//! [`ConnectionProvider::execute`] hands the work a pooled connection;
//! [`ConnectionProvider::execute_tx`] wraps it in a transaction that commits on
//! `Ok` and rolls back on `Err`. A transaction dropped mid-flight (panic or
//! cancelled future) is rolled back by its own `Drop`. Pool connections are
//! returned on every exit path.

use crate::error::{AppError, AppResult};
use futures_util::future::BoxFuture;
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionError, TransactionTrait};
use std::future::Future;
use std::time::Duration;

#[derive(Clone)]
pub struct ConnectionProvider {
    db: DatabaseConnection,
}

impl ConnectionProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn execute<'a, F, Fut, T>(&'a self, work: F) -> AppResult<T>
    where
        F: FnOnce(&'a DatabaseConnection) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        work(&self.db).await
    }

    /// Errors returned by `work` come back unchanged; failures to begin or
    /// commit are reported as `DatabaseError` for `operation`.
    pub async fn execute_tx<F, T>(&self, operation: &'static str, work: F) -> AppResult<T>
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, AppResult<T>> + Send,
        T: Send,
    {
        self.db.transaction(work).await.map_err(|e| match e {
            TransactionError::Connection(source) => AppError::DatabaseError { operation, source },
            TransactionError::Transaction(err) => err,
        })
    }

    pub async fn ping(&self, timeout: Duration) -> AppResult<()> {
        match tokio::time::timeout(timeout, self.db.ping()).await {
            Ok(result) => result.map_err(AppError::database("health check")),
            Err(_) => Err(AppError::DatabaseError {
                operation: "health check",
                source: DbErr::Custom(format!("no answer within {timeout:?}")),
            }),
        }
    }
}
