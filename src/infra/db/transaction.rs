//! Scoped write transactions.
//!
//! Every repository write runs inside [`in_transaction`]: the closure's work is
//! committed on success and rolled back on any failure. The failure is handed
//! back untranslated so the caller maps it to a domain error only after the
//! rollback has happened. A transaction dropped mid-flight (cancelled future)
//! is rolled back by SeaORM.

use std::future::Future;
use std::pin::Pin;

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

use crate::errors::AppError;

/// Why a write did not commit.
#[derive(Debug)]
pub(crate) enum WriteFailure {
    /// Raw storage failure; translated by the owning repository
    Store(DbErr),
    /// Stored version moved on since the caller read the row
    Stale { expected_version: i32, actual_version: Option<i32> },
    /// Business-level refusal decided inside the transaction (e.g. missing row)
    Rejected(AppError),
}

impl From<DbErr> for WriteFailure {
    fn from(err: DbErr) -> Self {
        WriteFailure::Store(err)
    }
}

impl From<AppError> for WriteFailure {
    fn from(err: AppError) -> Self {
        WriteFailure::Rejected(err)
    }
}

pub(crate) type TxFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, WriteFailure>> + Send + 'a>>;

/// Run `work` in a transaction; commit on `Ok`, roll back on `Err`.
pub(crate) async fn in_transaction<F, T>(db: &DatabaseConnection, work: F) -> Result<T, WriteFailure>
where
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> TxFuture<'a, T> + Send,
    T: Send,
{
    let txn = db.begin().await?;
    let outcome = work(&txn).await;

    match outcome {
        Ok(result) => {
            txn.commit().await?;
            Ok(result)
        }
        Err(failure) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Transaction rollback failed: {}", rollback_err);
            }
            Err(failure)
        }
    }
}
