//! Append-only ordered key-value persistence for price snapshots.
//!
//! Snapshot records live under `prices:<timestamp>` keys with the timestamp
//! zero-padded to a fixed width, so lexicographic key order equals numeric
//! timestamp order for every representable `i64`. A single well-known
//! `latest` key holds a pointer to the most recently written record.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Schema, Set, TransactionTrait,
};
use serde_json::Value;

use crate::entities::records;

/// Well-known key of the pointer to the most recent snapshot record.
pub const LATEST_KEY: &str = "latest";

/// Key prefix under which snapshot records are stored.
pub const SNAPSHOT_KEY_PREFIX: &str = "prices:";

/// Builds the record key for a snapshot taken at `timestamp` (ms). The
/// timestamp is zero-padded to 20 digits, wide enough for any non-negative
/// `i64`.
pub fn snapshot_key(timestamp: i64) -> String {
    format!("{SNAPSHOT_KEY_PREFIX}{timestamp:020}")
}

/// Decodes the timestamp back out of a snapshot key. Returns `None` for
/// keys outside the snapshot prefix (such as `latest`).
pub fn parse_snapshot_key(key: &str) -> Option<i64> {
    key.strip_prefix(SNAPSHOT_KEY_PREFIX)?.parse().ok()
}

/// Creates the backing table if it does not exist yet.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut records_stmt = schema.create_table_from_entity(records::Entity);
    records_stmt.if_not_exists();
    db.execute(backend.build(&records_stmt)).await?;

    Ok(())
}

/// Ordered key-value store with point reads, transactional multi-key writes
/// and inclusive ascending range scans.
#[derive(Clone)]
pub struct TimeSeriesStore {
    db: DatabaseConnection,
}

impl TimeSeriesStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn put(&self, key: String, value: Value) -> Result<(), DbErr> {
        records::Entity::insert(records::ActiveModel {
            key: Set(key),
            value: Set(value),
        })
        .on_conflict(
            OnConflict::column(records::Column::Key)
                .update_column(records::Column::Value)
                .to_owned(),
        )
        .exec(&self.db)
        .await?;

        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Option<Value>, DbErr> {
        let record = records::Entity::find_by_id(key.to_string())
            .one(&self.db)
            .await?;

        Ok(record.map(|record| record.value))
    }

    /// Applies every write inside one database transaction: either all ops
    /// are durably applied or none is. Used to write a snapshot record and
    /// advance the `latest` pointer together.
    pub async fn batch_write(&self, ops: Vec<(String, Value)>) -> Result<(), DbErr> {
        let txn = self.db.begin().await?;

        for (key, value) in ops {
            records::Entity::insert(records::ActiveModel {
                key: Set(key),
                value: Set(value),
            })
            .on_conflict(
                OnConflict::column(records::Column::Key)
                    .update_column(records::Column::Value)
                    .to_owned(),
            )
            .exec(&txn)
            .await?;
        }

        txn.commit().await
    }

    /// Returns all records with `from_key <= key <= to_key` in ascending key
    /// order.
    pub async fn scan_range(
        &self,
        from_key: &str,
        to_key: &str,
    ) -> Result<Vec<(String, Value)>, DbErr> {
        let rows = records::Entity::find()
            .filter(records::Column::Key.gte(from_key))
            .filter(records::Column::Key.lte(to_key))
            .order_by_asc(records::Column::Key)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }
}
