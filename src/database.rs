use diesel::sql_types::Integer;
use diesel::sqlite::SqliteConnection;
use diesel::{ExpressionMethods, QueryDsl, QueryableByName, SelectableHelper};
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, RunQueryDsl};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::path::Path;
use tracing::{debug, info};

use crate::domain::ComparisonResult;
use crate::error::IngestError;
use crate::models::{CompareResultModel, NewCompareResult};
use crate::schema::compare_results;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// SQLite connection driven from async code; blocking work runs on tokio's
/// blocking pool.
pub type DbConnection = SyncConnectionWrapper<SqliteConnection>;

#[derive(QueryableByName)]
struct Probe {
    #[diesel(sql_type = Integer)]
    #[allow(dead_code)]
    ok: i32,
}

/// Hands out one short-lived connection per storage operation and owns the
/// fixed-schema tables.
#[derive(Debug, Clone)]
pub struct DatabaseManager {
    database_url: String,
}

impl DatabaseManager {
    pub async fn new(database_url: &str) -> Result<Self, IngestError> {
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = Self {
            database_url: database_url.to_string(),
        };
        manager.run_migrations()?;

        info!("Database ready at {}", database_url);
        Ok(manager)
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn run_migrations(&self) -> Result<(), IngestError> {
        // diesel_migrations only drives synchronous connections
        let mut connection =
            <SqliteConnection as diesel::Connection>::establish(&self.database_url).map_err(
                |e| IngestError::Storage {
                    message: format!("Failed to establish connection for migrations: {}", e),
                },
            )?;

        let applied = connection
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| IngestError::Storage {
                message: format!("Failed to run migrations: {}", e),
            })?;

        debug!("Applied {} pending migrations", applied.len());
        Ok(())
    }

    pub async fn connect(&self) -> Result<DbConnection, IngestError> {
        Ok(DbConnection::establish(&self.database_url).await?)
    }

    pub async fn record_comparison(
        &self,
        new_result: &NewCompareResult<'_>,
    ) -> Result<ComparisonResult, IngestError> {
        let mut conn = self.connect().await?;

        let stored = diesel::insert_into(compare_results::table)
            .values(new_result)
            .returning(CompareResultModel::as_returning())
            .get_result::<CompareResultModel>(&mut conn)
            .await
            .map_err(|e| IngestError::Storage {
                message: format!("Failed to insert comparison result: {}", e),
            })?;

        info!(
            "Recorded comparison result {} ({})",
            stored.id, stored.validation_status
        );
        Ok(stored.into())
    }

    /// Comparison results, newest first.
    pub async fn list_comparisons(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<ComparisonResult>, IngestError> {
        let mut conn = self.connect().await?;

        let mut query = compare_results::table
            .select(CompareResultModel::as_select())
            .order(compare_results::id.desc())
            .into_boxed();
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let results = query
            .load::<CompareResultModel>(&mut conn)
            .await
            .map_err(|e| IngestError::Storage {
                message: format!("Failed to fetch comparison results: {}", e),
            })?;

        Ok(results.into_iter().map(|r| r.into()).collect())
    }

    pub async fn health_check(&self) -> Result<(), IngestError> {
        let mut conn = self.connect().await?;
        diesel::sql_query("SELECT 1 AS ok")
            .load::<Probe>(&mut conn)
            .await?;
        Ok(())
    }
}
