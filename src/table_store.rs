//! Tables whose column set is only known at runtime.
//!
//! Every table gets an `Id INTEGER PRIMARY KEY AUTOINCREMENT` column followed
//! by one `TEXT` column per entry of the column list it was created with. The
//! same ordered column list drives both the DDL and the parameterized insert.

use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{BigInt, Integer, Nullable, Text};
use diesel::sqlite::Sqlite;
use diesel::QueryableByName;
use diesel_async::{AsyncConnection, RunQueryDsl};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::database::DatabaseManager;
use crate::error::IngestError;
use crate::ingest::{is_structurally_empty, TabularRow};

pub const IDENTITY_COLUMN: &str = "Id";

#[derive(QueryableByName)]
struct TableCount {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[derive(QueryableByName)]
struct ColumnInfoRow {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName)]
struct CellRow {
    #[diesel(sql_type = Integer)]
    id: i32,
    #[diesel(sql_type = Nullable<Text>)]
    value: Option<String>,
}

/// Double-quotes an identifier, doubling any embedded quote.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn create_table_sql(name: &str, columns: &[String]) -> String {
    let mut definitions = vec![format!(
        "{} INTEGER PRIMARY KEY AUTOINCREMENT",
        IDENTITY_COLUMN
    )];
    definitions.extend(
        columns
            .iter()
            .map(|column| format!("{} TEXT", quote_identifier(column))),
    );

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_identifier(name),
        definitions.join(", ")
    )
}

pub fn insert_sql(name: &str, columns: &[String]) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(name),
        column_list,
        placeholders
    )
}

#[derive(Debug, Clone)]
pub struct DynamicTableStore {
    database: DatabaseManager,
}

impl DynamicTableStore {
    pub fn new(database: DatabaseManager) -> Self {
        Self { database }
    }

    /// Creates `name` unless it already exists.
    pub async fn ensure_table(&self, name: &str, columns: &[String]) -> Result<(), IngestError> {
        let mut conn = self.database.connect().await?;

        diesel::sql_query(create_table_sql(name, columns))
            .execute(&mut conn)
            .await
            .map_err(|e| IngestError::Storage {
                message: format!("Failed to create table {}: {}", name, e),
            })?;

        debug!("Ensured table {} with {} columns", name, columns.len());
        Ok(())
    }

    /// Appends `rows` to `name` in order, skipping structurally empty rows.
    /// Returns the number of rows written.
    pub async fn insert_rows(
        &self,
        name: &str,
        columns: &[String],
        rows: &[TabularRow],
    ) -> Result<usize, IngestError> {
        let pending: Vec<Vec<Option<String>>> = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| row.get(column).cloned().flatten())
                    .collect::<Vec<_>>()
            })
            .filter(|values| !is_structurally_empty(values))
            .collect();

        let skipped = rows.len() - pending.len();
        if skipped > 0 {
            debug!("Skipping {} empty rows for table {}", skipped, name);
        }
        if pending.is_empty() {
            return Ok(0);
        }

        let inserted = pending.len();
        let sql = insert_sql(name, columns);
        let mut conn = self.database.connect().await?;

        conn.transaction::<_, IngestError, _>(|conn| {
            Box::pin(async move {
                for values in pending {
                    let mut query: BoxedSqlQuery<'static, Sqlite, SqlQuery> =
                        diesel::sql_query(sql.clone()).into_boxed();
                    for value in values {
                        query = query.bind::<Nullable<Text>, _>(value);
                    }
                    query.execute(conn).await?;
                }
                Ok(())
            })
        })
        .await
        .map_err(|e| match e {
            IngestError::Storage { message } => IngestError::Storage {
                message: format!("Failed to insert rows into {}: {}", name, message),
            },
            other => other,
        })?;

        info!("Inserted {} rows into {}", inserted, name);
        Ok(inserted)
    }

    /// Inspection helper: whether `name` exists. The pipeline never calls
    /// this; it is for checking what a run left behind.
    pub async fn table_exists(&self, name: &str) -> Result<bool, IngestError> {
        let mut conn = self.database.connect().await?;

        let counts = diesel::sql_query(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind::<Text, _>(name.to_string())
        .load::<TableCount>(&mut conn)
        .await?;

        Ok(counts.into_iter().next().map_or(false, |c| c.count > 0))
    }

    /// Inspection helper: declared columns of `name` in definition order,
    /// without the identity column.
    pub async fn table_columns(&self, name: &str) -> Result<Vec<String>, IngestError> {
        let mut conn = self.database.connect().await?;

        let columns = diesel::sql_query("SELECT name FROM pragma_table_info(?) ORDER BY cid")
            .bind::<Text, _>(name.to_string())
            .load::<ColumnInfoRow>(&mut conn)
            .await?;

        Ok(columns
            .into_iter()
            .map(|c| c.name)
            .filter(|c| c != IDENTITY_COLUMN)
            .collect())
    }

    /// Inspection helper: reads every row of `name` back in insertion order.
    /// NULL cells come back as `None`.
    ///
    /// Issues one query per column plus one for the ids, since
    /// `QueryableByName` needs a fixed row shape. Not meant for bulk reads.
    pub async fn read_rows(
        &self,
        name: &str,
        columns: &[String],
    ) -> Result<Vec<TabularRow>, IngestError> {
        let mut conn = self.database.connect().await?;
        let mut rows: BTreeMap<i32, TabularRow> = BTreeMap::new();

        let ids = diesel::sql_query(format!(
            "SELECT {id} AS id, NULL AS value FROM {table} ORDER BY {id}",
            id = IDENTITY_COLUMN,
            table = quote_identifier(name)
        ))
        .load::<CellRow>(&mut conn)
        .await?;
        for cell in ids {
            rows.insert(cell.id, TabularRow::new());
        }

        for column in columns {
            let cells = diesel::sql_query(format!(
                "SELECT {id} AS id, {column} AS value FROM {table} ORDER BY {id}",
                id = IDENTITY_COLUMN,
                column = quote_identifier(column),
                table = quote_identifier(name)
            ))
            .load::<CellRow>(&mut conn)
            .await?;

            for cell in cells {
                rows.entry(cell.id)
                    .or_default()
                    .insert(column.clone(), cell.value);
            }
        }

        Ok(rows.into_values().collect())
    }
}
