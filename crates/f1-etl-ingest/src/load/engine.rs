//! Connected database engine over the supported backends

use super::ddl::{insert_prefix, truncate_sql, TableDef};
use crate::config::{DatabaseBackend, DatabaseConfig, DatabaseTarget};
use crate::dataset::Dataset;
use crate::error::DatabaseError;
use crate::transform::FieldValue;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::QueryBuilder;
use std::str::FromStr;
use tracing::{debug, info};

/// A connection pool for one of the supported backends
#[derive(Debug, Clone)]
pub enum Engine {
    Postgres(PgPool),
    MySql(MySqlPool),
    Sqlite(SqlitePool),
}

/// Run the same expression against whichever pool is connected
macro_rules! with_pool {
    ($engine:expr, $pool:ident => $body:expr) => {
        match $engine {
            Engine::Postgres($pool) => $body,
            Engine::MySql($pool) => $body,
            Engine::Sqlite($pool) => $body,
        }
    };
}

/// Insert `$rows` into `$dataset` inside one transaction, `$chunk` rows per statement
macro_rules! insert_in_transaction {
    ($pool:expr, $db:ty, $backend:expr, $dataset:expr, $rows:expr, $chunk:expr) => {{
        let operation = format!("insert into {}", $dataset);
        let mut tx = $pool
            .begin()
            .await
            .map_err(|e| DatabaseError::statement(&operation, e))?;
        let prefix = insert_prefix($backend, $dataset);
        let mut inserted = 0u64;

        for chunk in $rows.chunks($chunk) {
            let mut query_builder: QueryBuilder<$db> = QueryBuilder::new(prefix.as_str());
            query_builder.push_values(chunk, |mut b, row| {
                for value in row {
                    match value {
                        FieldValue::Int(n) => b.push_bind(*n),
                        FieldValue::Text(s) => b.push_bind(s.clone()),
                        FieldValue::Date(d) => b.push_bind(*d),
                        FieldValue::Time(t) => b.push_bind(*t),
                    };
                }
            });

            let result = query_builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| DatabaseError::statement(&operation, e))?;
            inserted += result.rows_affected();
            debug!(table = %$dataset, rows = chunk.len(), "Inserted chunk");
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::statement(&operation, e))?;
        Ok(inserted)
    }};
}

impl Engine {
    /// Open a pool for the configured backend
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let backend = config.backend;
        let connection_error = |e: sqlx::Error| DatabaseError::connection(backend, e);

        let engine = match backend {
            DatabaseBackend::Postgres => {
                let options = match &config.target {
                    DatabaseTarget::Url(url) => PgConnectOptions::from_str(url).map_err(connection_error)?,
                    DatabaseTarget::Parts {
                        host,
                        port,
                        name,
                        user,
                        password,
                    } => {
                        let mut options = PgConnectOptions::new().host(host).port(*port).database(name);
                        if let Some(user) = user {
                            options = options.username(user);
                        }
                        if let Some(password) = password {
                            options = options.password(password);
                        }
                        options
                    },
                };
                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(config.connect_timeout())
                    .connect_with(options)
                    .await
                    .map_err(connection_error)?;
                Engine::Postgres(pool)
            },
            DatabaseBackend::MySql => {
                let options = match &config.target {
                    DatabaseTarget::Url(url) => MySqlConnectOptions::from_str(url).map_err(connection_error)?,
                    DatabaseTarget::Parts {
                        host,
                        port,
                        name,
                        user,
                        password,
                    } => {
                        let mut options = MySqlConnectOptions::new().host(host).port(*port).database(name);
                        if let Some(user) = user {
                            options = options.username(user);
                        }
                        if let Some(password) = password {
                            options = options.password(password);
                        }
                        options
                    },
                };
                let pool = MySqlPoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(config.connect_timeout())
                    .connect_with(options)
                    .await
                    .map_err(connection_error)?;
                Engine::MySql(pool)
            },
            DatabaseBackend::Sqlite => {
                let options = match &config.target {
                    DatabaseTarget::Url(url) => SqliteConnectOptions::from_str(url)
                        .map_err(connection_error)?
                        .create_if_missing(true),
                    DatabaseTarget::Parts { name, .. } => {
                        SqliteConnectOptions::new().filename(name).create_if_missing(true)
                    },
                };
                let pool = SqlitePoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(config.connect_timeout())
                    .connect_with(options.foreign_keys(true))
                    .await
                    .map_err(connection_error)?;
                Engine::Sqlite(pool)
            },
        };

        info!(
            backend = %backend,
            max_connections = config.max_connections,
            "Database connection pool created"
        );
        Ok(engine)
    }

    pub fn backend(&self) -> DatabaseBackend {
        match self {
            Engine::Postgres(_) => DatabaseBackend::Postgres,
            Engine::MySql(_) => DatabaseBackend::MySql,
            Engine::Sqlite(_) => DatabaseBackend::Sqlite,
        }
    }

    async fn execute(&self, sql: &str, operation: &str) -> Result<(), DatabaseError> {
        with_pool!(self, pool => sqlx::query(sql).execute(pool).await.map(|_| ()))
            .map_err(|e| DatabaseError::statement(operation, e))
    }

    /// Create the four destination tables if they do not exist yet
    pub async fn create_schema(&self) -> Result<(), DatabaseError> {
        let backend = self.backend();
        for dataset in Dataset::ALL {
            let sql = TableDef::for_dataset(dataset).create_sql(backend);
            self.execute(&sql, &format!("create table {}", dataset))
                .await?;
            debug!(table = %dataset, "Table ensured");
        }
        info!(backend = %backend, "Destination schema ready");
        Ok(())
    }

    /// Remove every row of `dataset`'s table
    pub async fn truncate(&self, dataset: Dataset) -> Result<(), DatabaseError> {
        let operation = format!("truncate {}", dataset);
        let sql = truncate_sql(self.backend(), dataset);

        match self {
            Engine::MySql(pool) => {
                // The session variable only applies to the connection it was set on
                let mut conn = pool
                    .acquire()
                    .await
                    .map_err(|e| DatabaseError::statement(&operation, e))?;

                sqlx::query("SET FOREIGN_KEY_CHECKS = 0")
                    .execute(&mut *conn)
                    .await
                    .map_err(|e| DatabaseError::statement(&operation, e))?;
                let truncated = sqlx::query(&sql).execute(&mut *conn).await;
                let restored = sqlx::query("SET FOREIGN_KEY_CHECKS = 1")
                    .execute(&mut *conn)
                    .await;

                truncated.map_err(|e| DatabaseError::statement(&operation, e))?;
                restored.map_err(|e| DatabaseError::statement("restore foreign key checks", e))?;
                Ok(())
            },
            _ => self.execute(&sql, &operation).await,
        }
    }

    /// Insert rows (values in [`Dataset::columns`] order) in one transaction
    ///
    /// Any failing chunk rolls back every chunk of this call.
    pub async fn insert_rows(
        &self,
        dataset: Dataset,
        rows: &[Vec<FieldValue>],
        chunk_size: usize,
    ) -> Result<u64, DatabaseError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let backend = self.backend();
        let chunk_size = chunk_size.max(1);
        match self {
            Engine::Postgres(pool) => {
                insert_in_transaction!(pool, sqlx::Postgres, backend, dataset, rows, chunk_size)
            },
            Engine::MySql(pool) => {
                insert_in_transaction!(pool, sqlx::MySql, backend, dataset, rows, chunk_size)
            },
            Engine::Sqlite(pool) => {
                insert_in_transaction!(pool, sqlx::Sqlite, backend, dataset, rows, chunk_size)
            },
        }
    }

    pub async fn count_rows(&self, dataset: Dataset) -> Result<i64, DatabaseError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}",
            super::ddl::quote_ident(self.backend(), dataset.table_name())
        );
        with_pool!(self, pool => sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await)
            .map_err(|e| DatabaseError::statement(format!("count {}", dataset), e))
    }

    pub async fn close(&self) {
        with_pool!(self, pool => pool.close().await)
    }
}
