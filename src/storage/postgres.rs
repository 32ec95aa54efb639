//! PostgreSQL archive session backed by a deadpool connection pool

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use deadpool_postgres::{Config as PgConfig, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::types::ToSql;
use tokio_postgres::NoTls;

use super::{ArchiveSession, Dialect, Param, QueryError, ResultSet, Value};
use crate::config::DatabaseConfig;

/// Session against the production PostgreSQL archive
///
/// Each query checks a client out of the pool and returns it when the query
/// completes, so no connection outlives a single call.
pub struct PostgresArchive {
    pool: Pool,
}

impl PostgresArchive {
    /// Create a pooled session from database configuration
    pub fn connect(config: &DatabaseConfig) -> Result<Self, QueryError> {
        let mut cfg = PgConfig::new();
        cfg.url = Some(config.postgres_url.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(deadpool_postgres::PoolConfig::new(config.pool_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| QueryError::Connection(format!("failed to create pool: {e}")))?;

        tracing::info!(pool_size = config.pool_size, "PostgreSQL archive pool created");
        Ok(Self { pool })
    }
}

fn to_sql_params(params: &[Param]) -> Vec<Box<dyn ToSql + Sync + Send>> {
    params
        .iter()
        .map(|p| -> Box<dyn ToSql + Sync + Send> {
            match p {
                Param::Int(v) => Box::new(*v),
                Param::Float(v) => Box::new(*v),
                Param::Text(v) => Box::new(v.clone()),
            }
        })
        .collect()
}

fn column_value(row: &tokio_postgres::Row, idx: usize) -> Result<Value, QueryError> {
    let column = &row.columns()[idx];
    let value = match column.type_().name() {
        "bool" => row.try_get::<_, Option<bool>>(idx)?.map(Value::Bool),
        "int2" => row.try_get::<_, Option<i16>>(idx)?.map(|v| Value::Int(v.into())),
        "int4" => row.try_get::<_, Option<i32>>(idx)?.map(|v| Value::Int(v.into())),
        "int8" => row.try_get::<_, Option<i64>>(idx)?.map(Value::Int),
        "float4" => row
            .try_get::<_, Option<f32>>(idx)?
            .map(|v| Value::Float(v.into())),
        "float8" => row.try_get::<_, Option<f64>>(idx)?.map(Value::Float),
        "text" | "varchar" | "bpchar" | "name" => {
            row.try_get::<_, Option<String>>(idx)?.map(Value::Text)
        }
        "bytea" => row.try_get::<_, Option<Vec<u8>>>(idx)?.map(Value::Bytes),
        "date" => row.try_get::<_, Option<NaiveDate>>(idx)?.map(Value::Date),
        "timestamp" => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(Value::Timestamp),
        "timestamptz" => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(|v| Value::Timestamp(v.naive_utc())),
        other => {
            return Err(QueryError::UnsupportedType {
                column: column.name().to_string(),
                type_name: other.to_string(),
            })
        }
    };
    Ok(value.unwrap_or(Value::Null))
}

#[async_trait]
impl ArchiveSession for PostgresArchive {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn query(&self, sql: &str, params: &[Param]) -> Result<ResultSet, QueryError> {
        let client = self.pool.get().await?;
        let boxed = to_sql_params(params);
        let refs: Vec<&(dyn ToSql + Sync)> = boxed
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let statement = client.prepare(sql).await?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let rows = client.query(&statement, &refs).await?;

        let mut result = ResultSet::new(columns);
        for row in &rows {
            let values = (0..row.len())
                .map(|idx| column_value(row, idx))
                .collect::<Result<Vec<_>, _>>()?;
            result.push(values);
        }

        tracing::debug!(rows = result.len(), "PostgreSQL query completed");
        Ok(result)
    }
}
