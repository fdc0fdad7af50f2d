use crate::config::DatabaseConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{NewVersion, Version};
use crate::repository::{VersionRepository, UNIQUE_ACTIVE_INDEX};
use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::Row;
use tracing::{error, info};

const SELECT_COLUMNS: &str = "id, version_number, active, created_at, updated_at";

/// PostgreSQL への接続プールを握るリポジトリ層。
/// Deadpool の `Pool` を内部に保持し、`VersionRepository` の各操作を SQL で実装する。
/// グローバル変数ではなく `main` で生成し、`Arc` 経由でサービス層に渡す。
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// 接続プールを構築し、起動時に疎通確認まで実施する。
    /// Deadpool は接続を遅延生成するため、`test_connection` でここで失敗させる。
    pub async fn new(config: DatabaseConfig) -> Result<Self, ApiError> {
        info!("Creating PostgreSQL connection pool for {}", config.describe());

        let pool = Self::create_pool(config)?;

        let db = Database { pool };
        db.test_connection().await?;

        Ok(db)
    }

    /// `tokio_postgres::Config` からプールを生成する内部関数。
    /// TLS コネクタは常に渡すが、`sslmode=disable` の場合は実際には使われない。
    fn create_pool(config: DatabaseConfig) -> Result<Pool, ApiError> {
        let tls_connector = TlsConnector::builder()
            .build()
            .map_err(|e| {
                error!("Failed to create TLS connector: {}", e);
                ApiError::Database(format!("TLS connector creation failed: {}", e))
            })?;
        let tls = MakeTlsConnector::new(tls_connector);

        let manager = Manager::from_config(
            config.pg_config,
            tls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(config.connection_timeout))
            .create_timeout(Some(config.connection_timeout))
            .build()
            .map_err(|e| {
                error!("Failed to create connection pool: {}", e);
                ApiError::Database(format!("Connection pool creation failed: {}", e))
            })
    }

    /// プールから接続を借りる小さなラッパー。
    async fn get_connection(&self) -> Result<Object, ApiError> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// `SELECT 1` を投げて DB が生きているか確認する。
    pub async fn test_connection(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[])
            .await
            .map_err(|e| {
                error!("Database connection test failed: {}", e);
                ApiError::from(e)
            })?;

        info!("Database connection test successful");
        Ok(())
    }

    /// `tokio_postgres::Row` から `Version` を組み立てる。列順は `SELECT_COLUMNS` に一致させること。
    fn row_to_version(row: &Row) -> Version {
        Version {
            id: row.get(0),
            version_number: row.get(1),
            active: row.get(2),
            created_at: row.get(3),
            updated_at: row.get(4),
        }
    }
}

#[async_trait]
impl VersionRepository for Database {
    /// テーブルが無ければ作成し、既存テーブルに足りない列があれば追加する。
    async fn ensure_schema(&self) -> ApiResult<()> {
        info!("Ensuring versions table schema");

        let client = self.get_connection().await?;

        let versions_table = r#"
            CREATE TABLE IF NOT EXISTS versions (
                id BIGSERIAL PRIMARY KEY,
                version_number TEXT NOT NULL,
                active BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        client.execute(versions_table, &[])
            .await
            .map_err(|e| {
                error!("Failed to create versions table: {}", e);
                ApiError::from(e)
            })?;

        // Bring tables created by an older build up to the current column set
        let missing_columns = [
            "ALTER TABLE versions ADD COLUMN IF NOT EXISTS version_number TEXT NOT NULL DEFAULT ''",
            "ALTER TABLE versions ADD COLUMN IF NOT EXISTS active BOOLEAN NOT NULL DEFAULT FALSE",
            "ALTER TABLE versions ADD COLUMN IF NOT EXISTS created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
            "ALTER TABLE versions ADD COLUMN IF NOT EXISTS updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
        ];

        for statement in missing_columns {
            client.execute(statement, &[])
                .await
                .map_err(|e| {
                    error!("Failed to update versions table ({}): {}", statement, e);
                    ApiError::from(e)
                })?;
        }

        Ok(())
    }

    async fn ensure_unique_active_constraint(&self) -> ApiResult<()> {
        let client = self.get_connection().await?;

        let index = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON versions (active) WHERE active = true",
            UNIQUE_ACTIVE_INDEX
        );

        client.execute(index.as_str(), &[]).await.map_err(ApiError::from)?;
        Ok(())
    }

    async fn count_active_versions(&self) -> ApiResult<i64> {
        let client = self.get_connection().await?;

        let row = client
            .query_one("SELECT COUNT(*) FROM versions WHERE active = $1", &[&true])
            .await
            .map_err(ApiError::from)?;

        Ok(row.get(0))
    }

    async fn insert_version(&self, version: NewVersion) -> ApiResult<Version> {
        let client = self.get_connection().await?;

        let query = format!(
            "INSERT INTO versions (version_number, active, created_at, updated_at) \
             VALUES ($1, $2, NOW(), NOW()) \
             RETURNING {}",
            SELECT_COLUMNS
        );

        let row = client
            .query_one(query.as_str(), &[&version.version_number, &version.active])
            .await
            .map_err(ApiError::from)?;

        let created = Self::row_to_version(&row);
        info!("Inserted version {} (id: {}, active: {})", created.version_number, created.id, created.active);
        Ok(created)
    }

    /// `ORDER BY id LIMIT 1` で最初のアクティブ行を取る。無ければ `None`。
    async fn find_active_version(&self) -> ApiResult<Option<Version>> {
        let client = self.get_connection().await?;

        let query = format!(
            "SELECT {} FROM versions WHERE active = $1 ORDER BY id LIMIT 1",
            SELECT_COLUMNS
        );

        let row = client
            .query_opt(query.as_str(), &[&true])
            .await
            .map_err(ApiError::from)?;

        Ok(row.as_ref().map(Self::row_to_version))
    }
}
