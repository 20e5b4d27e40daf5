//! Table creation.

use crate::error::DbError;
use crate::pool::PostgresPool;

const PLAYERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    id SERIAL PRIMARY KEY,
    name VARCHAR NOT NULL UNIQUE,
    auth VARCHAR NOT NULL
)
"#;

// transition_at holds epoch seconds; 0 means no pending transition.
const PLOTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS plots (
    player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
    id SMALLINT NOT NULL,
    item BIGINT NOT NULL DEFAULT 0,
    transition_at BIGINT NOT NULL DEFAULT 0,
    PRIMARY KEY (player_id, id)
)
"#;

/// Create the `players` and `plots` tables if they are missing.
pub async fn init_schema(pool: &PostgresPool) -> Result<(), DbError> {
    for ddl in [PLAYERS_TABLE, PLOTS_TABLE] {
        sqlx::query(ddl)
            .execute(pool.inner())
            .await
            .map_err(|e| DbError::SchemaFailed(e.to_string()))?;
    }
    tracing::info!("Database schema ready");
    Ok(())
}
