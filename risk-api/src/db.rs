//! Database module - PostgreSQL connection and migrations

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create database connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Postgres prepared statements take one command each
    for statement in SCHEMA_SQL.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- High-risk students (dropout probability >= 0.70)
CREATE TABLE IF NOT EXISTS high_risk_students (
    id UUID PRIMARY KEY,
    student_id VARCHAR(128) NOT NULL,
    features JSONB NOT NULL,
    prediction JSONB NOT NULL,
    dropout_probability DOUBLE PRECISION NOT NULL,
    risk_level VARCHAR(16) NOT NULL,
    confidence DOUBLE PRECISION NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_high_risk_probability ON high_risk_students(dropout_probability);
CREATE INDEX IF NOT EXISTS idx_high_risk_created ON high_risk_students(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_high_risk_student ON high_risk_students(student_id);
CREATE INDEX IF NOT EXISTS idx_high_risk_level ON high_risk_students(risk_level);

-- Student mood tracker
CREATE TABLE IF NOT EXISTS mood_entries (
    id UUID PRIMARY KEY,
    student_id VARCHAR(128) NOT NULL,
    mood VARCHAR(16) NOT NULL,
    stress_level SMALLINT NOT NULL CHECK (stress_level BETWEEN 0 AND 10),
    sleep_hours DOUBLE PRECISION NOT NULL CHECK (sleep_hours >= 0 AND sleep_hours <= 24),
    notes TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_mood_student_created ON mood_entries(student_id, created_at DESC);
"#;
