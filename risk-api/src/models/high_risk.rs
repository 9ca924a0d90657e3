//! High-risk student registry model

use chrono::{DateTime, Utc};
use dropout_risk_core::model::threshold::{
    CRITICAL_URGENCY_FLOOR, PERSIST_THRESHOLD, VERY_HIGH_URGENCY_FLOOR,
};
use dropout_risk_core::model::UrgencyBreakdown;
use dropout_risk_core::PredictionResult;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 500;

/// Totals and urgency bands in one pass; $1..$3 are the band floors, highest first
const SUMMARY_SQL: &str = r#"
SELECT
    COUNT(*) AS total,
    COUNT(*) FILTER (WHERE risk_level = 'High') AS high,
    AVG(dropout_probability) AS average,
    COUNT(*) FILTER (WHERE dropout_probability >= $1) AS critical,
    COUNT(*) FILTER (WHERE dropout_probability >= $2 AND dropout_probability < $1) AS very_high,
    COUNT(*) FILTER (WHERE dropout_probability >= $3 AND dropout_probability < $2) AS elevated
FROM high_risk_students
"#;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HighRiskStudent {
    pub id: Uuid,
    pub student_id: String,
    /// Feature payload the prediction was made from
    pub features: serde_json::Value,
    pub prediction: serde_json::Value,
    pub dropout_probability: f64,
    pub risk_level: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaveHighRiskRequest {
    #[validate(length(min = 1, max = 128))]
    pub student_id: String,
    pub features: serde_json::Value,
}

#[derive(Debug, Deserialize, Default)]
pub struct HighRiskFilter {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub min_probability: Option<f64>,
    pub risk_level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted_count: u64,
}

#[derive(Debug, Serialize)]
pub struct HighRiskSummary {
    pub total_students: i64,
    pub high_risk_students: i64,
    pub average_dropout_probability: Option<f64>,
    pub urgency: UrgencyBreakdown,
}

impl HighRiskStudent {
    pub async fn create(
        pool: &PgPool,
        student_id: &str,
        features: &serde_json::Value,
        result: &PredictionResult,
    ) -> Result<Self, sqlx::Error> {
        let prediction = serde_json::to_value(result)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query_as::<_, HighRiskStudent>(
            r#"
            INSERT INTO high_risk_students (id, student_id, features, prediction, dropout_probability, risk_level, confidence)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(features)
        .bind(&prediction)
        .bind(result.dropout_probability())
        .bind(result.risk_level.as_str())
        .bind(result.confidence)
        .fetch_one(pool)
        .await
    }

    /// Most recent record for a student
    pub async fn find_latest(pool: &PgPool, student_id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, HighRiskStudent>(
            r#"
            SELECT * FROM high_risk_students
            WHERE student_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#
        )
        .bind(student_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(pool: &PgPool, filter: &HighRiskFilter) -> Result<Vec<Self>, sqlx::Error> {
        let limit = filter.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        let offset = filter.offset.unwrap_or(0).max(0);

        sqlx::query_as::<_, HighRiskStudent>(
            r#"
            SELECT * FROM high_risk_students
            WHERE ($1::DOUBLE PRECISION IS NULL OR dropout_probability >= $1)
              AND ($2::TEXT IS NULL OR risk_level = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        )
        .bind(filter.min_probability)
        .bind(filter.risk_level.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn delete_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM high_risk_students")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn summary(pool: &PgPool) -> Result<HighRiskSummary, sqlx::Error> {
        let row = sqlx::query(SUMMARY_SQL)
            .bind(CRITICAL_URGENCY_FLOOR)
            .bind(VERY_HIGH_URGENCY_FLOOR)
            .bind(PERSIST_THRESHOLD)
            .fetch_one(pool)
            .await?;

        let count = |column: &str| -> u64 { row.get::<i64, _>(column).max(0) as u64 };

        Ok(HighRiskSummary {
            total_students: row.get("total"),
            high_risk_students: row.get("high"),
            average_dropout_probability: row.get("average"),
            urgency: UrgencyBreakdown {
                critical: count("critical"),
                very_high: count("very_high"),
                elevated: count("elevated"),
            },
        })
    }
}
