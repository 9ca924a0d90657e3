//! Student mood tracker model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_MOOD_LIMIT: i64 = 30;
pub const MAX_MOOD_LIMIT: i64 = 100;
pub const MAX_STUDENT_ID_LEN: usize = 128;

/// Five-point self-reported mood scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "Very Sad")]
    VerySad,
    Sad,
    Neutral,
    Happy,
    #[serde(rename = "Very Happy")]
    VeryHappy,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::VerySad => "Very Sad",
            Mood::Sad => "Sad",
            Mood::Neutral => "Neutral",
            Mood::Happy => "Happy",
            Mood::VeryHappy => "Very Happy",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: Uuid,
    pub student_id: String,
    pub mood: String,
    pub stress_level: i16,
    pub sleep_hours: f64,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaveMoodRequest {
    pub mood: Mood,
    /// 0 = none, 10 = extreme
    #[validate(range(min = 0, max = 10))]
    pub stress_level: i16,
    #[validate(range(min = 0.0, max = 24.0))]
    pub sleep_hours: f64,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct MoodFilter {
    pub limit: Option<i64>,
}

impl MoodFilter {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_MOOD_LIMIT).clamp(1, MAX_MOOD_LIMIT)
    }
}

impl MoodEntry {
    pub async fn create(
        pool: &PgPool,
        student_id: &str,
        req: &SaveMoodRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, MoodEntry>(
            r#"
            INSERT INTO mood_entries (id, student_id, mood, stress_level, sleep_hours, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(req.mood.as_str())
        .bind(req.stress_level)
        .bind(req.sleep_hours)
        .bind(req.notes.as_deref().unwrap_or(""))
        .fetch_one(pool)
        .await
    }

    /// Newest entries for one student
    pub async fn recent(pool: &PgPool, student_id: &str, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, MoodEntry>(
            r#"
            SELECT * FROM mood_entries
            WHERE student_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        )
        .bind(student_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
